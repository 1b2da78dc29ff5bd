use core::ops::Deref;

use alloc::string::String;

use crate::shape::RowShape;
use crate::{Error, Fields, IndexKey, Result, Value};

/// A row as stored by the table: its identity, its shape tag and its field values.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    key: IndexKey,
    shape: String,
    fields: Fields,
}

impl Record {
    pub(crate) fn new(key: IndexKey, shape: String, fields: Fields) -> Self {
        Self { key, shape, fields }
    }

    pub fn key(&self) -> &IndexKey {
        &self.key
    }

    /// The shape identifier of the record this row was built from.
    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }

    /// Like [`Self::get`], but absent fields read as `Value::Null`.
    pub fn value(&self, column: &str) -> &Value {
        self.fields.get(column).unwrap_or(&Value::Null)
    }

    /// Reconstructs the typed record this row was ingested from.
    pub fn decode<T: RowShape>(&self) -> Result<T> {
        if self.shape != T::SHAPE {
            return Err(Error::ShapeMismatch {
                expected: String::from(T::SHAPE),
                found: self.shape.clone(),
            });
        }
        let json = serde_json::to_value(&self.fields)?;
        Ok(serde_json::from_value(json)?)
    }

    pub(crate) fn set(&mut self, column: &str, value: Value) {
        match self.fields.get_mut(column) {
            Some(slot) => *slot = value,
            None => {
                self.fields.insert(String::from(column), value);
            }
        }
    }

    pub(crate) fn remove(&mut self, column: &str) {
        self.fields.remove(column);
    }

    pub(crate) fn replace_values(&mut self, shape: String, fields: Fields) {
        self.shape = shape;
        self.fields = fields;
    }
}

/// A read-only view of a stored row, including its cache metadata.
///
/// This is what filter predicates receive. It dereferences to [`Record`].
#[derive(Clone, Copy, Debug)]
pub struct RowView<'a> {
    pub record: &'a Record,
    pub dirty: bool,
    pub focus_position: Option<usize>,
}

impl Deref for RowView<'_> {
    type Target = Record;

    fn deref(&self) -> &Record {
        self.record
    }
}
