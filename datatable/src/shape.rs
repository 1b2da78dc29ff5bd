use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use core::any::Any;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Fields, Record, Result, Value};

/// Shape identifier given to rows that were not built from a typed record.
pub const DYNAMIC_SHAPE: &str = "record";

/// A typed record that can be stored as a table row and reconstructed on read.
///
/// The record must serialize to a flat map of scalar fields.
///
/// ```
/// use datatable::{RowData, RowShape};
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Player {
///     id: i64,
///     name: String,
/// }
///
/// impl RowShape for Player {
///     const SHAPE: &'static str = "player";
/// }
///
/// let row = RowData::from_shape(&Player { id: 1, name: "a".into() }).unwrap();
/// assert_eq!(row.shape, "player");
/// ```
pub trait RowShape: Serialize + DeserializeOwned {
    const SHAPE: &'static str;
}

/// An incoming row: a field mapping tagged with the shape it was built from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowData {
    pub shape: String,
    pub fields: Fields,
}

impl RowData {
    /// Creates an empty dynamic row.
    pub fn new() -> Self {
        Self {
            shape: String::from(DYNAMIC_SHAPE),
            fields: Fields::new(),
        }
    }

    pub fn from_fields(fields: Fields) -> Self {
        Self {
            shape: String::from(DYNAMIC_SHAPE),
            fields,
        }
    }

    /// Builds a row from a typed record, tagging it with `T::SHAPE`.
    pub fn from_shape<T: RowShape>(record: &T) -> Result<Self> {
        let json = serde_json::to_value(record)?;
        let fields: Fields = serde_json::from_value(json)?;
        Ok(Self {
            shape: String::from(T::SHAPE),
            fields,
        })
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = shape.into();
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields.get(column)
    }
}

impl Default for RowData {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Fields> for RowData {
    fn from(fields: Fields) -> Self {
        Self::from_fields(fields)
    }
}

impl From<&Record> for RowData {
    fn from(record: &Record) -> Self {
        Self {
            shape: String::from(record.shape()),
            fields: record.fields().clone(),
        }
    }
}

type Decoder = Arc<dyn Fn(&Record) -> Result<Box<dyn Any + Send>> + Send + Sync>;

/// Maps shape identifiers to typed constructors.
///
/// Useful when one table holds rows of several shapes and the reader wants the typed record
/// back without knowing the shape up front.
#[derive(Clone, Default)]
pub struct ShapeRegistry {
    decoders: BTreeMap<String, Decoder>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T: RowShape + Send + 'static>(&mut self) -> &mut Self {
        let decoder: Decoder = Arc::new(|record: &Record| {
            let typed: T = record.decode()?;
            Ok(Box::new(typed) as Box<dyn Any + Send>)
        });
        self.decoders.insert(String::from(T::SHAPE), decoder);
        self
    }

    pub fn with<T: RowShape + Send + 'static>(mut self) -> Self {
        self.register::<T>();
        self
    }

    pub fn contains(&self, shape: &str) -> bool {
        self.decoders.contains_key(shape)
    }

    /// Decodes `record` with the constructor registered for its shape.
    ///
    /// Returns `None` when the shape is not registered; such rows are read as plain
    /// [`Record`]s.
    pub fn decode(&self, record: &Record) -> Option<Result<Box<dyn Any + Send>>> {
        let decoder = self.decoders.get(record.shape())?;
        Some(decoder(record))
    }
}

impl core::fmt::Debug for ShapeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.decoders.keys()).finish()
    }
}
