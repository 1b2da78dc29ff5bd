//! Saving and loading a table's rows as a JSON document.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::{Column, DataTable, Error, Result, RowData, VecSource};

/// The persisted form of a table: index designation, column order and rows in sort order.
///
/// ```json
/// {
///   "index": "id",
///   "columns": ["id", "name", "score"],
///   "rows": [{ "shape": "record", "fields": { "id": 1, "name": "a", "score": 3 } }]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub index: String,
    pub columns: Vec<String>,
    pub rows: Vec<RowData>,
}

impl Document {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<A> DataTable<A> {
    /// Snapshots every loaded row, filtered or not.
    pub fn to_document(&self) -> Document {
        Document {
            index: self.index.clone(),
            columns: self.column_names().map(String::from).collect(),
            rows: self.store.records().map(RowData::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        self.to_document().to_json()
    }

    /// Replaces the table's rows with a document's and reloads.
    ///
    /// The document's rows become the table's data source and are all loaded, page by page
    /// when the table is paginated. Columns are laid out in the document's order; a column
    /// the table already defines keeps its definition, any other column gets a default one.
    pub fn load_document(&mut self, document: Document) -> Result<()> {
        let Document {
            index,
            columns: names,
            rows,
        } = document;
        if names.is_empty() {
            return Err(Error::NoColumns);
        }

        let mut previous = core::mem::take(&mut self.columns);
        let mut columns: Vec<Column> = names
            .into_iter()
            .map(|name| match previous.iter().position(|c| c.name == name) {
                Some(found) => previous.swap_remove(found),
                None if name == index => Column::hidden(name),
                None => Column::new(name),
            })
            .collect();
        if !columns.iter().any(|c| c.name == index) {
            columns.insert(0, Column::hidden(index.clone()));
        }
        ddebug!(index = %index, columns = columns.len(), rows = rows.len(), "loading document");

        self.columns = columns;
        self.index = index;
        if let Some(sort) = &self.sort_by {
            if self.column(&sort.column).is_none() {
                self.sort_by = None;
            }
        }
        self.sync_sort_column();
        self.source = Box::new(VecSource::new(rows));
        self.reset(false)?;
        self.load_all()
    }

    pub fn load_json(&mut self, json: &str) -> Result<()> {
        self.load_document(Document::from_json(json)?)
    }

    /// Writes the table to `path` as JSON.
    #[cfg(feature = "std")]
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reads a table saved with [`Self::save`] and reloads from it.
    #[cfg(feature = "std")]
    pub fn load(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = std::fs::read_to_string(path)?;
        self.load_json(&json)
    }
}
