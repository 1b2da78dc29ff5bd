use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{Align, DataTable, IndexKey, Record, Wrap};

/// Hooks the table calls on a freshly materialized row before caching it.
pub trait RowArtifact {
    /// Applies the row-level attribute returned by the table's `row_attr` function.
    fn set_attr(&mut self, attr: &str);

    /// Marks which column the cursor should land on when this row gains focus.
    fn set_focus_column(&mut self, index: usize);
}

/// Builds the rendered representation of one row.
///
/// The table calls this only for dirty rows; the result is cached until the row is
/// invalidated again.
pub type Materializer<A> = Arc<dyn Fn(&DataTable<A>, &IndexKey) -> A + Send + Sync>;

/// Row-level decoration: returns an attribute (style name) for a row, if any.
pub type RowAttrFn = Arc<dyn Fn(&Record) -> Option<String> + Send + Sync>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub column: String,
    pub text: String,
    pub align: Align,
    pub wrap: Wrap,
}

/// The default rendered row: one decorated text cell per visible column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedRow {
    pub key: IndexKey,
    pub cells: Vec<Cell>,
    pub attr: Option<String>,
    pub focus_column: Option<usize>,
}

impl RenderedRow {
    /// Materializes `key` using each visible column's decoration, alignment and wrap mode.
    pub fn materialize<A>(table: &DataTable<A>, key: &IndexKey) -> Self {
        let record = table.record(key);
        let cells = table
            .visible_columns()
            .map(|column| {
                let text = match record {
                    Some(record) => column.decorate(record.value(&column.name)),
                    None => String::new(),
                };
                Cell {
                    column: column.name.clone(),
                    text,
                    align: column.align,
                    wrap: column.wrap,
                }
            })
            .collect();
        Self {
            key: key.clone(),
            cells,
            attr: None,
            focus_column: None,
        }
    }

    pub fn cell(&self, column: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.column == column)
    }

    pub fn texts(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.text.as_str()).collect()
    }
}

impl RowArtifact for RenderedRow {
    fn set_attr(&mut self, attr: &str) {
        self.attr = Some(String::from(attr));
    }

    fn set_focus_column(&mut self, index: usize) {
        self.focus_column = Some(index);
    }
}
