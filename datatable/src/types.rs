use alloc::string::String;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Wrap {
    #[default]
    Space,
    Any,
    Clip,
    Ellipsis,
}

/// How a column claims horizontal space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sizing {
    /// A fixed width in cells.
    Given(u32),
    /// A share of the remaining width, proportional to the weight.
    Weight(u32),
}

impl Default for Sizing {
    fn default() -> Self {
        Self::Weight(1)
    }
}

/// The side of a resize boundary that pays for (or absorbs) a drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeDirection {
    /// The run extends from the boundary column to the last column.
    Forward,
    /// The run extends from the boundary column back to the first column.
    Backward,
}

/// The active sort: a column name and its direction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub column: String,
    pub reverse: bool,
}

impl SortBy {
    pub fn new(column: impl Into<String>, reverse: bool) -> Self {
        Self {
            column: column.into(),
            reverse,
        }
    }

    pub fn ascending(column: impl Into<String>) -> Self {
        Self::new(column, false)
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self::new(column, true)
    }
}

/// Refers to a column by name, by its position among all columns, or by its position among
/// the visible columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnRef {
    Name(String),
    Index(usize),
    Visible(usize),
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        Self::Name(String::from(name))
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        Self::Visible(index)
    }
}
