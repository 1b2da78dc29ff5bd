use alloc::boxed::Box;
use alloc::string::String;

use crate::IndexKey;

/// A type-erased error returned by a [`crate::DataSource`].
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("a table needs at least one column")]
    NoColumns,

    #[error("page size must be positive")]
    InvalidPageSize,

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("column number {0} is out of range")]
    ColumnIndexOutOfRange(usize),

    #[error("expected {expected} column widths, got {found}")]
    WidthMismatch { expected: usize, found: usize },

    #[error("a resize needs at least two columns in its run (index={index}, columns={len})")]
    ResizeRun { index: usize, len: usize },

    #[error("position {position} is out of range (len={len})")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("no row with index key `{0}`")]
    UnknownKey(IndexKey),

    #[error("row is missing a value for index column `{column}`")]
    MissingIndexKey { column: String },

    #[error("index column `{column}` must hold an integer or a string")]
    InvalidIndexKey { column: String },

    #[error("index column `{column}` cannot be modified in place")]
    IndexColumnReadOnly { column: String },

    #[error("row has shape `{found}`, expected `{expected}`")]
    ShapeMismatch { expected: String, found: String },

    #[error("data source failed: {0}")]
    DataSource(#[source] BoxError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "std")]
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for errors caused by invalid table configuration or arguments.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoColumns
                | Self::InvalidPageSize
                | Self::UnknownColumn(_)
                | Self::ColumnIndexOutOfRange(_)
                | Self::WidthMismatch { .. }
                | Self::ResizeRun { .. }
                | Self::IndexColumnReadOnly { .. }
        )
    }

    /// Returns `true` for lookups outside the current visible range or row set.
    pub fn is_bounds(&self) -> bool {
        matches!(self, Self::PositionOutOfRange { .. } | Self::UnknownKey(_))
    }
}
