use alloc::vec::Vec;

use crate::sort::compare_sort_keys;
use crate::{BoxError, RowData, SortBy, Value};

/// A window request sent to a [`DataSource`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    /// Set only when the table delegates sorting to the source (`query_sort`).
    pub sort: Option<SortBy>,
    /// `None` (together with `limit`) when the table is not paginated.
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    /// Set when the request is one step of a `load_all` pass.
    pub load_all: bool,
}

/// Supplies rows to a table.
///
/// Implementations must be idempotent for identical queries, modulo external changes to the
/// underlying data. The table never calls a source concurrently; a slow source blocks the
/// caller of `requery`/`load_more`.
pub trait DataSource {
    /// Returns at most `query.limit` rows starting at `query.offset`.
    fn query(&mut self, query: &Query) -> Result<Vec<RowData>, BoxError>;

    /// The total number of rows the source can return, if known.
    ///
    /// `None` means the table keeps fetching pages until a short page arrives.
    fn query_result_count(&mut self) -> Result<Option<usize>, BoxError> {
        Ok(None)
    }
}

impl<S: DataSource + ?Sized> DataSource for alloc::boxed::Box<S> {
    fn query(&mut self, query: &Query) -> Result<Vec<RowData>, BoxError> {
        (**self).query(query)
    }

    fn query_result_count(&mut self) -> Result<Option<usize>, BoxError> {
        (**self).query_result_count()
    }
}

/// An in-memory data source over a fixed set of rows.
///
/// Honors offset/limit and, when asked, sorts with the same null policy as the table.
#[derive(Clone, Debug, Default)]
pub struct VecSource {
    rows: Vec<RowData>,
}

impl VecSource {
    pub fn new(rows: Vec<RowData>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[RowData] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut Vec<RowData> {
        &mut self.rows
    }
}

impl DataSource for VecSource {
    fn query(&mut self, query: &Query) -> Result<Vec<RowData>, BoxError> {
        let mut rows: Vec<&RowData> = self.rows.iter().collect();
        if let Some(sort) = &query.sort {
            rows.sort_by(|a, b| {
                let a = a.get(&sort.column).unwrap_or(&Value::Null);
                let b = b.get(&sort.column).unwrap_or(&Value::Null);
                compare_sort_keys(a, b, sort.reverse)
            });
        }
        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(offset).take(limit).cloned().collect())
    }

    fn query_result_count(&mut self) -> Result<Option<usize>, BoxError> {
        Ok(Some(self.rows.len()))
    }
}

/// Adapts a query closure into a [`DataSource`] with an unknown total.
pub struct FnSource<F> {
    f: F,
}

impl<F> FnSource<F>
where
    F: FnMut(&Query) -> Result<Vec<RowData>, BoxError>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> DataSource for FnSource<F>
where
    F: FnMut(&Query) -> Result<Vec<RowData>, BoxError>,
{
    fn query(&mut self, query: &Query) -> Result<Vec<RowData>, BoxError> {
        (self.f)(query)
    }
}
