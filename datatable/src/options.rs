use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::render::{Materializer, RowAttrFn};
use crate::{Column, DataTable, IndexKey, Record, RenderedRow, SortBy};

/// Configuration for [`crate::DataTable`].
///
/// Built once per table. Closures are stored in `Arc`s so the struct is cheap to clone.
pub struct TableOptions<A = RenderedRow> {
    pub columns: Vec<Column>,
    /// Name of the index column. When it is not among `columns`, a hidden column is inserted
    /// at position 0.
    pub index: String,
    /// Page size. `None` loads everything in one query.
    pub limit: Option<usize>,
    /// Delegate sorting to the data source instead of sorting loaded rows.
    pub query_sort: bool,
    /// Initial sort, also restored by `reset(true)`.
    pub sort_by: Option<SortBy>,
    /// Keep the focused row focused across a sort.
    pub sort_refocus: bool,
    /// Load the first page when the table is constructed.
    pub load_on_init: bool,
    pub row_attr: Option<RowAttrFn>,
    pub materializer: Materializer<A>,
}

impl<A> Clone for TableOptions<A> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            index: self.index.clone(),
            limit: self.limit,
            query_sort: self.query_sort,
            sort_by: self.sort_by.clone(),
            sort_refocus: self.sort_refocus,
            load_on_init: self.load_on_init,
            row_attr: self.row_attr.clone(),
            materializer: Arc::clone(&self.materializer),
        }
    }
}

impl TableOptions<RenderedRow> {
    /// Creates options that render rows as [`RenderedRow`]s.
    pub fn new(columns: Vec<Column>) -> Self {
        Self::new_with_materializer(
            columns,
            |table: &DataTable<RenderedRow>, key: &IndexKey| RenderedRow::materialize(table, key),
        )
    }
}

impl<A> TableOptions<A> {
    /// Creates options with a custom row materializer.
    pub fn new_with_materializer(
        columns: Vec<Column>,
        materializer: impl Fn(&DataTable<A>, &IndexKey) -> A + Send + Sync + 'static,
    ) -> Self {
        Self {
            columns,
            index: String::from("index"),
            limit: None,
            query_sort: false,
            sort_by: None,
            sort_refocus: false,
            load_on_init: true,
            row_attr: None,
            materializer: Arc::new(materializer),
        }
    }

    /// Swaps the materializer, changing the rendered row type.
    pub fn with_materializer<B>(
        self,
        materializer: impl Fn(&DataTable<B>, &IndexKey) -> B + Send + Sync + 'static,
    ) -> TableOptions<B> {
        TableOptions {
            columns: self.columns,
            index: self.index,
            limit: self.limit,
            query_sort: self.query_sort,
            sort_by: self.sort_by,
            sort_refocus: self.sort_refocus,
            load_on_init: self.load_on_init,
            row_attr: self.row_attr,
            materializer: Arc::new(materializer),
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = index.into();
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.limit = Some(page_size);
        self
    }

    pub fn with_query_sort(mut self, query_sort: bool) -> Self {
        self.query_sort = query_sort;
        self
    }

    pub fn with_sort_by(mut self, sort_by: Option<SortBy>) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_sort_refocus(mut self, sort_refocus: bool) -> Self {
        self.sort_refocus = sort_refocus;
        self
    }

    pub fn with_load_on_init(mut self, load_on_init: bool) -> Self {
        self.load_on_init = load_on_init;
        self
    }

    pub fn with_row_attr(
        mut self,
        row_attr: Option<impl Fn(&Record) -> Option<String> + Send + Sync + 'static>,
    ) -> Self {
        self.row_attr = row_attr.map(|f| Arc::new(f) as _);
        self
    }
}

impl<A> core::fmt::Debug for TableOptions<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TableOptions")
            .field("columns", &self.columns)
            .field("index", &self.index)
            .field("limit", &self.limit)
            .field("query_sort", &self.query_sort)
            .field("sort_by", &self.sort_by)
            .field("sort_refocus", &self.sort_refocus)
            .field("load_on_init", &self.load_on_init)
            .finish_non_exhaustive()
    }
}
