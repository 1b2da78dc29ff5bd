use alloc::string::String;
use alloc::sync::Arc;

use crate::{Align, Record, Sizing, TableRead, Value, Wrap};

/// Derives a computed column's value for a row.
///
/// Invoked once per refresh pass for every dirty row.
pub type ValueFn = Arc<dyn Fn(&dyn TableRead, &Record) -> Value + Send + Sync>;

/// Maps a cell value to the value it is sorted by.
pub type SortKeyFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Turns a cell value into its displayed text.
pub type DecorationFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// A column definition.
///
/// The column's `name` is the key used in row field mappings. Column order determines
/// display order and which columns neighbour each other during a resize.
#[derive(Clone)]
pub struct Column {
    pub name: String,
    /// Header text; defaults to `name`.
    pub label: Option<String>,
    pub sizing: Sizing,
    pub align: Align,
    pub wrap: Wrap,
    pub hide: bool,
    /// Makes this a computed column.
    pub value_fn: Option<ValueFn>,
    pub sort_key: Option<SortKeyFn>,
    /// Direction used when a sort on this column does not name one.
    pub sort_reverse: Option<bool>,
    pub decoration_fn: Option<DecorationFn>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            sizing: Sizing::default(),
            align: Align::default(),
            wrap: Wrap::default(),
            hide: false,
            value_fn: None,
            sort_key: None,
            sort_reverse: None,
            decoration_fn: None,
        }
    }

    /// A hidden column, as inserted for an index that is not among the user's columns.
    pub fn hidden(name: impl Into<String>) -> Self {
        Self::new(name).with_hide(true)
    }

    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn is_computed(&self) -> bool {
        self.value_fn.is_some()
    }

    /// Renders a cell of this column as text.
    pub fn decorate(&self, value: &Value) -> String {
        match &self.decoration_fn {
            Some(f) => f(value),
            None => alloc::format!("{value}"),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.sizing = Sizing::Given(width);
        self
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.sizing = Sizing::Weight(weight);
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_wrap(mut self, wrap: Wrap) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn with_hide(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }

    pub fn with_value_fn(
        mut self,
        f: impl Fn(&dyn TableRead, &Record) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.value_fn = Some(Arc::new(f));
        self
    }

    pub fn with_sort_key(mut self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.sort_key = Some(Arc::new(f));
        self
    }

    pub fn with_sort_reverse(mut self, reverse: bool) -> Self {
        self.sort_reverse = Some(reverse);
        self
    }

    pub fn with_decoration(mut self, f: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        self.decoration_fn = Some(Arc::new(f));
        self
    }
}

impl core::fmt::Debug for Column {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("sizing", &self.sizing)
            .field("align", &self.align)
            .field("wrap", &self.wrap)
            .field("hide", &self.hide)
            .field("computed", &self.value_fn.is_some())
            .field("sort_reverse", &self.sort_reverse)
            .finish_non_exhaustive()
    }
}
