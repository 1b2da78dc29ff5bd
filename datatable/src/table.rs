use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::events::Observers;
use crate::pager::Pager;
use crate::render::RowArtifact;
use crate::resize::{HeaderDrag, negotiate_widths, resolve_header_drag};
use crate::sort::{sort_store, sort_store_by_index};
use crate::store::RowStore;
use crate::{
    Column, ColumnRef, DataSource, Error, Event, FilterSet, IndexKey, LoadPhase, ObserverId,
    PageState, PositionIndex, Query, Record, RenderedRow, Result, RowData, RowShape, RowView,
    Sizing, SortBy, TableOptions, Value, ValueFn, VecSource,
};

/// Read-only access to a table, as seen by computed-column functions.
pub trait TableRead {
    fn columns(&self) -> &[Column];

    fn index_name(&self) -> &str;

    fn record(&self, key: &IndexKey) -> Option<&Record>;

    /// Rows held by the table, visible or not.
    fn loaded_len(&self) -> usize;

    /// Rows that pass the current filters.
    fn visible_len(&self) -> usize;
}

/// A sortable, filterable, lazily loaded table of rows.
///
/// The table owns three orderings:
/// - the row store's sort order, changed by sorting;
/// - the visible positions `0..len()`, the rows of the store that pass the filters, in sort
///   order;
/// - the index-key order, restored by [`Self::sort_index`].
///
/// Rows are fetched from a [`DataSource`] one page at a time when the table is paginated.
/// Rendered rows of type `A` are cached per row until the row is invalidated.
pub struct DataTable<A = RenderedRow> {
    pub(crate) options: TableOptions<A>,
    pub(crate) index: String,
    pub(crate) columns: Vec<Column>,
    pub(crate) store: RowStore<A>,
    pub(crate) positions: PositionIndex,
    pub(crate) filters: FilterSet,
    pub(crate) source: Box<dyn DataSource>,
    pub(crate) pager: Pager,
    pub(crate) sort_by: Option<SortBy>,
    /// Visible column number of the sort column.
    pub(crate) sort_column: Option<usize>,
    pub(crate) focus: Option<usize>,
    pub(crate) observers: Observers,
}

impl<A> DataTable<A> {
    /// Creates a table over `source`.
    ///
    /// Loads the first page unless `options.load_on_init` is off.
    pub fn new(options: TableOptions<A>, source: impl DataSource + 'static) -> Result<Self> {
        if options.columns.is_empty() {
            return Err(Error::NoColumns);
        }
        if options.limit == Some(0) {
            return Err(Error::InvalidPageSize);
        }
        let index = options.index.clone();
        let mut columns = options.columns.clone();
        if !columns.iter().any(|c| c.name == index) {
            columns.insert(0, Column::hidden(index.clone()));
        }
        if let Some(sort) = &options.sort_by {
            if !columns.iter().any(|c| c.name == sort.column) {
                return Err(Error::UnknownColumn(sort.column.clone()));
            }
        }

        let mut table = Self {
            store: RowStore::new(index.clone()),
            index,
            columns,
            positions: PositionIndex::new(),
            filters: FilterSet::new(),
            source: Box::new(source),
            pager: Pager::new(options.limit),
            sort_by: options.sort_by.clone(),
            sort_column: None,
            focus: None,
            observers: Observers::default(),
            options,
        };
        table.sync_sort_column();
        ddebug!(
            index = %table.index,
            columns = table.columns.len(),
            limit = ?table.options.limit,
            query_sort = table.options.query_sort,
            "table created"
        );
        if table.options.load_on_init {
            table.reset(false)?;
        }
        Ok(table)
    }

    /// Creates a table over a fixed set of rows.
    pub fn from_rows(options: TableOptions<A>, rows: Vec<RowData>) -> Result<Self> {
        Self::new(options, VecSource::new(rows))
    }

    pub fn options(&self) -> &TableOptions<A> {
        &self.options
    }

    /// Replaces the data source. Takes effect on the next query.
    pub fn set_source(&mut self, source: impl DataSource + 'static) {
        self.source = Box::new(source);
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn visible_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(|c| !c.hide)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Position of `name` among the visible columns.
    pub fn visible_column_index(&self, name: &str) -> Option<usize> {
        self.visible_columns().position(|c| c.name == name)
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    pub fn sort_by(&self) -> Option<&SortBy> {
        self.sort_by.as_ref()
    }

    /// Visible column number of the active sort, if the sort column is visible.
    pub fn sort_column(&self) -> Option<usize> {
        self.sort_column
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Number of rows held, including filtered-out rows.
    pub fn loaded_len(&self) -> usize {
        self.store.len()
    }

    /// Visible keys in display order.
    pub fn keys(&self) -> &[IndexKey] {
        self.positions.keys()
    }

    pub fn positions(&self) -> &PositionIndex {
        &self.positions
    }

    /// Total row count reported by the data source. `None` when unknown or not paginated.
    pub fn row_count(&self) -> Option<usize> {
        if self.pager.is_paginated() {
            self.pager.total()
        } else {
            None
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.pager.phase()
    }

    pub fn page_state(&self) -> PageState {
        self.pager.state(self.store.len())
    }

    pub fn position_to_key(&self, position: usize) -> Result<&IndexKey> {
        self.positions
            .key_at(position)
            .ok_or(Error::PositionOutOfRange {
                position,
                len: self.len(),
            })
    }

    pub fn key_to_position(&self, key: &IndexKey) -> Option<usize> {
        self.positions.position_of(key)
    }

    pub fn next_position(&self, position: usize) -> Option<usize> {
        let next = position.checked_add(1)?;
        (next < self.len()).then_some(next)
    }

    pub fn prev_position(&self, position: usize) -> Option<usize> {
        position.checked_sub(1).filter(|&p| p < self.len())
    }

    pub fn record(&self, key: &IndexKey) -> Option<&Record> {
        self.store.get(key)
    }

    pub fn record_at(&self, position: usize) -> Result<&Record> {
        let key = self.position_to_key(position)?;
        self.store
            .get(key)
            .ok_or_else(|| Error::UnknownKey(key.clone()))
    }

    /// Visible rows in display order.
    pub fn records(&self) -> impl Iterator<Item = &Record> + '_ {
        self.positions
            .keys()
            .iter()
            .filter_map(|key| self.store.get(key))
    }

    /// Reconstructs the typed record shown at `position`.
    pub fn typed_row<T: RowShape>(&self, position: usize) -> Result<T> {
        self.record_at(position)?.decode()
    }

    pub fn get_value(&self, position: usize, column: &str) -> Result<&Value> {
        self.check_column(column)?;
        Ok(self.record_at(position)?.value(column))
    }

    pub fn set_value(
        &mut self,
        position: usize,
        column: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let key = self.position_to_key(position)?.clone();
        self.set(&key, column, value)
    }

    /// Writes one cell and marks the row dirty.
    pub fn set(&mut self, key: &IndexKey, column: &str, value: impl Into<Value>) -> Result<()> {
        self.check_column(column)?;
        self.store.set(key, column, value.into())
    }

    pub fn focus_position(&self) -> Option<usize> {
        self.focus
    }

    /// Moves the focus, announcing `Blur` of the old position before `Focus` of the new one.
    pub fn set_focus(&mut self, position: usize) -> Result<()> {
        if position >= self.len() {
            return Err(Error::PositionOutOfRange {
                position,
                len: self.len(),
            });
        }
        self.move_focus(Some(position));
        Ok(())
    }

    /// The focused row.
    pub fn selection(&self) -> Option<&Record> {
        let key = self.positions.key_at(self.focus?)?;
        self.store.get(key)
    }

    /// Announces the focused row as selected.
    pub fn select(&self) -> Option<&IndexKey> {
        let key = self.positions.key_at(self.focus?)?;
        self.observers.emit(&Event::Select(key.clone()));
        Some(key)
    }

    pub fn subscribe(&mut self, observer: impl Fn(&Event) + Send + Sync + 'static) -> ObserverId {
        self.observers.subscribe(Arc::new(observer))
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Recomputes the visible positions from scratch and clamps the focus into range.
    pub fn apply_filters(&mut self) {
        self.positions = self.filters.apply(&self.store);
        dtrace!(
            visible = self.positions.len(),
            loaded = self.store.len(),
            filters = self.filters.len(),
            "apply_filters"
        );
        self.clamp_focus();
    }

    pub fn set_filters(&mut self, filters: FilterSet) {
        self.filters = filters;
        self.apply_filters();
    }

    pub fn add_filter(&mut self, predicate: impl Fn(&RowView<'_>) -> bool + Send + Sync + 'static) {
        self.filters.push(predicate);
        self.apply_filters();
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
        self.apply_filters();
    }

    /// Sorts by `column`.
    ///
    /// An unqualified sort (`reverse == None`) uses the column's default direction. With
    /// `toggle`, sorting again by the active column flips the current direction instead.
    /// In `query_sort` mode the rows are re-queried from the source, sorted there.
    pub fn sort_by_column(
        &mut self,
        column: impl Into<ColumnRef>,
        reverse: Option<bool>,
        toggle: bool,
    ) -> Result<()> {
        let number = self.resolve_column(&column.into())?;
        let column = &self.columns[number];
        let reverse = match &self.sort_by {
            Some(current) if toggle && current.column == column.name => !current.reverse,
            _ => reverse.or(column.sort_reverse).unwrap_or(false),
        };
        let sort = SortBy::new(column.name.clone(), reverse);
        ddebug!(column = %sort.column, reverse, query_sort = self.options.query_sort, "sort_by_column");

        let refocus = if self.options.sort_refocus {
            self.selection().map(|record| record.key().clone())
        } else {
            None
        };
        self.sort_by = Some(sort.clone());
        self.sync_sort_column();
        if self.options.query_sort {
            self.reset(false)?;
        } else {
            self.local_sort();
            self.apply_filters();
        }
        self.store.set_focus_all(self.sort_column);
        if let Some(position) = refocus.and_then(|key| self.key_to_position(&key)) {
            self.move_focus(Some(position));
        }
        self.observers.emit(&Event::Sorted(sort));
        Ok(())
    }

    /// Re-applies the active sort.
    pub fn resort(&mut self) -> Result<()> {
        match self.sort_by.clone() {
            Some(sort) => self.sort_by_column(sort.column, Some(sort.reverse), false),
            None => Ok(()),
        }
    }

    /// Moves the sort `step` visible columns along, wrapping around.
    pub fn cycle_sort_column(&mut self, step: isize) -> Result<()> {
        let visible = self.visible_columns().count();
        if visible == 0 {
            return Ok(());
        }
        let next = match self.sort_column {
            None => 0,
            Some(current) => (current as isize + step).rem_euclid(visible as isize) as usize,
        };
        self.sort_by_column(ColumnRef::Visible(next), None, false)
    }

    /// Drops the active sort and restores index-key order.
    pub fn sort_index(&mut self) {
        self.sort_by = None;
        self.sort_column = None;
        sort_store_by_index(&mut self.store);
        self.store.set_focus_all(None);
        self.apply_filters();
    }

    /// Appends one row, optionally re-sorting, and reapplies the filters.
    pub fn add_row(&mut self, row: RowData, sort: bool) -> Result<IndexKey> {
        let key = IndexKey::from_value(&self.index, row.get(&self.index))?;
        self.store
            .append_prepared(alloc::vec![(key.clone(), row)], self.sort_column);
        self.refresh_computed(Some(core::slice::from_ref(&key)));
        if sort && !self.options.query_sort {
            self.local_sort();
        }
        self.apply_filters();
        Ok(key)
    }

    /// Appends rows. The batch is rejected as a whole if any row lacks a valid index key.
    pub fn append_rows(&mut self, rows: Vec<RowData>) -> Result<Vec<IndexKey>> {
        let keys = self.store.append(rows, self.sort_column)?;
        self.refresh_computed(Some(&keys));
        if !self.options.query_sort {
            self.local_sort();
        }
        self.apply_filters();
        Ok(keys)
    }

    /// Deletes rows by key and returns how many were removed. Absent keys are skipped.
    pub fn delete_rows<'a>(&mut self, keys: impl IntoIterator<Item = &'a IndexKey>) -> usize {
        let removed = self.store.delete(keys);
        if removed > 0 {
            self.apply_filters();
        }
        removed
    }

    pub fn delete_position(&mut self, position: usize) -> Result<IndexKey> {
        let key = self.position_to_key(position)?.clone();
        self.delete_rows(core::iter::once(&key));
        Ok(key)
    }

    /// Swaps every field except `field` (the index column by default) between two rows.
    ///
    /// Each row keeps its index key and its position.
    pub fn swap_rows(&mut self, p0: usize, p1: usize, field: Option<&str>) -> Result<()> {
        let a = self.position_to_key(p0)?.clone();
        let b = self.position_to_key(p1)?.clone();
        let keep = match field {
            Some(field) => {
                self.check_column(field)?;
                String::from(field)
            }
            None => self.index.clone(),
        };
        self.store.swap_fields(&a, &b, &keep)?;
        self.refresh_computed(Some(&[a, b]));
        Ok(())
    }

    /// Marks every row dirty.
    pub fn invalidate(&mut self) {
        self.store.mark_all_dirty();
    }

    /// Marks rows dirty and recomputes their computed columns.
    pub fn invalidate_rows(&mut self, keys: &[IndexKey]) {
        for key in keys {
            self.store.mark_dirty(key);
        }
        self.refresh_computed(Some(keys));
    }

    /// Queries one window of rows.
    ///
    /// With an explicit `offset`, the page containing it is fetched and appended (or, at
    /// offset zero, replaces the store). Without one, the store is rebuilt from enough whole
    /// pages to hold `limit` rows.
    pub fn requery(&mut self, offset: Option<usize>, limit: Option<usize>) -> Result<()> {
        self.requery_with(offset, limit, false)
    }

    /// Fetches the next page when `position` lies past the loaded rows.
    ///
    /// The page starts where the rows read from the source end, whatever was deleted or
    /// replaced since. Returns whether the source returned any rows.
    pub fn load_more(&mut self, position: Option<usize>) -> Result<bool> {
        if !self.pager.is_paginated() || self.pager.phase() == LoadPhase::Exhausted {
            return Ok(false);
        }
        if position.is_some_and(|position| position < self.len()) {
            return Ok(false);
        }
        if self.pager.reached_total() {
            self.pager.exhaust();
            return Ok(false);
        }
        let fetched = self.pager.fetched();
        self.requery(Some(self.pager.next_offset()), None)?;
        Ok(self.pager.fetched() > fetched)
    }

    /// Fetches pages until the source is exhausted.
    pub fn load_all(&mut self) -> Result<()> {
        if !self.pager.is_paginated() {
            if self.pager.phase() != LoadPhase::Exhausted {
                self.requery_with(None, None, true)?;
            }
            return Ok(());
        }
        while self.pager.phase() != LoadPhase::Exhausted {
            if self.pager.reached_total() {
                self.pager.exhaust();
                break;
            }
            let fetched = self.pager.fetched();
            self.requery_with(Some(self.pager.next_offset()), None, true)?;
            if self.pager.fetched() == fetched {
                self.pager.exhaust();
            }
        }
        Ok(())
    }

    /// Reloads rows from the source.
    ///
    /// A reset reloads the first page and focuses position zero. Otherwise as many pages as
    /// are loaded are fetched again and the focused row keeps the focus.
    pub fn refresh(&mut self, reset: bool) -> Result<()> {
        let (selected, position) = if reset {
            (None, 0)
        } else {
            (
                self.selection().map(|record| record.key().clone()),
                self.focus.unwrap_or(0),
            )
        };
        if reset {
            self.requery(Some(0), None)?;
        } else {
            let fetched = self.pager.fetched();
            self.requery(None, Some(fetched))?;
        }
        let position = selected
            .and_then(|key| self.key_to_position(&key))
            .unwrap_or(position);
        let len = self.len();
        self.move_focus((len > 0).then(|| position.min(len - 1)));
        Ok(())
    }

    /// Reloads the first page, optionally restoring the initial sort.
    pub fn reset(&mut self, reset_sort: bool) -> Result<()> {
        if reset_sort {
            self.sort_by = self.options.sort_by.clone();
            self.sync_sort_column();
        }
        self.refresh(true)?;
        if reset_sort {
            self.store.set_focus_all(self.sort_column);
            if let Some(sort) = &self.sort_by {
                self.observers.emit(&Event::Sorted(sort.clone()));
            }
        }
        Ok(())
    }

    /// Appends columns, filling each with `value` in every loaded row.
    ///
    /// A column whose name already exists replaces that column's definition.
    pub fn add_columns(&mut self, columns: impl IntoIterator<Item = (Column, Value)>) -> Result<()> {
        for (column, value) in columns {
            if column.name == self.index {
                return Err(Error::IndexColumnReadOnly { column: column.name });
            }
            self.store.add_column(&column.name, &value);
            match self.columns.iter_mut().find(|c| c.name == column.name) {
                Some(existing) => *existing = column,
                None => self.columns.push(column),
            }
        }
        self.refresh_computed(None);
        self.sync_sort_column();
        Ok(())
    }

    pub fn add_column(&mut self, column: Column, value: impl Into<Value>) -> Result<()> {
        self.add_columns(core::iter::once((column, value.into())))
    }

    /// Removes columns and their cells. The index column cannot be removed.
    pub fn remove_columns<C: Into<ColumnRef>>(
        &mut self,
        columns: impl IntoIterator<Item = C>,
    ) -> Result<()> {
        let names = self.resolve_names(columns)?;
        if names.iter().any(|name| *name == self.index) {
            return Err(Error::IndexColumnReadOnly {
                column: self.index.clone(),
            });
        }
        self.columns.retain(|c| !names.contains(&c.name));
        for name in &names {
            self.store.remove_column(name);
        }
        if self
            .sort_by
            .as_ref()
            .is_some_and(|sort| names.contains(&sort.column))
        {
            self.sort_by = None;
        }
        self.sync_sort_column();
        Ok(())
    }

    /// Replaces every column definition and reloads.
    pub fn set_columns(&mut self, columns: Vec<Column>) -> Result<()> {
        if columns.is_empty() {
            return Err(Error::NoColumns);
        }
        let mut columns = columns;
        if !columns.iter().any(|c| c.name == self.index) {
            columns.insert(0, Column::hidden(self.index.clone()));
        }
        self.columns = columns;
        if let Some(sort) = &self.sort_by {
            if self.column(&sort.column).is_none() {
                self.sort_by = None;
            }
        }
        self.sync_sort_column();
        self.reset(false)
    }

    /// Shows or hides columns. `show == None` flips each column's visibility.
    pub fn toggle_columns<C: Into<ColumnRef>>(
        &mut self,
        columns: impl IntoIterator<Item = C>,
        show: Option<bool>,
    ) -> Result<()> {
        let numbers = columns
            .into_iter()
            .map(|c| self.resolve_column(&c.into()))
            .collect::<Result<Vec<_>>>()?;
        for number in numbers {
            let column = &mut self.columns[number];
            column.hide = match show {
                Some(show) => !show,
                None => !column.hide,
            };
        }
        self.sync_sort_column();
        self.store.set_focus_all(self.sort_column);
        Ok(())
    }

    pub fn show_columns<C: Into<ColumnRef>>(
        &mut self,
        columns: impl IntoIterator<Item = C>,
    ) -> Result<()> {
        self.toggle_columns(columns, Some(true))
    }

    pub fn hide_columns<C: Into<ColumnRef>>(
        &mut self,
        columns: impl IntoIterator<Item = C>,
    ) -> Result<()> {
        self.toggle_columns(columns, Some(false))
    }

    pub fn resize_column(&mut self, name: &str, sizing: Sizing) -> Result<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnknownColumn(String::from(name)))?;
        column.sizing = sizing;
        self.store.mark_all_dirty();
        self.observers.emit(&Event::ColumnsResized);
        Ok(())
    }

    /// Applies a header drag to the visible columns.
    ///
    /// `widths` and `mins` are the current and minimum widths of the visible columns as laid
    /// out by the caller. Columns whose width changes get a fixed [`Sizing::Given`] width.
    /// Returns the new widths, or `None` when the drag does not resize anything.
    pub fn drag_header(
        &mut self,
        drag: &HeaderDrag,
        widths: &[u32],
        mins: &[u32],
    ) -> Result<Option<Vec<u32>>> {
        let visible: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.hide)
            .map(|(number, _)| number)
            .collect();
        if widths.len() != visible.len() {
            return Err(Error::WidthMismatch {
                expected: visible.len(),
                found: widths.len(),
            });
        }
        let Some((direction, delta)) = resolve_header_drag(drag, visible.len()) else {
            return Ok(None);
        };
        let out = negotiate_widths(widths, mins, drag.index, delta, direction)?;

        let before: u64 = widths.iter().map(|&w| u64::from(w)).sum();
        let after: u64 = out.iter().map(|&w| u64::from(w)).sum();
        if before != after {
            dwarn!(before, after, "column widths not conserved by resize");
        }

        for (&number, (&old, &new)) in visible.iter().zip(widths.iter().zip(&out)) {
            if old != new {
                self.columns[number].sizing = Sizing::Given(new);
            }
        }
        self.store.mark_all_dirty();
        self.observers.emit(&Event::ColumnsResized);
        Ok(Some(out))
    }

    fn requery_with(
        &mut self,
        offset: Option<usize>,
        limit: Option<usize>,
        load_all: bool,
    ) -> Result<()> {
        let window = self.pager.window(offset, limit);
        let query = Query {
            sort: if self.options.query_sort {
                self.sort_by.clone()
            } else {
                None
            },
            offset: window.limit.map(|_| window.offset),
            limit: window.limit,
            load_all,
        };
        ddebug!(
            offset = ?query.offset,
            limit = ?query.limit,
            sort = ?query.sort,
            load_all,
            "requery"
        );

        let previous = self.pager.begin();
        let (rows, total) = match self.fetch(&query) {
            Ok(fetched) => fetched,
            Err(err) => {
                self.pager.abort(previous);
                return Err(err);
            }
        };

        let returned = rows.len();
        if window.is_fresh() {
            self.store = RowStore::new(self.index.clone());
        }
        let keys = self.store.append_prepared(rows, self.sort_column);
        self.pager.finish(window, returned, total);
        dtrace!(returned, loaded = self.store.len(), phase = ?self.pager.phase(), "window ingested");

        self.refresh_computed(Some(&keys));
        if !self.options.query_sort {
            self.local_sort();
        }
        self.apply_filters();
        self.observers.emit(&Event::Refreshed);
        Ok(())
    }

    /// Runs a query and validates the batch without touching the store.
    fn fetch(&mut self, query: &Query) -> Result<(Vec<(IndexKey, RowData)>, Option<usize>)> {
        let rows = self.source.query(query).map_err(Error::DataSource)?;
        let total = if self.pager.is_paginated() {
            self.source
                .query_result_count()
                .map_err(Error::DataSource)?
        } else {
            None
        };
        let rows = RowStore::<A>::prepare(&self.index, rows)?;
        Ok((rows, total))
    }

    fn local_sort(&mut self) {
        let Some(sort) = &self.sort_by else {
            return;
        };
        let key = self
            .columns
            .iter()
            .find(|c| c.name == sort.column)
            .and_then(|c| c.sort_key.clone());
        sort_store(&mut self.store, &sort.column, key.as_ref(), sort.reverse);
    }

    /// Recomputes computed columns for dirty rows, one column at a time in column order.
    fn refresh_computed(&mut self, keys: Option<&[IndexKey]>) {
        let computed: Vec<(String, ValueFn)> = self
            .columns
            .iter()
            .filter_map(|c| c.value_fn.as_ref().map(|f| (c.name.clone(), Arc::clone(f))))
            .collect();
        if computed.is_empty() {
            return;
        }
        let targets: Vec<IndexKey> = match keys {
            Some(keys) => keys.to_vec(),
            None => self.store.keys().to_vec(),
        };
        for (name, value_fn) in &computed {
            let table: &dyn TableRead = &*self;
            let updates: Vec<(IndexKey, Value)> = targets
                .iter()
                .filter_map(|key| {
                    let slot = self.store.slot(key).filter(|slot| slot.dirty)?;
                    Some((key.clone(), value_fn(table, &slot.record)))
                })
                .collect();
            for (key, value) in updates {
                self.store.set_computed(&key, name, value);
            }
        }
    }

    pub(crate) fn move_focus(&mut self, position: Option<usize>) {
        if self.focus == position {
            return;
        }
        if let Some(old) = self.focus {
            self.observers.emit(&Event::Blur(old));
        }
        self.focus = position;
        if let Some(new) = position {
            self.observers.emit(&Event::Focus(new));
        }
    }

    fn clamp_focus(&mut self) {
        let len = self.len();
        let clamped = match self.focus {
            Some(_) if len == 0 => None,
            Some(position) if position >= len => Some(len - 1),
            other => other,
        };
        self.move_focus(clamped);
    }

    pub(crate) fn sync_sort_column(&mut self) {
        self.sort_column = self
            .sort_by
            .as_ref()
            .and_then(|sort| self.visible_column_index(&sort.column));
    }

    fn check_column(&self, name: &str) -> Result<()> {
        if self.column(name).is_some() {
            Ok(())
        } else {
            Err(Error::UnknownColumn(String::from(name)))
        }
    }

    /// Resolves a column reference to its position in `self.columns`.
    fn resolve_column(&self, column: &ColumnRef) -> Result<usize> {
        match column {
            ColumnRef::Name(name) => self
                .columns
                .iter()
                .position(|c| c.name == *name)
                .ok_or_else(|| Error::UnknownColumn(name.clone())),
            ColumnRef::Index(number) if *number < self.columns.len() => Ok(*number),
            ColumnRef::Index(number) => Err(Error::ColumnIndexOutOfRange(*number)),
            ColumnRef::Visible(number) => self
                .columns
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.hide)
                .nth(*number)
                .map(|(position, _)| position)
                .ok_or(Error::ColumnIndexOutOfRange(*number)),
        }
    }

    fn resolve_names<C: Into<ColumnRef>>(
        &self,
        columns: impl IntoIterator<Item = C>,
    ) -> Result<Vec<String>> {
        columns
            .into_iter()
            .map(|c| {
                self.resolve_column(&c.into())
                    .map(|number| self.columns[number].name.clone())
            })
            .collect()
    }
}

impl<A: RowArtifact> DataTable<A> {
    /// Returns the rendered row for `key`.
    ///
    /// A clean row returns its cached artifact (the same `Arc`). A dirty row has its computed
    /// columns refreshed, is materialized again, decorated with the row attribute and the
    /// focus-column marker, cached and marked clean.
    pub fn get_row(&mut self, key: &IndexKey) -> Result<Arc<A>> {
        let slot = self
            .store
            .slot(key)
            .ok_or_else(|| Error::UnknownKey(key.clone()))?;
        if !slot.dirty {
            if let Some(rendered) = &slot.rendered {
                return Ok(Arc::clone(rendered));
            }
        }

        self.refresh_computed(Some(core::slice::from_ref(key)));
        let materializer = Arc::clone(&self.options.materializer);
        let mut artifact = materializer(&*self, key);
        if let Some(slot) = self.store.slot(key) {
            if let Some(attr) = self.options.row_attr.as_ref().and_then(|f| f(&slot.record)) {
                artifact.set_attr(&attr);
            }
            if let Some(focus) = slot.focus_position {
                artifact.set_focus_column(focus);
            }
        }
        let artifact = Arc::new(artifact);
        self.store.store_rendered(key, Arc::clone(&artifact));
        Ok(artifact)
    }

    pub fn get_row_by_position(&mut self, position: usize) -> Result<Arc<A>> {
        let key = self.position_to_key(position)?.clone();
        self.get_row(&key)
    }
}

impl<A> TableRead for DataTable<A> {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn index_name(&self) -> &str {
        &self.index
    }

    fn record(&self, key: &IndexKey) -> Option<&Record> {
        self.store.get(key)
    }

    fn loaded_len(&self) -> usize {
        self.store.len()
    }

    fn visible_len(&self) -> usize {
        self.positions.len()
    }
}

impl<A> core::fmt::Debug for DataTable<A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DataTable")
            .field("index", &self.index)
            .field("columns", &self.columns.len())
            .field("loaded", &self.store.len())
            .field("visible", &self.positions.len())
            .field("sort_by", &self.sort_by)
            .field("focus", &self.focus)
            .field("page", &self.pager.state(self.store.len()))
            .finish_non_exhaustive()
    }
}
