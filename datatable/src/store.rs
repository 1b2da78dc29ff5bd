use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::key::KeyMap;
use crate::{Error, IndexKey, Record, Result, RowData, RowView, Value};

#[derive(Clone, Debug)]
pub(crate) struct RowSlot<A> {
    pub(crate) record: Record,
    pub(crate) dirty: bool,
    pub(crate) rendered: Option<Arc<A>>,
    pub(crate) focus_position: Option<usize>,
}

impl<A> RowSlot<A> {
    fn view(&self) -> RowView<'_> {
        RowView {
            record: &self.record,
            dirty: self.dirty,
            focus_position: self.focus_position,
        }
    }

    fn invalidate(&mut self) {
        self.dirty = true;
        self.rendered = None;
    }
}

/// Ordered, keyed row storage.
///
/// `order` is the sort order; every key in it has exactly one slot in `rows`.
#[derive(Clone, Debug)]
pub(crate) struct RowStore<A> {
    index: String,
    order: Vec<IndexKey>,
    rows: KeyMap<RowSlot<A>>,
}

impl<A> RowStore<A> {
    pub(crate) fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            order: Vec::new(),
            rows: KeyMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn keys(&self) -> &[IndexKey] {
        &self.order
    }

    pub(crate) fn contains(&self, key: &IndexKey) -> bool {
        self.rows.contains_key(key)
    }

    pub(crate) fn get(&self, key: &IndexKey) -> Option<&Record> {
        self.rows.get(key).map(|slot| &slot.record)
    }

    pub(crate) fn slot(&self, key: &IndexKey) -> Option<&RowSlot<A>> {
        self.rows.get(key)
    }

    /// Iterates rows in sort order.
    pub(crate) fn views(&self) -> impl Iterator<Item = RowView<'_>> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.rows.get(key).map(RowSlot::view))
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &Record> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.rows.get(key).map(|slot| &slot.record))
    }

    /// Validates a batch and extracts each row's index key.
    ///
    /// Either every row has a valid key or the whole batch is rejected, so callers can commit
    /// the batch atomically.
    pub(crate) fn prepare(index: &str, rows: Vec<RowData>) -> Result<Vec<(IndexKey, RowData)>> {
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let key = IndexKey::from_value(index, row.fields.get(index))?;
            out.push((key, row));
        }
        Ok(out)
    }

    /// Ingests a prepared batch and returns the keys that were inserted or replaced.
    ///
    /// A duplicate key replaces the prior row's values but keeps its place in the order.
    pub(crate) fn append_prepared(
        &mut self,
        rows: Vec<(IndexKey, RowData)>,
        focus_position: Option<usize>,
    ) -> Vec<IndexKey> {
        let mut touched = Vec::with_capacity(rows.len());
        for (key, row) in rows {
            if let Some(slot) = self.rows.get_mut(&key) {
                dtrace!(key = ?key, "replacing row with duplicate index key");
                slot.record.replace_values(row.shape, row.fields);
                slot.focus_position = focus_position;
                slot.invalidate();
            } else {
                self.order.push(key.clone());
                self.rows.insert(
                    key.clone(),
                    RowSlot {
                        record: Record::new(key.clone(), row.shape, row.fields),
                        dirty: true,
                        rendered: None,
                        focus_position,
                    },
                );
            }
            touched.push(key);
        }
        touched
    }

    pub(crate) fn append(
        &mut self,
        rows: Vec<RowData>,
        focus_position: Option<usize>,
    ) -> Result<Vec<IndexKey>> {
        let prepared = Self::prepare(&self.index, rows)?;
        Ok(self.append_prepared(prepared, focus_position))
    }

    /// Writes a cell and marks the row dirty.
    pub(crate) fn set(&mut self, key: &IndexKey, column: &str, value: Value) -> Result<()> {
        if column == self.index {
            return Err(Error::IndexColumnReadOnly {
                column: String::from(column),
            });
        }
        let slot = self
            .rows
            .get_mut(key)
            .ok_or_else(|| Error::UnknownKey(key.clone()))?;
        slot.record.set(column, value);
        slot.invalidate();
        Ok(())
    }

    /// Writes a computed value without touching the dirty flag.
    pub(crate) fn set_computed(&mut self, key: &IndexKey, column: &str, value: Value) {
        if let Some(slot) = self.rows.get_mut(key) {
            slot.record.set(column, value);
        }
    }

    /// Removes rows by key. Absent keys are ignored.
    pub(crate) fn delete<'a>(&mut self, keys: impl IntoIterator<Item = &'a IndexKey>) -> usize {
        let mut removed = 0usize;
        for key in keys {
            if self.rows.remove(key).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            let rows = &self.rows;
            self.order.retain(|key| rows.contains_key(key));
        }
        removed
    }

    /// Swaps every field except `keep` between two rows.
    pub(crate) fn swap_fields(&mut self, a: &IndexKey, b: &IndexKey, keep: &str) -> Result<()> {
        let ra = self.get(a).ok_or_else(|| Error::UnknownKey(a.clone()))?.clone();
        let rb = self.get(b).ok_or_else(|| Error::UnknownKey(b.clone()))?.clone();
        for (name, value) in ra.fields() {
            if name != keep && name != &self.index {
                self.set_computed(b, name, value.clone());
            }
        }
        for (name, value) in rb.fields() {
            if name != keep && name != &self.index {
                self.set_computed(a, name, value.clone());
            }
        }
        self.mark_dirty(a);
        self.mark_dirty(b);
        Ok(())
    }

    pub(crate) fn add_column(&mut self, column: &str, value: &Value) {
        for slot in self.rows.values_mut() {
            slot.record.set(column, value.clone());
            slot.invalidate();
        }
    }

    pub(crate) fn remove_column(&mut self, column: &str) {
        for slot in self.rows.values_mut() {
            slot.record.remove(column);
            slot.invalidate();
        }
    }

    pub(crate) fn mark_dirty(&mut self, key: &IndexKey) {
        if let Some(slot) = self.rows.get_mut(key) {
            slot.invalidate();
        }
    }

    pub(crate) fn mark_all_dirty(&mut self) {
        for slot in self.rows.values_mut() {
            slot.invalidate();
        }
    }

    /// Sets the focus-column marker on every row.
    pub(crate) fn set_focus_all(&mut self, focus_position: Option<usize>) {
        for slot in self.rows.values_mut() {
            slot.focus_position = focus_position;
            slot.invalidate();
        }
    }

    pub(crate) fn store_rendered(&mut self, key: &IndexKey, rendered: Arc<A>) {
        if let Some(slot) = self.rows.get_mut(key) {
            slot.rendered = Some(rendered);
            slot.dirty = false;
        }
    }

    /// Replaces the sort order. `order` must be a permutation of the current keys.
    pub(crate) fn reorder(&mut self, order: Vec<IndexKey>) {
        debug_assert_eq!(order.len(), self.order.len(), "reorder must be a permutation");
        self.order = order;
    }
}
