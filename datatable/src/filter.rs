use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::store::RowStore;
use crate::{PositionIndex, RowView};

/// A filter predicate. It sees the row's fields and its cache metadata.
pub type Predicate = Arc<dyn Fn(&RowView<'_>) -> bool + Send + Sync>;

/// A conjunction of predicates. An empty set lets every row through.
#[derive(Clone, Default)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, predicate: impl Fn(&RowView<'_>) -> bool + Send + Sync + 'static) -> Self {
        self.push(predicate);
        self
    }

    pub fn push(&mut self, predicate: impl Fn(&RowView<'_>) -> bool + Send + Sync + 'static) {
        self.predicates.push(Arc::new(predicate));
    }

    pub fn push_shared(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn clear(&mut self) {
        self.predicates.clear();
    }

    pub fn matches(&self, row: &RowView<'_>) -> bool {
        self.predicates.iter().all(|p| p(row))
    }

    /// Evaluates every row from scratch, in store order.
    pub(crate) fn apply<A>(&self, store: &RowStore<A>) -> PositionIndex {
        if self.predicates.is_empty() {
            return PositionIndex::from_keys(store.keys().to_vec());
        }
        let keys = store
            .views()
            .filter(|row| self.matches(row))
            .map(|row| row.key().clone())
            .collect();
        PositionIndex::from_keys(keys)
    }
}

impl core::fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FilterSet")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}
