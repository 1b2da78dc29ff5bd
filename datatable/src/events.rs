use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{IndexKey, SortBy};

/// A state change announced to observers.
///
/// When focus moves, `Blur` of the old position is always delivered before `Focus` of the new
/// one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Blur(usize),
    Focus(usize),
    Select(IndexKey),
    /// The row set was (re)loaded from the data source.
    Refreshed,
    Sorted(SortBy),
    ColumnsResized,
}

/// A callback invoked synchronously for every [`Event`].
pub type Observer = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

#[derive(Clone, Default)]
pub(crate) struct Observers {
    next_id: u64,
    list: Vec<(ObserverId, Observer)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.list.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.list.len();
        self.list.retain(|(other, _)| *other != id);
        self.list.len() != before
    }

    /// Delivers `event` to observers in registration order.
    pub(crate) fn emit(&self, event: &Event) {
        for (_, observer) in &self.list {
            observer(event);
        }
    }
}

impl core::fmt::Debug for Observers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.list.len())
            .finish()
    }
}
