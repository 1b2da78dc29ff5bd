use serde::{Deserialize, Serialize};

/// The lazy-load controller's phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadPhase {
    #[default]
    Idle,
    /// A window query is in flight.
    Loading,
    /// Every row the source can return has been loaded.
    Exhausted,
}

/// A lightweight, serializable snapshot of the pagination state.
///
/// This is useful for status lines ("120 of 237 loaded") and for restoring a table's scroll
/// position across sessions without coupling the table to any UI framework.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub page: usize,
    /// Page size; `None` when the table is not paginated.
    pub limit: Option<usize>,
    /// Total row count reported by the data source, if known.
    pub total: Option<usize>,
    /// Rows currently held by the table.
    pub loaded: usize,
    pub phase: LoadPhase,
}

impl PageState {
    pub fn is_exhausted(&self) -> bool {
        self.phase == LoadPhase::Exhausted
    }
}
