use alloc::sync::Arc;

use datatable::{DataTable, IndexKey, Result, RowArtifact};

/// What a scrolling viewport needs from a table.
///
/// `row_count` is the total the source knows about (`None` when unknown); `visible_len` is
/// how many rows can be read right now. Reading near the tail should be followed by a
/// `load_more` so more rows become readable.
pub trait RowSource {
    type Row;

    fn row_count(&self) -> Option<usize>;

    fn visible_len(&self) -> usize;

    fn row_at(&mut self, position: usize) -> Result<Self::Row>;

    /// Asks for rows past `position`. Returns whether any were added.
    fn load_more(&mut self, position: usize) -> Result<bool>;

    fn key_at(&self, position: usize) -> Option<&IndexKey>;

    fn position_of(&self, key: &IndexKey) -> Option<usize>;

    fn focus_position(&self) -> Option<usize>;

    fn set_focus(&mut self, position: usize) -> Result<()>;
}

impl<A: RowArtifact> RowSource for DataTable<A> {
    type Row = Arc<A>;

    fn row_count(&self) -> Option<usize> {
        DataTable::row_count(self)
    }

    fn visible_len(&self) -> usize {
        self.len()
    }

    fn row_at(&mut self, position: usize) -> Result<Arc<A>> {
        self.get_row_by_position(position)
    }

    fn load_more(&mut self, position: usize) -> Result<bool> {
        DataTable::load_more(self, Some(position))
    }

    fn key_at(&self, position: usize) -> Option<&IndexKey> {
        self.position_to_key(position).ok()
    }

    fn position_of(&self, key: &IndexKey) -> Option<usize> {
        self.key_to_position(key)
    }

    fn focus_position(&self) -> Option<usize> {
        DataTable::focus_position(self)
    }

    fn set_focus(&mut self, position: usize) -> Result<()> {
        DataTable::set_focus(self, position)
    }
}
