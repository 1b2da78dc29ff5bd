use datatable::IndexKey;

use crate::RowSource;

/// A scroll anchor that pins the viewport to a row identity across data changes.
///
/// Typical use cases:
/// - keeping the same rows on screen after a sort or filter change
/// - a refresh that inserts rows above the viewport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowAnchor {
    pub key: IndexKey,
    /// Rows between the top of the viewport and the anchor row.
    pub offset_in_viewport: usize,
}

/// Captures an anchor for the first visible row.
///
/// Returns `None` if `first_visible` is past the readable rows.
pub fn capture_first_visible_anchor<S: RowSource>(
    source: &S,
    first_visible: usize,
) -> Option<RowAnchor> {
    capture_anchor_at(source, first_visible, 0)
}

/// Captures an anchor for the row `offset_in_viewport` rows below the top of the viewport.
pub fn capture_anchor_at<S: RowSource>(
    source: &S,
    first_visible: usize,
    offset_in_viewport: usize,
) -> Option<RowAnchor> {
    let key = source.key_at(first_visible.checked_add(offset_in_viewport)?)?;
    Some(RowAnchor {
        key: key.clone(),
        offset_in_viewport,
    })
}

/// Resolves an anchor against the current rows.
///
/// Returns the first visible position that puts the anchor row back at its offset, or `None`
/// when the row is no longer visible.
pub fn apply_anchor<S: RowSource>(source: &S, anchor: &RowAnchor) -> Option<usize> {
    let position = source.position_of(&anchor.key)?;
    Some(position.saturating_sub(anchor.offset_in_viewport))
}
