//! Column width renegotiation for interactive header drags.

use alloc::vec::Vec;

use crate::{Error, ResizeDirection, Result};

/// Where a header drag started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOrigin {
    /// The divider to the right of the column.
    Divider,
    /// Inside the column's header cell, `offset` cells from its left edge.
    Cell { offset: u32, width: u32 },
}

/// A drag on the header of visible column `index`, moved by `delta` cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderDrag {
    pub index: usize,
    pub origin: DragOrigin,
    pub delta: i32,
}

/// Decides which run a header drag resizes and the delta applied to the boundary column.
///
/// - A divider drag grows (or shrinks) the column at the expense of the columns after it.
/// - A drag that starts in the left third of a cell (except the first column) moves the
///   column's left edge: the delta is negated and paid for by the columns before it.
/// - A drag that starts in the right third of a cell (except the last column) behaves like a
///   divider drag.
///
/// Any other drag is ignored.
pub fn resolve_header_drag(drag: &HeaderDrag, visible_len: usize) -> Option<(ResizeDirection, i32)> {
    match drag.origin {
        DragOrigin::Divider => Some((ResizeDirection::Forward, drag.delta)),
        DragOrigin::Cell { offset, width } => {
            let first_third = (width + 1) / 3;
            let last_third = (2 * width + 1) / 3;
            if drag.index != 0 && offset <= first_third {
                Some((ResizeDirection::Backward, drag.delta.saturating_neg()))
            } else if drag.index + 1 != visible_len && offset >= last_third {
                Some((ResizeDirection::Forward, drag.delta))
            } else {
                None
            }
        }
    }
}

/// Redistributes `delta` cells across the run of columns that starts at `index`.
///
/// The run is `index..n` for [`ResizeDirection::Forward`] (and for `index == 0`), otherwise
/// `index, index-1, ..., 0`. The boundary column `index` receives the delta; the rest of the
/// run pays for it:
///
/// - growing the boundary is clamped to the slack (`width - min`) left in the rest of the run,
///   and the rest of the run shrinks in run order, never below its minimums;
/// - shrinking the boundary is clamped to its own slack and the freed width goes to its
///   neighbour in the run.
///
/// The sum of the widths is unchanged. A run of fewer than two columns is rejected. A zero
/// delta leaves the widths untouched.
pub fn negotiate_widths(
    widths: &[u32],
    mins: &[u32],
    index: usize,
    delta: i32,
    direction: ResizeDirection,
) -> Result<Vec<u32>> {
    let n = widths.len();
    if mins.len() != n {
        return Err(Error::WidthMismatch {
            expected: n,
            found: mins.len(),
        });
    }
    let run: Vec<usize> = if index >= n {
        Vec::new()
    } else if direction == ResizeDirection::Forward || index == 0 {
        (index..n).collect()
    } else {
        (0..=index).rev().collect()
    };
    let Some((&boundary, rest)) = run.split_first().filter(|(_, rest)| !rest.is_empty()) else {
        return Err(Error::ResizeRun { index, len: n });
    };

    let mut out = widths.to_vec();
    if delta == 0 {
        return Ok(out);
    }
    let slack = |j: usize| widths[j].saturating_sub(mins[j]);

    if delta > 0 {
        let available: u64 = rest.iter().map(|&j| slack(j) as u64).sum();
        let granted = (delta as u64).min(available) as u32;
        debug_assert!(out[boundary].checked_add(granted).is_some());
        out[boundary] = out[boundary].saturating_add(granted);
        let mut remaining = granted;
        for &j in rest {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(slack(j));
            out[j] -= take;
            remaining -= take;
        }
        debug_assert_eq!(remaining, 0);
    } else {
        let granted = delta.unsigned_abs().min(slack(boundary));
        out[boundary] -= granted;
        out[rest[0]] = out[rest[0]].saturating_add(granted);
    }

    dtrace!(?widths, ?mins, index, delta, ?direction, ?out, "negotiate_widths");
    Ok(out)
}
