use alloc::vec::Vec;
use core::ops::Range;

use datatable::Result;

use crate::{RowAnchor, RowSource, apply_anchor, capture_anchor_at, capture_first_visible_anchor};

/// A framework-neutral controller that wraps a [`RowSource`] (usually a
/// `datatable::DataTable`) and tracks which rows a viewport shows.
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_viewport_size` when the viewport is laid out
/// - `scroll_to` / `scroll_by` on user scrolling
/// - `visible_rows` when drawing
///
/// Positions are row positions; the viewport is measured in rows.
#[derive(Clone, Debug)]
pub struct ScrollController<S> {
    source: S,
    viewport: usize,
    first: usize,
    prefetch: usize,
}

impl<S: RowSource> ScrollController<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            viewport: 0,
            first: 0,
            prefetch: 0,
        }
    }

    /// Starts loading more rows once the viewport is within `rows` of the loaded tail.
    pub fn with_prefetch(mut self, rows: usize) -> Self {
        self.prefetch = rows;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub fn viewport(&self) -> usize {
        self.viewport
    }

    pub fn first_visible(&self) -> usize {
        self.first
    }

    pub fn on_viewport_size(&mut self, rows: usize) {
        self.viewport = rows;
        self.first = self.clamp_first(self.first);
    }

    /// Scrolls so that `position` is the first visible row, as far as the rows allow.
    ///
    /// Returns the applied (clamped) first visible position.
    pub fn scroll_to(&mut self, position: usize) -> usize {
        self.first = self.clamp_first(position);
        self.first
    }

    pub fn scroll_by(&mut self, delta: isize) -> usize {
        let target = if delta < 0 {
            self.first.saturating_sub(delta.unsigned_abs())
        } else {
            self.first.saturating_add(delta as usize)
        };
        self.scroll_to(target)
    }

    /// Scrolls the least amount needed to show `position`.
    pub fn ensure_visible(&mut self, position: usize) {
        if position < self.first {
            self.first = position;
        } else if self.viewport > 0 && position >= self.first + self.viewport {
            self.first = position + 1 - self.viewport;
        }
        self.first = self.clamp_first(self.first);
    }

    pub fn visible_range(&self) -> Range<usize> {
        let len = self.source.visible_len();
        let start = self.first.min(len);
        let end = self.first.saturating_add(self.viewport).min(len);
        start..end
    }

    /// Materializes the rows in the viewport.
    ///
    /// When the viewport reaches within `prefetch` rows of the readable tail, one
    /// `load_more` is issued first, so a source that pages lazily keeps ahead of the viewport.
    pub fn visible_rows(&mut self) -> Result<Vec<S::Row>> {
        if self.viewport > 0 {
            let wanted = self
                .first
                .saturating_add(self.viewport)
                .saturating_add(self.prefetch);
            if wanted >= self.source.visible_len() && self.source.load_more(wanted)? {
                dtrace!(wanted, len = self.source.visible_len(), "prefetched rows");
            }
        }
        self.visible_range()
            .map(|position| self.source.row_at(position))
            .collect()
    }

    /// Moves the focus one row down, loading more rows at the tail.
    ///
    /// Returns the new focus position, or `None` at the last row.
    pub fn focus_next(&mut self) -> Result<Option<usize>> {
        let next = self.source.focus_position().map_or(0, |p| p + 1);
        if next >= self.source.visible_len() {
            self.source.load_more(next)?;
            if next >= self.source.visible_len() {
                return Ok(None);
            }
        }
        self.focus(next).map(Some)
    }

    /// Moves the focus one row up. Returns `None` at the first row.
    pub fn focus_prev(&mut self) -> Result<Option<usize>> {
        let Some(prev) = self
            .source
            .focus_position()
            .and_then(|p| p.checked_sub(1))
        else {
            return Ok(None);
        };
        self.focus(prev).map(Some)
    }

    pub fn capture_first_visible_anchor(&self) -> Option<RowAnchor> {
        capture_first_visible_anchor(&self.source, self.first)
    }

    /// Captures an anchor for the row `offset_in_viewport` rows below the top.
    pub fn capture_anchor_at(&self, offset_in_viewport: usize) -> Option<RowAnchor> {
        capture_anchor_at(&self.source, self.first, offset_in_viewport)
    }

    /// Scrolls so the anchored row is back at its offset in the viewport.
    ///
    /// Returns `true` when the anchor row is still visible.
    pub fn apply_anchor(&mut self, anchor: &RowAnchor) -> bool {
        let Some(first) = apply_anchor(&self.source, anchor) else {
            return false;
        };
        self.scroll_to(first);
        true
    }

    fn focus(&mut self, position: usize) -> Result<usize> {
        self.source.set_focus(position)?;
        self.ensure_visible(position);
        Ok(position)
    }

    fn clamp_first(&self, first: usize) -> usize {
        let len = self.source.visible_len();
        first.min(len.saturating_sub(self.viewport))
    }
}
