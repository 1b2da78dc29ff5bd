use crate::{LoadPhase, PageState};

/// The window a `requery` resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Window {
    pub(crate) offset: usize,
    /// `None` when the table is not paginated.
    pub(crate) limit: Option<usize>,
    /// Page number recorded once the window is committed.
    pub(crate) page: usize,
}

impl Window {
    /// A window starting at zero rebuilds the store; any other window appends to it.
    pub(crate) fn is_fresh(&self) -> bool {
        self.offset == 0
    }
}

/// Lazy-load bookkeeping: page size, current page, known total and load phase.
///
/// `fetched` is the end of the source prefix read so far. It counts the rows the source
/// returned, not the rows the store kept, so repeated keys and deletions never pull the next
/// window back over rows already read.
#[derive(Clone, Debug)]
pub(crate) struct Pager {
    limit: Option<usize>,
    page: usize,
    fetched: usize,
    total: Option<usize>,
    phase: LoadPhase,
}

impl Pager {
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            page: 0,
            fetched: 0,
            total: None,
            phase: LoadPhase::Idle,
        }
    }

    pub(crate) fn is_paginated(&self) -> bool {
        self.limit.is_some()
    }

    pub(crate) fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub(crate) fn total(&self) -> Option<usize> {
        self.total
    }

    pub(crate) fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Rows the source has returned for the loaded prefix.
    pub(crate) fn fetched(&self) -> usize {
        self.fetched
    }

    /// Whether the known total has been read.
    pub(crate) fn reached_total(&self) -> bool {
        self.total.is_some_and(|total| self.fetched >= total)
    }

    /// Resolves a requery request to a page-aligned window.
    ///
    /// With an explicit offset, the offset is clamped down to its page boundary and exactly one
    /// page is requested. Without one, the window starts at zero and covers enough whole pages
    /// for `limit` rows (at least one page).
    pub(crate) fn window(&self, offset: Option<usize>, limit: Option<usize>) -> Window {
        let Some(page_size) = self.limit else {
            return Window {
                offset: 0,
                limit: None,
                page: 0,
            };
        };
        match offset {
            Some(offset) => {
                let page = offset / page_size;
                Window {
                    offset: page * page_size,
                    limit: Some(page_size),
                    page,
                }
            }
            None => {
                let rows = limit.unwrap_or(page_size);
                let pages = rows.div_ceil(page_size).max(1);
                Window {
                    offset: 0,
                    limit: Some(pages * page_size),
                    page: pages - 1,
                }
            }
        }
    }

    /// Offset of the page that follows the rows read so far.
    pub(crate) fn next_offset(&self) -> usize {
        match self.limit {
            Some(page_size) => self.fetched.div_ceil(page_size) * page_size,
            None => 0,
        }
    }

    /// Enters `Loading` and returns the phase to restore if the load fails.
    pub(crate) fn begin(&mut self) -> LoadPhase {
        core::mem::replace(&mut self.phase, LoadPhase::Loading)
    }

    pub(crate) fn abort(&mut self, previous: LoadPhase) {
        self.phase = previous;
    }

    /// Records a committed window and decides whether more rows can be fetched.
    pub(crate) fn finish(&mut self, window: Window, returned: usize, total: Option<usize>) {
        self.page = window.page;
        self.fetched = window.offset + returned;
        self.total = total;
        self.phase = match window.limit {
            None => LoadPhase::Exhausted,
            Some(requested) => {
                if self.reached_total() || returned < requested {
                    LoadPhase::Exhausted
                } else {
                    LoadPhase::Idle
                }
            }
        };
    }

    pub(crate) fn exhaust(&mut self) {
        self.phase = LoadPhase::Exhausted;
    }

    pub(crate) fn state(&self, loaded: usize) -> PageState {
        PageState {
            page: self.page,
            limit: self.limit,
            total: self.total,
            loaded,
            phase: self.phase,
        }
    }
}
