//! Viewport utilities for the `datatable` crate.
//!
//! The `datatable` crate is UI-agnostic and owns the rows, their order and their rendering
//! cache. This crate provides small, framework-neutral helpers commonly needed by the widget
//! that scrolls through a table:
//!
//! - A [`RowSource`] trait: the row count / row-by-position / load-more contract a viewport
//!   consumes, implemented for `DataTable`
//! - A [`ScrollController`] that keeps a window of rows on screen and pages lazily
//! - Row anchoring, to keep the viewport on the same rows across sorts and refreshes
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod controller;
mod source;


pub use anchor::{RowAnchor, apply_anchor, capture_anchor_at, capture_first_visible_anchor};
pub use controller::ScrollController;
pub use source::RowSource;
