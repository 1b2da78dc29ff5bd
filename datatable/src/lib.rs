//! A headless engine for sortable, filterable, lazily loaded tables.
//!
//! For viewport-level utilities (scrolling, anchoring), see the `datatable-adapter` crate.
//!
//! This crate owns the parts of an interactive table that carry real invariants: an indexed
//! row store, the sort and filter pipeline that maps display positions to rows, a pagination
//! controller that pulls windows of rows from a [`DataSource`], a per-row render cache and the
//! column width negotiation behind interactive header drags.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - a data source (or a static set of rows)
//! - a materializer that turns a row into something drawable (see [`RenderedRow`])
//! - column widths as laid out on screen, when resizing columns
//!
//! ```
//! use datatable::{Column, DataTable, RowData, SortBy, TableOptions};
//!
//! let options = TableOptions::new(vec![Column::new("name"), Column::new("score")])
//!     .with_index("id")
//!     .with_sort_by(Some(SortBy::ascending("score")));
//! let rows = vec![
//!     RowData::new().with("id", 1).with("name", "a").with("score", 3),
//!     RowData::new().with("id", 2).with("name", "b").with("score", 1),
//! ];
//! let mut table = DataTable::from_rows(options, rows).unwrap();
//! assert_eq!(table.len(), 2);
//! assert_eq!(table.get_row_by_position(0).unwrap().texts(), ["b", "1"]);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod column;
pub mod error;
mod events;
mod filter;
mod key;
mod options;
mod pager;
mod persist;
mod position;
mod record;
mod render;
mod resize;
mod shape;
mod sort;
mod source;
mod state;
mod store;
mod table;
mod types;
mod value;

#[cfg(test)]
mod tests;

pub use column::{Column, DecorationFn, SortKeyFn, ValueFn};
pub use error::{BoxError, Error, Result};
pub use events::{Event, Observer, ObserverId};
pub use filter::{FilterSet, Predicate};
pub use options::TableOptions;
pub use persist::Document;
pub use position::PositionIndex;
pub use record::{Record, RowView};
pub use render::{Cell, Materializer, RenderedRow, RowArtifact, RowAttrFn};
pub use resize::{DragOrigin, HeaderDrag, negotiate_widths, resolve_header_drag};
pub use shape::{DYNAMIC_SHAPE, RowData, RowShape, ShapeRegistry};
pub use sort::compare_sort_keys;
pub use source::{DataSource, FnSource, Query, VecSource};
pub use state::{LoadPhase, PageState};
pub use table::{DataTable, TableRead};
pub use types::{Align, ColumnRef, ResizeDirection, Sizing, SortBy, Wrap};
pub use value::{Fields, IndexKey, Value};
