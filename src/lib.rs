//! Tabella - streaming table markup to document-model grids
//!
//! This library turns a token-driven description of an HTML-like table
//! (rows, cells with row/column spans, column groups, captions,
//! arbitrarily nested tables) into a canonical rectangular grid with
//! resolved cell overlaps, inherited borders and backgrounds, and
//! computed column widths, ready to hand to a rich-document model.
//!
//! # Features
//!
//! - **Resumable building**: events arrive in batches of any size; the
//!   builder suspends between batches and resumes without replaying or
//!   dropping anything
//! - **Defensive by design**: untrusted markup clamps and degrades, it
//!   never aborts the surrounding import
//! - **Two-pass sizing**: intrinsic min/max ranges bottom-up, then a
//!   concrete width distribution top-down
//! - **Nested inheritance**: border lines and background fills flow
//!   from outer tables and cells into nested tables
//! - **Host-owned content**: leaf content stays behind opaque handles;
//!   the grid never interprets it
//!
//! # Example
//!
//! ```
//! use tabella::builder::{ContentSink, TableBuilder};
//! use tabella::grid::ContentHandle;
//! use tabella::layout::{ContentMeasure, SizeRange};
//! use tabella::markup::{CellOptions, ContentPayload, TableEvent, TableOptions};
//!
//! struct Host {
//!     next: u32,
//! }
//!
//! impl ContentSink for Host {
//!     fn new_content_section(&mut self, _is_header: bool) -> ContentHandle {
//!         self.next += 1;
//!         ContentHandle::new(self.next - 1)
//!     }
//!     fn content(&mut self, _section: ContentHandle, _payload: &ContentPayload) {}
//! }
//!
//! impl ContentMeasure for Host {
//!     fn measure(&self, _content: ContentHandle) -> SizeRange {
//!         SizeRange { min: 300, max: 1200 }
//!     }
//! }
//!
//! # fn main() -> Result<(), tabella::Error> {
//! let mut builder = TableBuilder::new(Host { next: 0 });
//! builder.feed([
//!     TableEvent::OpenTable(TableOptions::from_attrs([
//!         ("border", "1"),
//!         ("width", "100%"),
//!     ])),
//!     TableEvent::OpenRow { adjust: None, valign: None, background: None },
//!     TableEvent::OpenCell(CellOptions { row_span: 1, col_span: 1, ..Default::default() }),
//!     TableEvent::Content(ContentPayload("hello".into())),
//!     TableEvent::CloseCell,
//!     TableEvent::CloseRow,
//!     TableEvent::CloseTable,
//! ])?;
//! let (mut grid, host) = builder.finish()?;
//!
//! tabella::resolve::resolve_borders(&mut grid);
//! tabella::layout::plan(&mut grid, 9600, &host)?;
//!
//! assert_eq!(grid.row_count(), 1);
//! assert_eq!(grid.layout().unwrap().width, 9600);
//! # Ok(())
//! # }
//! ```
//!
//! # Pipeline
//!
//! Events flow into the [`builder`], which mutates a [`grid`]; once the
//! outermost table closes, the [`layout`] planner and the [`resolve`]
//! inheritance resolver run over the closed grid, and the [`assemble`]
//! walker consumes it exactly once to emit the host document-model
//! structure.

/// Grid-to-model assembly through the host [`DocumentModel`](assemble::DocumentModel) trait.
pub mod assemble;

/// The resumable, event-driven table builder.
pub mod builder;

/// Shared plumbing: errors, colors, style value types.
pub mod common;

/// Cell grid containers: cells, rows, columns, and the table grid.
pub mod grid;

/// Two-pass column sizing.
pub mod layout;

/// The event-stream language and table option parsing.
pub mod markup;

/// Border and background inheritance over nested tables.
pub mod resolve;

// Re-export commonly used types for convenience
pub use assemble::{assemble, DocumentModel};
pub use builder::{ContentSink, FeedStatus, TableBuilder};
pub use common::{Error, Result};
pub use grid::{ContentHandle, TableGrid};
pub use layout::{ContentMeasure, SizeRange};
pub use markup::{TableEvent, TableOptions};
pub use resolve::resolve_borders;
