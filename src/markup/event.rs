//! Table construction events.
//!
//! This enum is the language between the tokenizer and the builder: one
//! event per structural token, plus opaque content payloads that the
//! builder forwards to the host's content sink without interpretation.

use crate::common::{Background, BorderLine, HorizAdjust, NumberFormat, VertAlign, WidthSpec};
use crate::markup::options::TableOptions;

/// An opaque content payload forwarded verbatim to the host
/// [`ContentSink`](crate::builder::ContentSink).
///
/// The builder never inspects the payload; the type exists so event
/// streams stay self-contained and cloneable in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentPayload(pub String);

/// Options carried by a cell-open event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellOptions {
    /// Number of grid rows the cell occupies (0 is clamped to 1)
    pub row_span: u32,
    /// Number of grid columns the cell occupies (0 is clamped to 1)
    pub col_span: u32,
    pub width: Option<WidthSpec>,
    /// Requested height in twips
    pub height: Option<u32>,
    /// Horizontal adjustment for the cell content
    pub adjust: Option<HorizAdjust>,
    pub valign: Option<VertAlign>,
    pub background: Option<Background>,
    /// Per-cell border override, wins over table-level resolution
    pub border: Option<BorderLine>,
    pub num_format: Option<NumberFormat>,
    pub no_wrap: bool,
}

/// One structural event of a table description.
///
/// Any event may be the last of a feed batch; the builder suspends and
/// resumes without replaying or dropping events.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    /// Start of a table, with its parsed open-tag options
    OpenTable(TableOptions),
    /// Start of a column group
    OpenColumnGroup {
        span: u32,
        width: Option<WidthSpec>,
        adjust: Option<HorizAdjust>,
    },
    CloseColumnGroup,
    /// A single column declaration, inside or outside a group
    OpenColumn {
        span: u32,
        width: Option<WidthSpec>,
        adjust: Option<HorizAdjust>,
    },
    /// Start of a row group; header sections are forwarded to the
    /// content sink so it can style their rows
    OpenSection { header: bool },
    CloseSection,
    OpenRow {
        adjust: Option<HorizAdjust>,
        valign: Option<VertAlign>,
        background: Option<Background>,
    },
    CloseRow,
    OpenCell(CellOptions),
    CloseCell,
    /// Opaque leaf content, delegated to the content sink
    Content(ContentPayload),
    /// Start of a caption; `top` selects placement above the grid
    OpenCaption { top: bool },
    CloseCaption,
    CloseTable,
}
