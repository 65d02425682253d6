//! Table cells and their content units.

use crate::common::{Background, BorderLine, HorizAdjust, NumberFormat, VertAlign, WidthSpec};
use crate::grid::table::TableGrid;
use crate::markup::event::CellOptions;
use smallvec::SmallVec;

/// Opaque reference to leaf content owned by the host document.
///
/// Handles are produced by the host's content sink and never
/// dereferenced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHandle(u32);

impl ContentHandle {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }
}

/// One content unit of a cell: an opaque leaf reference or a nested
/// table, recursively.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentUnit {
    Leaf(ContentHandle),
    Table(Box<TableGrid>),
}

/// The properties of a cell about to be inserted into the grid.
///
/// Built by the builder from [`CellOptions`] plus the content units
/// accumulated between the cell-open and cell-close events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellSpec {
    pub contents: SmallVec<[ContentUnit; 1]>,
    pub row_span: u32,
    pub col_span: u32,
    pub width: Option<WidthSpec>,
    pub height: Option<u32>,
    pub adjust: Option<HorizAdjust>,
    pub valign: Option<VertAlign>,
    pub background: Option<Background>,
    pub border: Option<BorderLine>,
    pub num_format: Option<NumberFormat>,
    pub no_wrap: bool,
}

impl CellSpec {
    /// Spec carrying only options, with contents to be attached later.
    pub fn from_options(opts: CellOptions) -> Self {
        Self {
            contents: SmallVec::new(),
            row_span: opts.row_span,
            col_span: opts.col_span,
            width: opts.width,
            height: opts.height,
            adjust: opts.adjust,
            valign: opts.valign,
            background: opts.background,
            border: opts.border,
            num_format: opts.num_format,
            no_wrap: opts.no_wrap,
        }
    }
}

/// One grid position.
///
/// Positions are either span anchors (holding the content and the full
/// span), covered continuations of an anchor, or fillers added to keep
/// rows rectangular while the grid grows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableCell {
    /// Content units; always empty for covered and filler cells
    pub contents: SmallVec<[ContentUnit; 1]>,
    pub row_span: u32,
    pub col_span: u32,
    pub width: Option<WidthSpec>,
    pub height: Option<u32>,
    pub adjust: Option<HorizAdjust>,
    pub valign: Option<VertAlign>,
    pub background: Option<Background>,
    /// Per-cell border override
    pub border: Option<BorderLine>,
    pub num_format: Option<NumberFormat>,
    pub no_wrap: bool,
    /// True when this position lies inside another cell's span
    pub covered: bool,
    /// Grid position of the covering anchor, while one exists
    pub covered_by: Option<(u32, u32)>,
    /// True once a real cell was placed here (anchors and normalized
    /// trailing cells); fillers stay false
    pub used: bool,
}

impl TableCell {
    /// A filler cell created by grid growth.
    pub(crate) fn filler() -> Self {
        Self {
            row_span: 1,
            col_span: 1,
            ..Self::default()
        }
    }

    /// A covered continuation of the anchor at `anchor`.
    pub(crate) fn covered(anchor: (u32, u32), col_span: u32) -> Self {
        Self {
            row_span: 1,
            col_span,
            covered: true,
            covered_by: Some(anchor),
            ..Self::default()
        }
    }

    /// An anchor cell built from a spec with clamped spans.
    pub(crate) fn anchor(spec: CellSpec, row_span: u32, col_span: u32) -> Self {
        Self {
            contents: spec.contents,
            row_span,
            col_span,
            width: spec.width,
            height: spec.height,
            adjust: spec.adjust,
            valign: spec.valign,
            background: spec.background,
            border: spec.border,
            num_format: spec.num_format,
            no_wrap: spec.no_wrap,
            covered: false,
            covered_by: None,
            used: true,
        }
    }

    /// Whether the insertion cursor must skip this position.
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.used || self.covered
    }

    /// Whether this position anchors a span (i.e. is a real cell).
    #[inline]
    pub fn is_anchor(&self) -> bool {
        self.used && !self.covered
    }

    /// Demote this position to a protected empty after its covering
    /// span was truncated away. The position stays occupied so the
    /// cursor keeps skipping it, but no longer references an anchor.
    pub(crate) fn protect(&mut self) {
        debug_assert!(self.covered, "only covered cells can be protected");
        self.covered_by = None;
        self.row_span = 1;
        self.col_span = 1;
        self.contents.clear();
    }
}
