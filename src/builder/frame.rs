//! Continuation records for the resumable builder.
//!
//! One frame per construct kind, holding exactly the local state that
//! would otherwise live on a call stack. The builder suspends by simply
//! returning with these frames still stacked, and resumes by dispatching
//! the next event against the top frame.

use crate::common::{HorizAdjust, WidthSpec};
use crate::grid::cell::{CellSpec, ContentHandle};
use crate::grid::table::TableGrid;
use smallvec::SmallVec;

/// One suspended construct.
#[derive(Debug)]
pub(crate) enum Frame {
    Table(TableFrame),
    ColumnGroup(ColumnGroupFrame),
    Section { header: bool },
    Row,
    Cell(CellFrame),
    Caption(CaptionFrame),
}

/// A table under construction, possibly nested.
#[derive(Debug)]
pub(crate) struct TableFrame {
    pub grid: TableGrid,
    /// Whether the enclosing cell already had an open content section
    /// when this table started; decides what an empty nested table
    /// becomes on close
    pub in_parent_section: bool,
}

/// A column group whose columns may still arrive.
#[derive(Debug)]
pub(crate) struct ColumnGroupFrame {
    /// Group span, used when no column events arrive inside the group
    pub span: u32,
    pub width: Option<WidthSpec>,
    pub adjust: Option<HorizAdjust>,
    pub saw_column: bool,
}

/// A cell accumulating content units.
#[derive(Debug)]
pub(crate) struct CellFrame {
    pub spec: CellSpec,
    /// The open leaf content section, if any; reset when a nested table
    /// interrupts the text flow
    pub section: Option<ContentHandle>,
    /// Cell belongs to a header section
    pub header: bool,
}

/// A caption accumulating leaf content.
#[derive(Debug)]
pub(crate) struct CaptionFrame {
    pub top: bool,
    pub contents: SmallVec<[ContentHandle; 2]>,
    pub section: Option<ContentHandle>,
}
