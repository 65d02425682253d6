//! Table rows.

use crate::common::{Background, HorizAdjust, VertAlign};
use crate::grid::cell::TableCell;

/// One grid row. After [`TableGrid::close`](crate::grid::TableGrid::close)
/// the cell vector length equals the table's final column count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
    /// Requested height in twips
    pub height: Option<u32>,
    pub adjust: Option<HorizAdjust>,
    pub valign: Option<VertAlign>,
    pub background: Option<Background>,
    /// True for the last row of a row group (section)
    pub end_of_group: bool,
    /// Row belongs to a header section
    pub header: bool,
    /// A rule line runs under this row, set during border resolution
    pub bottom_border: bool,
    /// Count of empty rows closed immediately after this one; used to
    /// thicken the emulated bottom border
    pub empty_rows: u32,
}

impl TableRow {
    pub(crate) fn with_cols(cols: usize) -> Self {
        Self {
            cells: (0..cols).map(|_| TableCell::filler()).collect(),
            ..Self::default()
        }
    }

    /// Whether any real cell was inserted into this row.
    pub fn has_cells(&self) -> bool {
        self.cells.iter().any(|c| c.used)
    }
}
