//! Table columns.

use crate::common::{HorizAdjust, WidthSpec};

/// One grid column. Column declarations come from the COLS option and
/// column-group events and are fixed once the first row exists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableColumn {
    pub width: Option<WidthSpec>,
    pub adjust: Option<HorizAdjust>,
    /// True for the last column of a column group
    pub end_of_group: bool,
    /// A rule line runs left of this column, set during border resolution
    pub left_border: bool,
}
