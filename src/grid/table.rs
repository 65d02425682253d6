//! The rectangular cell grid under construction.
//!
//! All mutation funnels through a handful of operations driven by the
//! builder: open/close row, insert cell, column declarations, and the
//! final close. Input is untrusted, so every operation clamps rather
//! than fails; the only hard stop is the cell-count ceiling, which
//! abandons the table via the overflow flag while the surrounding
//! import continues.

use crate::common::{Background, Frame, HorizAdjust, ResolvedBorders, Rules, VertAlign, WidthSpec};
use crate::grid::cell::{CellSpec, ContentHandle, TableCell};
use crate::grid::column::TableColumn;
use crate::grid::row::TableRow;
use crate::layout::TableLayoutInfo;
use crate::markup::options::TableOptions;
use smallvec::SmallVec;

/// Defensive cap on a single row or column span.
pub const MAX_SPAN: u32 = 8192;

/// Hard ceiling on grid positions per table. Exceeding it abandons the
/// table (overflow flag) without failing the import.
pub const MAX_CELLS: usize = 1 << 16;

/// A table caption: leaf content shown above or below the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    /// True for placement above the grid
    pub top: bool,
    pub contents: SmallVec<[ContentHandle; 2]>,
}

/// A table grid being built, and after [`close`](TableGrid::close) the
/// canonical rectangular result.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid {
    pub(crate) rows: Vec<TableRow>,
    pub(crate) columns: Vec<TableColumn>,
    /// Insertion cursor: the row currently open
    pub(crate) cur_row: usize,
    /// Insertion cursor: next candidate column in the open row
    pub(crate) cur_col: usize,
    /// Whether the open row received a real cell yet
    row_has_cells: bool,
    /// Highest column index (exclusive) that received a content-bearing
    /// cell; the "filled columns" of the grid
    pub(crate) cols_filled: usize,
    /// Column count fixed by the COLS option; reserved through close
    pub(crate) declared_cols: usize,
    /// Next inserted column starts a new column group
    next_col_starts_group: bool,
    /// Running count of grid positions claimed by inserted cells
    cell_count: usize,

    // Options carried from the open tag.
    pub(crate) width: Option<WidthSpec>,
    pub(crate) height: Option<u32>,
    pub(crate) cell_padding: u32,
    pub(crate) cell_spacing: u32,
    pub(crate) border_width: u32,
    pub(crate) frame: Option<Frame>,
    pub(crate) rules: Option<Rules>,
    pub(crate) adjust: Option<HorizAdjust>,
    pub(crate) valign: Option<VertAlign>,
    pub(crate) background: Option<Background>,
    pub(crate) hspace: u32,
    pub(crate) vspace: u32,

    pub(crate) caption: Option<Caption>,

    pub(crate) closed: bool,
    pub(crate) overflow: bool,
    pub(crate) borders: Option<ResolvedBorders>,
    pub(crate) layout: Option<TableLayoutInfo>,
    pub(crate) assembled: bool,
}

impl TableGrid {
    /// Create a grid from parsed open-tag options. A COLS declaration
    /// materializes its columns immediately.
    pub fn from_options(opts: &TableOptions) -> Self {
        let declared = opts.cols.unwrap_or(0).min(MAX_SPAN) as usize;
        Self {
            rows: Vec::new(),
            columns: (0..declared).map(|_| TableColumn::default()).collect(),
            cur_row: 0,
            cur_col: 0,
            row_has_cells: false,
            cols_filled: 0,
            declared_cols: declared,
            next_col_starts_group: false,
            cell_count: 0,
            width: opts.width,
            height: opts.height,
            cell_padding: opts.cell_padding,
            cell_spacing: opts.cell_spacing,
            border_width: opts.border,
            frame: opts.frame,
            rules: opts.rules,
            adjust: opts.align,
            valign: opts.valign,
            background: opts.effective_background(),
            hspace: opts.hspace,
            vspace: opts.vspace,
            caption: None,
            closed: false,
            overflow: false,
            borders: None,
            layout: None,
            assembled: false,
        }
    }

    /// Grid with default options, mainly for tests.
    pub fn new() -> Self {
        Self::from_options(&TableOptions::default())
    }

    // --- accessors -----------------------------------------------------

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn columns(&self) -> &[TableColumn] {
        &self.columns
    }

    /// The cell at a grid position, if in bounds.
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    pub fn caption(&self) -> Option<&Caption> {
        self.caption.as_ref()
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// True once the cell ceiling was exceeded and the table abandoned.
    pub fn is_overflowed(&self) -> bool {
        self.overflow
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether any real cell was ever inserted.
    pub fn has_cells(&self) -> bool {
        self.cell_count > 0
    }

    /// Number of leading columns that received a content-bearing cell.
    pub fn filled_columns(&self) -> usize {
        self.cols_filled
    }

    /// Borders after frame/rules/inheritance resolution.
    pub fn borders(&self) -> Option<&ResolvedBorders> {
        self.borders.as_ref()
    }

    /// Column widths after layout planning.
    pub fn layout(&self) -> Option<&TableLayoutInfo> {
        self.layout.as_ref()
    }

    /// Requested table height in twips, if any.
    pub fn height(&self) -> Option<u32> {
        self.height
    }

    /// Outside margins in twips: (horizontal, vertical).
    pub fn margins(&self) -> (u32, u32) {
        (self.hspace, self.vspace)
    }

    /// Default vertical alignment for the table's cells.
    pub fn valign(&self) -> Option<VertAlign> {
        self.valign
    }

    // --- construction --------------------------------------------------

    /// Open a row, reusing the materialized row left behind by an empty
    /// close if one exists.
    pub fn open_row(
        &mut self,
        adjust: Option<HorizAdjust>,
        valign: Option<VertAlign>,
        background: Option<Background>,
    ) {
        if self.closed || self.overflow {
            return;
        }
        if self.rows.len() <= self.cur_row {
            self.rows.push(TableRow::with_cols(self.columns.len()));
        }
        let row = &mut self.rows[self.cur_row];
        row.adjust = adjust;
        row.valign = valign;
        row.background = background;
        self.row_has_cells = false;
        self.cur_col = 0;
    }

    /// Close the open row.
    ///
    /// A row that received no cell bumps the previous row's empty-row
    /// tally and leaves the cursor in place; a populated row folds any
    /// trailing run of unused cells into one spanning cell and advances
    /// the cursor.
    pub fn close_row(&mut self) {
        if self.closed || self.overflow || self.rows.len() <= self.cur_row {
            return;
        }
        if !self.row_has_cells && !self.rows[self.cur_row].has_cells() {
            if self.cur_row > 0 {
                self.rows[self.cur_row - 1].empty_rows += 1;
            }
            self.cur_col = 0;
            return;
        }

        self.normalize_trailing(self.cur_row);
        self.cur_row += 1;
        self.cur_col = 0;
        self.row_has_cells = false;
    }

    /// Fold the trailing run of unused cells of `row` into a single
    /// empty cell spanning the remainder.
    fn normalize_trailing(&mut self, row: usize) {
        let n = self.columns.len();
        let cells = &mut self.rows[row].cells;
        let first_unused = match cells.iter().rposition(|c| c.is_occupied()) {
            Some(last) => last + 1,
            None => 0,
        };
        if first_unused >= n {
            return;
        }
        let span = (n - first_unused) as u32;
        cells[first_unused] = TableCell::anchor(CellSpec::default(), 1, span);
        for c in first_unused + 1..n {
            cells[c] = TableCell::covered((row as u32, first_unused as u32), 1);
        }
    }

    /// Insert a cell at the cursor, growing the grid as needed and
    /// truncating any colliding span from an earlier row.
    pub fn insert_cell(&mut self, spec: CellSpec) {
        if self.closed || self.overflow {
            return;
        }
        let row_span = clamp_span(spec.row_span);
        let col_span = clamp_span(spec.col_span);
        // A bare cell with no content and no styling does not claim its
        // columns; close-time shrinking may fold them away again.
        let fills = !spec.contents.is_empty()
            || spec.num_format.is_some()
            || spec.background.is_some()
            || spec.width.is_some()
            || spec.height.is_some();

        if self.rows.len() <= self.cur_row {
            self.rows.push(TableRow::with_cols(self.columns.len()));
        }

        // Skip positions occupied by earlier cells or active spans.
        while self.cur_col < self.columns.len()
            && self.rows[self.cur_row].cells[self.cur_col].is_occupied()
        {
            self.cur_col += 1;
        }
        let row = self.cur_row;
        let col = self.cur_col;
        let rows_req = row + row_span as usize;
        let cols_req = col + col_span as usize;

        self.cell_count = self.cell_count.saturating_add(row_span as usize * col_span as usize);
        if self.cell_count > MAX_CELLS {
            self.overflow = true;
            return;
        }

        if cols_req > self.columns.len() {
            self.grow_columns(cols_req);
        }
        while self.rows.len() < rows_req {
            self.rows.push(TableRow::with_cols(self.columns.len()));
        }

        // A still-active span from an earlier row reaching into the new
        // rectangle is truncated to end above the current row.
        for r in row..rows_req {
            for c in col..cols_req {
                if let Some((ar, ac)) = self.rows[r].cells[c].covered_by {
                    if (ar as usize) < row {
                        self.truncate_span(ar as usize, ac as usize, row);
                    }
                }
            }
        }

        self.rows[row].cells[col] = TableCell::anchor(spec, row_span as u32, col_span as u32);
        for r in row..rows_req {
            for c in col..cols_req {
                if r == row && c == col {
                    continue;
                }
                // Continuations in the anchor column repeat the column
                // span, like a vertical-merge continuation cell.
                let span = if c == col { col_span } else { 1 };
                self.rows[r].cells[c] = TableCell::covered((row as u32, col as u32), span as u32);
            }
        }

        if fills && cols_req > self.cols_filled {
            self.cols_filled = cols_req;
        }
        self.row_has_cells = true;
        self.cur_col = cols_req;
    }

    /// Shorten the span of the anchor at (`anchor_row`, `anchor_col`) so
    /// it ends above `cut_row`, demoting the cells it no longer covers
    /// to protected empties.
    fn truncate_span(&mut self, anchor_row: usize, anchor_col: usize, cut_row: usize) {
        debug_assert!(anchor_row < cut_row);
        let (old_span, anchor_cols) = {
            let anchor = &self.rows[anchor_row].cells[anchor_col];
            (anchor.row_span as usize, anchor.col_span as usize)
        };
        let new_span = cut_row - anchor_row;
        if new_span >= old_span {
            return;
        }
        self.rows[anchor_row].cells[anchor_col].row_span = new_span as u32;

        let last = (anchor_row + old_span).min(self.rows.len());
        for r in cut_row..last {
            for c in anchor_col..(anchor_col + anchor_cols).min(self.columns.len()) {
                let cell = &mut self.rows[r].cells[c];
                if cell.covered_by == Some((anchor_row as u32, anchor_col as u32)) {
                    cell.protect();
                }
            }
        }
    }

    fn grow_columns(&mut self, to: usize) {
        while self.columns.len() < to {
            self.columns.push(TableColumn::default());
        }
        for row in &mut self.rows {
            while row.cells.len() < to {
                row.cells.push(TableCell::filler());
            }
        }
    }

    /// Declare `span` columns. A no-op once any row exists: columns are
    /// fixed at first row insertion.
    pub fn insert_column(
        &mut self,
        span: u32,
        width: Option<WidthSpec>,
        adjust: Option<HorizAdjust>,
    ) {
        if self.closed || self.overflow || !self.rows.is_empty() {
            return;
        }
        let span = clamp_span(span);
        for i in 0..span {
            self.columns.push(TableColumn {
                width,
                adjust,
                end_of_group: false,
                left_border: i == 0 && self.next_col_starts_group,
            });
            self.next_col_starts_group = false;
        }
    }

    /// End the current column group. A no-op once any row exists.
    pub fn close_column_group(&mut self) {
        if self.closed || self.overflow || !self.rows.is_empty() {
            return;
        }
        if let Some(last) = self.columns.last_mut() {
            last.end_of_group = true;
        }
        self.next_col_starts_group = true;
    }

    /// Mark the last row of a row group (used by RULES=groups).
    pub(crate) fn end_row_group(&mut self) {
        if let Some(prev) = self.cur_row.checked_sub(1) {
            if let Some(row) = self.rows.get_mut(prev) {
                row.end_of_group = true;
            }
        }
    }

    /// Flag the open row as belonging to a header section.
    pub(crate) fn mark_header_row(&mut self) {
        if let Some(row) = self.rows.get_mut(self.cur_row) {
            row.header = true;
        }
    }

    pub fn set_caption(&mut self, caption: Caption) {
        // First caption wins; markup with several captions is bogus.
        if self.caption.is_none() {
            self.caption = Some(caption);
        }
    }

    /// Place a leaf handle into the top-left cell of a grid that never
    /// received content: the synthesized default content slot.
    pub(crate) fn set_default_slot(&mut self, handle: ContentHandle) {
        if let Some(cell) = self
            .rows
            .get_mut(0)
            .and_then(|r| r.cells.get_mut(0))
        {
            if cell.contents.is_empty() && !cell.covered {
                cell.contents.push(crate::grid::cell::ContentUnit::Leaf(handle));
                cell.used = true;
            }
        }
    }

    /// Finalize the grid shape.
    ///
    /// Discards rows beyond the number actually closed (fixing up the
    /// spans that reached into them), guarantees at least one row and
    /// column, and shrinks trailing columns that neither received a
    /// cell nor were reserved by a COLS declaration.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        // An open populated row never saw its close event; close it so
        // its cells survive the truncation below.
        if self.row_has_cells {
            self.close_row();
        }
        self.closed = true;

        // Drop rows never closed, shortening spans that reach into them.
        let keep_rows = self.cur_row.min(self.rows.len());
        if keep_rows < self.rows.len() {
            for r in 0..keep_rows {
                for c in 0..self.columns.len() {
                    let cell = &mut self.rows[r].cells[c];
                    if cell.is_anchor() && r + cell.row_span as usize > keep_rows {
                        cell.row_span = (keep_rows - r) as u32;
                    }
                }
            }
            self.rows.truncate(keep_rows);
        }

        // An empty table normalizes to at least 1x1.
        if self.columns.is_empty() {
            self.columns.push(TableColumn::default());
            for row in &mut self.rows {
                row.cells.push(TableCell::filler());
            }
        }
        if self.rows.is_empty() {
            self.rows.push(TableRow::with_cols(self.columns.len()));
        }
        if !self.rows[0].cells.is_empty() && !self.has_cells() && self.rows.len() == 1 {
            // Synthesized 1x1 content slot for a table with no cells.
            self.rows[0].cells[0].used = true;
        }

        // Shrink unused trailing columns, keeping COLS reservations.
        let keep_cols = self
            .cols_filled
            .max(self.declared_cols)
            .max(1)
            .min(self.columns.len());
        if keep_cols < self.columns.len() {
            self.columns.truncate(keep_cols);
            for r in 0..self.rows.len() {
                self.rows[r].cells.truncate(keep_cols);
                for c in 0..keep_cols {
                    let cell = &mut self.rows[r].cells[c];
                    if cell.is_anchor() && c + cell.col_span as usize > keep_cols {
                        cell.col_span = (keep_cols - c) as u32;
                    }
                }
            }
        }
    }
}

impl Default for TableGrid {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn clamp_span(span: u32) -> usize {
    if span == 0 || span > MAX_SPAN {
        1
    } else {
        span as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::cell::ContentUnit;

    fn spec(row_span: u32, col_span: u32) -> CellSpec {
        CellSpec {
            row_span,
            col_span,
            ..CellSpec::default()
        }
    }

    fn used_spec(row_span: u32, col_span: u32, id: u32) -> CellSpec {
        let mut s = spec(row_span, col_span);
        s.contents.push(ContentUnit::Leaf(ContentHandle::new(id)));
        s
    }

    #[test]
    fn test_rectangular_after_close() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 2, 0));
        g.close_row();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 1, 1));
        g.insert_cell(used_spec(1, 3, 2));
        g.close_row();
        g.close();

        let cols = g.column_count();
        assert_eq!(cols, 4);
        for row in g.rows() {
            assert_eq!(row.cells.len(), cols);
        }
    }

    #[test]
    fn test_row_span_covers_cells_below() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(3, 2, 0));
        g.close_row();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 1, 1));
        g.close_row();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 1, 2));
        g.close_row();
        g.close();

        let anchor = g.cell(0, 0).unwrap();
        assert_eq!(anchor.row_span, 3);
        assert_eq!(anchor.col_span, 2);
        for r in 1..3 {
            let covered = g.cell(r, 0).unwrap();
            assert!(covered.covered);
            assert!(covered.contents.is_empty());
            assert_eq!(covered.row_span, 1);
            assert_eq!(covered.col_span, 2);
        }
        // The second cell of each lower row landed right of the span.
        assert!(g.cell(1, 2).unwrap().is_anchor());
        assert!(g.cell(2, 2).unwrap().is_anchor());
    }

    #[test]
    fn test_col_span_growth_expands_existing_rows() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 1, 0));
        g.close_row();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 4, 1));
        g.close_row();
        g.close();

        assert_eq!(g.column_count(), 4);
        assert_eq!(g.rows()[0].cells.len(), 4);
        // Row 0 gained exactly the trailing fillers.
        for c in 1..4 {
            let cell = g.cell(0, c).unwrap();
            assert!(!cell.used && !cell.covered);
        }
    }

    #[test]
    fn test_span_collision_truncates_old_span() {
        // Row 0: A (1 col), B at col 1 with rowSpan 3.
        // Row 1: C with colSpan 2 collides with B's continuation.
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 1, 0));
        g.insert_cell(used_spec(3, 1, 1));
        g.close_row();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 2, 2));
        g.close_row();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 1, 3));
        g.close_row();
        g.close();

        // B's span shrank to its own row.
        assert_eq!(g.cell(0, 1).unwrap().row_span, 1);
        // C anchors at (1,0) spanning both columns.
        let c = g.cell(1, 0).unwrap();
        assert!(c.is_anchor());
        assert_eq!(c.col_span, 2);
        assert!(g.cell(1, 1).unwrap().covered);
        // The released position in row 2 is protected, so the row-2
        // cell landed after it.
        let freed = g.cell(2, 1).unwrap();
        assert!(freed.covered && freed.covered_by.is_none());
        assert!(g.cell(2, 0).unwrap().is_anchor());
    }

    #[test]
    fn test_zero_span_clamped() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(0, 0, 0));
        g.close_row();
        g.close();

        let cell = g.cell(0, 0).unwrap();
        assert_eq!(cell.row_span, 1);
        assert_eq!(cell.col_span, 1);
    }

    #[test]
    fn test_huge_span_clamped() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(MAX_SPAN + 1, 2, 0));
        g.close_row();
        g.close();

        assert_eq!(g.cell(0, 0).unwrap().row_span, 1);
        assert_eq!(g.row_count(), 1);
    }

    #[test]
    fn test_empty_row_bumps_tally() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 1, 0));
        g.close_row();
        g.open_row(None, None, None);
        g.close_row(); // empty
        g.open_row(None, None, None);
        g.close_row(); // empty
        g.close();

        assert_eq!(g.row_count(), 1);
        assert_eq!(g.rows()[0].empty_rows, 2);
    }

    #[test]
    fn test_trailing_cells_normalized_on_close_row() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 3, 0));
        g.close_row();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 1, 1));
        g.close_row();
        g.close();

        // Row 1 columns 1-2 folded into one spanning cell.
        let folded = g.cell(1, 1).unwrap();
        assert!(folded.is_anchor());
        assert_eq!(folded.col_span, 2);
        assert!(g.cell(1, 2).unwrap().covered);
    }

    #[test]
    fn test_empty_table_normalizes_to_1x1() {
        let mut g = TableGrid::new();
        g.close();
        assert_eq!(g.row_count(), 1);
        assert_eq!(g.column_count(), 1);
        assert!(g.cell(0, 0).unwrap().used);
    }

    #[test]
    fn test_cols_reserved_without_rows() {
        let mut g = TableGrid::from_options(&TableOptions {
            cols: Some(3),
            ..TableOptions::default()
        });
        g.close();
        assert_eq!(g.row_count(), 1);
        assert_eq!(g.column_count(), 3);
    }

    #[test]
    fn test_unused_trailing_columns_shrink() {
        let mut g = TableGrid::new();
        g.insert_column(4, None, None);
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 2, 0));
        g.close_row();
        g.close();

        // Column declarations are not COLS reservations; the two unused
        // trailing columns go away.
        assert_eq!(g.column_count(), 2);
        for row in g.rows() {
            assert_eq!(row.cells.len(), 2);
        }
    }

    #[test]
    fn test_unclosed_rows_discarded_with_span_fixup() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(3, 1, 0));
        g.close_row();
        // Rows 1 and 2 exist only as continuations; never closed.
        g.close();

        assert_eq!(g.row_count(), 1);
        assert_eq!(g.cell(0, 0).unwrap().row_span, 1);
    }

    #[test]
    fn test_columns_fixed_after_first_row() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 1, 0));
        g.insert_column(2, None, None);
        g.close_column_group();
        g.close_row();
        g.close();

        assert_eq!(g.column_count(), 1);
    }

    #[test]
    fn test_overflow_abandons_table() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        // MAX_SPAN * MAX_SPAN positions blow the ceiling outright.
        g.insert_cell(used_spec(MAX_SPAN, MAX_SPAN, 0));
        assert!(g.is_overflowed());
        // Further operations are no-ops.
        g.insert_cell(used_spec(1, 1, 2));
        g.close_row();
        g.close();
        assert!(g.is_overflowed());
    }

    #[test]
    fn test_cursor_skips_covered_positions() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(2, 1, 0));
        g.insert_cell(used_spec(1, 1, 1));
        g.close_row();
        g.open_row(None, None, None);
        g.insert_cell(used_spec(1, 1, 2));
        g.close_row();
        g.close();

        // The row-1 cell skipped the covered column 0.
        assert!(g.cell(1, 0).unwrap().covered);
        let moved = g.cell(1, 1).unwrap();
        assert!(moved.is_anchor());
        assert_eq!(moved.contents.len(), 1);
    }
}
