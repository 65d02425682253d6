//! Grid-to-model assembly.
//!
//! Walks a finalized grid row by row and emits the host document-model
//! structure through the [`DocumentModel`] trait: one box per anchor
//! cell, nested tables recursed in place, one sub-structure per content
//! unit when a cell holds several. The walk transfers content ownership
//! out of the grid, so a grid assembles exactly once.
//!
//! Each trait call is a discrete, individually consistent edit; the
//! host is free to let other subsystems read the model between calls
//! and to apply its own locking above this layer.

use crate::common::{Background, Error, HorizAdjust, NumberFormat, Result, VertAlign, WidthSpec};
use crate::grid::cell::{ContentHandle, ContentUnit};
use crate::grid::table::TableGrid;
use crate::resolve::{cell_lines, CellLines};

/// Attributes applied to one emitted box.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxAttributes<'a> {
    pub width: Option<WidthSpec>,
    pub background: Option<&'a Background>,
    pub adjust: Option<HorizAdjust>,
    pub valign: VertAlign,
    pub no_wrap: bool,
    pub row_span: u32,
    pub col_span: u32,
    /// Resolved border lines around the cell
    pub borders: CellLines,
    /// Numeric format, present only when it may be applied (the cell is
    /// explicitly valued or holds no content to overwrite)
    pub num_format: Option<&'a NumberFormat>,
}

/// The target document model the assembler writes into.
///
/// Handles are host-defined; the assembler only threads them through.
pub trait DocumentModel {
    type TableHandle;
    type BoxHandle;

    /// Create a table node with the given dimensions, nested under a
    /// box when `parent` is set.
    fn insert_table(
        &mut self,
        parent: Option<&Self::BoxHandle>,
        rows: usize,
        cols: usize,
    ) -> Self::TableHandle;

    /// Detach and reuse the placeholder box left by model
    /// initialization, if one exists. Called exactly once, for the very
    /// first emitted cell.
    fn reuse_first_box(
        &mut self,
        table: &Self::TableHandle,
        row: usize,
        col: usize,
        content: Option<ContentHandle>,
    ) -> Option<Self::BoxHandle>;

    /// Create a box for the cell at (`row`, `col`), anchored at the
    /// given leaf content when present.
    fn new_box(
        &mut self,
        table: &Self::TableHandle,
        row: usize,
        col: usize,
        content: Option<ContentHandle>,
    ) -> Self::BoxHandle;

    /// Create one sub-structure inside a box for one content unit.
    fn new_sub_box(
        &mut self,
        parent: &Self::BoxHandle,
        content: Option<ContentHandle>,
    ) -> Self::BoxHandle;

    /// Attach caption content above (`top`) or below the table.
    fn new_caption(&mut self, table: &Self::TableHandle, top: bool, content: ContentHandle);

    fn set_box_attributes(&mut self, bx: &Self::BoxHandle, attrs: &BoxAttributes<'_>);

    /// Remove a row that ended up fully empty after span trimming.
    /// Rows are removed in descending index order.
    fn remove_empty_row(&mut self, table: &Self::TableHandle, row: usize);
}

/// Assemble the grid into the model, consuming its content.
pub fn assemble<M: DocumentModel>(grid: &mut TableGrid, model: &mut M) -> Result<M::TableHandle> {
    if grid.assembled {
        return Err(Error::AlreadyAssembled);
    }
    let mut reuse_first = true;
    Ok(emit_table(grid, model, None, &mut reuse_first))
}

fn emit_table<M: DocumentModel>(
    grid: &mut TableGrid,
    model: &mut M,
    parent: Option<&M::BoxHandle>,
    reuse_first: &mut bool,
) -> M::TableHandle {
    grid.assembled = true;
    let nrows = grid.row_count();
    let ncols = grid.column_count();
    let table = model.insert_table(parent, nrows, ncols);

    if let Some(caption) = &grid.caption {
        if caption.top {
            for &handle in &caption.contents {
                model.new_caption(&table, true, handle);
            }
        }
    }

    let mut empty_rows: Vec<usize> = Vec::new();
    for r in 0..nrows {
        let mut row_emitted = false;
        for c in 0..ncols {
            let cell = &grid.rows[r].cells[c];
            if cell.covered {
                continue;
            }
            if !cell.used {
                // Filler left by grid growth: an empty box keeps the
                // model row rectangular but does not keep the row.
                let bx = make_box(model, &table, r, c, None, reuse_first);
                let attrs = box_attributes(grid, r, c, false);
                model.set_box_attributes(&bx, &attrs);
                continue;
            }
            row_emitted = true;

            let attrs_allow_format = {
                let cell = &grid.rows[r].cells[c];
                cell.num_format
                    .as_ref()
                    .map(|f| f.value.is_some() || cell.contents.is_empty())
                    .unwrap_or(false)
            };
            let contents = std::mem::take(&mut grid.rows[r].cells[c].contents);
            let attrs = box_attributes(grid, r, c, attrs_allow_format);

            match contents.len() {
                0 => {
                    let bx = make_box(model, &table, r, c, None, reuse_first);
                    model.set_box_attributes(&bx, &attrs);
                },
                1 => {
                    let mut contents = contents;
                    match contents.remove(0) {
                        ContentUnit::Leaf(handle) => {
                            let bx = make_box(model, &table, r, c, Some(handle), reuse_first);
                            model.set_box_attributes(&bx, &attrs);
                        },
                        ContentUnit::Table(mut nested) => {
                            let bx = make_box(model, &table, r, c, None, reuse_first);
                            model.set_box_attributes(&bx, &attrs);
                            emit_table(&mut nested, model, Some(&bx), reuse_first);
                        },
                    }
                },
                _ => {
                    let bx = make_box(model, &table, r, c, None, reuse_first);
                    model.set_box_attributes(&bx, &attrs);
                    for unit in contents {
                        match unit {
                            ContentUnit::Leaf(handle) => {
                                model.new_sub_box(&bx, Some(handle));
                            },
                            ContentUnit::Table(mut nested) => {
                                let sub = model.new_sub_box(&bx, None);
                                emit_table(&mut nested, model, Some(&sub), reuse_first);
                            },
                        }
                    }
                },
            }
        }
        if !row_emitted && !row_holds_live_span(grid, r) {
            empty_rows.push(r);
        }
    }

    if let Some(caption) = &grid.caption {
        if !caption.top {
            for &handle in &caption.contents {
                model.new_caption(&table, false, handle);
            }
        }
    }

    // Descending order keeps the model's remaining row indices valid.
    for &r in empty_rows.iter().rev() {
        model.remove_empty_row(&table, r);
    }

    table
}

/// Whether any position of the row is still covered by a live span;
/// such rows survive the empty-row cleanup.
fn row_holds_live_span(grid: &TableGrid, row: usize) -> bool {
    grid.rows[row]
        .cells
        .iter()
        .any(|c| c.covered && c.covered_by.is_some())
}

fn make_box<M: DocumentModel>(
    model: &mut M,
    table: &M::TableHandle,
    row: usize,
    col: usize,
    content: Option<ContentHandle>,
    reuse_first: &mut bool,
) -> M::BoxHandle {
    if *reuse_first {
        *reuse_first = false;
        if let Some(bx) = model.reuse_first_box(table, row, col, content) {
            return bx;
        }
    }
    model.new_box(table, row, col, content)
}

fn box_attributes(grid: &TableGrid, row: usize, col: usize, allow_format: bool) -> BoxAttributes<'_> {
    let cell = &grid.rows[row].cells[col];
    let row_meta = &grid.rows[row];
    BoxAttributes {
        width: cell.width,
        background: cell
            .background
            .as_ref()
            .or(row_meta.background.as_ref()),
        adjust: cell.adjust.or(row_meta.adjust),
        valign: cell.valign.or(row_meta.valign).unwrap_or_default(),
        no_wrap: cell.no_wrap,
        row_span: cell.row_span.max(1),
        col_span: cell.col_span.max(1),
        borders: cell_lines(grid, row, col),
        num_format: if allow_format {
            cell.num_format.as_ref()
        } else {
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::NumberFormat;
    use crate::grid::cell::CellSpec;
    use crate::markup::options::TableOptions;
    use crate::resolve::resolve_borders;
    use smallvec::smallvec;

    #[derive(Debug, Default)]
    struct MockModel {
        next_box: u32,
        next_table: u32,
        has_placeholder: bool,
        reused: Option<u32>,
        /// (table, row, col, content)
        boxes: Vec<(u32, usize, usize, Option<u32>)>,
        /// (parent box, rows, cols)
        tables: Vec<(Option<u32>, usize, usize)>,
        /// (parent box, content)
        sub_boxes: Vec<(u32, Option<u32>)>,
        captions: Vec<(u32, bool, u32)>,
        formatted: Vec<u32>,
        removed: Vec<(u32, usize)>,
    }

    impl DocumentModel for MockModel {
        type TableHandle = u32;
        type BoxHandle = u32;

        fn insert_table(&mut self, parent: Option<&u32>, rows: usize, cols: usize) -> u32 {
            let t = self.next_table;
            self.next_table += 1;
            self.tables.push((parent.copied(), rows, cols));
            t
        }

        fn reuse_first_box(
            &mut self,
            table: &u32,
            row: usize,
            col: usize,
            content: Option<ContentHandle>,
        ) -> Option<u32> {
            if !self.has_placeholder {
                return None;
            }
            let b = self.next_box;
            self.next_box += 1;
            self.reused = Some(b);
            self.boxes.push((*table, row, col, content.map(|h| h.id())));
            Some(b)
        }

        fn new_box(
            &mut self,
            table: &u32,
            row: usize,
            col: usize,
            content: Option<ContentHandle>,
        ) -> u32 {
            let b = self.next_box;
            self.next_box += 1;
            self.boxes.push((*table, row, col, content.map(|h| h.id())));
            b
        }

        fn new_sub_box(&mut self, parent: &u32, content: Option<ContentHandle>) -> u32 {
            let b = self.next_box;
            self.next_box += 1;
            self.sub_boxes.push((*parent, content.map(|h| h.id())));
            b
        }

        fn new_caption(&mut self, table: &u32, top: bool, content: ContentHandle) {
            self.captions.push((*table, top, content.id()));
        }

        fn set_box_attributes(&mut self, bx: &u32, attrs: &BoxAttributes<'_>) {
            if attrs.num_format.is_some() {
                self.formatted.push(*bx);
            }
        }

        fn remove_empty_row(&mut self, table: &u32, row: usize) {
            self.removed.push((*table, row));
        }
    }

    fn leaf_spec(id: u32) -> CellSpec {
        CellSpec {
            contents: smallvec![ContentUnit::Leaf(ContentHandle::new(id))],
            row_span: 1,
            col_span: 1,
            ..CellSpec::default()
        }
    }

    fn two_by_two() -> TableGrid {
        let mut g = TableGrid::new();
        for r in 0..2u32 {
            g.open_row(None, None, None);
            g.insert_cell(leaf_spec(r * 2));
            g.insert_cell(leaf_spec(r * 2 + 1));
            g.close_row();
        }
        g.close();
        g
    }

    #[test]
    fn test_one_box_per_anchor() {
        let mut g = two_by_two();
        resolve_borders(&mut g);
        let mut model = MockModel::default();
        assemble(&mut g, &mut model).unwrap();

        assert_eq!(model.tables.len(), 1);
        assert_eq!(model.boxes.len(), 4);
        assert_eq!(model.boxes[0], (0, 0, 0, Some(0)));
        assert_eq!(model.boxes[3], (0, 1, 1, Some(3)));
    }

    #[test]
    fn test_placeholder_reused_for_first_cell_only() {
        let mut g = two_by_two();
        let mut model = MockModel {
            has_placeholder: true,
            ..MockModel::default()
        };
        assemble(&mut g, &mut model).unwrap();

        assert_eq!(model.reused, Some(0));
        assert_eq!(model.boxes.len(), 4);
    }

    #[test]
    fn test_content_ownership_transferred() {
        let mut g = two_by_two();
        let mut model = MockModel::default();
        assemble(&mut g, &mut model).unwrap();

        for row in g.rows() {
            for cell in &row.cells {
                assert!(cell.contents.is_empty());
            }
        }
    }

    #[test]
    fn test_assemble_twice_is_error() {
        let mut g = two_by_two();
        let mut model = MockModel::default();
        assemble(&mut g, &mut model).unwrap();
        assert!(matches!(
            assemble(&mut g, &mut model),
            Err(Error::AlreadyAssembled)
        ));
    }

    #[test]
    fn test_nested_table_recursed_under_box() {
        let mut inner = TableGrid::new();
        inner.open_row(None, None, None);
        inner.insert_cell(leaf_spec(5));
        inner.close_row();
        inner.close();

        let mut outer = TableGrid::new();
        outer.open_row(None, None, None);
        outer.insert_cell(CellSpec {
            contents: smallvec![ContentUnit::Table(Box::new(inner))],
            row_span: 1,
            col_span: 1,
            ..CellSpec::default()
        });
        outer.close_row();
        outer.close();

        let mut model = MockModel::default();
        assemble(&mut outer, &mut model).unwrap();

        assert_eq!(model.tables.len(), 2);
        // The outer box hosts the nested table.
        let outer_box = model.boxes[0];
        assert_eq!(outer_box.3, None);
        assert_eq!(model.tables[1].0, Some(0));
    }

    #[test]
    fn test_multiple_units_become_sub_boxes() {
        let mut inner = TableGrid::new();
        inner.open_row(None, None, None);
        inner.insert_cell(leaf_spec(9));
        inner.close_row();
        inner.close();

        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        g.insert_cell(CellSpec {
            contents: smallvec![
                ContentUnit::Leaf(ContentHandle::new(1)),
                ContentUnit::Table(Box::new(inner)),
                ContentUnit::Leaf(ContentHandle::new(2)),
            ],
            row_span: 1,
            col_span: 1,
            ..CellSpec::default()
        });
        g.close_row();
        g.close();

        let mut model = MockModel::default();
        assemble(&mut g, &mut model).unwrap();

        // One cell box, three sub-structures, one of them hosting the
        // nested table.
        assert_eq!(model.sub_boxes.len(), 3);
        assert_eq!(model.sub_boxes[0].1, Some(1));
        assert_eq!(model.sub_boxes[1].1, None);
        assert_eq!(model.sub_boxes[2].1, Some(2));
        assert_eq!(model.tables.len(), 2);
    }

    #[test]
    fn test_num_format_only_when_valued_or_empty() {
        let mut g = TableGrid::new();
        g.open_row(None, None, None);
        // Valued cell with content: format applies.
        let mut valued = leaf_spec(0);
        valued.num_format = Some(NumberFormat {
            code: Some("0.00".into()),
            value: Some(1.5),
        });
        g.insert_cell(valued);
        // Format without value on a content-bearing cell: skipped.
        let mut unvalued = leaf_spec(1);
        unvalued.num_format = Some(NumberFormat {
            code: Some("0.00".into()),
            value: None,
        });
        g.insert_cell(unvalued);
        // Format without value on an empty cell: applies.
        let mut empty = CellSpec {
            row_span: 1,
            col_span: 1,
            ..CellSpec::default()
        };
        empty.num_format = Some(NumberFormat {
            code: Some("0%".into()),
            value: None,
        });
        g.insert_cell(empty);
        g.close_row();
        g.close();

        let mut model = MockModel::default();
        assemble(&mut g, &mut model).unwrap();

        assert_eq!(model.formatted.len(), 2);
    }

    #[test]
    fn test_caption_emitted_on_requested_side() {
        let mut g = two_by_two();
        g.caption = Some(crate::grid::table::Caption {
            top: false,
            contents: smallvec![ContentHandle::new(42)],
        });
        let mut model = MockModel::default();
        assemble(&mut g, &mut model).unwrap();

        assert_eq!(model.captions, vec![(0, false, 42)]);
    }

    #[test]
    fn test_fully_empty_row_removed() {
        let mut g = two_by_two();
        // Simulate span trimming leaving row 1 with protected cells only.
        for cell in &mut g.rows[1].cells {
            *cell = crate::grid::cell::TableCell {
                covered: true,
                covered_by: None,
                row_span: 1,
                col_span: 1,
                ..Default::default()
            };
        }
        let mut model = MockModel::default();
        assemble(&mut g, &mut model).unwrap();

        assert_eq!(model.removed, vec![(0, 1)]);
    }

    #[test]
    fn test_covered_span_row_not_removed() {
        let mut g = TableGrid::from_options(&TableOptions::default());
        g.open_row(None, None, None);
        g.insert_cell(CellSpec {
            contents: smallvec![ContentUnit::Leaf(ContentHandle::new(0))],
            row_span: 2,
            col_span: 1,
            ..CellSpec::default()
        });
        g.close_row();
        g.open_row(None, None, None);
        g.close_row();
        g.open_row(None, None, None);
        g.insert_cell(leaf_spec(1));
        g.close_row();
        g.close();

        let mut model = MockModel::default();
        assemble(&mut g, &mut model).unwrap();
        assert!(model.removed.is_empty());
    }
}
