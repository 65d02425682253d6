//! Two-pass column sizing.
//!
//! Pass 1 ([`measure`]) walks the grid bottom-up collecting intrinsic
//! minimum and natural maximum widths per column; leaf content is
//! measured through the host [`ContentMeasure`] and a nested table
//! contributes its own aggregated range as a single unit. Pass 2
//! ([`plan`]) distributes a concrete width budget top-down: explicit
//! user widths first, the remainder proportional to the pass-1 ranges.
//! Pass 2 is a pure function of its inputs, so re-running it with the
//! same budget always yields the same column widths.
//!
//! All widths are in twips. The available budget handed to [`plan`] is
//! the space after the container's own margins, padding, and border
//! were already deducted upstream.

use crate::common::{Error, HorizAdjust, Result, WidthSpec};
use crate::grid::cell::ContentUnit;
use crate::grid::table::TableGrid;
use crate::grid::ContentHandle;

/// Intrinsic width range of a content unit or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeRange {
    /// Narrowest width that avoids clipping
    pub min: u32,
    /// Natural width without wrapping
    pub max: u32,
}

impl SizeRange {
    /// Widen this range to cover `other`.
    fn unite(&mut self, other: SizeRange) {
        self.min = self.min.max(other.min);
        self.max = self.max.max(other.max);
    }
}

/// Host measurement of leaf content.
pub trait ContentMeasure {
    /// Intrinsic min/max width of the referenced content, in twips.
    fn measure(&self, content: ContentHandle) -> SizeRange;
}

/// Pass-1 result: ranges only, no final widths.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRanges {
    pub columns: Vec<SizeRange>,
    /// Aggregated range of the whole table including chrome
    pub total: SizeRange,
}

/// Pass-2 result stored on the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayoutInfo {
    /// Final width per column, in twips
    pub column_widths: Vec<u32>,
    /// Total table width including spacing and border chrome
    pub width: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    /// The table tracks its container width instead of keeping fixed
    /// margins; recompute on container change
    pub resize_with_container: bool,
}

/// Pass 1: aggregate intrinsic ranges bottom-up.
pub fn measure(grid: &TableGrid, m: &impl ContentMeasure) -> TableRanges {
    let ncols = grid.column_count();
    let mut columns = vec![SizeRange::default(); ncols];

    // Declared absolute column widths raise the natural width; the
    // content minimum still rules the floor.
    for (i, col) in grid.columns().iter().enumerate() {
        if let Some(WidthSpec::Absolute(w)) = col.width {
            columns[i].max = columns[i].max.max(w);
        }
    }

    let cell_chrome = 2 * grid.cell_padding;
    // Single-span cells set the base ranges; spanning cells then only
    // top up what their columns do not already provide.
    for spanning in [false, true] {
        for row in grid.rows() {
            for (c, cell) in row.cells.iter().enumerate() {
                if !cell.is_anchor() || (cell.col_span > 1) != spanning {
                    continue;
                }
                let mut range = cell_range(cell, m);
                range.min = range.min.saturating_add(cell_chrome);
                range.max = range.max.saturating_add(cell_chrome).max(range.min);
                let span = (cell.col_span as usize).min(ncols - c);
                if span <= 1 {
                    columns[c].unite(range);
                } else {
                    spread(&mut columns[c..c + span], range);
                }
            }
        }
    }

    for col in &mut columns {
        col.max = col.max.max(col.min);
    }

    let chrome = table_chrome(grid, ncols);
    let mut total = SizeRange {
        min: columns.iter().map(|r| r.min).sum::<u32>() + chrome,
        max: columns.iter().map(|r| r.max).sum::<u32>() + chrome,
    };
    if let Some(WidthSpec::Absolute(w)) = grid.width {
        total.max = total.max.max(w);
    }
    total.max = total.max.max(total.min);

    TableRanges { columns, total }
}

/// Range of one cell: units stack vertically, so the widest rules.
fn cell_range(cell: &crate::grid::cell::TableCell, m: &impl ContentMeasure) -> SizeRange {
    let mut range = SizeRange::default();
    for unit in &cell.contents {
        match unit {
            ContentUnit::Leaf(handle) => range.unite(m.measure(*handle)),
            ContentUnit::Table(nested) => range.unite(measure(nested, m).total),
        }
    }
    if let Some(WidthSpec::Absolute(w)) = cell.width {
        range.max = range.max.max(w);
    }
    range
}

/// Distribute a spanning cell's range over its columns, proportional to
/// what the columns already hold (equal split when all are empty).
fn spread(cols: &mut [SizeRange], range: SizeRange) {
    let n = cols.len() as u32;
    let sum_min: u32 = cols.iter().map(|r| r.min).sum();
    let sum_max: u32 = cols.iter().map(|r| r.max).sum();

    if range.min > sum_min {
        let extra = range.min - sum_min;
        for col in cols.iter_mut() {
            let share = if sum_min > 0 {
                (extra as u64 * col.min as u64 / sum_min as u64) as u32
            } else {
                extra / n
            };
            col.min += share;
        }
        // Rounding crumbs land in the last column.
        let assigned: u32 = cols.iter().map(|r| r.min).sum::<u32>();
        if assigned < range.min {
            cols.last_mut().unwrap().min += range.min - assigned;
        }
    }
    if range.max > sum_max {
        let extra = range.max - sum_max;
        for col in cols.iter_mut() {
            let share = if sum_max > 0 {
                (extra as u64 * col.max as u64 / sum_max as u64) as u32
            } else {
                extra / n
            };
            col.max += share;
        }
        let assigned: u32 = cols.iter().map(|r| r.max).sum::<u32>();
        if assigned < range.max {
            cols.last_mut().unwrap().max += range.max - assigned;
        }
    }
    for col in cols.iter_mut() {
        col.max = col.max.max(col.min);
    }
}

fn table_chrome(grid: &TableGrid, ncols: usize) -> u32 {
    grid.cell_spacing * (ncols as u32 + 1) + 2 * grid.border_width
}

/// Pass 2: compute final column widths for `available` twips of space.
///
/// Layout is computed exactly once per table; a second call is an
/// error. Nested tables are planned recursively with the inner width
/// their enclosing cell resolved to.
pub fn plan(grid: &mut TableGrid, available: u32, m: &impl ContentMeasure) -> Result<()> {
    if grid.layout.is_some() {
        return Err(Error::LayoutAlreadyComputed);
    }
    plan_recursive(grid, available, m);
    Ok(())
}

fn plan_recursive(grid: &mut TableGrid, available: u32, m: &impl ContentMeasure) {
    debug_assert!(grid.layout.is_none(), "layout computed twice");
    let ranges = measure(grid, m);
    let info = distribute(grid, &ranges, available);

    let cell_padding = grid.cell_padding;
    let cell_spacing = grid.cell_spacing;
    let widths = info.column_widths.clone();
    for row in &mut grid.rows {
        for (c, cell) in row.cells.iter_mut().enumerate() {
            if !cell.is_anchor() || cell.contents.is_empty() {
                continue;
            }
            let span = (cell.col_span as usize).min(widths.len().saturating_sub(c));
            let cell_width: u32 = widths[c..c + span].iter().sum::<u32>()
                + cell_spacing * span.saturating_sub(1) as u32;
            let border = cell.border.map(|b| b.width).unwrap_or(0);
            let inner = cell_width.saturating_sub(2 * (cell_padding + border));
            for unit in &mut cell.contents {
                if let ContentUnit::Table(nested) = unit {
                    plan_recursive(nested, inner, m);
                }
            }
        }
    }
    grid.layout = Some(info);
}

/// The pure distribution step of pass 2.
///
/// Exposed for hosts that re-run sizing on container changes; it never
/// mutates the grid, so identical inputs give identical widths.
pub fn distribute(grid: &TableGrid, ranges: &TableRanges, available: u32) -> TableLayoutInfo {
    let ncols = ranges.columns.len();
    let chrome = table_chrome(grid, ncols);
    let min_total: u32 = ranges.columns.iter().map(|r| r.min).sum::<u32>() + chrome;

    let target = match grid.width {
        Some(WidthSpec::Percent(p)) => {
            (available as u64 * u64::from(p.min(100)) / 100) as u32
        },
        Some(WidthSpec::Absolute(w)) => w.min(available),
        None => ranges.total.max.min(available),
    }
    .max(min_total);
    let inner = target.saturating_sub(chrome);

    // Explicit widths first: a column declaration, or the width of a
    // single-span cell anchored in the column.
    let specs = column_specs(grid, ncols);
    let mut widths = vec![0u32; ncols];
    let mut fixed = vec![false; ncols];
    for i in 0..ncols {
        match specs[i] {
            Some(WidthSpec::Absolute(w)) => {
                widths[i] = w.min(inner).max(ranges.columns[i].min);
                fixed[i] = true;
            },
            Some(WidthSpec::Percent(p)) => {
                let w = (inner as u64 * u64::from(p.min(100)) / 100) as u32;
                widths[i] = w.max(ranges.columns[i].min);
                fixed[i] = true;
            },
            None => {},
        }
    }

    let assigned: u32 = widths.iter().sum();
    let avail_free = inner.saturating_sub(assigned);
    let free: Vec<usize> = (0..ncols).filter(|&i| !fixed[i]).collect();
    let sum_min: u32 = free.iter().map(|&i| ranges.columns[i].min).sum();
    let sum_max: u32 = free.iter().map(|&i| ranges.columns[i].max).sum();

    if avail_free <= sum_min {
        // No room beyond the minima.
        for &i in &free {
            widths[i] = ranges.columns[i].min;
        }
    } else if avail_free < sum_max {
        // Interpolate between minimum and natural width, proportional
        // to each column's pass-1 range.
        let budget = avail_free - sum_min;
        let slack = sum_max - sum_min;
        for &i in &free {
            let col = ranges.columns[i];
            widths[i] = col.min
                + (u64::from(budget) * u64::from(col.max - col.min) / u64::from(slack)) as u32;
        }
        // Rounding crumbs land in the last free column.
        let used: u32 = free.iter().map(|&i| widths[i]).sum();
        if let Some(&last) = free.last() {
            widths[last] += avail_free.saturating_sub(used);
        }
    } else if !free.is_empty() {
        // Every free column reaches its natural width; the surplus goes
        // to no-content columns in equal shares, or spreads over the
        // weighted columns when all columns have content.
        for &i in &free {
            widths[i] = ranges.columns[i].max;
        }
        let extra = avail_free - sum_max;
        let zero: Vec<usize> = free
            .iter()
            .copied()
            .filter(|&i| ranges.columns[i].max == 0)
            .collect();
        if !zero.is_empty() {
            let share = extra / zero.len() as u32;
            for &i in &zero {
                widths[i] = share;
            }
            if let Some(&last) = zero.last() {
                widths[last] += extra - share * zero.len() as u32;
            }
        } else if sum_max > 0 {
            for &i in &free {
                widths[i] += (u64::from(extra) * u64::from(ranges.columns[i].max)
                    / u64::from(sum_max)) as u32;
            }
            let used: u32 = free.iter().map(|&i| widths[i]).sum();
            if let Some(&last) = free.last() {
                widths[last] += avail_free.saturating_sub(used);
            }
        } else {
            let share = extra / free.len() as u32;
            for &i in &free {
                widths[i] = share;
            }
        }
    }

    let width: u32 = widths.iter().sum::<u32>() + chrome;
    let resize_with_container = matches!(grid.width, Some(WidthSpec::Percent(_)));
    let leftover = if resize_with_container {
        0
    } else {
        available.saturating_sub(width)
    };
    let (left_margin, right_margin) = match grid.adjust {
        Some(HorizAdjust::Right) => (leftover, 0),
        Some(HorizAdjust::Center) => (leftover / 2, leftover - leftover / 2),
        _ => (0, leftover),
    };

    TableLayoutInfo {
        column_widths: widths,
        width,
        left_margin,
        right_margin,
        resize_with_container,
    }
}

/// Effective width spec per column: the declaration wins, then the
/// first single-span cell anchored in the column.
fn column_specs(grid: &TableGrid, ncols: usize) -> Vec<Option<WidthSpec>> {
    let mut specs: Vec<Option<WidthSpec>> = grid.columns().iter().map(|c| c.width).collect();
    specs.resize(ncols, None);
    for row in grid.rows() {
        for (c, cell) in row.cells.iter().enumerate() {
            if c < ncols && cell.is_anchor() && cell.col_span == 1 && specs[c].is_none() {
                specs[c] = cell.width;
            }
        }
    }
    specs
}
