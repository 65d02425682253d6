//! Border and background inheritance resolution.
//!
//! Runs once per table tree, outermost table first, after every grid is
//! closed. The outer frame and inner rules of each table become
//! concrete [`BorderLine`]s; nested tables then inherit the lines and
//! fills of their enclosing cells where the markup left them unset.
//! Results are cached on the grid, so resolving twice is a no-op.

use crate::common::{
    Background, BorderLine, BorderSides, ResolvedBorders, Rules,
};
use crate::grid::cell::ContentUnit;
use crate::grid::table::TableGrid;

/// Inheritance context handed down from an enclosing cell.
#[derive(Debug, Clone, Default)]
struct Inherit {
    /// Lines the enclosing cell exposes on each side, available only
    /// when the nested table sits first/last on that side
    top: Option<BorderLine>,
    bottom: Option<BorderLine>,
    left: Option<BorderLine>,
    right: Option<BorderLine>,
    /// Sides the enclosing cell permits an explicit frame to enable
    permit: BorderSides,
    /// Fill passed through when the nested table occupies the whole cell
    background: Option<Background>,
}

impl Inherit {
    fn root() -> Self {
        Self {
            permit: BorderSides::all(),
            ..Self::default()
        }
    }
}

/// Border lines around one anchor cell, derived from the resolved table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellLines {
    pub top: Option<BorderLine>,
    pub bottom: Option<BorderLine>,
    pub left: Option<BorderLine>,
    pub right: Option<BorderLine>,
}

/// Resolve borders and backgrounds for a table tree, outermost first.
pub fn resolve_borders(grid: &mut TableGrid) {
    resolve_with(grid, &Inherit::root());
}

fn resolve_with(grid: &mut TableGrid, ctx: &Inherit) {
    // The containment relation is a tree; a table resolves exactly once.
    if grid.borders.is_some() {
        return;
    }

    let own_line = BorderLine {
        width: grid.border_width.max(crate::common::TWIPS_PER_PIXEL),
        color: None,
    };
    let requested = match grid.frame {
        Some(frame) => frame.sides(),
        None if grid.border_width > 0 => BorderSides::all(),
        None => BorderSides::empty(),
    };

    // A side is enabled when the explicit frame requests it and the
    // enclosing cell permits it, or when the cell exposes a line to
    // inherit; inherited sides copy the ancestor's resolved line.
    let decide = |side: BorderSides, inherited: Option<BorderLine>| {
        if requested.contains(side) && ctx.permit.contains(side) {
            Some(own_line)
        } else {
            inherited
        }
    };
    let mut resolved = ResolvedBorders {
        top: decide(BorderSides::TOP, ctx.top),
        bottom: decide(BorderSides::BOTTOM, ctx.bottom),
        left: decide(BorderSides::LEFT, ctx.left),
        right: decide(BorderSides::RIGHT, ctx.right),
        ..ResolvedBorders::default()
    };
    for (present, side) in [
        (resolved.top.is_some(), BorderSides::TOP),
        (resolved.bottom.is_some(), BorderSides::BOTTOM),
        (resolved.left.is_some(), BorderSides::LEFT),
        (resolved.right.is_some(), BorderSides::RIGHT),
    ] {
        if present {
            resolved.sides |= side;
        }
    }

    // Inner rule pattern.
    let rules = grid.rules.unwrap_or(if grid.border_width > 0 {
        Rules::All
    } else {
        Rules::None
    });
    let hairline = BorderLine::hairline();
    let nrows = grid.rows.len();
    match rules {
        Rules::Rows | Rules::All => {
            resolved.inner_h = Some(hairline);
            for row in grid.rows.iter_mut().take(nrows.saturating_sub(1)) {
                row.bottom_border = true;
            }
        },
        Rules::Groups => {
            resolved.inner_h = Some(hairline);
            for row in grid.rows.iter_mut().take(nrows.saturating_sub(1)) {
                row.bottom_border = row.end_of_group;
            }
        },
        Rules::None | Rules::Cols => {},
    }
    match rules {
        Rules::Cols | Rules::All => {
            resolved.inner_v = Some(hairline);
            for col in grid.columns.iter_mut().skip(1) {
                col.left_border = true;
            }
        },
        Rules::Groups => {
            // Column-group starts already carry their flags.
            resolved.inner_v = Some(hairline);
        },
        Rules::None | Rules::Rows => {},
    }

    grid.borders = Some(resolved);

    // Background falls through from the nearest ancestor construct.
    if grid.background.is_none() {
        grid.background = ctx.background.clone();
    }

    // Recurse into nested tables with the lines their cells expose.
    let nrows = grid.rows.len();
    let ncols = grid.columns.len();
    let table_bg = grid.background.clone();
    let mut jobs: Vec<(usize, usize, CellLines, Option<Background>, usize)> = Vec::new();
    for r in 0..nrows {
        let row_bg = grid.rows[r].background.clone();
        for c in 0..ncols {
            let cell = &grid.rows[r].cells[c];
            if !cell.is_anchor()
                || !cell
                    .contents
                    .iter()
                    .any(|u| matches!(u, ContentUnit::Table(_)))
            {
                continue;
            }
            let bg = cell
                .background
                .clone()
                .or_else(|| row_bg.clone())
                .or_else(|| table_bg.clone());
            jobs.push((r, c, cell_lines(grid, r, c), bg, cell.contents.len()));
        }
    }

    for (r, c, lines, bg, len) in jobs {
        for idx in 0..len {
            let first = idx == 0;
            let last = idx + 1 == len;
            let mut permit = BorderSides::LEFT | BorderSides::RIGHT;
            if first {
                permit |= BorderSides::TOP;
            }
            if last {
                permit |= BorderSides::BOTTOM;
            }
            let child_ctx = Inherit {
                top: if first { lines.top } else { None },
                bottom: if last { lines.bottom } else { None },
                left: lines.left,
                right: lines.right,
                permit,
                background: if len == 1 { bg.clone() } else { None },
            };
            if let ContentUnit::Table(nested) = &mut grid.rows[r].cells[c].contents[idx] {
                resolve_with(nested, &child_ctx);
            }
        }
    }
}

/// The border lines around the anchor cell at (`row`, `col`), taking the
/// resolved table lines, per-row rule flags, the empty-row thickness
/// emulation, and the cell's own override into account.
///
/// Returns all-`None` until the table's borders were resolved.
pub fn cell_lines(grid: &TableGrid, row: usize, col: usize) -> CellLines {
    let Some(resolved) = grid.borders() else {
        return CellLines::default();
    };
    let Some(cell) = grid.cell(row, col) else {
        return CellLines::default();
    };
    if let Some(over) = cell.border {
        // A cell border override frames the whole cell.
        return CellLines {
            top: Some(over),
            bottom: Some(over),
            left: Some(over),
            right: Some(over),
        };
    }

    let nrows = grid.row_count();
    let ncols = grid.column_count();
    let row_end = row + cell.row_span as usize;
    let col_end = col + cell.col_span as usize;

    let top = if row == 0 {
        resolved.top
    } else {
        line_below_row(grid, row - 1, resolved)
    };
    let bottom = if row_end >= nrows {
        resolved
            .bottom
            .map(|l| thicken(l, grid.rows()[nrows - 1].empty_rows))
    } else {
        line_below_row(grid, row_end - 1, resolved)
    };
    let left = if col == 0 {
        resolved.left
    } else if grid.columns()[col].left_border {
        resolved.inner_v
    } else {
        None
    };
    let right = if col_end >= ncols {
        resolved.right
    } else if grid.columns()[col_end].left_border {
        resolved.inner_v
    } else {
        None
    };

    CellLines {
        top,
        bottom,
        left,
        right,
    }
}

/// The rule line under a row, thickened by its trailing-empty-row tally.
fn line_below_row(grid: &TableGrid, row: usize, resolved: &ResolvedBorders) -> Option<BorderLine> {
    let r = grid.rows().get(row)?;
    if !r.bottom_border {
        return None;
    }
    resolved.inner_h.map(|l| thicken(l, r.empty_rows))
}

fn thicken(line: BorderLine, empty_rows: u32) -> BorderLine {
    BorderLine {
        width: line.width.saturating_mul(1 + empty_rows),
        color: line.color,
    }
}
