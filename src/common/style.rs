//! Shared style value types: alignments, widths, backgrounds, and
//! border lines.
//!
//! Widths and line thicknesses are measured in twips (1/1440 inch)
//! throughout.

use crate::common::color::RgbColor;
use bitflags::bitflags;

/// Horizontal adjustment of a table, row, or cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizAdjust {
    /// Flush left
    Left,
    /// Centered
    Center,
    /// Flush right
    Right,
}

/// Vertical alignment of cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertAlign {
    /// Align to the top edge
    Top,
    /// Center vertically
    #[default]
    Middle,
    /// Align to the bottom edge
    Bottom,
}

/// A width given either as an absolute twip count or as a percentage of
/// the containing width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthSpec {
    /// Absolute width in twips
    Absolute(u32),
    /// Relative width as a percentage (clamped to 0-100 during layout)
    Percent(u8),
}

impl WidthSpec {
    /// True for the percentage form.
    #[inline]
    pub fn is_relative(&self) -> bool {
        matches!(self, WidthSpec::Percent(_))
    }
}

/// Background fill: a solid color, an image reference, or both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Background {
    /// Fill color
    pub color: Option<RgbColor>,
    /// Background image reference (an opaque URL the host resolves)
    pub image: Option<String>,
}

impl Background {
    /// Background with only a fill color.
    #[inline]
    pub fn color(color: RgbColor) -> Self {
        Self {
            color: Some(color),
            image: None,
        }
    }

    /// True if neither color nor image is set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.color.is_none() && self.image.is_none()
    }
}

/// A single border line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderLine {
    /// Line thickness in twips
    pub width: u32,
    /// Line color; `None` means the model default
    pub color: Option<RgbColor>,
}

impl BorderLine {
    /// A hairline (one pixel wide) border with default color.
    #[inline]
    pub fn hairline() -> Self {
        Self {
            width: crate::common::TWIPS_PER_PIXEL,
            color: None,
        }
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.width > 0
    }
}

bitflags! {
    /// Which sides of a table carry an outer border.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BorderSides: u8 {
        const TOP = 0x01;
        const BOTTOM = 0x02;
        const LEFT = 0x04;
        const RIGHT = 0x08;
    }
}

/// Outer frame mode of a table (the FRAME attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// No outer border
    Void,
    /// Top side only
    Above,
    /// Bottom side only
    Below,
    /// Top and bottom
    Hsides,
    /// Left and right
    Vsides,
    /// Left side only
    Lhs,
    /// Right side only
    Rhs,
    /// All four sides
    Box,
}

impl Frame {
    /// The set of outer sides this frame mode requests.
    pub fn sides(&self) -> BorderSides {
        match self {
            Frame::Void => BorderSides::empty(),
            Frame::Above => BorderSides::TOP,
            Frame::Below => BorderSides::BOTTOM,
            Frame::Hsides => BorderSides::TOP | BorderSides::BOTTOM,
            Frame::Vsides => BorderSides::LEFT | BorderSides::RIGHT,
            Frame::Lhs => BorderSides::LEFT,
            Frame::Rhs => BorderSides::RIGHT,
            Frame::Box => BorderSides::all(),
        }
    }
}

/// Inner rule mode of a table (the RULES attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rules {
    /// No inner lines
    None,
    /// Lines between column groups only
    Groups,
    /// Lines between rows
    Rows,
    /// Lines between columns
    Cols,
    /// Lines between all rows and columns
    All,
}

/// Numeric format information attached to a cell.
///
/// The format code is an opaque string interpreted by the host model;
/// the value, when present, marks the cell as explicitly valued.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberFormat {
    /// Host-interpreted format code
    pub code: Option<String>,
    /// Explicit numeric value
    pub value: Option<f64>,
}

/// Borders of a table after frame/rules/inheritance resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedBorders {
    /// Which outer sides are enabled
    pub sides: BorderSides,
    pub top: Option<BorderLine>,
    pub bottom: Option<BorderLine>,
    pub left: Option<BorderLine>,
    pub right: Option<BorderLine>,
    /// Line drawn under rows flagged with a bottom border
    pub inner_h: Option<BorderLine>,
    /// Line drawn left of columns flagged with a left border
    pub inner_v: Option<BorderLine>,
}

impl ResolvedBorders {
    /// The resolved line for one outer side, if enabled.
    pub fn line(&self, side: BorderSides) -> Option<BorderLine> {
        if side == BorderSides::TOP {
            self.top
        } else if side == BorderSides::BOTTOM {
            self.bottom
        } else if side == BorderSides::LEFT {
            self.left
        } else if side == BorderSides::RIGHT {
            self.right
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_sides() {
        assert_eq!(Frame::Void.sides(), BorderSides::empty());
        assert_eq!(Frame::Box.sides(), BorderSides::all());
        assert_eq!(
            Frame::Hsides.sides(),
            BorderSides::TOP | BorderSides::BOTTOM
        );
        assert_eq!(Frame::Lhs.sides(), BorderSides::LEFT);
    }

    #[test]
    fn test_width_spec() {
        assert!(WidthSpec::Percent(50).is_relative());
        assert!(!WidthSpec::Absolute(1440).is_relative());
    }
}
