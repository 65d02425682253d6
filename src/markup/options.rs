//! Table open-tag option parsing.
//!
//! Recognizes the classic HTML table attributes. Unknown attributes are
//! ignored; enumerated values are matched case-insensitively through
//! compile-time keyword maps.

use crate::common::color::parse_html_color;
use crate::common::{px_to_twips, Background, Frame, HorizAdjust, RgbColor, Rules, VertAlign, WidthSpec};

static FRAME_KEYWORDS: phf::Map<&'static str, Frame> = phf::phf_map! {
    "void" => Frame::Void,
    "above" => Frame::Above,
    "below" => Frame::Below,
    "hsides" => Frame::Hsides,
    "vsides" => Frame::Vsides,
    "lhs" => Frame::Lhs,
    "rhs" => Frame::Rhs,
    "box" => Frame::Box,
    "border" => Frame::Box,
};

static RULES_KEYWORDS: phf::Map<&'static str, Rules> = phf::phf_map! {
    "none" => Rules::None,
    "groups" => Rules::Groups,
    "rows" => Rules::Rows,
    "cols" => Rules::Cols,
    "all" => Rules::All,
};

static ALIGN_KEYWORDS: phf::Map<&'static str, HorizAdjust> = phf::phf_map! {
    "left" => HorizAdjust::Left,
    "center" => HorizAdjust::Center,
    "middle" => HorizAdjust::Center,
    "right" => HorizAdjust::Right,
};

static VALIGN_KEYWORDS: phf::Map<&'static str, VertAlign> = phf::phf_map! {
    "top" => VertAlign::Top,
    "middle" => VertAlign::Middle,
    "center" => VertAlign::Middle,
    "bottom" => VertAlign::Bottom,
};

/// Default cell padding: one pixel, in twips.
pub const DEFAULT_CELL_PADDING: u32 = px_to_twips(1);
/// Default cell spacing: two pixels, in twips.
pub const DEFAULT_CELL_SPACING: u32 = px_to_twips(2);

/// Parsed table open-tag options.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    /// Declared column count (the COLS attribute)
    pub cols: Option<u32>,
    /// Requested table width
    pub width: Option<WidthSpec>,
    /// Requested table height in twips
    pub height: Option<u32>,
    /// Padding inside each cell, in twips
    pub cell_padding: u32,
    /// Spacing between cells, in twips
    pub cell_spacing: u32,
    /// Border width in twips; 0 means borderless
    pub border: u32,
    /// Whether a BORDER attribute appeared at all
    pub has_border_attr: bool,
    pub frame: Option<Frame>,
    pub rules: Option<Rules>,
    pub align: Option<HorizAdjust>,
    pub valign: Option<VertAlign>,
    /// Background derived from BGCOLOR/BACKGROUND attributes
    pub background: Option<Background>,
    /// Background color from an inline style; wins over the attribute form
    pub style_background: Option<RgbColor>,
    /// Horizontal outside margin in twips
    pub hspace: u32,
    /// Vertical outside margin in twips
    pub vspace: u32,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            cols: None,
            width: None,
            height: None,
            cell_padding: DEFAULT_CELL_PADDING,
            cell_spacing: DEFAULT_CELL_SPACING,
            border: 0,
            has_border_attr: false,
            frame: None,
            rules: None,
            align: None,
            valign: None,
            background: None,
            style_background: None,
            hspace: 0,
            vspace: 0,
        }
    }
}

impl TableOptions {
    /// Parse options from open-tag attribute name/value pairs.
    ///
    /// Attribute names are matched case-insensitively; unknown names are
    /// skipped. A BORDER attribute with no (or unparseable) value counts
    /// as `BORDER=1`.
    pub fn from_attrs<'a, I>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut opts = Self::default();
        for (name, value) in attrs {
            let name = name.to_ascii_lowercase();
            match name.as_str() {
                "cols" => opts.cols = value.trim().parse().ok(),
                "width" => opts.width = parse_width(value),
                "height" => {
                    opts.height = value.trim().parse().ok().map(px_to_twips);
                },
                "cellpadding" => {
                    if let Ok(px) = value.trim().parse() {
                        opts.cell_padding = px_to_twips(px);
                    }
                },
                "cellspacing" => {
                    if let Ok(px) = value.trim().parse() {
                        opts.cell_spacing = px_to_twips(px);
                    }
                },
                "border" => {
                    opts.has_border_attr = true;
                    let px: u32 = value.trim().parse().unwrap_or(1);
                    opts.border = px_to_twips(px);
                },
                "frame" => opts.frame = lookup(&FRAME_KEYWORDS, value),
                "rules" => opts.rules = lookup(&RULES_KEYWORDS, value),
                "align" => opts.align = lookup(&ALIGN_KEYWORDS, value),
                "valign" => opts.valign = lookup(&VALIGN_KEYWORDS, value),
                "bgcolor" => {
                    // Empty BGCOLOR is treated as absent, not as an error.
                    if let Some(color) = parse_html_color(value) {
                        opts.background
                            .get_or_insert_with(Background::default)
                            .color = Some(color);
                    }
                },
                "background" => {
                    let url = value.trim();
                    if !url.is_empty() {
                        opts.background
                            .get_or_insert_with(Background::default)
                            .image = Some(url.to_string());
                    }
                },
                "hspace" => {
                    if let Ok(px) = value.trim().parse() {
                        opts.hspace = px_to_twips(px);
                    }
                },
                "vspace" => {
                    if let Ok(px) = value.trim().parse() {
                        opts.vspace = px_to_twips(px);
                    }
                },
                _ => {},
            }
        }
        opts
    }

    /// The background that actually applies: the inline style color wins
    /// over the attribute-derived fill.
    pub fn effective_background(&self) -> Option<Background> {
        if let Some(color) = self.style_background {
            let mut bg = self.background.clone().unwrap_or_default();
            bg.color = Some(color);
            return Some(bg);
        }
        self.background.clone()
    }
}

fn lookup<T: Copy>(map: &phf::Map<&'static str, T>, value: &str) -> Option<T> {
    map.get(value.trim().to_ascii_lowercase().as_str()).copied()
}

/// Parse a WIDTH attribute: `"50%"` is relative, a bare number is pixels.
pub fn parse_width(value: &str) -> Option<WidthSpec> {
    let value = value.trim();
    if let Some(pct) = value.strip_suffix('%') {
        let pct: u32 = pct.trim().parse().ok()?;
        return Some(WidthSpec::Percent(pct.min(100) as u8));
    }
    let px: u32 = value.strip_suffix("px").unwrap_or(value).trim().parse().ok()?;
    Some(WidthSpec::Absolute(px_to_twips(px)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = TableOptions::default();
        assert_eq!(opts.cell_padding, px_to_twips(1));
        assert_eq!(opts.cell_spacing, px_to_twips(2));
        assert_eq!(opts.border, 0);
    }

    #[test]
    fn test_parse_basic_attrs() {
        let opts = TableOptions::from_attrs([
            ("COLS", "3"),
            ("WIDTH", "50%"),
            ("BORDER", "2"),
            ("ALIGN", "Center"),
            ("RULES", "rows"),
            ("FRAME", "hsides"),
        ]);
        assert_eq!(opts.cols, Some(3));
        assert_eq!(opts.width, Some(WidthSpec::Percent(50)));
        assert_eq!(opts.border, px_to_twips(2));
        assert!(opts.has_border_attr);
        assert_eq!(opts.align, Some(HorizAdjust::Center));
        assert_eq!(opts.rules, Some(Rules::Rows));
        assert_eq!(opts.frame, Some(Frame::Hsides));
    }

    #[test]
    fn test_border_without_value() {
        let opts = TableOptions::from_attrs([("border", "")]);
        assert!(opts.has_border_attr);
        assert_eq!(opts.border, px_to_twips(1));
    }

    #[test]
    fn test_empty_bgcolor_ignored() {
        let opts = TableOptions::from_attrs([("bgcolor", "")]);
        assert_eq!(opts.background, None);

        let opts = TableOptions::from_attrs([("bgcolor", "red")]);
        assert_eq!(
            opts.background.unwrap().color,
            Some(RgbColor::new(255, 0, 0))
        );
    }

    #[test]
    fn test_style_background_wins() {
        let mut opts = TableOptions::from_attrs([("bgcolor", "red")]);
        opts.style_background = Some(RgbColor::new(0, 0, 255));
        assert_eq!(
            opts.effective_background().unwrap().color,
            Some(RgbColor::new(0, 0, 255))
        );
    }

    #[test]
    fn test_width_forms() {
        assert_eq!(parse_width("300"), Some(WidthSpec::Absolute(px_to_twips(300))));
        assert_eq!(parse_width("150%"), Some(WidthSpec::Percent(100)));
        assert_eq!(parse_width("abc"), None);
    }

    #[test]
    fn test_unknown_attrs_ignored() {
        let opts = TableOptions::from_attrs([("onclick", "alert(1)"), ("summary", "x")]);
        assert_eq!(opts, TableOptions::default());
    }
}
