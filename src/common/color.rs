//! RGB color representation and HTML color attribute parsing.

use std::fmt;

/// The sixteen HTML 4 color names plus the universally supported
/// `orange` extension. Keys are lowercase.
static NAMED_COLORS: phf::Map<&'static str, RgbColor> = phf::phf_map! {
    "black" => RgbColor::new(0x00, 0x00, 0x00),
    "silver" => RgbColor::new(0xC0, 0xC0, 0xC0),
    "gray" => RgbColor::new(0x80, 0x80, 0x80),
    "white" => RgbColor::new(0xFF, 0xFF, 0xFF),
    "maroon" => RgbColor::new(0x80, 0x00, 0x00),
    "red" => RgbColor::new(0xFF, 0x00, 0x00),
    "purple" => RgbColor::new(0x80, 0x00, 0x80),
    "fuchsia" => RgbColor::new(0xFF, 0x00, 0xFF),
    "green" => RgbColor::new(0x00, 0x80, 0x00),
    "lime" => RgbColor::new(0x00, 0xFF, 0x00),
    "olive" => RgbColor::new(0x80, 0x80, 0x00),
    "yellow" => RgbColor::new(0xFF, 0xFF, 0x00),
    "navy" => RgbColor::new(0x00, 0x00, 0x80),
    "blue" => RgbColor::new(0x00, 0x00, 0xFF),
    "teal" => RgbColor::new(0x00, 0x80, 0x80),
    "aqua" => RgbColor::new(0x00, 0xFF, 0xFF),
    "orange" => RgbColor::new(0xFF, 0xA5, 0x00),
};

/// RGB color representation.
///
/// Represents a color using red, green, and blue components, each in the
/// range 0-255.
///
/// # Examples
///
/// ```rust
/// use tabella::common::RgbColor;
///
/// let red = RgbColor::new(255, 0, 0);
/// let blue = RgbColor::from_hex("0000FF").unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl RgbColor {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create an RGB color from a hex string.
    ///
    /// Accepts six-digit (`"FF0000"`) and three-digit (`"F00"`) forms,
    /// with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            },
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Self::new(r * 17, g * 17, b * 17))
            },
            _ => None,
        }
    }

    /// Convert to hex string (without # prefix).
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Parse an HTML color attribute value (named color or hex form).
///
/// An empty or whitespace-only value yields `None`. Table, row, and cell
/// markup treats an empty BGCOLOR as absent, and this function is the
/// single place that rule lives.
pub fn parse_html_color(value: &str) -> Option<RgbColor> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let lower = value.to_ascii_lowercase();
    if let Some(named) = NAMED_COLORS.get(lower.as_str()) {
        return Some(*named);
    }
    RgbColor::from_hex(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_colors() {
        assert_eq!(parse_html_color("red"), Some(RgbColor::new(255, 0, 0)));
        assert_eq!(parse_html_color("NAVY"), Some(RgbColor::new(0, 0, 128)));
        assert_eq!(parse_html_color("orange"), Some(RgbColor::new(255, 165, 0)));
    }

    #[test]
    fn test_hex_forms() {
        assert_eq!(parse_html_color("#00FF00"), Some(RgbColor::new(0, 255, 0)));
        assert_eq!(parse_html_color("00ff00"), Some(RgbColor::new(0, 255, 0)));
        assert_eq!(parse_html_color("#F00"), Some(RgbColor::new(255, 0, 0)));
    }

    #[test]
    fn test_empty_is_absent() {
        assert_eq!(parse_html_color(""), None);
        assert_eq!(parse_html_color("   "), None);
    }

    #[test]
    fn test_garbage_is_absent() {
        assert_eq!(parse_html_color("not-a-color"), None);
        assert_eq!(parse_html_color("#12345"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(RgbColor::new(255, 0, 0).to_string(), "#FF0000");
    }
}
