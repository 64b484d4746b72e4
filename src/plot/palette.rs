//! Qualitative colour palette and marker shapes.

use std::str::FromStr;

use plotters::style::RGBColor;

/// Ten-colour qualitative palette, cycled by series index.
pub const QUALITATIVE: [RGBColor; 10] = [
    RGBColor(0x63, 0x6E, 0xFA),
    RGBColor(0xEF, 0x55, 0x3B),
    RGBColor(0x00, 0xCC, 0x96),
    RGBColor(0xAB, 0x63, 0xFA),
    RGBColor(0xFF, 0xA1, 0x5A),
    RGBColor(0x19, 0xD3, 0xF3),
    RGBColor(0xFF, 0x66, 0x92),
    RGBColor(0xB6, 0xE8, 0x80),
    RGBColor(0xFF, 0x97, 0xFF),
    RGBColor(0xFE, 0xCB, 0x52),
];

/// Colour for the `i`-th series.
pub fn color(i: usize) -> RGBColor {
    QUALITATIVE[i % QUALITATIVE.len()]
}

/// Parses `#RRGGBB` (leading `#` optional).
pub fn parse_hex(s: &str) -> Option<RGBColor> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

/// Point marker drawn on averaged series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Marker {
    #[default]
    Circle,
    Triangle,
    Square,
    Cross,
}

impl FromStr for Marker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "circle" => Ok(Self::Circle),
            "triangle" | "triangle-up" => Ok(Self::Triangle),
            "square" => Ok(Self::Square),
            "cross" | "x" => Ok(Self::Cross),
            other => Err(format!("unknown marker \"{other}\"")),
        }
    }
}
