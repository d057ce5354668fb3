//! Color types used by category styles and label palettes.
//!
//! Colors accept several configuration spellings: `"#RRGGBB"`,
//! `"#RRGGBBAA"`, `[r, g, b]`, `[r, g, b, a]` or a handful of names.
//! They always serialize back as a four element array.

use serde::{Deserialize, Serialize};

/// An RGBA color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ColorValue", into = "[u8; 4]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    /// Convert to an RGBA tuple.
    pub fn to_rgba(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }

    /// Parse a `#RRGGBB` or `#RRGGBBAA` string.
    pub fn from_hex(s: &str) -> Result<Self, ColorError> {
        let hex = s.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(ColorError::InvalidHex(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ColorError::InvalidHex(s.to_string()))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Look up a named color.
    pub fn named(name: &str) -> Option<Self> {
        let (r, g, b, a) = match name.to_lowercase().as_str() {
            "transparent" => (0, 0, 0, 0),
            "black" => (0, 0, 0, 255),
            "white" => (255, 255, 255, 255),
            "red" => (255, 0, 0, 255),
            "green" => (0, 255, 0, 255),
            "blue" => (0, 0, 255, 255),
            "yellow" => (255, 255, 0, 255),
            "gray" | "grey" => (128, 128, 128, 255),
            _ => return None,
        };
        Some(Self::rgba(r, g, b, a))
    }
}

impl From<Color> for [u8; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

/// Accepted configuration spellings of a color.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ColorValue {
    /// RGB array: [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),
    /// Hex string or color name
    Text(String),
}

impl TryFrom<ColorValue> for Color {
    type Error = ColorError;

    fn try_from(value: ColorValue) -> Result<Self, Self::Error> {
        match value {
            ColorValue::Array(arr) => match arr.as_slice() {
                [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
                [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
                _ => Err(ColorError::InvalidArray(arr.len())),
            },
            ColorValue::Text(s) if s.starts_with('#') => Color::from_hex(&s),
            ColorValue::Text(s) => Color::named(&s).ok_or(ColorError::UnknownName(s)),
        }
    }
}

/// A fill color and the stroke (border) color drawn around it.
///
/// Serialized as `[fill, stroke]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[Color; 2]", into = "[Color; 2]")]
pub struct ColorPair {
    pub fill: Color,
    pub stroke: Color,
}

impl ColorPair {
    pub const fn new(fill: Color, stroke: Color) -> Self {
        Self { fill, stroke }
    }
}

impl From<[Color; 2]> for ColorPair {
    fn from(v: [Color; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<ColorPair> for [Color; 2] {
    fn from(p: ColorPair) -> Self {
        [p.fill, p.stroke]
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ColorError {
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),

    #[error("Color arrays need 3 or 4 channels, got {0}")]
    InvalidArray(usize),

    #[error("Unknown color name: {0}")]
    UnknownName(String),
}
