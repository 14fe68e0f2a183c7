//! Canonical color value and the text grammars the backends produce.
//!
//! Every backend funnels its raw output through one of the parsers here, so a
//! [`ColorSample`] only ever comes out of a fully validated representation.

use std::fmt;

use palette::{FromColor, Hsl, Hsv, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::ColorParseError;

/// One picked pixel, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSample {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ColorSample {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn rgb(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    /// `#RRGGBB`, upper case.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    pub fn to_rgb_string(&self) -> String {
        format!("rgb({}, {}, {})", self.red, self.green, self.blue)
    }

    pub fn to_hsl_string(&self) -> String {
        let hsl: Hsl = Hsl::from_color(self.to_srgb());
        format!(
            "hsl({:.0}, {:.0}%, {:.0}%)",
            hsl.hue.into_positive_degrees(),
            hsl.saturation * 100.0,
            hsl.lightness * 100.0
        )
    }

    pub fn to_hsv_string(&self) -> String {
        let hsv: Hsv = Hsv::from_color(self.to_srgb());
        format!(
            "hsv({:.0}, {:.0}%, {:.0}%)",
            hsv.hue.into_positive_degrees(),
            hsv.saturation * 100.0,
            hsv.value * 100.0
        )
    }

    pub(crate) fn to_srgb(self) -> Srgb {
        Srgb::new(self.red, self.green, self.blue).into_format()
    }
}

impl fmt::Display for ColorSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 3]> for ColorSample {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::new(red, green, blue)
    }
}

/// The two shapes the screenshot portal uses for its `color` result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortalColor {
    /// `u`: `0x00RRGGBB`.
    Packed(u32),
    /// `(ddd)`: each channel in `[0, 1]`.
    Normalized(f64, f64, f64),
}

impl PortalColor {
    pub fn to_sample(self) -> ColorSample {
        match self {
            PortalColor::Packed(v) => ColorSample::new(
                ((v >> 16) & 0xFF) as u8,
                ((v >> 8) & 0xFF) as u8,
                (v & 0xFF) as u8,
            ),
            PortalColor::Normalized(r, g, b) => ColorSample::new(
                scale_channel(r),
                scale_channel(g),
                scale_channel(b),
            ),
        }
    }
}

// Truncates, never rounds: 0.5 -> 127.
fn scale_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value * 255.0).trunc().clamp(0.0, 255.0) as u8
}

/// Parses `#RRGGBB` or `RRGGBB`.
pub fn parse_hex(text: &str) -> Result<ColorSample, ColorParseError> {
    let malformed = || ColorParseError::Malformed(text.to_string());
    let digits = text.strip_prefix('#').unwrap_or(text);

    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(malformed());
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| malformed())
    };
    Ok(ColorSample::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Parses the ImageMagick pixel notation: `srgb(r,g,b)`, `rgb(r,g,b)` or a
/// bare `r,g,b`.
pub fn parse_rgb_function(text: &str) -> Result<ColorSample, ColorParseError> {
    let malformed = || ColorParseError::Malformed(text.to_string());
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix("srgb(")
        .or_else(|| trimmed.strip_prefix("rgb("))
        .unwrap_or(trimmed);
    let inner = inner.strip_suffix(')').unwrap_or(inner);

    let channels = inner
        .split(',')
        .map(|part| parse_channel(part.trim()).ok_or_else(malformed))
        .collect::<Result<Vec<u8>, _>>()?;

    match channels.as_slice() {
        [r, g, b] => Ok(ColorSample::new(*r, *g, *b)),
        _ => Err(malformed()),
    }
}

fn parse_channel(token: &str) -> Option<u8> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse::<u8>().ok()
}
