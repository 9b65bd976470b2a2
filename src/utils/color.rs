//! Color parsing and conversion utilities
//!
//! Colors travel through the public API as `#RRGGBB` strings and are
//! converted to an RGB triple before any pixel math happens.

use crate::error::{RecolorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An RGB color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Create a color from its channels
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` (or bare `RRGGBB`) hex string
    ///
    /// # Examples
    /// ```rust
    /// use recolorize::Color;
    ///
    /// let red = Color::from_hex("#FF0000")?;
    /// assert_eq!(red, Color::new(255, 0, 0));
    /// let teal = Color::from_hex("008080")?;
    /// assert_eq!(teal.g, 128);
    /// # Ok::<(), recolorize::RecolorError>(())
    /// ```
    ///
    /// # Errors
    /// - `InvalidColor` when the string is not exactly six hex digits
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().strip_prefix('#').unwrap_or(hex.trim());

        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(RecolorError::invalid_color(format!(
                "'{hex}' is not a #RRGGBB hex color"
            )));
        }

        let channel = |range: std::ops::Range<usize>, name: &str| {
            digits
                .get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| {
                    RecolorError::invalid_color(format!("Invalid {name} component in '{hex}'"))
                })
        };

        Ok(Self {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    /// Format as a lowercase `#rrggbb` string
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Build a color from HSV components, each in `[0, 1]`
    ///
    /// Channels are truncated toward zero after scaling by 255, so
    /// `from_hsv(0.0, 1.0, 1.0)` is pure red.
    #[must_use]
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let (r, g, b) = hsv_to_rgb(h, s.clamp(0.0, 1.0), v.clamp(0.0, 1.0));
        let to_u8 = |x: f32| (x * 255.0).clamp(0.0, 255.0) as u8;
        Self::new(to_u8(r), to_u8(g), to_u8(b))
    }

    /// HSV components of this color, each in `[0, 1]`
    #[must_use]
    pub fn to_hsv(&self) -> (f32, f32, f32) {
        rgb_to_hsv(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }

    /// Channels as floats in `[0, 255]`
    #[must_use]
    pub fn channels_f32(&self) -> [f32; 3] {
        [f32::from(self.r), f32::from(self.g), f32::from(self.b)]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = RecolorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<[u8; 3]> for Color {
    fn from(rgb: [u8; 3]) -> Self {
        Self::new(rgb[0], rgb[1], rgb[2])
    }
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (v, v, v);
    }
    let h = h.rem_euclid(1.0);
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    match sector as u8 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let v = max;
    if (max - min).abs() < f32::EPSILON {
        return (0.0, 0.0, v);
    }
    let delta = max - min;
    let s = delta / max;
    let rc = (max - r) / delta;
    let gc = (max - g) / delta;
    let bc = (max - b) / delta;

    let h = if (r - max).abs() < f32::EPSILON {
        bc - gc
    } else if (g - max).abs() < f32::EPSILON {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };

    ((h / 6.0).rem_euclid(1.0), s, v)
}
