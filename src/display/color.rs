/*
 *  display/color.rs
 *
 *  HeatMap - sweep waterfall
 *  (c) 2020-26 Stuart Hunter
 *
 *  RGBA colors, HSL conversion and hex parsing
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Channel spread below which a color is treated as gray.
///
/// Anti-aliased near-gray input would otherwise produce wild hue swings.
const ACHROMATIC_EPS: f64 = 1e-4;

/// Error raised when a `#RRGGBB` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("hex color {input:?} must have 6 hex digits, found {found}")]
    InvalidLength { input: String, found: usize },
    #[error("hex color {input:?} has a non-hex character {ch:?}")]
    InvalidDigit { input: String, ch: char },
}

/// 8-bit RGBA color value (straight alpha).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Hue, saturation, lightness; every component in `[0, 1]` (hue excludes 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` (the `#` is optional, digits are case-insensitive).
    ///
    /// Alpha is always 255; an eight digit form is rejected.
    pub fn from_hex(input: &str) -> Result<Self, ColorError> {
        let digits = input.trim().strip_prefix('#').unwrap_or(input.trim());
        let found = digits.chars().count();
        if found != 6 {
            return Err(ColorError::InvalidLength { input: input.to_string(), found });
        }
        if let Some(ch) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit { input: input.to_string(), ch });
        }
        // all six chars are ascii hex digits, so byte slicing is safe
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);
        match (channel(0), channel(2), channel(4)) {
            (Ok(r), Ok(g), Ok(b)) => Ok(Self::rgb(r, g, b)),
            _ => Err(ColorError::InvalidLength { input: input.to_string(), found }),
        }
    }

    /// Upper-case `#RRGGBB`; alpha is not encoded.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_hsl(&self) -> Hsl {
        rgb_to_hsl(*self)
    }

    /// Pixel bytes in B,G,R,A order with premultiplied alpha.
    #[inline]
    pub fn to_bgra_premultiplied(&self) -> [u8; 4] {
        if self.a == 255 {
            return [self.b, self.g, self.r, 255];
        }
        let mul = |c: u8| ((c as u16 * self.a as u16 + 127) / 255) as u8;
        [mul(self.b), mul(self.g), mul(self.r), self.a]
    }
}

impl Hsl {
    pub fn to_color(&self) -> Color {
        hsl_to_color(self.h, self.s, self.l, 255)
    }

    /// Component-wise linear interpolation, `t` in `[0, 1]`.
    pub fn lerp(&self, other: &Hsl, t: f64) -> Hsl {
        Hsl {
            h: self.h + (other.h - self.h) * t,
            s: self.s + (other.s - self.s) * t,
            l: self.l + (other.l - self.l) * t,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Convert an RGB color to HSL, alpha is ignored.
pub fn rgb_to_hsl(color: Color) -> Hsl {
    let r = color.r as f64 / 255.0;
    let g = color.g as f64 / 255.0;
    let b = color.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < ACHROMATIC_EPS {
        return Hsl { h: 0.0, s: 0.0, l };
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl { h: h / 6.0, s, l }
}

/// Convert HSL back to RGB.
///
/// Channels are truncated (not rounded) to 8 bits, so a round trip through
/// [`rgb_to_hsl`] may land one below the original channel value.
pub fn hsl_to_color(h: f64, s: f64, l: f64, alpha: u8) -> Color {
    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };
    Color::rgba((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, alpha)
}

/// One channel of the HSL to RGB conversion.
pub fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let mut t = t;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 0.001;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < TOLERANCE, "{actual} != {expected}");
    }

    #[test]
    fn test_rgb_to_hsl_red() {
        let hsl = rgb_to_hsl(Color::RED);
        assert_close(hsl.h, 0.0);
        assert_close(hsl.s, 1.0);
        assert_close(hsl.l, 0.5);
    }

    #[test]
    fn test_rgb_to_hsl_gray() {
        let hsl = rgb_to_hsl(Color::GRAY);
        assert_eq!(hsl.h, 0.0);
        assert_eq!(hsl.s, 0.0);
        assert_close(hsl.l, 0.502);
    }

    #[test]
    fn test_rgb_to_hsl_ranges() {
        for r in (0..=255u16).step_by(15) {
            for g in (0..=255u16).step_by(15) {
                for b in (0..=255u16).step_by(15) {
                    let hsl = rgb_to_hsl(Color::rgb(r as u8, g as u8, b as u8));
                    assert!((0.0..1.0).contains(&hsl.h), "h={} for {r},{g},{b}", hsl.h);
                    assert!((0.0..=1.0).contains(&hsl.s));
                    assert!((0.0..=1.0).contains(&hsl.l));
                }
            }
        }
    }

    #[test]
    fn test_hsl_to_color_red() {
        assert_eq!(hsl_to_color(0.0, 1.0, 0.5, 255), Color::RED);
    }

    #[test]
    fn test_hsl_to_color_keeps_alpha() {
        assert_eq!(hsl_to_color(0.0, 0.0, 1.0, 40), Color::rgba(255, 255, 255, 40));
    }

    #[test]
    fn test_round_trip_within_one() {
        for r in (0..=255u16).step_by(5) {
            for g in (0..=255u16).step_by(5) {
                for b in (0..=255u16).step_by(5) {
                    let original = Color::rgb(r as u8, g as u8, b as u8);
                    let back = original.to_hsl().to_color();
                    assert!(back.r.abs_diff(original.r) <= 1, "red {original:?} -> {back:?}");
                    assert!(back.g.abs_diff(original.g) <= 1, "green {original:?} -> {back:?}");
                    assert!(back.b.abs_diff(original.b) <= 1, "blue {original:?} -> {back:?}");
                }
            }
        }
    }

    #[test]
    fn test_round_trip_named_colors() {
        let named = [
            Color::RED,
            Color::GREEN,
            Color::BLUE,
            Color::rgb(255, 255, 0),
            Color::rgb(0, 255, 255),
            Color::GRAY,
            Color::BLACK,
            Color::WHITE,
            Color::rgb(123, 45, 200),
        ];
        for original in named {
            let back = original.to_hsl().to_color();
            assert!(back.r.abs_diff(original.r) <= 1);
            assert!(back.g.abs_diff(original.g) <= 1);
            assert!(back.b.abs_diff(original.b) <= 1);
        }
    }

    #[test]
    fn test_hue_to_rgb_first_segment() {
        assert_close(hue_to_rgb(0.25, 0.75, 1.0 / 12.0), 0.5);
    }

    #[test]
    fn test_hue_to_rgb_third_segment() {
        assert_close(hue_to_rgb(0.25, 0.75, 0.6), 0.45);
    }

    #[test]
    fn test_hue_to_rgb_wraps() {
        assert_close(hue_to_rgb(0.25, 0.75, -0.25), hue_to_rgb(0.25, 0.75, 0.75));
        assert_close(hue_to_rgb(0.25, 0.75, 1.25), hue_to_rgb(0.25, 0.75, 0.25));
        assert_close(hue_to_rgb(0.25, 0.75, 0.9), 0.25);
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#FF0000").unwrap(), Color::RED);
        assert_eq!(Color::from_hex("#00ff7f").unwrap(), Color::rgb(0, 255, 127));
        assert_eq!(Color::from_hex("0000Ff").unwrap(), Color::BLUE);
        assert_eq!("#808080".parse::<Color>().unwrap(), Color::GRAY);
    }

    #[test]
    fn test_from_hex_rejects_malformed() {
        assert!(matches!(Color::from_hex("#FFF"), Err(ColorError::InvalidLength { found: 3, .. })));
        assert!(matches!(Color::from_hex("#FF0000FF"), Err(ColorError::InvalidLength { found: 8, .. })));
        assert!(matches!(Color::from_hex(""), Err(ColorError::InvalidLength { found: 0, .. })));
        assert!(matches!(Color::from_hex("#GG0000"), Err(ColorError::InvalidDigit { ch: 'G', .. })));
        assert!(matches!(Color::from_hex("#12345é"), Err(ColorError::InvalidDigit { ch: 'é', .. })));
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::rgb(0, 171, 255).to_hex(), "#00ABFF");
        assert_eq!(Color::rgb(1, 2, 3).to_string(), "#010203");
    }

    #[test]
    fn test_bgra_premultiplied() {
        assert_eq!(Color::rgb(10, 20, 30).to_bgra_premultiplied(), [30, 20, 10, 255]);
        assert_eq!(Color::rgba(255, 0, 100, 0).to_bgra_premultiplied(), [0, 0, 0, 0]);
        assert_eq!(Color::rgba(255, 255, 255, 128).to_bgra_premultiplied(), [128, 128, 128, 128]);
    }

    #[test]
    fn test_serde_hex_string() {
        let c: Color = serde_yaml::from_str("\"#FFA500\"").unwrap();
        assert_eq!(c, Color::rgb(255, 165, 0));
        assert!(serde_yaml::from_str::<Color>("\"orange\"").is_err());
        let yaml = serde_yaml::to_string(&c).unwrap();
        assert_eq!(serde_yaml::from_str::<Color>(&yaml).unwrap(), c);
    }
}
