//! Spatial and colour types

use crate::error::{GlintError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

/// A 2D vector in CSS pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: &Self) -> f32 {
        (*self - *other).length()
    }

    /// Move `self` a fraction `k` of the way toward `target`
    pub fn approach(&self, target: Self, k: f32) -> Self {
        *self + (target - *self) * k
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// RGBA colour with channels in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    /// The alarm red used by glitch flashes
    pub const GLITCH_RED: Self = Self::new(1.0, 0.0, 60.0 / 255.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Parse `rgb(...)`, `rgba(...)` or `#rrggbb` notation.
    ///
    /// `has_alpha` on the returned tuple tells whether the text carried an
    /// explicit alpha channel; callers pick their own opacity otherwise.
    pub fn parse_css(text: &str) -> Result<(Self, bool)> {
        let s = text.trim();
        if let Some(hex) = s.strip_prefix('#') {
            let value = u32::from_str_radix(hex, 16)
                .map_err(|_| GlintError::ColorParseError(text.to_string()))?;
            if hex.len() != 6 {
                return Err(GlintError::ColorParseError(text.to_string()));
            }
            return Ok((Self::from_hex(value), false));
        }

        let inner = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| GlintError::ColorParseError(text.to_string()))?;

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(GlintError::ColorParseError(text.to_string()));
        }

        let mut channels = [0.0f32; 3];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            let v: f32 = part
                .parse()
                .map_err(|_| GlintError::ColorParseError(text.to_string()))?;
            *slot = (v / 255.0).clamp(0.0, 1.0);
        }

        let (alpha, has_alpha) = match parts.get(3) {
            Some(a) => {
                let v: f32 = a
                    .parse()
                    .map_err(|_| GlintError::ColorParseError(text.to_string()))?;
                (v.clamp(0.0, 1.0), true)
            }
            None => (1.0, false),
        };

        Ok((
            Self::new(channels[0], channels[1], channels[2], alpha),
            has_alpha,
        ))
    }

    pub fn with_alpha(mut self, a: f32) -> Self {
        self.a = a;
        self
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {})",
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            self.a
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 6.0);
        assert_eq!(a + b, Vec2::new(5.0, 8.0));
        assert_eq!(b - a, Vec2::new(3.0, 4.0));
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn approach_moves_fraction_of_gap() {
        let p = Vec2::ZERO.approach(Vec2::new(100.0, -50.0), 0.1);
        assert!((p.x - 10.0).abs() < 1e-5);
        assert!((p.y + 5.0).abs() < 1e-5);
    }

    #[test]
    fn parse_rgba_reads_alpha() {
        let (c, has_alpha) = Rgba::parse_css("rgba(255, 255, 255, 0.7)").unwrap();
        assert!(has_alpha);
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.a - 0.7).abs() < 1e-6);
    }

    #[test]
    fn parse_rgb_has_no_alpha() {
        let (c, has_alpha) = Rgba::parse_css("rgb(141,141,141)").unwrap();
        assert!(!has_alpha);
        assert!((c.g - 141.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn parse_hex() {
        let (c, _) = Rgba::parse_css("#ff003c").unwrap();
        assert_eq!(c, Rgba::GLITCH_RED);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Rgba::parse_css("hsl(0, 0%, 0%)").is_err());
        assert!(Rgba::parse_css("rgba(1, 2)").is_err());
        assert!(Rgba::parse_css("#fff").is_err());
    }

    #[test]
    fn display_is_css() {
        let c = Rgba::new(1.0, 0.0, 0.0, 0.5);
        assert_eq!(c.to_string(), "rgba(255, 0, 0, 0.5)");
    }
}
