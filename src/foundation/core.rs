use std::{fmt, str::FromStr};

use crate::foundation::error::{ConvertError, ConvertResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Target output resolution in whole pixels, as given by `-r WxH`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels, always `> 0`.
    pub width: u32,
    /// Height in pixels, always `> 0`.
    pub height: u32,
}

impl Resolution {
    /// Create a validated resolution; both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> ConvertResult<Self> {
        if width == 0 || height == 0 {
            return Err(ConvertError::config(format!(
                "resolution must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
        }
    }
}

impl FromStr for Resolution {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s.split_once('x').ok_or_else(|| {
            ConvertError::config(format!("expected WxH (for example 240x240), got '{s}'"))
        })?;
        let parse = |part: &str| {
            part.trim().parse::<u32>().map_err(|_| {
                ConvertError::config(format!("invalid dimension '{part}' in resolution '{s}'"))
            })
        };
        Self::new(parse(w)?, parse(h)?)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Opaque sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `RRGGBB` (an optional leading `#` is accepted).
    pub fn from_hex(s: &str) -> ConvertResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConvertError::config(format!(
                "expected six hex digits RRGGBB, got '{s}'"
            )));
        }
        let v = u32::from_str_radix(hex, 16)
            .map_err(|e| ConvertError::config(format!("invalid color '{s}': {e}")))?;
        Ok(Self {
            r: ((v >> 16) & 0xff) as u8,
            g: ((v >> 8) & 0xff) as u8,
            b: (v & 0xff) as u8,
        })
    }
}

impl FromStr for Rgb8 {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Floating-point size of an animation canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Uniform scale that fits this size inside `target` while preserving aspect ratio.
    pub fn fit_scale(self, target: Resolution) -> f64 {
        let sx = f64::from(target.width) / self.width;
        let sy = f64::from(target.height) / self.height;
        sx.min(sy)
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Whole-pixel canvas covering this size (at least 1x1).
    pub fn to_pixels(self) -> (u32, u32) {
        fn px(v: f64) -> u32 {
            v.round().clamp(1.0, f64::from(u32::MAX)) as u32
        }
        (px(self.width), px(self.height))
    }

    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
