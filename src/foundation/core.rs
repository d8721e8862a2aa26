use crate::foundation::error::{PaticError, PaticResult};
use crate::foundation::math::mul_div255_u8;

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// 0-based time index into a phase field.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub usize);

/// Frames per second used by animation export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator, always `> 0`.
    pub den: u32,
}

impl Fps {
    /// Create a validated frame rate.
    pub fn new(num: u32, den: u32) -> PaticResult<Self> {
        if den == 0 {
            return Err(PaticError::range("fps denominator must be > 0"));
        }
        if num == 0 {
            return Err(PaticError::range("fps numerator must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as a float.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of a single frame in milliseconds, rounded to the nearest integer.
    pub fn frame_duration_ms(self) -> u32 {
        ((f64::from(self.den) * 1000.0) / f64::from(self.num)).round() as u32
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self { num: 10, den: 1 }
    }
}

/// Output raster dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Canvas for a figure of `w_in`×`h_in` inches at `dpi`, with both sides rounded to even
    /// pixel counts (yuv420p encoders require it).
    pub fn from_inches(w_in: f64, h_in: f64, dpi: f64) -> Self {
        fn even(v: f64) -> u32 {
            let px = v.round().max(2.0) as u32;
            px + (px % 2)
        }
        Self {
            width: even(w_in * dpi),
            height: even(h_in * dpi),
        }
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Opaque color from RGB channels.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with its alpha replaced by `alpha` (clamped to `[0,1]`).
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Convert to premultiplied alpha.
    pub fn premultiplied(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red, premultiplied.
    pub r: u8,
    /// Green, premultiplied.
    pub g: u8,
    /// Blue, premultiplied.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Premultiply straight RGBA8 channels.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        let premul = |c: u8, a: u8| mul_div255_u8(u16::from(c), u16::from(a));
        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
