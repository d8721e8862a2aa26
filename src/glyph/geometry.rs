//! Orientation-to-glyph geometry.
//!
//! All outlines live in a y-up unit frame centered on the lattice site with radius 1; the
//! rasterizer scales them by the configured glyph size. Every outline produced for an
//! orientation `θ` is rotated by `θ − 90°`, so the tick always points along `θ` and the first
//! vertex of the polygon and asterisk coincides with it.

use crate::foundation::core::{Affine, BezPath, Point, Vec2};
use crate::foundation::error::{PaticError, PaticResult};

/// Rendering pipeline selected once from the glyph degree `p`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum GlyphKind {
    /// `p = 1`: a unit direction vector drawn as an arrow.
    Director,
    /// `p = 2`: a nematic line; the polygon degenerates to a segment.
    Line,
    /// `p ≥ 3`: a regular `sides`-gon with a matching asterisk.
    Polygon {
        /// Number of sides (`p`).
        sides: u32,
    },
}

impl GlyphKind {
    /// Select the pipeline for degree `p`. Fails for `p = 0`.
    pub fn for_degree(p: u32) -> PaticResult<Self> {
        match p {
            0 => Err(PaticError::shape(
                "p must be a positive integer (greater than or equal to 1)",
            )),
            1 => Ok(Self::Director),
            2 => Ok(Self::Line),
            sides => Ok(Self::Polygon { sides }),
        }
    }

    /// The glyph degree `p`.
    pub fn degree(self) -> u32 {
        match self {
            Self::Director => 1,
            Self::Line => 2,
            Self::Polygon { sides } => sides,
        }
    }

    /// Glyph for orientation `theta_deg` (degrees).
    pub fn shape(self, theta_deg: f64) -> GlyphShape {
        match self {
            Self::Director => GlyphShape::Director(director(theta_deg)),
            Self::Line | Self::Polygon { .. } => {
                let t = orientation_transform(theta_deg);
                let p = self.degree();
                GlyphShape::Outlines(GlyphOutlines {
                    patch: t * unit_regular_polygon(p),
                    point: t * unit_regular_asterisk(p),
                    tick: t * unit_regular_asterisk(1),
                })
            }
        }
    }
}

/// Geometry produced for one lattice site.
#[derive(Clone, Debug, PartialEq)]
pub enum GlyphShape {
    /// Unit direction `(cos θ, sin θ)`.
    Director(Vec2),
    /// The three candidate outlines.
    Outlines(GlyphOutlines),
}

/// Patch, point and tick outlines for one site, already rotated.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphOutlines {
    /// Closed regular polygon (filled).
    pub patch: BezPath,
    /// Regular asterisk (stroked).
    pub point: BezPath,
    /// Single dash marking the zero orientation (stroked).
    pub tick: BezPath,
}

/// Rotation shared by every outline at orientation `theta_deg`.
pub fn orientation_transform(theta_deg: f64) -> Affine {
    Affine::rotate((theta_deg - 90.0).to_radians())
}

/// Unit vector for orientation `theta_deg`.
pub fn director(theta_deg: f64) -> Vec2 {
    let (s, c) = theta_deg.to_radians().sin_cos();
    Vec2::new(c, s)
}

/// Closed regular `n`-gon on the unit circle, first vertex pointing up.
pub fn unit_regular_polygon(n: u32) -> BezPath {
    let step = std::f64::consts::TAU / f64::from(n.max(1));
    let mut path = BezPath::new();
    for i in 0..=n {
        let p = unit_point(step * f64::from(i));
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

/// Closed `n`-pointed asterisk: alternates unit-circle tips with the center.
///
/// `n = 1` is a single dash from the center to the top.
pub fn unit_regular_asterisk(n: u32) -> BezPath {
    let n2 = 2 * n.max(1);
    let step = std::f64::consts::TAU / f64::from(n2);
    let mut path = BezPath::new();
    for i in 0..=n2 {
        let p = if i % 2 == 0 {
            unit_point(step * f64::from(i))
        } else {
            Point::ORIGIN
        };
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

fn unit_point(angle_from_up: f64) -> Point {
    let a = angle_from_up + std::f64::consts::FRAC_PI_2;
    Point::new(a.cos(), a.sin())
}

#[cfg(test)]
#[path = "../../tests/unit/glyph/geometry.rs"]
mod tests;
