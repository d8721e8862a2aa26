//! Glyph size and stroke auto-derivation from lattice extents and density.

use crate::config::model::MarkerDensity;

/// Sizes picked by the bucket table for one configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoSize {
    /// Shared glyph area (points²).
    pub size: f64,
    /// Point and tick stroke width, set only for `p < 3`.
    pub linewidth: Option<f64>,
}

/// Glyph count along the longer axis, floored at 10.
pub fn glyph_count(dims: (usize, usize), density: MarkerDensity) -> usize {
    let (ny, nx) = dims;
    let nmax = nx.max(ny);
    let d = if nx >= ny { density.x } else { density.y };
    ((d * nmax as f64).floor() as usize).max(10)
}

/// Piecewise-constant size table keyed on [`glyph_count`].
pub fn auto_size(p: u32, dims: (usize, usize), density: MarkerDensity) -> AutoSize {
    let n = glyph_count(dims, density);
    // (upper bound, size p≥3, size p<3, linewidth p<3)
    const TABLE: [(usize, f64, f64, f64); 4] = [
        (20, 140.0, 140.0, 1.75),
        (30, 100.0, 140.0, 1.0),
        (40, 60.0, 60.0, 0.85),
        (50, 30.0, 45.0, 0.85),
    ];
    let (_, polygon, small, lw) = TABLE
        .iter()
        .copied()
        .find(|(upper, ..)| n < *upper)
        .unwrap_or((usize::MAX, 20.0, 30.0, 0.85));
    if p >= 3 {
        AutoSize {
            size: polygon,
            linewidth: None,
        }
    } else {
        AutoSize {
            size: small,
            linewidth: Some(lw),
        }
    }
}

/// Subsampling step along an axis of `extent` sites.
pub fn stride(extent: usize, density: f64) -> usize {
    let count = ((density * extent as f64).floor() as usize).max(1);
    (extent / count).max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/config/sizing.rs"]
mod tests;
