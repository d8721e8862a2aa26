use std::str::FromStr;

use crate::foundation::error::{PaticError, PaticResult};
use crate::foundation::math::{finite_min_max, linspace};

/// A coordinate specification for one axis.
///
/// Deserializes from either a two-element JSON array (`[min, max]`) or an object
/// `{ "shape": [...], "data": [...] }` holding a 1D or 2D coordinate array.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum CoordSpec {
    /// `[min, max]` limits of a uniform mesh. Must hold exactly two values.
    Limits(Vec<f64>),
    /// Row-major coordinate array of at most two dimensions.
    Array {
        /// Array shape (`[n]` or `[rows, cols]`).
        shape: Vec<usize>,
        /// Flattened values.
        data: Vec<f64>,
    },
}

impl CoordSpec {
    /// Limits of a uniform mesh.
    pub fn limits(min: f64, max: f64) -> Self {
        Self::Limits(vec![min, max])
    }

    /// One-dimensional coordinate samples; only their extremes are used.
    pub fn array_1d(data: Vec<f64>) -> Self {
        Self::Array {
            shape: vec![data.len()],
            data,
        }
    }

    /// Two-dimensional `(rows, cols)` coordinate array.
    pub fn array_2d(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        Self::Array {
            shape: vec![rows, cols],
            data,
        }
    }

    /// Validate against the current field extents and extract `(min, max)`.
    ///
    /// `dims` is the `(ny, nx)` of the current field, if one exists.
    pub(crate) fn validate(&self, dims: Option<(usize, usize)>) -> PaticResult<(f64, f64)> {
        let (lo, hi) = match self {
            Self::Limits(v) => {
                if v.len() != 2 {
                    return Err(PaticError::shape(format!(
                        "coordinate limits must be given as two numbers, got {}",
                        v.len()
                    )));
                }
                if !v[0].is_finite() || !v[1].is_finite() {
                    return Err(PaticError::shape("coordinate limits must be finite numbers"));
                }
                (v[0], v[1])
            }
            Self::Array { shape, data } => {
                if shape.is_empty() || shape.len() > 2 {
                    return Err(PaticError::shape(format!(
                        "coordinate array must be one- or two-dimensional, got {} dimension(s)",
                        shape.len()
                    )));
                }
                if shape.iter().product::<usize>() != data.len() || data.is_empty() {
                    return Err(PaticError::shape(format!(
                        "coordinate array shape {shape:?} does not match {} value(s)",
                        data.len()
                    )));
                }
                if let (2, Some((ny, nx))) = (shape.len(), dims)
                    && (shape[0], shape[1]) != (ny, nx)
                {
                    return Err(PaticError::shape(format!(
                        "coordinate grid must have shape (ny,nx) = ({ny},{nx}), got ({},{})",
                        shape[0], shape[1]
                    )));
                }
                finite_min_max(data.iter().copied()).ok_or_else(|| {
                    PaticError::shape("coordinate array contains no finite values")
                })?
            }
        };
        if hi <= lo {
            return Err(PaticError::range(format!(
                "upper coordinate limit must be greater than the lower limit, got [{lo}, {hi}]"
            )));
        }
        Ok((lo, hi))
    }

    /// The raw values when this spec is a 2D array of exactly `(ny, nx)`.
    fn prebuilt_mesh(&self, ny: usize, nx: usize) -> Option<&[f64]> {
        match self {
            Self::Array { shape, data } if shape.as_slice() == [ny, nx] => Some(data),
            _ => None,
        }
    }
}

/// Which coordinate axis an operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// x only.
    X,
    /// y only.
    Y,
    /// Both axes at once.
    Both,
}

impl Axis {
    const NAMES: [&'static str; 3] = ["x", "y", "both"];
}

impl FromStr for Axis {
    type Err = PaticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            "both" => Ok(Self::Both),
            _ => Err(PaticError::domain("axis", s, &Self::NAMES)),
        }
    }
}

/// Closed coordinate interval of one axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Limits {
    /// Lower bound.
    pub min: f64,
    /// Upper bound, strictly greater than `min`.
    pub max: f64,
}

/// Fully materialized coordinate mesh: two `(ny, nx)` arrays plus their limits.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateGrid<'a> {
    /// Row count.
    pub ny: usize,
    /// Column count.
    pub nx: usize,
    /// Row-major x coordinates.
    pub x: &'a [f64],
    /// Row-major y coordinates.
    pub y: &'a [f64],
    /// x limits.
    pub x_limits: Limits,
    /// y limits.
    pub y_limits: Limits,
}

impl CoordinateGrid<'_> {
    /// Coordinates of lattice site `(row, col)`.
    pub fn site(&self, row: usize, col: usize) -> (f64, f64) {
        let i = row * self.nx + col;
        (self.x[i], self.y[i])
    }
}

/// Grid lifecycle: limits may exist before a field, meshes only once extents are known.
#[derive(Clone, Debug, Default)]
pub struct GridState {
    x_limits: Option<Limits>,
    y_limits: Option<Limits>,
    x: Option<Vec<f64>>,
    y: Option<Vec<f64>>,
    dims: Option<(usize, usize)>,
}

impl GridState {
    /// Build the initial grid from optional x/y specs.
    ///
    /// When only one spec is given its limits are used for both axes. With `dims` present and no
    /// spec at all, the unit square is used.
    pub fn from_specs(
        x: Option<&CoordSpec>,
        y: Option<&CoordSpec>,
        dims: Option<(usize, usize)>,
    ) -> PaticResult<Self> {
        let mut grid = Self {
            dims,
            ..Self::default()
        };
        match (x, y) {
            (None, None) => {
                if let Some((ny, nx)) = dims {
                    grid.rebuild(ny, nx);
                }
            }
            (Some(c), None) | (None, Some(c)) => grid.set(c, Axis::Both)?,
            (Some(cx), Some(cy)) => {
                cx.validate(dims)?;
                cy.validate(dims)?;
                grid.set(cx, Axis::X)?;
                grid.set(cy, Axis::Y)?;
            }
        }
        Ok(grid)
    }

    /// Apply a coordinate spec to `axis`.
    ///
    /// Without known extents only the limits are retained. A 2D array matching `(ny, nx)` given
    /// for a single axis becomes that axis' mesh verbatim; every other spec yields a uniform mesh.
    pub fn set(&mut self, spec: &CoordSpec, axis: Axis) -> PaticResult<()> {
        let (min, max) = spec.validate(self.dims)?;
        let limits = Limits { min, max };
        match axis {
            Axis::X => self.x_limits = Some(limits),
            Axis::Y => self.y_limits = Some(limits),
            Axis::Both => {
                self.x_limits = Some(limits);
                self.y_limits = Some(limits);
            }
        }

        let Some((ny, nx)) = self.dims else {
            return Ok(());
        };
        let prebuilt = spec.prebuilt_mesh(ny, nx).map(<[f64]>::to_vec);
        match axis {
            Axis::X => self.x = Some(prebuilt.unwrap_or_else(|| uniform_x(limits, ny, nx))),
            Axis::Y => self.y = Some(prebuilt.unwrap_or_else(|| uniform_y(limits, ny, nx))),
            Axis::Both => {
                self.x = Some(uniform_x(limits, ny, nx));
                self.y = Some(uniform_y(limits, ny, nx));
            }
        }
        Ok(())
    }

    /// Adopt new field extents, regenerating every mesh from the stored limits.
    ///
    /// With no limits at all the unit square `[0,1]×[0,1]` is used.
    pub fn rebuild(&mut self, ny: usize, nx: usize) {
        if self.x_limits.is_none() && self.y_limits.is_none() {
            let unit = Limits { min: 0.0, max: 1.0 };
            self.x_limits = Some(unit);
            self.y_limits = Some(unit);
        }
        self.dims = Some((ny, nx));
        self.x = self.x_limits.map(|l| uniform_x(l, ny, nx));
        self.y = self.y_limits.map(|l| uniform_y(l, ny, nx));
        tracing::debug!(
            ny,
            nx,
            x = self.x.is_some(),
            y = self.y.is_some(),
            "coordinate mesh rebuilt"
        );
    }

    /// `(ny, nx)` once a field has been seen.
    pub fn dims(&self) -> Option<(usize, usize)> {
        self.dims
    }

    /// Stored x limits.
    pub fn x_limits(&self) -> Option<Limits> {
        self.x_limits
    }

    /// Stored y limits.
    pub fn y_limits(&self) -> Option<Limits> {
        self.y_limits
    }

    /// `true` when the x mesh exists.
    pub fn has_x(&self) -> bool {
        self.x.is_some()
    }

    /// `true` when the y mesh exists.
    pub fn has_y(&self) -> bool {
        self.y.is_some()
    }

    /// The complete mesh, or `None` while either axis is undefined.
    pub fn grid(&self) -> Option<CoordinateGrid<'_>> {
        let (ny, nx) = self.dims?;
        Some(CoordinateGrid {
            ny,
            nx,
            x: self.x.as_deref()?,
            y: self.y.as_deref()?,
            x_limits: self.x_limits?,
            y_limits: self.y_limits?,
        })
    }
}

fn uniform_x(l: Limits, ny: usize, nx: usize) -> Vec<f64> {
    let row = linspace(l.min, l.max, nx);
    let mut out = Vec::with_capacity(ny * nx);
    for _ in 0..ny {
        out.extend_from_slice(&row);
    }
    out
}

fn uniform_y(l: Limits, ny: usize, nx: usize) -> Vec<f64> {
    let col = linspace(l.min, l.max, ny);
    let mut out = Vec::with_capacity(ny * nx);
    for v in col {
        out.extend(std::iter::repeat_n(v, nx));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/grid/builder.rs"]
mod tests;
