use num_complex::Complex64;

use crate::foundation::error::{PaticError, PaticResult};

/// Dense row-major `(nt, ny, nx)` array.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldArray<T> {
    shape: [usize; 3],
    data: Vec<T>,
}

impl<T: Copy> FieldArray<T> {
    /// Build an array from a shape slice and its flattened data.
    ///
    /// Fails unless `shape` has exactly three non-zero extents whose product equals `data.len()`.
    pub fn from_shape_vec(shape: &[usize], data: Vec<T>) -> PaticResult<Self> {
        let [nt, ny, nx] = <[usize; 3]>::try_from(shape).map_err(|_| {
            PaticError::shape(format!(
                "field must be a three-dimensional array with shape (nt,ny,nx), got {} dimension(s)",
                shape.len()
            ))
        })?;
        if nt == 0 || ny == 0 || nx == 0 {
            return Err(PaticError::shape(format!(
                "field extents must be non-zero, got ({nt},{ny},{nx})"
            )));
        }
        let expected = nt
            .checked_mul(ny)
            .and_then(|v| v.checked_mul(nx))
            .ok_or_else(|| PaticError::shape("field shape overflows usize"))?;
        if expected != data.len() {
            return Err(PaticError::shape(format!(
                "field data has {} element(s), shape ({nt},{ny},{nx}) needs {expected}",
                data.len()
            )));
        }
        Ok(Self {
            shape: [nt, ny, nx],
            data,
        })
    }

    /// `(nt, ny, nx)`.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Number of time steps.
    pub fn nt(&self) -> usize {
        self.shape[0]
    }

    /// Number of rows.
    pub fn ny(&self) -> usize {
        self.shape[1]
    }

    /// Number of columns.
    pub fn nx(&self) -> usize {
        self.shape[2]
    }

    /// All values, time-major.
    pub fn values(&self) -> &[T] {
        &self.data
    }

    /// The `ny*nx` slice for time step `t`.
    ///
    /// Panics if `t >= nt`; callers clamp frame indices first.
    pub fn frame(&self, t: usize) -> &[T] {
        let plane = self.shape[1] * self.shape[2];
        &self.data[t * plane..(t + 1) * plane]
    }

    /// Apply `f` element-wise, keeping the shape.
    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> FieldArray<U> {
        FieldArray {
            shape: self.shape,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}

/// Time-indexed phase field, real or complex valued.
///
/// Real values are orientations in degrees; complex values carry the p-atic phase in their
/// argument and the order magnitude in their modulus.
#[derive(Clone, Debug, PartialEq)]
pub enum PhaseField {
    /// Real-valued field.
    Real(FieldArray<f64>),
    /// Complex-valued field.
    Complex(FieldArray<Complex64>),
}

impl PhaseField {
    /// Real field from a `(nt, ny, nx)` shape and flattened data.
    pub fn real(shape: &[usize], data: Vec<f64>) -> PaticResult<Self> {
        FieldArray::from_shape_vec(shape, data).map(Self::Real)
    }

    /// Complex field from a `(nt, ny, nx)` shape and flattened data.
    pub fn complex(shape: &[usize], data: Vec<Complex64>) -> PaticResult<Self> {
        FieldArray::from_shape_vec(shape, data).map(Self::Complex)
    }

    /// `(nt, ny, nx)`.
    pub fn shape(&self) -> [usize; 3] {
        match self {
            Self::Real(a) => a.shape(),
            Self::Complex(a) => a.shape(),
        }
    }

    /// Number of time steps (frames).
    pub fn nt(&self) -> usize {
        self.shape()[0]
    }

    /// Number of rows.
    pub fn ny(&self) -> usize {
        self.shape()[1]
    }

    /// Number of columns.
    pub fn nx(&self) -> usize {
        self.shape()[2]
    }

    /// `true` for complex-valued fields.
    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Complex(_))
    }
}

/// JSON document describing a field: a shape plus flattened real and optional imaginary parts.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FieldDocument {
    /// `[nt, ny, nx]`.
    pub shape: Vec<usize>,
    /// Real parts, row-major.
    pub re: Vec<f64>,
    /// Imaginary parts, row-major. Presence selects the complex pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub im: Option<Vec<f64>>,
}

impl FieldDocument {
    /// Validate and convert into a [`PhaseField`].
    pub fn into_field(self) -> PaticResult<PhaseField> {
        match self.im {
            None => PhaseField::real(&self.shape, self.re),
            Some(im) => {
                if im.len() != self.re.len() {
                    return Err(PaticError::shape(format!(
                        "field document has {} real and {} imaginary values",
                        self.re.len(),
                        im.len()
                    )));
                }
                let data = self
                    .re
                    .into_iter()
                    .zip(im)
                    .map(|(re, im)| Complex64::new(re, im))
                    .collect();
                PhaseField::complex(&self.shape, data)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/phase.rs"]
mod tests;
