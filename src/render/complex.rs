//! Phase/amplitude decomposition of complex fields.

use num_complex::Complex64;

use crate::colormap::{Colormap, Normalize};
use crate::field::phase::FieldArray;
use crate::foundation::core::Rgba8;
use crate::foundation::math::finite_min_max;
use crate::render::legend::Legend;

/// Per-site phase `arg(z)/p` and globally normalized amplitude, computed once per field.
#[derive(Clone, Debug)]
pub struct ComplexPhase {
    p: u32,
    thetas: FieldArray<f64>,
    amplitude: FieldArray<f64>,
    theta_range: (f64, f64),
}

impl ComplexPhase {
    /// Decompose `field` for a degree-`p` order parameter.
    ///
    /// Amplitudes are scaled by the min/max over every frame; a constant amplitude maps to 1.
    pub fn new(field: &FieldArray<Complex64>, p: u32) -> Self {
        let p = p.max(1);
        let thetas = field.map(|z| z.arg() / f64::from(p));
        let moduli = field.map(|z| z.norm());

        let amplitude = match finite_min_max(moduli.values().iter().copied()) {
            Some((lo, hi)) if hi > lo => moduli.map(|r| (r - lo) / (hi - lo)),
            Some(_) => moduli.map(|r| if r.is_finite() { 1.0 } else { f64::NAN }),
            None => moduli,
        };

        let half = std::f64::consts::PI / f64::from(p);
        let theta_range = finite_min_max(thetas.values().iter().copied()).unwrap_or((-half, half));

        tracing::debug!(
            p,
            theta_min = theta_range.0,
            theta_max = theta_range.1,
            "complex field decomposed"
        );
        Self {
            p,
            thetas,
            amplitude,
            theta_range,
        }
    }

    /// `(nt, ny, nx)` of the decomposed field.
    pub fn shape(&self) -> [usize; 3] {
        self.thetas.shape()
    }

    /// Global `(min, max)` of the scaled phase.
    pub fn theta_range(&self) -> (f64, f64) {
        self.theta_range
    }

    /// Scaled phase of frame `t`.
    pub fn thetas(&self, t: usize) -> &[f64] {
        self.thetas.frame(t)
    }

    /// Normalized amplitude of frame `t`, in `[0,1]` for finite sites.
    pub fn amplitude(&self, t: usize) -> &[f64] {
        self.amplitude.frame(t)
    }

    /// Mesh colors of frame `t`: hue from the phase, alpha from the amplitude.
    ///
    /// Sites with a non-finite phase or amplitude are fully transparent.
    pub fn frame_colors(&self, t: usize, colormap: Colormap) -> Vec<Rgba8> {
        let norm = Normalize::new(self.theta_range.0, self.theta_range.1);
        self.thetas(t)
            .iter()
            .zip(self.amplitude(t))
            .map(|(&theta, &amp)| {
                if theta.is_finite() && amp.is_finite() {
                    colormap.sample(norm.apply(theta)).with_alpha(amp)
                } else {
                    Rgba8::TRANSPARENT
                }
            })
            .collect()
    }

    /// Colorbar over the phase range with fraction-of-π labels.
    pub fn legend(&self, colormap: Colormap) -> Legend {
        Legend::phase(colormap, self.theta_range.0, self.theta_range.1, self.p)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/complex.rs"]
mod tests;
