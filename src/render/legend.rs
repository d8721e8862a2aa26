//! Colorbar tick placement and labels.

use crate::colormap::Colormap;
use crate::foundation::math::{gcd, linspace};

/// Number of ticks on every colorbar.
pub const TICK_COUNT: usize = 9;

/// One labelled colorbar tick.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LegendTick {
    /// Data value at the tick.
    pub value: f64,
    /// Position along the bar, `0` at the bottom and `1` at the top.
    pub fraction: f64,
    /// Rendered label.
    pub label: String,
}

/// Vertical colorbar next to a field panel.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Legend {
    /// Colormap shown along the bar.
    pub colormap: Colormap,
    /// Value at the bottom.
    pub vmin: f64,
    /// Value at the top.
    pub vmax: f64,
    /// Evenly spaced ticks from `vmin` to `vmax`.
    pub ticks: Vec<LegendTick>,
}

impl Legend {
    /// Colorbar with numeric labels for a real-valued range.
    pub fn linear(colormap: Colormap, vmin: f64, vmax: f64) -> Self {
        let values = linspace(vmin, vmax, TICK_COUNT);
        let step = (vmax - vmin) / (TICK_COUNT - 1) as f64;
        let ticks = values
            .into_iter()
            .enumerate()
            .map(|(i, value)| LegendTick {
                value,
                fraction: i as f64 / (TICK_COUNT - 1) as f64,
                label: format_tick(value, step),
            })
            .collect();
        Self {
            colormap,
            vmin,
            vmax,
            ticks,
        }
    }

    /// Colorbar for a phase range `[vmin, vmax]` of a degree-`p` field, labelled in fractions of π.
    pub fn phase(colormap: Colormap, vmin: f64, vmax: f64, p: u32) -> Self {
        let values = linspace(vmin, vmax, TICK_COUNT);
        let ticks = values
            .into_iter()
            .zip(phase_tick_labels(p))
            .enumerate()
            .map(|(i, (value, label))| LegendTick {
                value,
                fraction: i as f64 / (TICK_COUNT - 1) as f64,
                label,
            })
            .collect();
        Self {
            colormap,
            vmin,
            vmax,
            ticks,
        }
    }
}

/// Labels for the nine ticks spanning `[-π/p, π/p]`.
///
/// Tick `i` sits at `(i − 4)·π / (4p)`; the fraction is reduced to lowest terms and the centre
/// tick reads `0`.
pub fn phase_tick_labels(p: u32) -> [String; TICK_COUNT] {
    std::array::from_fn(|i| {
        let offset = i as i64 - 4;
        if offset == 0 {
            return "0".to_owned();
        }
        let n = offset.unsigned_abs();
        let d = 4 * u64::from(p.max(1));
        let g = gcd(n, d);
        let (n, d) = (n / g, d / g);
        let sign = if offset < 0 { "-" } else { "" };
        match (n, d) {
            (1, 1) => format!("{sign}π"),
            (1, d) => format!("{sign}π/{d}"),
            (n, 1) => format!("{sign}{n}π"),
            (n, d) => format!("{sign}{n}π/{d}"),
        }
    })
}

/// Format `value` with enough decimals to tell ticks `step` apart.
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step.is_finite() && step > 0.0 {
        (1.0 - step.log10().floor()).clamp(0.0, 6.0) as usize
    } else {
        2
    };
    let s = format!("{value:.decimals$}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        s
    };
    if s == "-0" { "0".to_owned() } else { s }
}

#[cfg(test)]
#[path = "../../tests/unit/render/legend.rs"]
mod tests;
