//! Pure configuration transitions.
//!
//! [`resolve`] never mutates its input: it validates the change, then returns the next
//! configuration with every cascade already applied. A rejected change therefore leaves the
//! caller's configuration exactly as it was.

use crate::colormap::{Color, Colormap};
use crate::config::model::{
    CompositingMode, DisplayConfig, DisplayMode, GlyphSelection, GlyphStyles, Grouping, SubType,
};
use crate::config::sizing::auto_size;
use crate::foundation::error::{PaticError, PaticResult};
use crate::glyph::geometry::GlyphKind;
use crate::grid::builder::Axis;

/// One requested edit to a [`DisplayConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigChange {
    /// Switch what is drawn.
    Which(DisplayMode),
    /// Switch panel sharing.
    Grouping(Grouping),
    /// Switch compositing.
    Mode(CompositingMode),
    /// Choose the visible glyph layers.
    Selection(GlyphSelection),
    /// Set a layer color.
    Color(SubType, Color),
    /// Set a layer stroke width (points, `≥ 0`).
    Linewidth(SubType, f64),
    /// Set a layer opacity; clamped into `[0,1]`.
    Transparency(SubType, f64),
    /// Set the shared glyph size (points², `≥ 0`).
    Size(f64),
    /// Set the field layer opacity; clamped into `[0,1]`.
    FieldTransparency(f64),
    /// Pick the colormap.
    Colormap(Colormap),
    /// Set glyph density along an axis; `> 1` clamps to 1.
    Density(f64, Axis),
    /// Set the panel background.
    FaceColor(Color),
    /// Restore glyph styles to the defaults of the current configuration.
    ResetGlyphs,
}

/// Animator facts the transitions depend on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolveContext {
    /// Rendering pipeline.
    pub kind: GlyphKind,
    /// `(ny, nx)` when a field is present.
    pub dims: Option<(usize, usize)>,
    /// `true` when both coordinate meshes exist.
    pub grid_complete: bool,
}

impl ResolveContext {
    fn sizing_dims(&self) -> Option<(usize, usize)> {
        self.dims.filter(|_| self.grid_complete)
    }
}

/// Apply `change` to `current`, returning the resolved configuration.
pub fn resolve(
    current: &DisplayConfig,
    change: &ConfigChange,
    ctx: &ResolveContext,
) -> PaticResult<DisplayConfig> {
    let mut next = current.clone();
    match *change {
        ConfigChange::Which(which) => {
            if which != DisplayMode::Both {
                next.grouping = Grouping::Together;
            }
            if current.which == DisplayMode::PhaseField && which != DisplayMode::PhaseField {
                next.field_alpha = 1.0;
            }
            next.which = which;
        }
        ConfigChange::Grouping(grouping) => {
            if current.which == DisplayMode::Both {
                next.grouping = grouping;
                cascade_layout(&mut next, ctx.kind);
            }
        }
        ConfigChange::Mode(mode) => {
            next.mode = mode;
            if current.which == DisplayMode::Both {
                cascade_layout(&mut next, ctx.kind);
            }
        }
        ConfigChange::Selection(selection) => next.selection = selection,
        ConfigChange::Color(sub, color) => next.styles.get_mut(sub).color = color,
        ConfigChange::Linewidth(sub, lw) => {
            next.styles.get_mut(sub).linewidth = non_negative("linewidth", lw)?;
        }
        ConfigChange::Transparency(sub, alpha) => {
            next.styles.get_mut(sub).alpha = unit_clamped("transparency", alpha)?;
        }
        ConfigChange::Size(size) => next.styles.size = non_negative("size", size)?,
        ConfigChange::FieldTransparency(alpha) => {
            next.field_alpha = unit_clamped("field transparency", alpha)?;
        }
        ConfigChange::Colormap(cmap) => next.colormap = cmap,
        ConfigChange::Density(density, axis) => {
            let density = checked_density(density)?;
            match axis {
                Axis::X => next.density.x = density,
                Axis::Y => next.density.y = density,
                Axis::Both => {
                    next.density.x = density;
                    next.density.y = density;
                }
            }
            apply_auto_size(&mut next, ctx);
        }
        ConfigChange::FaceColor(color) => next.face_color = color,
        ConfigChange::ResetGlyphs => {
            next.styles = GlyphStyles::default();
            next.selection = GlyphSelection::All;
            if next.glyphs_colormapped() {
                apply_mapped_defaults(&mut next, ctx.kind, false);
            }
            apply_auto_size(&mut next, ctx);
        }
    }
    if next != *current {
        tracing::debug!(?change, "display configuration resolved");
    }
    Ok(next)
}

/// Recompute the auto-derived size (and `p < 3` strokes) when the grid allows it.
pub(crate) fn apply_auto_size(cfg: &mut DisplayConfig, ctx: &ResolveContext) {
    let Some(dims) = ctx.sizing_dims() else {
        return;
    };
    let auto = auto_size(ctx.kind.degree(), dims, cfg.density);
    cfg.styles.size = auto.size;
    if let Some(lw) = auto.linewidth {
        cfg.styles.point.linewidth = lw;
        cfg.styles.tick.linewidth = lw;
    }
}

/// Cascade applied after grouping or mode changes while both layers are shown.
fn cascade_layout(cfg: &mut DisplayConfig, kind: GlyphKind) {
    match cfg.grouping {
        Grouping::Together if cfg.mode.is_mapped() => apply_mapped_defaults(cfg, kind, true),
        Grouping::Together => {}
        Grouping::Separate => {
            cfg.selection = GlyphSelection::All;
            cfg.styles.patch.alpha = 0.5;
            cfg.field_alpha = 1.0;
        }
    }
}

fn apply_mapped_defaults(cfg: &mut DisplayConfig, kind: GlyphKind, field: bool) {
    if kind == GlyphKind::Line {
        cfg.selection = GlyphSelection::Point;
    } else {
        cfg.selection = GlyphSelection::Patch;
        cfg.styles.patch.alpha = 1.0;
    }
    if field {
        cfg.field_alpha = 0.25;
    }
}

fn non_negative(option: &str, v: f64) -> PaticResult<f64> {
    if v.is_nan() {
        return Err(PaticError::shape(format!("{option} must be a number")));
    }
    if v < 0.0 {
        return Err(PaticError::range(format!("{option} cannot be negative, got {v}")));
    }
    Ok(v)
}

fn unit_clamped(option: &str, v: f64) -> PaticResult<f64> {
    if v.is_nan() {
        return Err(PaticError::shape(format!("{option} must be a number")));
    }
    Ok(v.clamp(0.0, 1.0))
}

fn checked_density(v: f64) -> PaticResult<f64> {
    if v.is_nan() {
        return Err(PaticError::shape(
            "density must be a number in the half-open interval (0,1]",
        ));
    }
    if v <= 0.0 {
        return Err(PaticError::range(format!(
            "density must lie in the half-open interval (0,1], got {v}"
        )));
    }
    Ok(v.min(1.0))
}

#[cfg(test)]
#[path = "../../tests/unit/config/resolve.rs"]
mod tests;
