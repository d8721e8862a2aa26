//! The stateful front end: field, grid and display configuration owned by one animator.

pub(crate) mod session;

use std::path::{Path, PathBuf};

use crate::colormap::{Color, Colormap};
use crate::config::model::{CompositingMode, DisplayConfig, DisplayMode, GlyphSelection, Grouping, SubType};
use crate::config::options::AnimatorOptions;
use crate::config::resolve::{ConfigChange, ResolveContext, apply_auto_size, resolve};
use crate::encode::ffmpeg::FfmpegSink;
use crate::encode::gif::GifSink;
use crate::encode::png::write_png;
use crate::encode::sink::FrameSink;
use crate::encode::{ExportFormat, output_path, unix_millis};
use crate::field::phase::PhaseField;
use crate::foundation::core::Fps;
use crate::foundation::error::{PaticError, PaticResult};
use crate::glyph::geometry::GlyphKind;
use crate::grid::builder::{Axis, CoordSpec, GridState};
use crate::render::complex::ComplexPhase;

pub use session::{FrameSession, RenderedFrame};

/// Raster resolution used until [`Animator::set_dpi`] is called.
pub const DEFAULT_DPI: f64 = 100.0;

/// Renders a phase field and its p-atic glyphs frame by frame.
///
/// Every setter validates before it mutates: on error the animator is left exactly as it was.
#[derive(Clone, Debug)]
pub struct Animator {
    kind: GlyphKind,
    field: Option<PhaseField>,
    complex: Option<ComplexPhase>,
    grid: GridState,
    config: DisplayConfig,
    fps: Fps,
    dpi: f64,
}

impl Animator {
    /// New animator for glyph degree `p`.
    ///
    /// `x`/`y` are optional coordinate specs; with only one given its limits serve both axes.
    /// Fails with a shape error for `p = 0` or malformed coordinates.
    pub fn new(
        p: u32,
        field: Option<PhaseField>,
        x: Option<&CoordSpec>,
        y: Option<&CoordSpec>,
    ) -> PaticResult<Self> {
        let kind = GlyphKind::for_degree(p)?;
        let dims = field.as_ref().map(|f| (f.ny(), f.nx()));
        let grid = GridState::from_specs(x, y, dims)?;
        let complex = decompose(field.as_ref(), p);

        let mut animator = Self {
            kind,
            field,
            complex,
            grid,
            config: DisplayConfig::default(),
            fps: Fps::default(),
            dpi: DEFAULT_DPI,
        };
        let ctx = animator.context();
        apply_auto_size(&mut animator.config, &ctx);
        Ok(animator)
    }

    /// Glyph degree `p`.
    pub fn degree(&self) -> u32 {
        self.kind.degree()
    }

    /// Pipeline selected by `p`.
    pub fn kind(&self) -> GlyphKind {
        self.kind
    }

    /// Current field, if any.
    pub fn field(&self) -> Option<&PhaseField> {
        self.field.as_ref()
    }

    /// Coordinate state.
    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    /// Resolved display configuration.
    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Export frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Raster resolution in dots per inch.
    pub fn dpi(&self) -> f64 {
        self.dpi
    }

    /// Replace the field. The mesh is regenerated at the new extents from the stored limits and
    /// glyph sizes are re-derived.
    pub fn set_field(&mut self, field: PhaseField) {
        tracing::debug!(shape = ?field.shape(), complex = field.is_complex(), "field replaced");
        self.grid.rebuild(field.ny(), field.nx());
        self.complex = decompose(Some(&field), self.kind.degree());
        self.field = Some(field);
        let ctx = self.context();
        apply_auto_size(&mut self.config, &ctx);
    }

    /// Apply a coordinate spec to `axis`. Glyph sizes are left as they are.
    pub fn set_grid(&mut self, spec: &CoordSpec, axis: Axis) -> PaticResult<()> {
        self.grid.set(spec, axis)
    }

    /// What to draw.
    pub fn set_which(&mut self, which: DisplayMode) -> PaticResult<()> {
        self.apply(ConfigChange::Which(which))
    }

    /// Shared or separate panels; only effective while both layers are shown.
    pub fn set_grouping(&mut self, grouping: Grouping) -> PaticResult<()> {
        self.apply(ConfigChange::Grouping(grouping))
    }

    /// Compositing of field and glyphs on a shared panel.
    pub fn set_mode(&mut self, mode: CompositingMode) -> PaticResult<()> {
        self.apply(ConfigChange::Mode(mode))
    }

    /// Visible glyph layers.
    pub fn set_marker_type(&mut self, selection: GlyphSelection) -> PaticResult<()> {
        self.apply(ConfigChange::Selection(selection))
    }

    /// Layer color.
    pub fn set_marker_color(&mut self, sub: SubType, color: Color) -> PaticResult<()> {
        self.apply(ConfigChange::Color(sub, color))
    }

    /// Layer stroke width in points.
    pub fn set_marker_linewidth(&mut self, sub: SubType, linewidth: f64) -> PaticResult<()> {
        self.apply(ConfigChange::Linewidth(sub, linewidth))
    }

    /// Layer opacity, clamped into `[0,1]`.
    pub fn set_marker_transparency(&mut self, sub: SubType, alpha: f64) -> PaticResult<()> {
        self.apply(ConfigChange::Transparency(sub, alpha))
    }

    /// Shared glyph area in points².
    pub fn set_marker_size(&mut self, size: f64) -> PaticResult<()> {
        self.apply(ConfigChange::Size(size))
    }

    /// Field layer opacity, clamped into `[0,1]`.
    pub fn set_pf_transparency(&mut self, alpha: f64) -> PaticResult<()> {
        self.apply(ConfigChange::FieldTransparency(alpha))
    }

    /// Colormap shared by the field and mapped glyphs.
    pub fn set_colormap(&mut self, colormap: Colormap) -> PaticResult<()> {
        self.apply(ConfigChange::Colormap(colormap))
    }

    /// Fraction of sites carrying a glyph along `axis`, in `(0,1]`.
    pub fn set_marker_density(&mut self, density: f64, axis: Axis) -> PaticResult<()> {
        self.apply(ConfigChange::Density(density, axis))
    }

    /// Panel background.
    pub fn set_axes_facecolor(&mut self, color: Color) -> PaticResult<()> {
        self.apply(ConfigChange::FaceColor(color))
    }

    /// Restore glyph styles and size to the defaults for the current mode.
    pub fn reset_marker_settings(&mut self) -> PaticResult<()> {
        self.apply(ConfigChange::ResetGlyphs)
    }

    /// Export frame rate.
    pub fn set_fps(&mut self, fps: Fps) {
        self.fps = fps;
    }

    /// Raster resolution; must be finite and positive.
    pub fn set_dpi(&mut self, dpi: f64) -> PaticResult<()> {
        self.dpi = checked_dpi(dpi)?;
        Ok(())
    }

    /// Apply a whole options document. Either every change lands or none does.
    pub fn apply_options(&mut self, options: &AnimatorOptions) -> PaticResult<()> {
        let ctx = self.context();
        let config = options
            .changes()
            .iter()
            .try_fold(self.config.clone(), |cfg, change| resolve(&cfg, change, &ctx))?;
        let fps = options.fps.map(|n| Fps::new(n, 1)).transpose()?;
        let dpi = options.dpi.map(checked_dpi).transpose()?;

        self.config = config;
        if let Some(fps) = fps {
            self.fps = fps;
        }
        if let Some(dpi) = dpi {
            self.dpi = dpi;
        }
        Ok(())
    }

    /// Render one frame. `None` shows frame 0; indices past the end clamp to the last frame.
    pub fn preview(&self, frame: Option<usize>) -> PaticResult<RenderedFrame> {
        let mut session = FrameSession::initialize(self)?;
        let last = session.frame_count().saturating_sub(1);
        session.advance(frame.unwrap_or(0).min(last))
    }

    /// [`Animator::preview`] written to `path` as PNG.
    pub fn preview_png(&self, frame: Option<usize>, path: &Path) -> PaticResult<RenderedFrame> {
        let rendered = self.preview(frame)?;
        write_png(path, &rendered.image)?;
        Ok(rendered)
    }

    /// Stream every frame, in order, into `sink`. Returns the frame count.
    pub fn render_into(&self, sink: &mut dyn FrameSink) -> PaticResult<usize> {
        FrameSession::initialize(self)?.finalize(sink, self.fps)
    }

    /// Export the animation to `out_dir/PAA_<timestamp>.<ext>` and return the path.
    ///
    /// A partially written file is removed when any frame fails.
    pub fn animate(&self, format: ExportFormat, out_dir: &Path) -> PaticResult<PathBuf> {
        let path = output_path(out_dir, format, unix_millis());
        let mut sink: Box<dyn FrameSink> = match format {
            ExportFormat::Gif => Box::new(GifSink::new(&path)),
            ExportFormat::Mp4 => Box::new(FfmpegSink::new(&path)),
        };
        match self.render_into(sink.as_mut()) {
            Ok(frames) => {
                tracing::debug!(path = %path.display(), frames, %format, "animation exported");
                Ok(path)
            }
            Err(e) => {
                // The encoder is stopped before its output is removed.
                drop(sink);
                if let Err(rm) = std::fs::remove_file(&path)
                    && rm.kind() != std::io::ErrorKind::NotFound
                {
                    tracing::warn!(path = %path.display(), error = %rm, "partial export left behind");
                }
                Err(e)
            }
        }
    }

    fn context(&self) -> ResolveContext {
        ResolveContext {
            kind: self.kind,
            dims: self.grid.dims(),
            grid_complete: self.grid.grid().is_some(),
        }
    }

    fn apply(&mut self, change: ConfigChange) -> PaticResult<()> {
        self.config = resolve(&self.config, &change, &self.context())?;
        Ok(())
    }
}

fn decompose(field: Option<&PhaseField>, p: u32) -> Option<ComplexPhase> {
    match field {
        Some(PhaseField::Complex(values)) => Some(ComplexPhase::new(values, p)),
        _ => None,
    }
}

fn checked_dpi(dpi: f64) -> PaticResult<f64> {
    if dpi.is_finite() && dpi > 0.0 {
        Ok(dpi)
    } else {
        Err(PaticError::range(format!("dpi must be positive, got {dpi}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animator/mod.rs"]
mod tests;
