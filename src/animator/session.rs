use crate::animator::Animator;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::field::phase::PhaseField;
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{PaticError, PaticResult};
use crate::render::FrameRGBA;
use crate::render::cpu::CpuRasterizer;
use crate::render::frame::{FieldView, FrameRenderer};
use crate::render::scene::LiveScene;

/// A rasterized frame and the time index it shows.
#[derive(Clone, Debug)]
pub struct RenderedFrame {
    /// Time index.
    pub index: FrameIndex,
    /// Premultiplied RGBA8 pixels.
    pub image: FrameRGBA,
}

/// One pass over an animator's frames: `initialize`, then `advance` in increasing time order,
/// then `finalize`.
///
/// The static skeleton is built once; each `advance` only swaps the per-frame layers.
#[derive(Debug)]
pub struct FrameSession<'a> {
    renderer: FrameRenderer<'a>,
    live: LiveScene,
    raster: CpuRasterizer,
    last: Option<FrameIndex>,
}

impl<'a> FrameSession<'a> {
    /// Build the static scene. Fails when the animator has no field or an incomplete grid.
    pub fn initialize(animator: &'a Animator) -> PaticResult<Self> {
        let field = match (&animator.field, &animator.complex) {
            (None, _) => {
                return Err(PaticError::precondition(
                    "no phase field set; pass one at construction or call set_field",
                ));
            }
            (Some(PhaseField::Real(values)), _) => FieldView::Real(values),
            (Some(PhaseField::Complex(_)), Some(phase)) => FieldView::Complex(phase),
            (Some(PhaseField::Complex(_)), None) => {
                return Err(PaticError::precondition(
                    "complex field has not been decomposed",
                ));
            }
        };
        let grid = animator.grid.grid().ok_or_else(|| {
            PaticError::precondition("coordinate grid is not fully defined; set both x and y")
        })?;

        let renderer = FrameRenderer::new(animator.kind, &animator.config, field, grid)?;
        let live = LiveScene::new(renderer.skeleton());
        let raster = CpuRasterizer::new(animator.dpi)?;
        tracing::debug!(
            frames = renderer.frame_count(),
            layout = ?renderer.layout(),
            sites = renderer.sites().len(),
            range = ?renderer.field_range(),
            "frame session initialized"
        );
        Ok(Self {
            renderer,
            live,
            raster,
            last: None,
        })
    }

    /// Number of frames available.
    pub fn frame_count(&self) -> usize {
        self.renderer.frame_count()
    }

    /// Output raster size.
    pub fn canvas(&self) -> Canvas {
        self.raster.canvas(&self.live)
    }

    /// Render frame `t`. Within a session `t` must exceed every previously advanced index.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn advance(&mut self, t: usize) -> PaticResult<RenderedFrame> {
        if t >= self.frame_count() {
            return Err(PaticError::range(format!(
                "frame {t} is out of range for {} frame(s)",
                self.frame_count()
            )));
        }
        let index = FrameIndex(t);
        if self.last.is_some_and(|last| last >= index) {
            return Err(PaticError::precondition(format!(
                "frames must advance in increasing order; {t} follows {}",
                self.last.map_or(0, |l| l.0)
            )));
        }

        let diff = self.live.apply(self.renderer.layers(t))?;
        tracing::trace!(unchanged = diff.is_empty(), replaced = ?diff.replaced, "layers swapped");
        let image = self.raster.render(&self.live)?;
        self.last = Some(index);
        Ok(RenderedFrame { index, image })
    }

    /// Stream the frames not yet advanced into `sink`, bracketed by `begin` and `end`.
    /// Returns how many frames were pushed.
    pub fn finalize(mut self, sink: &mut dyn FrameSink, fps: Fps) -> PaticResult<usize> {
        let canvas = self.canvas();
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps,
        })?;
        let start = self.last.map_or(0, |l| l.0 + 1);
        for t in start..self.frame_count() {
            let frame = self.advance(t)?;
            sink.push_frame(frame.index, &frame.image)?;
        }
        sink.end()?;
        let frames = self.frame_count() - start;
        tracing::debug!(frames, "frame session finalized");
        Ok(frames)
    }
}
