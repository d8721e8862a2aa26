use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context as _;
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::encode::{ensure_parent_dir, flatten_to_opaque_rgba8};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PaticError, PaticResult};
use crate::render::FrameRGBA;

/// Quantizer speed for the GIF palette, 1 (best) to 30 (fastest).
const GIF_SPEED: i32 = 10;

/// Infinitely looping animated GIF.
pub struct GifSink {
    out_path: PathBuf,
    bg: [u8; 3],
    running: Option<(SinkConfig, GifEncoder<BufWriter<File>>)>,
    frames: usize,
}

impl std::fmt::Debug for GifSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifSink")
            .field("out_path", &self.out_path)
            .field("running", &self.running.is_some())
            .field("frames", &self.frames)
            .finish()
    }
}

impl GifSink {
    /// Sink writing to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            bg: [255, 255, 255],
            running: None,
            frames: 0,
        }
    }
}

impl FrameSink for GifSink {
    fn begin(&mut self, cfg: SinkConfig) -> PaticResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(PaticError::encode("gif width/height must be non-zero"));
        }
        ensure_parent_dir(&self.out_path)?;
        let file = File::create(&self.out_path)
            .with_context(|| format!("create '{}'", self.out_path.display()))?;
        let mut encoder = GifEncoder::new_with_speed(BufWriter::new(file), GIF_SPEED);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| PaticError::encode(format!("gif repeat: {e}")))?;
        self.running = Some((cfg, encoder));
        self.frames = 0;
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, frame: &FrameRGBA) -> PaticResult<()> {
        let (cfg, encoder) = self
            .running
            .as_mut()
            .ok_or_else(|| PaticError::encode("push_frame called before begin"))?;
        cfg.check_frame(frame)?;

        let mut rgba = vec![0; cfg.frame_bytes()];
        flatten_to_opaque_rgba8(&mut rgba, &frame.data, frame.premultiplied, self.bg)?;
        let image = RgbaImage::from_raw(cfg.width, cfg.height, rgba)
            .ok_or_else(|| PaticError::encode("gif frame buffer has the wrong length"))?;
        let delay = Delay::from_numer_denom_ms(1000 * cfg.fps.den, cfg.fps.num);
        encoder
            .encode_frame(Frame::from_parts(image, 0, 0, delay))
            .map_err(|e| PaticError::encode(format!("gif frame {}: {e}", self.frames)))?;
        self.frames += 1;
        Ok(())
    }

    fn end(&mut self) -> PaticResult<()> {
        // The encoder writes the GIF trailer when dropped.
        let Some((_, encoder)) = self.running.take() else {
            return Err(PaticError::encode("end called before begin"));
        };
        drop(encoder);
        tracing::debug!(path = %self.out_path.display(), frames = self.frames, "gif written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
