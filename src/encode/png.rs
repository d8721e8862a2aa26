use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::encode::{ensure_parent_dir, flatten_to_opaque_rgba8};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PaticError, PaticResult};
use crate::render::FrameRGBA;

/// Write one frame as an opaque RGBA PNG over white.
pub fn write_png(path: &Path, frame: &FrameRGBA) -> PaticResult<()> {
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != expected {
        return Err(PaticError::encode(
            "frame data length does not match width*height*4",
        ));
    }
    ensure_parent_dir(path)?;
    let mut rgba = vec![0; expected];
    flatten_to_opaque_rgba8(&mut rgba, &frame.data, frame.premultiplied, [255, 255, 255])?;
    image::save_buffer_with_format(
        path,
        &rgba,
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// One `frame_<index>.png` per frame inside a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    /// Sink writing into `dir`, created on `begin`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            written: Vec::new(),
        }
    }

    /// Files written since the last `begin`, in frame order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> PaticResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> PaticResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| PaticError::encode("push_frame called before begin"))?;
        cfg.check_frame(frame)?;
        let path = self.dir.join(format!("frame_{:05}.png", idx.0));
        write_png(&path, frame)?;
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> PaticResult<()> {
        tracing::debug!(dir = %self.dir.display(), frames = self.written.len(), "png sequence written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
