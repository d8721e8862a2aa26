use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{PaticError, PaticResult};
use crate::render::FrameRGBA;

/// Stream parameters handed to a [`FrameSink`] before the first frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Playback rate.
    pub fps: Fps,
}

impl SinkConfig {
    pub(crate) fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Reject a frame whose size differs from the configured stream.
    pub(crate) fn check_frame(&self, frame: &FrameRGBA) -> PaticResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(PaticError::encode(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.data.len() != self.frame_bytes() {
            return Err(PaticError::encode(
                "frame data length does not match width*height*4",
            ));
        }
        Ok(())
    }
}

/// Consumer of rendered frames.
///
/// `push_frame` is called in strictly increasing [`FrameIndex`] order between one `begin` and
/// one `end`. Any error aborts the whole export.
pub trait FrameSink: Send {
    /// Called once before any frame.
    fn begin(&mut self, cfg: SinkConfig) -> PaticResult<()>;
    /// Accept the next frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> PaticResult<()>;
    /// Called once after the last frame; finalizes the artifact.
    fn end(&mut self) -> PaticResult<()>;
}

/// Collects frames in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    finished: bool,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration captured by the last `begin`.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` was called after the last `begin`.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> PaticResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> PaticResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| PaticError::encode("push_frame called before begin"))?;
        cfg.check_frame(frame)?;
        if let Some((last, _)) = self.frames.last()
            && *last >= idx
        {
            return Err(PaticError::encode(format!(
                "frame {} pushed after frame {}",
                idx.0, last.0
            )));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> PaticResult<()> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
