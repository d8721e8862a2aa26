use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::encode::{ensure_parent_dir, flatten_to_opaque_rgba8};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{PaticError, PaticResult};
use crate::render::FrameRGBA;

/// Whether an `ffmpeg` binary answers `-version`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// MP4 (H.264, yuv420p) writer that pipes raw RGBA frames into the system `ffmpeg`.
///
/// An existing file at the output path is replaced. Dropping the sink before [`FrameSink::end`]
/// kills the encoder and waits for it to exit.
#[derive(Debug)]
pub struct FfmpegSink {
    out_path: PathBuf,
    bg: [u8; 3],
    running: Option<Running>,
}

/// A spawned encoder process. stderr is drained on a thread so a verbose encoder cannot block
/// frame writes on a full pipe.
#[derive(Debug)]
struct Running {
    cfg: SinkConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    stderr: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
}

impl Running {
    fn spawn(mut cmd: Command, cfg: SinkConfig) -> PaticResult<Self> {
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PaticError::encode(format!("failed to spawn ffmpeg: {e}")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PaticError::encode("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| PaticError::encode("failed to open ffmpeg stderr"))?;
        let drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        Ok(Self {
            scratch: vec![0; cfg.frame_bytes()],
            cfg,
            child,
            stdin: Some(stdin),
            stderr: Some(drain),
        })
    }

    /// Close stdin, wait for the encoder and report its stderr on failure.
    fn finish(&mut self) -> PaticResult<()> {
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .map_err(|e| PaticError::encode(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr = match self.stderr.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| PaticError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| PaticError::encode(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        if !status.success() {
            return Err(PaticError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                String::from_utf8_lossy(&stderr).trim()
            )));
        }
        Ok(())
    }

    /// Kill the encoder if it is still running and reap it.
    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Ok(None) = self.child.try_wait() {
            if let Err(e) = self.child.kill() {
                tracing::warn!(error = %e, "failed to kill ffmpeg");
            }
            if let Err(e) = self.child.wait() {
                tracing::warn!(error = %e, "failed to reap ffmpeg");
            }
            tracing::debug!("ffmpeg aborted");
        }
        if let Some(handle) = self.stderr.take()
            && handle.join().is_err()
        {
            tracing::warn!("ffmpeg stderr drain thread panicked");
        }
    }
}

impl Drop for Running {
    fn drop(&mut self) {
        self.abort();
    }
}

impl FfmpegSink {
    /// Sink writing to `out_path`.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            bg: [255, 255, 255],
            running: None,
        }
    }
}

/// yuv420p needs even dimensions.
pub(crate) fn validate(cfg: &SinkConfig) -> PaticResult<()> {
    if cfg.width == 0 || cfg.height == 0 {
        return Err(PaticError::encode("mp4 width/height must be non-zero"));
    }
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(PaticError::encode(format!(
            "mp4 width/height must be even, got {}x{}",
            cfg.width, cfg.height
        )));
    }
    Ok(())
}

pub(crate) fn ffmpeg_args(cfg: &SinkConfig, out_path: &Path) -> Vec<String> {
    let mut args: Vec<String> = [
        "-y",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        &format!("{}x{}", cfg.width, cfg.height),
        "-r",
        &format!("{}/{}", cfg.fps.num, cfg.fps.den),
        "-i",
        "pipe:0",
        "-an",
        "-c:v",
        "libx264",
        "-pix_fmt",
        "yuv420p",
        "-movflags",
        "+faststart",
    ]
    .map(String::from)
    .into();
    args.push(out_path.display().to_string());
    args
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> PaticResult<()> {
        validate(&cfg)?;
        if self.running.is_some() {
            return Err(PaticError::encode("ffmpeg sink already started"));
        }
        ensure_parent_dir(&self.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(PaticError::encode(
                "ffmpeg is required for mp4 export, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(ffmpeg_args(&cfg, &self.out_path));
        self.running = Some(Running::spawn(cmd, cfg)?);
        tracing::debug!(path = %self.out_path.display(), width = cfg.width, height = cfg.height, "ffmpeg started");
        Ok(())
    }

    fn push_frame(&mut self, _idx: FrameIndex, frame: &FrameRGBA) -> PaticResult<()> {
        let run = self
            .running
            .as_mut()
            .ok_or_else(|| PaticError::encode("push_frame called before begin"))?;
        run.cfg.check_frame(frame)?;
        flatten_to_opaque_rgba8(&mut run.scratch, &frame.data, frame.premultiplied, self.bg)?;

        let stdin = run
            .stdin
            .as_mut()
            .ok_or_else(|| PaticError::encode("ffmpeg sink is already finalized"))?;
        stdin
            .write_all(&run.scratch)
            .map_err(|e| PaticError::encode(format!("failed to write frame to ffmpeg: {e}")))
    }

    fn end(&mut self) -> PaticResult<()> {
        let Some(mut run) = self.running.take() else {
            return Err(PaticError::encode("end called before begin"));
        };
        run.finish()?;
        tracing::debug!(path = %self.out_path.display(), "ffmpeg finished");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
