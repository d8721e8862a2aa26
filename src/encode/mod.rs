//! Frame sinks and the helpers they share.

pub(crate) mod ffmpeg;
pub(crate) mod gif;
pub(crate) mod png;
pub(crate) mod sink;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::foundation::error::{PaticError, PaticResult};
use crate::foundation::math::mul_div255_u16;

/// Container produced by `animate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Looping animated GIF.
    Gif,
    /// H.264 MP4 through the system `ffmpeg`.
    Mp4,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn ext(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Mp4 => "mp4",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = PaticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gif" => Ok(Self::Gif),
            "mp4" => Ok(Self::Mp4),
            _ => Err(PaticError::domain("format", s, &["gif", "mp4"])),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ext())
    }
}

/// `dir/PAA_<unix millis>.<ext>`.
pub fn output_path(dir: &Path, format: ExportFormat, unix_millis: u128) -> PathBuf {
    dir.join(format!("PAA_{unix_millis}.{}", format.ext()))
}

/// Milliseconds since the unix epoch, or 0 when the clock is before it.
pub(crate) fn unix_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

pub(crate) fn ensure_parent_dir(path: &Path) -> PaticResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Composite RGBA8 over an opaque background; every output pixel has alpha 255.
pub(crate) fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg: [u8; 3],
) -> PaticResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PaticError::encode(
            "flatten expects equal-length rgba8 buffers",
        ));
    }

    let [bg_r, bg_g, bg_b] = bg.map(u16::from);
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        let over = |c: u8, bg: u16| {
            let c = if src_is_premul {
                u16::from(c)
            } else {
                mul_div255_u16(u16::from(c), a)
            };
            (c + mul_div255_u16(bg, inv)).min(255) as u8
        };
        d[0] = over(s[0], bg_r);
        d[1] = over(s[1], bg_g);
        d[2] = over(s[2], bg_b);
        d[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/mod.rs"]
mod tests;
