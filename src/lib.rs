//! Frame-by-frame rendering of time-indexed phase fields and their p-atic order-parameter
//! glyphs.
//!
//! The public API centers on [`Animator`]:
//!
//! - Construct it with a glyph degree `p`, an optional [`PhaseField`] and optional coordinates
//! - Adjust the [`DisplayConfig`] through its setters or an [`AnimatorOptions`] document
//! - [`Animator::preview`] a frame, or stream all of them into a [`FrameSink`]
//!
//! Configuration changes go through a pure resolver ([`resolve`]) so the cascade rules between
//! options can be exercised without rendering anything.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animator;
mod colormap;
mod config;
mod encode;
mod field;
mod foundation;
mod glyph;
mod grid;
mod render;

pub use crate::animator::{Animator, DEFAULT_DPI, FrameSession, RenderedFrame};
pub use crate::colormap::{Color, Colormap, Normalize};
pub use crate::config::model::{
    CompositingMode, DisplayConfig, DisplayMode, GlyphSelection, GlyphStyle, GlyphStyles,
    Grouping, Layout, MarkerDensity, SubType,
};
pub use crate::config::options::{AnimatorOptions, PerSubType};
pub use crate::config::resolve::{ConfigChange, ResolveContext, resolve};
pub use crate::config::sizing::{AutoSize, auto_size, glyph_count};
pub use crate::encode::ffmpeg::{FfmpegSink, is_ffmpeg_on_path};
pub use crate::encode::gif::GifSink;
pub use crate::encode::png::{PngSequenceSink, write_png};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::encode::{ExportFormat, output_path};
pub use crate::field::phase::{FieldArray, FieldDocument, PhaseField};
pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Rgba8Premul, Vec2,
};
pub use crate::foundation::error::{PaticError, PaticResult};
pub use crate::glyph::geometry::{GlyphKind, GlyphOutlines, GlyphShape};
pub use crate::grid::builder::{Axis, CoordSpec, CoordinateGrid, GridState, Limits};
pub use crate::render::FrameRGBA;
pub use crate::render::legend::{Legend, LegendTick, phase_tick_labels};
