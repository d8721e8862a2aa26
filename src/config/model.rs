use std::fmt;
use std::str::FromStr;

use crate::colormap::{Color, Colormap};
use crate::foundation::error::PaticError;

macro_rules! string_serde {
    ($ty:ty) => {
        impl TryFrom<String> for $ty {
            type Error = PaticError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$ty> for String {
            fn from(v: $ty) -> Self {
                v.to_string()
            }
        }
    };
}

/// What to draw: the phase field, the order-parameter glyphs, or both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DisplayMode {
    /// Phase field only (`"pf"`).
    #[default]
    PhaseField,
    /// Order-parameter glyphs only (`"op"`).
    OrderParameter,
    /// Field and glyphs (`"both"`).
    Both,
}

impl DisplayMode {
    /// Accepted option strings.
    pub const NAMES: [&'static str; 3] = ["pf", "op", "both"];

    /// Option string for this value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PhaseField => "pf",
            Self::OrderParameter => "op",
            Self::Both => "both",
        }
    }

    /// `true` when the field layer is part of the figure.
    pub fn shows_field(self) -> bool {
        matches!(self, Self::PhaseField | Self::Both)
    }

    /// `true` when glyphs are part of the figure.
    pub fn shows_glyphs(self) -> bool {
        matches!(self, Self::OrderParameter | Self::Both)
    }
}

impl FromStr for DisplayMode {
    type Err = PaticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pf" => Ok(Self::PhaseField),
            "op" => Ok(Self::OrderParameter),
            "both" => Ok(Self::Both),
            _ => Err(PaticError::domain("which", s, &Self::NAMES)),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

string_serde!(DisplayMode);

/// How field and glyphs share drawing surfaces when both are shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Grouping {
    /// Two panels side by side (`"separate"`).
    Separate,
    /// One shared panel (`"together"`).
    #[default]
    Together,
}

impl Grouping {
    /// Accepted option strings.
    pub const NAMES: [&'static str; 2] = ["separate", "together"];

    /// Option string for this value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Separate => "separate",
            Self::Together => "together",
        }
    }
}

impl FromStr for Grouping {
    type Err = PaticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "separate" => Ok(Self::Separate),
            "together" => Ok(Self::Together),
            _ => Err(PaticError::domain("grouping", s, &Self::NAMES)),
        }
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

string_serde!(Grouping);

/// How glyphs combine with the field on a shared panel.
///
/// Serialized as the integers `0`, `1` and `2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CompositingMode {
    /// Solid-colored glyphs over the opaque field.
    #[default]
    Solid,
    /// Field-colored glyphs with no field layer.
    Mapped,
    /// Field-colored glyphs over a translucent field layer.
    MappedOverField,
}

impl CompositingMode {
    /// Accepted option strings.
    pub const NAMES: [&'static str; 3] = ["0", "1", "2"];

    /// Numeric value.
    pub fn index(self) -> u8 {
        match self {
            Self::Solid => 0,
            Self::Mapped => 1,
            Self::MappedOverField => 2,
        }
    }

    /// `true` for modes 1 and 2.
    pub fn is_mapped(self) -> bool {
        !matches!(self, Self::Solid)
    }
}

impl TryFrom<u8> for CompositingMode {
    type Error = PaticError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Solid),
            1 => Ok(Self::Mapped),
            2 => Ok(Self::MappedOverField),
            other => Err(PaticError::domain("mode", other.to_string(), &Self::NAMES)),
        }
    }
}

impl From<CompositingMode> for u8 {
    fn from(m: CompositingMode) -> Self {
        m.index()
    }
}

impl FromStr for CompositingMode {
    type Err = PaticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Self::Solid),
            "1" => Ok(Self::Mapped),
            "2" => Ok(Self::MappedOverField),
            _ => Err(PaticError::domain("mode", s, &Self::NAMES)),
        }
    }
}

impl fmt::Display for CompositingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// One of the three glyph outline layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SubType {
    /// Filled regular polygon.
    Patch,
    /// Stroked asterisk.
    Point,
    /// Zero-orientation dash.
    Tick,
}

impl SubType {
    /// Accepted option strings.
    pub const NAMES: [&'static str; 3] = ["patch", "point", "tick"];

    /// All sub-types in drawing order.
    pub const ALL: [Self; 3] = [Self::Patch, Self::Point, Self::Tick];

    /// Option string for this value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Point => "point",
            Self::Tick => "tick",
        }
    }
}

impl FromStr for SubType {
    type Err = PaticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patch" => Ok(Self::Patch),
            "point" => Ok(Self::Point),
            "tick" => Ok(Self::Tick),
            _ => Err(PaticError::domain("sub-type", s, &Self::NAMES)),
        }
    }
}

impl fmt::Display for SubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

string_serde!(SubType);

/// Which glyph layers are kept in the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GlyphSelection {
    /// Polygons only.
    Patch,
    /// Asterisks only.
    Point,
    /// Ticks only.
    Tick,
    /// Polygons and asterisks.
    PatchPoint,
    /// Polygons and ticks.
    PatchTick,
    /// Asterisks and ticks.
    PointTick,
    /// Every layer.
    #[default]
    All,
}

impl GlyphSelection {
    /// Accepted option strings.
    pub const NAMES: [&'static str; 7] = [
        "patch",
        "point",
        "tick",
        "patch & point",
        "patch & tick",
        "point & tick",
        "all",
    ];

    /// Option string for this value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Point => "point",
            Self::Tick => "tick",
            Self::PatchPoint => "patch & point",
            Self::PatchTick => "patch & tick",
            Self::PointTick => "point & tick",
            Self::All => "all",
        }
    }

    /// `true` when `sub` is part of this selection.
    pub fn shows(self, sub: SubType) -> bool {
        match self {
            Self::Patch => sub == SubType::Patch,
            Self::Point => sub == SubType::Point,
            Self::Tick => sub == SubType::Tick,
            Self::PatchPoint => sub != SubType::Tick,
            Self::PatchTick => sub != SubType::Point,
            Self::PointTick => sub != SubType::Patch,
            Self::All => true,
        }
    }
}

impl FromStr for GlyphSelection {
    type Err = PaticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s
            .split('&')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(" & ")
            .to_ascii_lowercase();
        match norm.as_str() {
            "patch" => Ok(Self::Patch),
            "point" => Ok(Self::Point),
            "tick" => Ok(Self::Tick),
            "patch & point" => Ok(Self::PatchPoint),
            "patch & tick" => Ok(Self::PatchTick),
            "point & tick" => Ok(Self::PointTick),
            "all" => Ok(Self::All),
            _ => Err(PaticError::domain("marker type", s, &Self::NAMES)),
        }
    }
}

impl fmt::Display for GlyphSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

string_serde!(GlyphSelection);

/// Color, stroke width and opacity of one glyph layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlyphStyle {
    /// Fill color for patches, stroke color otherwise.
    pub color: Color,
    /// Stroke width in points.
    pub linewidth: f64,
    /// Opacity in `[0,1]`.
    pub alpha: f64,
}

/// Styles of the three layers plus their shared size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlyphStyles {
    /// Polygon layer.
    pub patch: GlyphStyle,
    /// Asterisk layer.
    pub point: GlyphStyle,
    /// Tick layer.
    pub tick: GlyphStyle,
    /// Shared glyph area in points² (scatter convention).
    pub size: f64,
}

impl GlyphStyles {
    /// Size used until a grid allows auto-derivation.
    pub const INITIAL_SIZE: f64 = 500.0;

    /// Style of `sub`.
    pub fn get(&self, sub: SubType) -> &GlyphStyle {
        match sub {
            SubType::Patch => &self.patch,
            SubType::Point => &self.point,
            SubType::Tick => &self.tick,
        }
    }

    /// Mutable style of `sub`.
    pub fn get_mut(&mut self, sub: SubType) -> &mut GlyphStyle {
        match sub {
            SubType::Patch => &mut self.patch,
            SubType::Point => &mut self.point,
            SubType::Tick => &mut self.tick,
        }
    }
}

impl Default for GlyphStyles {
    fn default() -> Self {
        Self {
            patch: GlyphStyle {
                color: Color::BLACK,
                linewidth: 0.0,
                alpha: 0.5,
            },
            point: GlyphStyle {
                color: Color::BLACK,
                linewidth: 0.2,
                alpha: 1.0,
            },
            tick: GlyphStyle {
                color: Color::RED,
                linewidth: 0.5,
                alpha: 1.0,
            },
            size: Self::INITIAL_SIZE,
        }
    }
}

/// Fraction of lattice sites carrying a glyph along each axis, in `(0,1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarkerDensity {
    /// Density along x (columns).
    pub x: f64,
    /// Density along y (rows).
    pub y: f64,
}

impl Default for MarkerDensity {
    fn default() -> Self {
        Self { x: 0.1, y: 0.1 }
    }
}

/// Panel arrangement derived from a [`DisplayConfig`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Layout {
    /// One panel with a colorbar.
    Single,
    /// Field panel with colorbar next to a glyph panel.
    SideBySide,
    /// One square glyph panel, no colorbar.
    OrderParameterOnly,
}

/// The complete, always-consistent display configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DisplayConfig {
    /// What to draw.
    pub which: DisplayMode,
    /// Panel sharing when both are drawn.
    pub grouping: Grouping,
    /// Compositing on a shared panel.
    pub mode: CompositingMode,
    /// Visible glyph layers.
    pub selection: GlyphSelection,
    /// Per-layer styles and shared size.
    pub styles: GlyphStyles,
    /// Opacity of the field layer.
    pub field_alpha: f64,
    /// Colormap for the field and field-colored glyphs.
    pub colormap: Colormap,
    /// Glyph subsampling density.
    pub density: MarkerDensity,
    /// Panel background.
    pub face_color: Color,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            which: DisplayMode::default(),
            grouping: Grouping::default(),
            mode: CompositingMode::default(),
            selection: GlyphSelection::default(),
            styles: GlyphStyles::default(),
            field_alpha: 1.0,
            colormap: Colormap::default(),
            density: MarkerDensity::default(),
            face_color: Color::WHITESMOKE,
        }
    }
}

impl DisplayConfig {
    /// Panel arrangement.
    pub fn layout(&self) -> Layout {
        match (self.which, self.grouping) {
            (DisplayMode::OrderParameter, _) => Layout::OrderParameterOnly,
            (DisplayMode::Both, Grouping::Separate) => Layout::SideBySide,
            _ => Layout::Single,
        }
    }

    /// `true` when glyphs and field share one panel.
    pub fn is_shared_both(&self) -> bool {
        self.which == DisplayMode::Both && self.grouping == Grouping::Together
    }

    /// `true` when glyphs take their color from the field (modes 1 and 2 on a shared panel).
    pub fn glyphs_colormapped(&self) -> bool {
        self.is_shared_both() && self.mode.is_mapped()
    }

    /// `true` when the field mesh is drawn at all.
    pub fn draws_field_mesh(&self) -> bool {
        self.which.shows_field()
            && !(self.is_shared_both() && self.mode == CompositingMode::Mapped)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
