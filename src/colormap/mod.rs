//! Colors, named colormaps and value normalization.

use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Rgba8;
use crate::foundation::error::PaticError;

/// Named colors accepted by [`Color::from_str`], in addition to `#rrggbb[aa]`.
const NAMED: &[(&str, Rgba8)] = &[
    ("k", Rgba8::opaque(0, 0, 0)),
    ("r", Rgba8::opaque(255, 0, 0)),
    ("g", Rgba8::opaque(0, 128, 0)),
    ("b", Rgba8::opaque(0, 0, 255)),
    ("c", Rgba8::opaque(0, 191, 191)),
    ("m", Rgba8::opaque(191, 0, 191)),
    ("y", Rgba8::opaque(191, 191, 0)),
    ("w", Rgba8::opaque(255, 255, 255)),
    ("black", Rgba8::opaque(0, 0, 0)),
    ("white", Rgba8::opaque(255, 255, 255)),
    ("red", Rgba8::opaque(255, 0, 0)),
    ("green", Rgba8::opaque(0, 128, 0)),
    ("blue", Rgba8::opaque(0, 0, 255)),
    ("cyan", Rgba8::opaque(0, 255, 255)),
    ("magenta", Rgba8::opaque(255, 0, 255)),
    ("yellow", Rgba8::opaque(255, 255, 0)),
    ("orange", Rgba8::opaque(255, 165, 0)),
    ("purple", Rgba8::opaque(128, 0, 128)),
    ("gray", Rgba8::opaque(128, 128, 128)),
    ("grey", Rgba8::opaque(128, 128, 128)),
    ("lightgray", Rgba8::opaque(211, 211, 211)),
    ("darkgray", Rgba8::opaque(169, 169, 169)),
    ("whitesmoke", Rgba8::opaque(245, 245, 245)),
];

/// A straight-alpha color parsed from a matplotlib-style spec.
///
/// Serializes as `#rrggbbaa`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub Rgba8);

impl Color {
    /// Black (`"k"`).
    pub const BLACK: Self = Self(Rgba8::opaque(0, 0, 0));
    /// Red (`"r"`).
    pub const RED: Self = Self(Rgba8::opaque(255, 0, 0));
    /// White.
    pub const WHITE: Self = Self(Rgba8::opaque(255, 255, 255));
    /// Default axes face color.
    pub const WHITESMOKE: Self = Self(Rgba8::opaque(245, 245, 245));

    /// The underlying channels.
    pub fn rgba(self) -> Rgba8 {
        self.0
    }
}

impl FromStr for Color {
    type Err = PaticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        if let Some(hex) = key.strip_prefix('#') {
            return parse_hex(hex).map(Self).ok_or_else(|| color_error(s));
        }
        NAMED
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, rgba)| Self(*rgba))
            .ok_or_else(|| color_error(s))
    }
}

impl TryFrom<String> for Color {
    type Error = PaticError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rgba8 { r, g, b, a } = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let a = if hex.len() == 8 { byte(6)? } else { 255 };
    Some(Rgba8 {
        r: byte(0)?,
        g: byte(2)?,
        b: byte(4)?,
        a,
    })
}

fn color_error(value: &str) -> PaticError {
    let mut allowed: Vec<&str> = NAMED.iter().map(|(n, _)| *n).collect();
    allowed.extend(["#rrggbb", "#rrggbbaa"]);
    PaticError::domain("color", value, &allowed)
}

/// Built-in piecewise-linear colormaps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Colormap {
    /// Cyclic light-blue-dark-red-light map; suits phases.
    #[default]
    Twilight,
    /// `twilight` reversed and rotated by half a period (dark at both ends).
    TwilightShifted,
    /// Perceptually uniform sequential map.
    Viridis,
    /// Cyclic hue wheel.
    Hsv,
    /// Black to white.
    Gray,
    /// Diverging blue to red.
    Coolwarm,
}

type Stop = (f64, [u8; 3]);

const TWILIGHT: &[Stop] = &[
    (0.0, [226, 217, 226]),
    (0.125, [163, 180, 204]),
    (0.25, [96, 126, 188]),
    (0.375, [93, 67, 165]),
    (0.5, [47, 20, 55]),
    (0.625, [121, 38, 91]),
    (0.75, [180, 84, 77]),
    (0.875, [207, 151, 128]),
    (1.0, [226, 217, 226]),
];

const VIRIDIS: &[Stop] = &[
    (0.0, [68, 1, 84]),
    (0.125, [71, 44, 122]),
    (0.25, [59, 82, 139]),
    (0.375, [44, 114, 142]),
    (0.5, [33, 145, 140]),
    (0.625, [40, 174, 128]),
    (0.75, [94, 201, 98]),
    (0.875, [173, 220, 48]),
    (1.0, [253, 231, 37]),
];

const HSV: &[Stop] = &[
    (0.0, [255, 0, 0]),
    (1.0 / 6.0, [255, 255, 0]),
    (2.0 / 6.0, [0, 255, 0]),
    (3.0 / 6.0, [0, 255, 255]),
    (4.0 / 6.0, [0, 0, 255]),
    (5.0 / 6.0, [255, 0, 255]),
    (1.0, [255, 0, 0]),
];

const GRAY: &[Stop] = &[(0.0, [0, 0, 0]), (1.0, [255, 255, 255])];

const COOLWARM: &[Stop] = &[
    (0.0, [59, 76, 192]),
    (0.25, [141, 176, 254]),
    (0.5, [221, 221, 221]),
    (0.75, [244, 154, 123]),
    (1.0, [180, 4, 38]),
];

impl Colormap {
    /// Every supported name, in declaration order.
    pub const NAMES: [&'static str; 6] = [
        "twilight",
        "twilight_shifted",
        "viridis",
        "hsv",
        "gray",
        "coolwarm",
    ];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Twilight => "twilight",
            Self::TwilightShifted => "twilight_shifted",
            Self::Viridis => "viridis",
            Self::Hsv => "hsv",
            Self::Gray => "gray",
            Self::Coolwarm => "coolwarm",
        }
    }

    /// Opaque color at `t ∈ [0,1]`. Out-of-range or NaN inputs clamp to the ends.
    pub fn sample(self, t: f64) -> Rgba8 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Twilight => interpolate(TWILIGHT, t),
            Self::TwilightShifted => interpolate(TWILIGHT, (1.5 - t).rem_euclid(1.0)),
            Self::Viridis => interpolate(VIRIDIS, t),
            Self::Hsv => interpolate(HSV, t),
            Self::Gray => interpolate(GRAY, t),
            Self::Coolwarm => interpolate(COOLWARM, t),
        }
    }
}

impl FromStr for Colormap {
    type Err = PaticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twilight" => Ok(Self::Twilight),
            "twilight_shifted" => Ok(Self::TwilightShifted),
            "viridis" => Ok(Self::Viridis),
            "hsv" => Ok(Self::Hsv),
            "gray" | "grey" => Ok(Self::Gray),
            "coolwarm" => Ok(Self::Coolwarm),
            _ => Err(PaticError::domain("colormap", s, &Self::NAMES)),
        }
    }
}

impl TryFrom<String> for Colormap {
    type Error = PaticError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Colormap> for String {
    fn from(c: Colormap) -> Self {
        c.name().to_owned()
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn interpolate(stops: &[Stop], t: f64) -> Rgba8 {
    let upper = stops
        .iter()
        .position(|(pos, _)| *pos >= t)
        .unwrap_or(stops.len() - 1);
    if upper == 0 {
        let [r, g, b] = stops[0].1;
        return Rgba8::opaque(r, g, b);
    }
    let (p0, c0) = stops[upper - 1];
    let (p1, c1) = stops[upper];
    let f = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
    let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * f).round() as u8;
    Rgba8::opaque(lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2]))
}

/// Linear map of `[vmin, vmax]` onto `[0,1]`, clamping outside values.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Normalize {
    /// Value mapped to 0.
    pub vmin: f64,
    /// Value mapped to 1.
    pub vmax: f64,
}

impl Normalize {
    /// Normalizer over `[vmin, vmax]`.
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// Normalize `v`. Degenerate ranges map every value to 0.5.
    pub fn apply(self, v: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if self.is_degenerate() {
            return 0.5;
        }
        ((v - self.vmin) / span).clamp(0.0, 1.0)
    }

    /// `true` when `vmax ≤ vmin`.
    pub fn is_degenerate(self) -> bool {
        let span = self.vmax - self.vmin;
        span.is_nan() || span <= 0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/colormap/mod.rs"]
mod tests;
