use crate::colormap::{Color, Colormap};
use crate::config::model::{CompositingMode, DisplayMode, GlyphSelection, Grouping, SubType};
use crate::config::resolve::ConfigChange;
use crate::grid::builder::Axis;

/// Optional value per glyph layer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerSubType<T> {
    /// Polygon layer.
    pub patch: Option<T>,
    /// Asterisk layer.
    pub point: Option<T>,
    /// Tick layer.
    pub tick: Option<T>,
}

impl<T> Default for PerSubType<T> {
    fn default() -> Self {
        Self {
            patch: None,
            point: None,
            tick: None,
        }
    }
}

impl<T: Copy> PerSubType<T> {
    fn entries(&self) -> impl Iterator<Item = (SubType, T)> + '_ {
        SubType::ALL.into_iter().filter_map(|sub| {
            let v = match sub {
                SubType::Patch => self.patch,
                SubType::Point => self.point,
                SubType::Tick => self.tick,
            };
            v.map(|v| (sub, v))
        })
    }
}

/// JSON options document applied on top of the defaults.
///
/// Every field is optional. [`AnimatorOptions::changes`] emits the edits in a fixed order so that
/// explicit glyph overrides land after the mode cascades they would otherwise lose to.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimatorOptions {
    /// `pf`, `op` or `both`.
    pub which: Option<DisplayMode>,
    /// `separate` or `together`.
    pub grouping: Option<Grouping>,
    /// `0`, `1` or `2`.
    pub mode: Option<CompositingMode>,
    /// Colormap name.
    pub colormap: Option<Colormap>,
    /// Density applied to both axes.
    pub density: Option<f64>,
    /// Density along x, applied after `density`.
    pub density_x: Option<f64>,
    /// Density along y, applied after `density`.
    pub density_y: Option<f64>,
    /// Field layer opacity.
    pub field_transparency: Option<f64>,
    /// Visible glyph layers.
    pub marker_type: Option<GlyphSelection>,
    /// Per-layer colors.
    pub colors: PerSubType<Color>,
    /// Per-layer stroke widths.
    pub linewidths: PerSubType<f64>,
    /// Per-layer opacities.
    pub transparencies: PerSubType<f64>,
    /// Shared glyph size.
    pub size: Option<f64>,
    /// Panel background.
    pub face_color: Option<Color>,
    /// Export frame rate.
    pub fps: Option<u32>,
    /// Raster resolution in dots per inch.
    pub dpi: Option<f64>,
}

impl AnimatorOptions {
    /// Parse a JSON options document.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Configuration edits in application order.
    pub fn changes(&self) -> Vec<ConfigChange> {
        let mut out = Vec::new();
        out.extend(self.which.map(ConfigChange::Which));
        out.extend(self.grouping.map(ConfigChange::Grouping));
        out.extend(self.mode.map(ConfigChange::Mode));
        out.extend(self.colormap.map(ConfigChange::Colormap));
        out.extend(self.density.map(|d| ConfigChange::Density(d, Axis::Both)));
        out.extend(self.density_x.map(|d| ConfigChange::Density(d, Axis::X)));
        out.extend(self.density_y.map(|d| ConfigChange::Density(d, Axis::Y)));
        out.extend(self.field_transparency.map(ConfigChange::FieldTransparency));
        out.extend(self.marker_type.map(ConfigChange::Selection));
        out.extend(
            self.colors
                .entries()
                .map(|(sub, c)| ConfigChange::Color(sub, c)),
        );
        out.extend(
            self.linewidths
                .entries()
                .map(|(sub, lw)| ConfigChange::Linewidth(sub, lw)),
        );
        out.extend(
            self.transparencies
                .entries()
                .map(|(sub, a)| ConfigChange::Transparency(sub, a)),
        );
        out.extend(self.size.map(ConfigChange::Size));
        out.extend(self.face_color.map(ConfigChange::FaceColor));
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/options.rs"]
mod tests;
