//! Pure per-frame scene description and the live state it is diffed into.
//!
//! [`FrameScene`] is the static skeleton built once per session (figure geometry, panel
//! placement, mesh cell outlines). [`FrameLayers`] is everything that changes between frames.
//! [`LiveScene::apply`] swaps in a new set of layers and reports which of them actually changed.

use std::sync::Arc;

use crate::config::model::{Layout, SubType};
use crate::foundation::core::{BezPath, FrameIndex, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{PaticError, PaticResult};
use crate::grid::builder::{CoordinateGrid, Limits};
use crate::render::legend::Legend;

/// Placement of one panel on the figure, in inches from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelFrame {
    /// Region of the figure owned by this panel; slots tile the figure.
    pub slot: Rect,
    /// Plot area.
    pub axes: Rect,
    /// Colorbar strip, when the panel carries one.
    pub colorbar: Option<Rect>,
}

/// Figure size and panel placement for a [`Layout`].
#[derive(Clone, Debug, PartialEq)]
pub struct FigureLayout {
    /// Width in inches.
    pub width_in: f64,
    /// Height in inches.
    pub height_in: f64,
    /// Panels, left to right.
    pub panels: Vec<PanelFrame>,
}

impl FigureLayout {
    const HEIGHT: f64 = 10.0;
    const TOP: f64 = 0.4;
    const BOTTOM: f64 = 9.45;
    const LEFT: f64 = 0.75;

    /// Geometry of `layout`: 12×10 in for one panel, 24×10 in side by side, 10×10 in glyphs-only.
    pub fn for_layout(layout: Layout) -> Self {
        match layout {
            Layout::Single => Self {
                width_in: 12.0,
                height_in: Self::HEIGHT,
                panels: vec![Self::field_panel(0.0)],
            },
            Layout::SideBySide => Self {
                width_in: 24.0,
                height_in: Self::HEIGHT,
                panels: vec![
                    Self::field_panel(0.0),
                    PanelFrame {
                        slot: Rect::new(12.0, 0.0, 24.0, Self::HEIGHT),
                        axes: Rect::new(12.0 + Self::LEFT, Self::TOP, 23.4, Self::BOTTOM),
                        colorbar: None,
                    },
                ],
            },
            Layout::OrderParameterOnly => Self {
                width_in: 10.0,
                height_in: Self::HEIGHT,
                panels: vec![PanelFrame {
                    slot: Rect::new(0.0, 0.0, 10.0, Self::HEIGHT),
                    axes: Rect::new(Self::LEFT, Self::TOP, 9.4, Self::BOTTOM),
                    colorbar: None,
                }],
            },
        }
    }

    fn field_panel(x0: f64) -> PanelFrame {
        PanelFrame {
            slot: Rect::new(x0, 0.0, x0 + 12.0, Self::HEIGHT),
            axes: Rect::new(x0 + Self::LEFT, Self::TOP, x0 + 10.05, Self::BOTTOM),
            colorbar: Some(Rect::new(x0 + 10.25, Self::TOP, x0 + 10.6, Self::BOTTOM)),
        }
    }
}

/// Cell outlines of a nearest-shaded mesh: one quadrilateral per lattice site.
///
/// Cell corners sit halfway between neighbouring sites; border cells extend by half their
/// neighbour spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshGeometry {
    ny: usize,
    nx: usize,
    corners: Vec<Point>,
}

impl MeshGeometry {
    /// Cell outlines for every site of `grid`.
    pub fn from_grid(grid: &CoordinateGrid<'_>) -> Self {
        let (ny, nx) = (grid.ny, grid.nx);
        let xs = widen(&widen_rows(grid.x, ny, nx), ny, nx + 1);
        let ys = widen(&widen_rows(grid.y, ny, nx), ny, nx + 1);
        let corners = xs.into_iter().zip(ys).map(|(x, y)| Point::new(x, y)).collect();
        Self { ny, nx, corners }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.ny * self.nx
    }

    /// `(ny, nx)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// Corners of the cell around site `(row, col)` in data coordinates, in outline order.
    pub fn corners(&self, row: usize, col: usize) -> [Point; 4] {
        let w = self.nx + 1;
        let at = |r: usize, c: usize| self.corners[r * w + c];
        [
            at(row, col),
            at(row, col + 1),
            at(row + 1, col + 1),
            at(row + 1, col),
        ]
    }
}

/// `(ny, nx)` → `(ny, nx+1)` midpoints along each row.
fn widen_rows(v: &[f64], ny: usize, nx: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(ny * (nx + 1));
    for row in v.chunks_exact(nx) {
        out.extend(edges(row));
    }
    out
}

/// `(ny, w)` → `(ny+1, w)` midpoints along each column.
fn widen(v: &[f64], ny: usize, w: usize) -> Vec<f64> {
    let mut out = vec![0.0; (ny + 1) * w];
    let mut column = Vec::with_capacity(ny);
    for c in 0..w {
        column.clear();
        column.extend((0..ny).map(|r| v[r * w + c]));
        for (r, e) in edges(&column).into_iter().enumerate() {
            out[r * w + c] = e;
        }
    }
    out
}

fn edges(samples: &[f64]) -> Vec<f64> {
    let n = samples.len();
    if n == 1 {
        return vec![samples[0] - 0.5, samples[0] + 0.5];
    }
    let mut out = Vec::with_capacity(n + 1);
    out.push(samples[0] - (samples[1] - samples[0]) / 2.0);
    out.extend(samples.windows(2).map(|w| (w[0] + w[1]) / 2.0));
    out.push(samples[n - 1] + (samples[n - 1] - samples[n - 2]) / 2.0);
    out
}

/// Static part of one panel.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelScene {
    /// Placement on the figure.
    pub frame: PanelFrame,
    /// Visible x range.
    pub x_limits: Limits,
    /// Visible y range.
    pub y_limits: Limits,
    /// Mesh cell outlines when this panel draws a field layer.
    pub mesh: Option<Arc<MeshGeometry>>,
}

/// Static skeleton of a rendering session.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameScene {
    /// Panel arrangement.
    pub layout: Layout,
    /// Figure width in inches.
    pub width_in: f64,
    /// Figure height in inches.
    pub height_in: f64,
    /// Background of every plot area.
    pub face_color: Rgba8,
    /// Panels, left to right.
    pub panels: Vec<PanelScene>,
}

/// Per-site colors of a field mesh, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshLayer {
    /// Straight-alpha colors, one per cell.
    pub colors: Vec<Rgba8>,
}

/// One glyph instance.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphMark {
    /// Site position in data coordinates.
    pub at: Point,
    /// Unit outline (y-up, radius 1), already oriented.
    pub outline: BezPath,
    /// Straight-alpha color, layer opacity included.
    pub color: Rgba8,
}

/// Every visible glyph of one sub-type.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphLayer {
    /// Which outline this layer draws.
    pub sub_type: SubType,
    /// Fill the outline (patches) in addition to stroking it.
    pub filled: bool,
    /// Stroke width in points; `0` disables the stroke.
    pub linewidth: f64,
    /// Outline radius in points.
    pub radius: f64,
    /// Instances, in lattice order.
    pub marks: Vec<GlyphMark>,
}

/// One director arrow.
#[derive(Clone, Debug, PartialEq)]
pub struct Arrow {
    /// Arrow midpoint in data coordinates.
    pub at: Point,
    /// Unit direction.
    pub direction: Vec2,
    /// Fill color.
    pub color: Rgba8,
}

/// All director arrows of a panel.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectorLayer {
    /// Arrow length in data units.
    pub length: f64,
    /// Arrows, in lattice order.
    pub arrows: Vec<Arrow>,
}

/// Everything drawn inside one panel for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelLayers {
    /// Field mesh colors.
    pub mesh: Option<MeshLayer>,
    /// Visible glyph layers, bottom to top. Hidden sub-types are absent.
    pub glyphs: Vec<GlyphLayer>,
    /// Director arrows (`p = 1`).
    pub directors: Option<DirectorLayer>,
    /// Colorbar.
    pub legend: Option<Legend>,
}

impl PanelLayers {
    fn glyph(&self, sub: SubType) -> Option<&GlyphLayer> {
        self.glyphs.iter().find(|g| g.sub_type == sub)
    }
}

/// The changing part of a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameLayers {
    /// Frame these layers belong to.
    pub frame: FrameIndex,
    /// One entry per panel of the skeleton.
    pub panels: Vec<PanelLayers>,
}

/// Identifies one replaceable element of a panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerSlot {
    /// Field mesh colors.
    Mesh,
    /// Glyph layer of a sub-type.
    Glyphs(SubType),
    /// Director arrows.
    Directors,
    /// Colorbar.
    Legend,
}

/// Outcome of [`LiveScene::apply`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneDiff {
    /// `(panel, slot)` pairs that were created or replaced.
    pub replaced: Vec<(usize, LayerSlot)>,
    /// `(panel, slot)` pairs that no longer exist.
    pub removed: Vec<(usize, LayerSlot)>,
}

impl SceneDiff {
    /// `true` when nothing changed.
    pub fn is_empty(&self) -> bool {
        self.replaced.is_empty() && self.removed.is_empty()
    }
}

/// Drawable state: a skeleton plus the most recently applied layers.
#[derive(Clone, Debug)]
pub struct LiveScene {
    scene: FrameScene,
    current: Option<FrameLayers>,
}

impl LiveScene {
    /// Empty live state over `scene`.
    pub fn new(scene: FrameScene) -> Self {
        Self {
            scene,
            current: None,
        }
    }

    /// The static skeleton.
    pub fn scene(&self) -> &FrameScene {
        &self.scene
    }

    /// Layers currently on display.
    pub fn layers(&self) -> Option<&FrameLayers> {
        self.current.as_ref()
    }

    /// Replace the current layers with `next`, returning what changed.
    ///
    /// Fails without touching the live state when `next` does not fit the skeleton.
    pub fn apply(&mut self, next: FrameLayers) -> PaticResult<SceneDiff> {
        self.check(&next)?;

        let empty = PanelLayers::default();
        let mut diff = SceneDiff::default();
        for (i, new) in next.panels.iter().enumerate() {
            let old = self
                .current
                .as_ref()
                .and_then(|c| c.panels.get(i))
                .unwrap_or(&empty);

            track(&mut diff, i, LayerSlot::Mesh, old.mesh.as_ref(), new.mesh.as_ref());
            for sub in SubType::ALL {
                track(
                    &mut diff,
                    i,
                    LayerSlot::Glyphs(sub),
                    old.glyph(sub),
                    new.glyph(sub),
                );
            }
            track(
                &mut diff,
                i,
                LayerSlot::Directors,
                old.directors.as_ref(),
                new.directors.as_ref(),
            );
            track(&mut diff, i, LayerSlot::Legend, old.legend.as_ref(), new.legend.as_ref());
        }

        tracing::trace!(
            frame = next.frame.0,
            replaced = diff.replaced.len(),
            removed = diff.removed.len(),
            "scene updated"
        );
        self.current = Some(next);
        Ok(diff)
    }

    fn check(&self, next: &FrameLayers) -> PaticResult<()> {
        if next.panels.len() != self.scene.panels.len() {
            return Err(PaticError::render(format!(
                "frame has {} panel layer set(s), scene has {} panel(s)",
                next.panels.len(),
                self.scene.panels.len()
            )));
        }
        for (i, (layers, panel)) in next.panels.iter().zip(&self.scene.panels).enumerate() {
            let Some(mesh) = &layers.mesh else {
                continue;
            };
            let Some(geometry) = &panel.mesh else {
                return Err(PaticError::render(format!(
                    "panel {i} received mesh colors but has no mesh"
                )));
            };
            if mesh.colors.len() != geometry.len() {
                return Err(PaticError::render(format!(
                    "panel {i} mesh has {} cell(s), got {} color(s)",
                    geometry.len(),
                    mesh.colors.len()
                )));
            }
        }
        Ok(())
    }
}

fn track<T: PartialEq>(
    diff: &mut SceneDiff,
    panel: usize,
    slot: LayerSlot,
    old: Option<&T>,
    new: Option<&T>,
) {
    match (old, new) {
        (Some(a), Some(b)) if a == b => {}
        (_, Some(_)) => diff.replaced.push((panel, slot)),
        (Some(_), None) => diff.removed.push((panel, slot)),
        (None, None) => {}
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
