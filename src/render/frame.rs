//! Builds scene skeletons and per-frame layers from a configuration and a field.

use std::sync::Arc;

use crate::colormap::Normalize;
use crate::config::model::{DisplayConfig, DisplayMode, Layout, SubType};
use crate::config::sizing::stride;
use crate::field::phase::FieldArray;
use crate::foundation::core::{FrameIndex, Point, Rgba8};
use crate::foundation::error::{PaticError, PaticResult};
use crate::foundation::math::finite_min_max;
use crate::glyph::geometry::{GlyphKind, GlyphShape};
use crate::grid::builder::CoordinateGrid;
use crate::render::complex::ComplexPhase;
use crate::render::legend::Legend;
use crate::render::scene::{
    Arrow, DirectorLayer, FigureLayout, FrameLayers, FrameScene, GlyphLayer, GlyphMark,
    MeshGeometry, MeshLayer, PanelLayers, PanelScene,
};

/// Field data as the renderer consumes it.
#[derive(Clone, Copy, Debug)]
pub enum FieldView<'a> {
    /// Orientations in degrees.
    Real(&'a FieldArray<f64>),
    /// Pre-decomposed complex field.
    Complex(&'a ComplexPhase),
}

/// Pure frame builder over borrowed animator state.
#[derive(Debug)]
pub struct FrameRenderer<'a> {
    kind: GlyphKind,
    config: &'a DisplayConfig,
    field: FieldView<'a>,
    grid: CoordinateGrid<'a>,
    sites: Vec<(usize, usize)>,
    field_range: (f64, f64),
}

impl<'a> FrameRenderer<'a> {
    /// Renderer for one session. `grid` must match the field's `(ny, nx)`.
    pub fn new(
        kind: GlyphKind,
        config: &'a DisplayConfig,
        field: FieldView<'a>,
        grid: CoordinateGrid<'a>,
    ) -> PaticResult<Self> {
        let ([_, ny, nx], field_range) = match field {
            FieldView::Real(values) => (
                values.shape(),
                finite_min_max(values.values().iter().copied()).unwrap_or((0.0, 1.0)),
            ),
            FieldView::Complex(phase) => (phase.shape(), phase.theta_range()),
        };
        if (ny, nx) != (grid.ny, grid.nx) {
            return Err(PaticError::precondition(format!(
                "coordinate grid is ({},{}) but the field is ({ny},{nx})",
                grid.ny, grid.nx
            )));
        }

        let sy = stride(ny, config.density.y);
        let sx = stride(nx, config.density.x);
        let sites = (0..ny)
            .step_by(sy)
            .flat_map(|r| (0..nx).step_by(sx).map(move |c| (r, c)))
            .collect();

        Ok(Self {
            kind,
            config,
            field,
            grid,
            sites,
            field_range,
        })
    }

    /// Number of frames.
    pub fn frame_count(&self) -> usize {
        match self.field {
            FieldView::Real(values) => values.nt(),
            FieldView::Complex(phase) => phase.shape()[0],
        }
    }

    /// Global color limits of the field layer.
    pub fn field_range(&self) -> (f64, f64) {
        self.field_range
    }

    /// Subsampled `(row, col)` glyph sites.
    pub fn sites(&self) -> &[(usize, usize)] {
        &self.sites
    }

    /// Panel arrangement actually used; complex fields always get a single panel.
    pub fn layout(&self) -> Layout {
        match self.field {
            FieldView::Real(_) => self.config.layout(),
            FieldView::Complex(_) => Layout::Single,
        }
    }

    /// Static skeleton: figure geometry, panel placement and mesh outlines.
    pub fn skeleton(&self) -> FrameScene {
        let layout = self.layout();
        let figure = FigureLayout::for_layout(layout);
        let mesh = Arc::new(MeshGeometry::from_grid(&self.grid));
        let complex = matches!(self.field, FieldView::Complex(_));
        let with_mesh = |panel: usize| {
            complex
                || match (layout, panel) {
                    (Layout::Single, _) => self.config.draws_field_mesh(),
                    (Layout::SideBySide, 0) => true,
                    _ => false,
                }
        };

        let panels = figure
            .panels
            .iter()
            .enumerate()
            .map(|(i, frame)| PanelScene {
                frame: *frame,
                x_limits: self.grid.x_limits,
                y_limits: self.grid.y_limits,
                mesh: with_mesh(i).then(|| Arc::clone(&mesh)),
            })
            .collect();

        FrameScene {
            layout,
            width_in: figure.width_in,
            height_in: figure.height_in,
            face_color: self.config.face_color.rgba(),
            panels,
        }
    }

    /// Layers of frame `t`, which must be `< frame_count()`.
    pub fn layers(&self, t: usize) -> FrameLayers {
        let colormap = self.config.colormap;
        let panels = match self.field {
            FieldView::Complex(phase) => vec![PanelLayers {
                mesh: Some(MeshLayer {
                    colors: phase.frame_colors(t, colormap),
                }),
                legend: Some(phase.legend(colormap)),
                ..PanelLayers::default()
            }],
            FieldView::Real(values) => self.real_layers(values.frame(t)),
        };
        FrameLayers {
            frame: FrameIndex(t),
            panels,
        }
    }

    fn real_layers(&self, frame: &[f64]) -> Vec<PanelLayers> {
        let cfg = self.config;
        let legend = (cfg.which != DisplayMode::OrderParameter)
            .then(|| Legend::linear(cfg.colormap, self.field_range.0, self.field_range.1));

        match self.layout() {
            Layout::Single => {
                let (glyphs, directors) = if cfg.which.shows_glyphs() {
                    self.glyph_layers(frame)
                } else {
                    (Vec::new(), None)
                };
                vec![PanelLayers {
                    mesh: cfg.draws_field_mesh().then(|| self.mesh_layer(frame)),
                    glyphs,
                    directors,
                    legend,
                }]
            }
            Layout::SideBySide => {
                let (glyphs, directors) = self.glyph_layers(frame);
                vec![
                    PanelLayers {
                        mesh: Some(self.mesh_layer(frame)),
                        legend,
                        ..PanelLayers::default()
                    },
                    PanelLayers {
                        glyphs,
                        directors,
                        ..PanelLayers::default()
                    },
                ]
            }
            Layout::OrderParameterOnly => {
                let (glyphs, directors) = self.glyph_layers(frame);
                vec![PanelLayers {
                    glyphs,
                    directors,
                    ..PanelLayers::default()
                }]
            }
        }
    }

    fn norm(&self) -> Normalize {
        Normalize::new(self.field_range.0, self.field_range.1)
    }

    fn mapped(&self, value: f64) -> Rgba8 {
        self.config.colormap.sample(self.norm().apply(value))
    }

    fn mesh_layer(&self, frame: &[f64]) -> MeshLayer {
        let alpha = self.config.field_alpha;
        let colors = frame
            .iter()
            .map(|&v| {
                if v.is_finite() {
                    self.mapped(v).with_alpha(alpha)
                } else {
                    Rgba8::TRANSPARENT
                }
            })
            .collect();
        MeshLayer { colors }
    }

    fn glyph_layers(&self, frame: &[f64]) -> (Vec<GlyphLayer>, Option<DirectorLayer>) {
        let cfg = self.config;
        let mapped = cfg.glyphs_colormapped();
        let nx = self.grid.nx;

        let values = self.sites.iter().filter_map(|&(r, c)| {
            let theta = frame[r * nx + c];
            let (x, y) = self.grid.site(r, c);
            theta.is_finite().then_some((Point::new(x, y), theta))
        });

        if self.kind == GlyphKind::Director {
            let color = |theta: f64| {
                if mapped {
                    self.mapped(theta)
                } else {
                    cfg.styles.point.color.rgba()
                }
            };
            let arrows = values
                .filter_map(|(at, theta)| match self.kind.shape(theta) {
                    GlyphShape::Director(direction) => Some(Arrow {
                        at,
                        direction,
                        color: color(theta),
                    }),
                    GlyphShape::Outlines(_) => None,
                })
                .collect();
            return (
                Vec::new(),
                Some(DirectorLayer {
                    length: self.arrow_length(),
                    arrows,
                }),
            );
        }

        let visible: Vec<SubType> = SubType::ALL
            .into_iter()
            .filter(|&sub| cfg.selection.shows(sub))
            .collect();
        let colormapped = |sub: SubType| {
            mapped
                && match sub {
                    SubType::Patch => true,
                    SubType::Point => self.kind == GlyphKind::Line,
                    SubType::Tick => false,
                }
        };

        let mut layers: Vec<GlyphLayer> = visible
            .iter()
            .map(|&sub| {
                let style = cfg.styles.get(sub);
                GlyphLayer {
                    sub_type: sub,
                    filled: sub == SubType::Patch,
                    linewidth: style.linewidth,
                    radius: 0.5 * cfg.styles.size.max(0.0).sqrt(),
                    marks: Vec::with_capacity(self.sites.len()),
                }
            })
            .collect();

        for (at, theta) in values {
            let GlyphShape::Outlines(outlines) = self.kind.shape(theta) else {
                continue;
            };
            for layer in &mut layers {
                let sub = layer.sub_type;
                let style = cfg.styles.get(sub);
                let base = if colormapped(sub) {
                    self.mapped(theta)
                } else {
                    style.color.rgba()
                };
                let outline = match sub {
                    SubType::Patch => outlines.patch.clone(),
                    SubType::Point => outlines.point.clone(),
                    SubType::Tick => outlines.tick.clone(),
                };
                layer.marks.push(GlyphMark {
                    at,
                    outline,
                    color: base.with_alpha(style.alpha),
                });
            }
        }
        (layers, None)
    }

    /// Auto-scaled arrow length: the x span over `1.8·max(10, √N)` for `N` arrows.
    fn arrow_length(&self) -> f64 {
        let span = self.grid.x_limits.max - self.grid.x_limits.min;
        let n = (self.sites.len() as f64).sqrt().max(10.0);
        span / (1.8 * n)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
