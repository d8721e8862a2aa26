use super::*;
use crate::colormap::{Color, Colormap};
use crate::config::resolve::{ConfigChange, ResolveContext, resolve};
use crate::config::model::{CompositingMode, GlyphSelection, Grouping, MarkerDensity};
use crate::grid::builder::{CoordSpec, GridState};
use crate::render::scene::LayerSlot;

fn grid(ny: usize, nx: usize) -> GridState {
    GridState::from_specs(Some(&CoordSpec::limits(0.0, 1.0)), None, Some((ny, nx))).unwrap()
}

fn ramp(nt: usize, ny: usize, nx: usize) -> FieldArray<f64> {
    let data = (0..nt * ny * nx).map(|i| i as f64).collect();
    FieldArray::from_shape_vec(&[nt, ny, nx], data).unwrap()
}

fn both_together(mode: CompositingMode) -> DisplayConfig {
    DisplayConfig {
        which: DisplayMode::Both,
        grouping: Grouping::Together,
        mode,
        ..DisplayConfig::default()
    }
}

#[test]
fn sites_follow_density_strides() {
    let cfg = DisplayConfig::default();
    let field = ramp(1, 20, 20);
    let g = grid(20, 20);
    let r = FrameRenderer::new(
        GlyphKind::for_degree(3).unwrap(),
        &cfg,
        FieldView::Real(&field),
        g.grid().unwrap(),
    )
    .unwrap();
    // density 0.1 on 20 sites: 2 glyphs per axis, stride 10.
    assert_eq!(r.sites(), &[(0, 0), (0, 10), (10, 0), (10, 10)]);
    assert_eq!(r.field_range(), (0.0, 399.0));
}

#[test]
fn mismatched_grid_is_a_precondition_error() {
    let cfg = DisplayConfig::default();
    let field = ramp(1, 4, 5);
    let g = grid(5, 4);
    let err = FrameRenderer::new(
        GlyphKind::Line,
        &cfg,
        FieldView::Real(&field),
        g.grid().unwrap(),
    )
    .unwrap_err();
    assert!(matches!(err, PaticError::Precondition(_)));
}

#[test]
fn phase_field_only_draws_mesh_and_legend() {
    let cfg = DisplayConfig::default();
    let field = ramp(2, 4, 4);
    let g = grid(4, 4);
    let r = FrameRenderer::new(
        GlyphKind::for_degree(4).unwrap(),
        &cfg,
        FieldView::Real(&field),
        g.grid().unwrap(),
    )
    .unwrap();
    let scene = r.skeleton();
    assert_eq!(scene.layout, Layout::Single);
    assert!(scene.panels[0].mesh.is_some());

    let layers = r.layers(1);
    assert_eq!(layers.frame, FrameIndex(1));
    let panel = &layers.panels[0];
    assert_eq!(panel.mesh.as_ref().unwrap().colors.len(), 16);
    assert!(panel.glyphs.is_empty());
    assert!(panel.directors.is_none());
    let legend = panel.legend.as_ref().unwrap();
    assert_eq!((legend.vmin, legend.vmax), (0.0, 31.0));
}

#[test]
fn mapped_mode_colors_patches_from_field_and_drops_mesh() {
    let mut cfg = both_together(CompositingMode::Mapped);
    cfg.selection = GlyphSelection::PatchTick;
    cfg.colormap = Colormap::Viridis;
    cfg.density = MarkerDensity { x: 0.5, y: 0.5 };
    let field = ramp(1, 10, 10);
    let g = grid(10, 10);
    let r = FrameRenderer::new(
        GlyphKind::for_degree(3).unwrap(),
        &cfg,
        FieldView::Real(&field),
        g.grid().unwrap(),
    )
    .unwrap();
    assert!(r.skeleton().panels[0].mesh.is_none());

    let panel = &r.layers(0).panels[0];
    assert!(panel.mesh.is_none());
    assert!(panel.legend.is_some());
    let subs: Vec<_> = panel.glyphs.iter().map(|g| g.sub_type).collect();
    assert_eq!(subs, [SubType::Patch, SubType::Tick]);

    let patch = &panel.glyphs[0];
    assert!(patch.filled);
    let first = patch.marks.first().unwrap();
    let last = patch.marks.last().unwrap();
    assert_ne!(first.color.r, last.color.r);
    let tick = &panel.glyphs[1];
    assert!(tick.marks.iter().all(|m| m.color == Rgba8::opaque(255, 0, 0)));
}

#[test]
fn explicit_patch_color_yields_to_colormap_in_mapped_modes() {
    let kind = GlyphKind::for_degree(4).unwrap();
    let ctx = ResolveContext {
        kind,
        dims: Some((10, 10)),
        grid_complete: true,
    };
    let green: Color = "g".parse().unwrap();
    let field = ramp(1, 10, 10);
    let g = grid(10, 10);

    for mode in [CompositingMode::Mapped, CompositingMode::MappedOverField] {
        let mapped = resolve(
            &DisplayConfig::default(),
            &ConfigChange::Which(DisplayMode::Both),
            &ctx,
        )
        .and_then(|cfg| resolve(&cfg, &ConfigChange::Mode(mode), &ctx))
        .unwrap();
        let recolored = resolve(&mapped, &ConfigChange::Color(SubType::Patch, green), &ctx).unwrap();
        assert_eq!(recolored.styles.patch.color, green);

        let patches = |cfg: &DisplayConfig| {
            let r = FrameRenderer::new(kind, cfg, FieldView::Real(&field), g.grid().unwrap())
                .unwrap();
            let layers = r.layers(0);
            let patch = layers.panels[0]
                .glyphs
                .iter()
                .find(|l| l.sub_type == SubType::Patch)
                .unwrap()
                .clone();
            patch.marks.into_iter().map(|m| m.color).collect::<Vec<_>>()
        };
        let colors = patches(&recolored);
        assert!(!colors.is_empty());
        assert_eq!(colors, patches(&mapped), "{mode:?}");
        assert!(colors.iter().all(|c| (c.r, c.g, c.b) != (0, 128, 0)), "{mode:?}");
    }
}

#[test]
fn glyph_alpha_and_radius_follow_styles() {
    let mut cfg = DisplayConfig {
        which: DisplayMode::OrderParameter,
        ..DisplayConfig::default()
    };
    cfg.styles.size = 400.0;
    let field = ramp(1, 10, 10);
    let g = grid(10, 10);
    let r = FrameRenderer::new(
        GlyphKind::for_degree(5).unwrap(),
        &cfg,
        FieldView::Real(&field),
        g.grid().unwrap(),
    )
    .unwrap();
    let panel = &r.layers(0).panels[0];
    assert!(panel.legend.is_none());
    assert_eq!(panel.glyphs.len(), 3);
    let patch = &panel.glyphs[0];
    assert_eq!(patch.radius, 10.0);
    assert_eq!(patch.marks[0].color, Rgba8::opaque(0, 0, 0).with_alpha(0.5));
}

#[test]
fn nematic_mapped_points_follow_the_field() {
    let mut cfg = both_together(CompositingMode::MappedOverField);
    cfg.colormap = Colormap::Viridis;
    cfg.density = MarkerDensity { x: 0.5, y: 0.5 };
    let field = ramp(1, 10, 10);
    let g = grid(10, 10);
    let r = FrameRenderer::new(
        GlyphKind::Line,
        &cfg,
        FieldView::Real(&field),
        g.grid().unwrap(),
    )
    .unwrap();
    let panel = &r.layers(0).panels[0];
    assert!(panel.mesh.is_some());
    let point = panel
        .glyphs
        .iter()
        .find(|g| g.sub_type == SubType::Point)
        .unwrap();
    let distinct: std::collections::HashSet<_> = point.marks.iter().map(|m| m.color).collect();
    assert!(distinct.len() > 1);
}

#[test]
fn directors_replace_glyph_layers_for_degree_one() {
    let cfg = DisplayConfig {
        which: DisplayMode::Both,
        grouping: Grouping::Separate,
        ..DisplayConfig::default()
    };
    let data = vec![0.0; 100];
    let field = FieldArray::from_shape_vec(&[1, 10, 10], data).unwrap();
    let g = grid(10, 10);
    let r = FrameRenderer::new(
        GlyphKind::Director,
        &cfg,
        FieldView::Real(&field),
        g.grid().unwrap(),
    )
    .unwrap();
    let scene = r.skeleton();
    assert_eq!(scene.layout, Layout::SideBySide);
    assert!(scene.panels[0].mesh.is_some());
    assert!(scene.panels[1].mesh.is_none());

    let layers = r.layers(0);
    assert!(layers.panels[0].legend.is_some());
    let directors = layers.panels[1].directors.as_ref().unwrap();
    assert!(layers.panels[1].glyphs.is_empty());
    assert_eq!(directors.arrows.len(), r.sites().len());
    assert!((directors.arrows[0].direction.x - 1.0).abs() < 1e-12);
    assert_eq!(directors.arrows[0].color, Rgba8::opaque(0, 0, 0));
    assert!((directors.length - 1.0 / 18.0).abs() < 1e-12);
}

#[test]
fn non_finite_sites_are_skipped_and_transparent() {
    let cfg = DisplayConfig {
        which: DisplayMode::Both,
        ..DisplayConfig::default()
    };
    let mut data = vec![45.0; 100];
    data[0] = f64::NAN;
    let field = FieldArray::from_shape_vec(&[1, 10, 10], data).unwrap();
    let g = grid(10, 10);
    let r = FrameRenderer::new(
        GlyphKind::for_degree(3).unwrap(),
        &cfg,
        FieldView::Real(&field),
        g.grid().unwrap(),
    )
    .unwrap();
    let panel = &r.layers(0).panels[0];
    assert_eq!(panel.mesh.as_ref().unwrap().colors[0], Rgba8::TRANSPARENT);
    assert_eq!(panel.glyphs[0].marks.len(), r.sites().len() - 1);
}

#[test]
fn complex_field_renders_single_panel_with_phase_legend() {
    let cfg = DisplayConfig {
        which: DisplayMode::OrderParameter,
        ..DisplayConfig::default()
    };
    let data = (0..32)
        .map(|i| num_complex::Complex64::from_polar(1.0 + i as f64, i as f64 * 0.3))
        .collect();
    let field = FieldArray::from_shape_vec(&[2, 4, 4], data).unwrap();
    let phase = ComplexPhase::new(&field, 2);
    let g = grid(4, 4);
    let r = FrameRenderer::new(
        GlyphKind::Line,
        &cfg,
        FieldView::Complex(&phase),
        g.grid().unwrap(),
    )
    .unwrap();
    assert_eq!(r.frame_count(), 2);
    assert_eq!(r.layout(), Layout::Single);

    let mut live = crate::render::scene::LiveScene::new(r.skeleton());
    let diff = live.apply(r.layers(0)).unwrap();
    assert!(diff.replaced.contains(&(0, LayerSlot::Legend)));
    let diff = live.apply(r.layers(1)).unwrap();
    assert_eq!(diff.replaced, vec![(0, LayerSlot::Mesh)]);

    let legend = live.layers().unwrap().panels[0].legend.as_ref().unwrap();
    assert_eq!(legend.ticks[0].label, "-π/2");
    assert_eq!(legend.ticks[8].label, "π/2");
}
