use super::*;
use crate::colormap::Colormap;
use crate::config::model::Layout;
use crate::foundation::core::FrameIndex;
use crate::grid::builder::{CoordSpec, GridState, Limits};
use crate::render::scene::{FigureLayout, FrameLayers, FrameScene, MeshGeometry, PanelLayers};

fn single_panel() -> FrameScene {
    let grid = GridState::from_specs(
        Some(&CoordSpec::limits(0.0, 2.0)),
        Some(&CoordSpec::limits(0.0, 1.0)),
        Some((2, 3)),
    )
    .unwrap();
    let mesh = Arc::new(MeshGeometry::from_grid(&grid.grid().unwrap()));
    let layout = FigureLayout::for_layout(Layout::Single);
    FrameScene {
        layout: Layout::Single,
        width_in: layout.width_in,
        height_in: layout.height_in,
        face_color: Rgba8::opaque(245, 245, 245),
        panels: vec![PanelScene {
            frame: layout.panels[0],
            x_limits: Limits { min: 0.0, max: 2.0 },
            y_limits: Limits { min: 0.0, max: 1.0 },
            mesh: Some(mesh),
        }],
    }
}

fn shaded(shade: u8) -> FrameLayers {
    FrameLayers {
        frame: FrameIndex(0),
        panels: vec![PanelLayers {
            mesh: Some(MeshLayer {
                colors: vec![Rgba8::opaque(shade, shade, shade); 6],
            }),
            legend: Some(Legend::linear(Colormap::Gray, 0.0, 1.0)),
            ..PanelLayers::default()
        }],
    }
}

#[test]
fn rejects_non_positive_dpi() {
    assert!(matches!(CpuRasterizer::new(0.0), Err(PaticError::Range(_))));
    assert!(CpuRasterizer::new(f64::NAN).is_err());
}

#[test]
fn canvas_follows_figure_inches() {
    let r = CpuRasterizer::new(10.0).unwrap();
    let live = LiveScene::new(single_panel());
    assert_eq!(r.canvas(&live), Canvas { width: 120, height: 100 });
}

#[test]
fn empty_scene_paints_face_color_inside_axes() {
    let mut r = CpuRasterizer::new(10.0).unwrap();
    let live = LiveScene::new(single_panel());
    let frame = r.render(&live).unwrap();
    assert!(frame.premultiplied);
    assert_eq!(frame.data.len(), 120 * 100 * 4);
    assert_eq!(frame.pixel(54, 49), Some([245, 245, 245, 255]));
    assert_eq!(frame.pixel(1, 1), Some([255, 255, 255, 255]));
}

#[test]
fn mesh_cells_cover_the_axes_and_margins_stay_white() {
    let mut r = CpuRasterizer::new(10.0).unwrap();
    let mut live = LiveScene::new(single_panel());
    live.apply(shaded(10)).unwrap();
    let frame = r.render(&live).unwrap();
    assert_eq!(frame.pixel(30, 30), Some([10, 10, 10, 255]));
    assert_eq!(frame.pixel(80, 70), Some([10, 10, 10, 255]));
    assert_eq!(frame.pixel(1, 1), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(119, 99), Some([255, 255, 255, 255]));
}

#[test]
fn shared_cell_edges_leave_no_seams() {
    let mut r = CpuRasterizer::new(10.0).unwrap();
    let scene = single_panel();
    let axes = scene.panels[0].frame.axes;
    let mut live = LiveScene::new(scene);
    live.apply(shaded(10)).unwrap();
    let frame = r.render(&live).unwrap();

    // One pixel in from the spines, every pixel belongs to some cell.
    let (x0, x1) = ((axes.x0 * 10.0).ceil() as u32 + 1, (axes.x1 * 10.0).floor() as u32 - 1);
    let (y0, y1) = ((axes.y0 * 10.0).ceil() as u32 + 1, (axes.y1 * 10.0).floor() as u32 - 1);
    let off: Vec<_> = (y0..y1)
        .flat_map(|y| (x0..x1).map(move |x| (x, y)))
        .filter(|&(x, y)| frame.pixel(x, y) != Some([10, 10, 10, 255]))
        .collect();
    assert!(off.is_empty(), "{} off-color pixels, first {:?}", off.len(), off.first());
}

#[test]
fn translucent_cells_blend_once_over_face_color() {
    let mut r = CpuRasterizer::new(10.0).unwrap();
    let mut live = LiveScene::new(single_panel());
    let mut layers = shaded(0);
    for c in &mut layers.panels[0].mesh.as_mut().unwrap().colors {
        *c = Rgba8 { r: 0, g: 0, b: 0, a: 128 };
    }
    live.apply(layers).unwrap();
    let frame = r.render(&live).unwrap();
    let inside = frame.pixel(54, 49).unwrap();
    assert_eq!(inside[3], 255);
    assert!((121..=124).contains(&inside[0]), "{inside:?}");
}

#[test]
fn pixel_centers_on_shared_edges_pick_one_cell() {
    let left = [
        Point::new(0.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(2.0, 2.0),
        Point::new(0.0, 2.0),
    ];
    let right = left.map(|p| p + Vec2::new(2.0, 0.0));
    let on_edge = Point::new(2.0, 1.0);
    assert!(quad_contains(&left, on_edge) != quad_contains(&right, on_edge));
    assert!(quad_contains(&left, Point::new(1.0, 1.0)));
    assert!(!quad_contains(&left, Point::new(3.0, 1.0)));

    let (xs, ys) = pixel_span(&left, (0.0, 100.0), (0.0, 100.0)).unwrap();
    assert_eq!((xs, ys), (0..2, 0..2));
    assert!(pixel_span(&left, (50.0, 100.0), (0.0, 100.0)).is_none());
}

#[test]
fn margins_cover_slot_outside_axes() {
    let slot = Rect::new(0.0, 0.0, 10.0, 10.0);
    let axes = Rect::new(1.0, 2.0, 9.0, 8.0);
    let strips: Vec<_> = margins(slot, axes).collect();
    assert_eq!(strips.len(), 4);
    let area: f64 = strips.iter().map(|r| r.area()).sum();
    assert!((area - (100.0 - 48.0)).abs() < 1e-9);

    assert_eq!(margins(axes, axes).count(), 0);
}

#[test]
fn label_text_is_escaped() {
    assert_eq!(escape_xml("a<b & \"c\">"), "a&lt;b &amp; &quot;c&quot;&gt;");
    let labels = [Label {
        at: Point::new(1.0, 2.0),
        anchor: "start",
        text: "-π/2".to_string(),
    }];
    let svg = labels_svg(&labels, Canvas { width: 4, height: 4 }, 10.0);
    assert!(svg.contains(r#"text-anchor="start">-π/2</text>"#));
}

#[test]
fn data_transform_flips_y() {
    let panel = &single_panel().panels[0];
    let axes = Rect::new(10.0, 20.0, 110.0, 70.0);
    let a = data_to_px(panel, axes);
    assert_eq!(a * Point::new(0.0, 0.0), Point::new(10.0, 70.0));
    assert_eq!(a * Point::new(2.0, 1.0), Point::new(110.0, 20.0));
}
