use super::*;
use crate::encode::sink::InMemorySink;
use crate::foundation::core::FrameIndex;

fn ramp(nt: usize, ny: usize, nx: usize) -> PhaseField {
    let data = (0..nt * ny * nx).map(|i| (i % 180) as f64).collect();
    PhaseField::real(&[nt, ny, nx], data).unwrap()
}

fn low_res(p: u32, field: PhaseField) -> Animator {
    let mut a = Animator::new(p, Some(field), None, None).unwrap();
    a.set_dpi(5.0).unwrap();
    a
}

#[test]
fn degree_zero_is_a_shape_error() {
    let err = Animator::new(0, None, None, None).unwrap_err();
    assert!(matches!(err, PaticError::Shape(_)));
}

#[test]
fn preview_requires_a_field() {
    let a = Animator::new(3, None, Some(&CoordSpec::limits(0.0, 2.0)), None).unwrap();
    assert!(matches!(a.preview(None), Err(PaticError::Precondition(_))));
}

#[test]
fn preview_requires_both_axes() {
    let mut a = Animator::new(3, None, None, None).unwrap();
    a.set_grid(&CoordSpec::limits(0.0, 2.0), Axis::X).unwrap();
    a.set_field(ramp(1, 4, 4));
    assert!(a.grid().has_x());
    assert!(!a.grid().has_y());
    assert!(matches!(a.preview(None), Err(PaticError::Precondition(_))));

    a.set_grid(&CoordSpec::limits(0.0, 1.0), Axis::Y).unwrap();
    a.set_dpi(5.0).unwrap();
    assert!(a.preview(None).is_ok());
}

#[test]
fn preview_clamps_to_last_frame() {
    let a = low_res(3, ramp(5, 4, 4));
    let frame = a.preview(Some(100)).unwrap();
    assert_eq!(frame.index, FrameIndex(4));
    assert_eq!((frame.image.width, frame.image.height), (60, 50));
    assert_eq!(a.preview(None).unwrap().index, FrameIndex(0));
}

#[test]
fn new_field_re_derives_glyph_size() {
    let mut a = Animator::new(3, Some(ramp(1, 20, 20)), None, None).unwrap();
    assert_eq!(a.config().styles.size, 140.0);

    a.set_field(ramp(1, 10, 650));
    assert_eq!(a.grid().dims(), Some((10, 650)));
    assert_eq!(a.config().styles.size, 20.0);
}

#[test]
fn set_grid_does_not_resize_glyphs() {
    let mut a = Animator::new(3, Some(ramp(1, 20, 20)), None, None).unwrap();
    a.set_marker_size(77.0).unwrap();
    a.set_grid(&CoordSpec::limits(-1.0, 1.0), Axis::Both).unwrap();
    assert_eq!(a.config().styles.size, 77.0);
    assert_eq!(a.grid().x_limits().unwrap().min, -1.0);
}

#[test]
fn failed_setters_leave_state_untouched() {
    let mut a = Animator::new(3, Some(ramp(1, 20, 20)), None, None).unwrap();
    let before = a.config().clone();
    assert!(matches!(
        a.set_marker_density(-0.1, Axis::Both),
        Err(PaticError::Range(_))
    ));
    assert!(a.set_marker_size(-1.0).is_err());
    assert!(a.set_grid(&CoordSpec::limits(1.0, 0.0), Axis::X).is_err());
    assert_eq!(a.config(), &before);
    assert_eq!(a.grid().x_limits().unwrap().max, 1.0);
    assert!(a.set_dpi(0.0).is_err());
    assert_eq!(a.dpi(), DEFAULT_DPI);
}

#[test]
fn mode_switch_cascades_through_setters() {
    let mut a = Animator::new(3, Some(ramp(1, 20, 20)), None, None).unwrap();
    a.set_marker_transparency(SubType::Patch, 0.2).unwrap();
    a.set_which(DisplayMode::Both).unwrap();
    a.set_mode(CompositingMode::Mapped).unwrap();
    let cfg = a.config();
    assert_eq!(cfg.selection, GlyphSelection::Patch);
    assert_eq!(cfg.styles.patch.alpha, 1.0);
    assert_eq!(cfg.field_alpha, 0.25);

    a.set_pf_transparency(0.6).unwrap();
    assert_eq!(a.config().field_alpha, 0.6);
}

#[test]
fn options_apply_atomically() {
    let mut a = Animator::new(3, Some(ramp(1, 20, 20)), None, None).unwrap();
    let before = a.config().clone();
    let bad = AnimatorOptions::from_json(r#"{"which": "both", "mode": 1, "density": -1}"#).unwrap();
    assert!(a.apply_options(&bad).is_err());
    assert_eq!(a.config(), &before);

    let good =
        AnimatorOptions::from_json(r#"{"which": "both", "mode": 1, "fps": 24, "dpi": 50}"#)
            .unwrap();
    a.apply_options(&good).unwrap();
    assert_eq!(a.config().mode, CompositingMode::Mapped);
    assert_eq!(a.fps(), Fps::new(24, 1).unwrap());
    assert_eq!(a.dpi(), 50.0);
}

#[test]
fn render_into_streams_every_frame() {
    let mut a = low_res(2, ramp(3, 6, 6));
    a.set_fps(Fps::new(5, 1).unwrap());
    let mut sink = InMemorySink::new();
    assert_eq!(a.render_into(&mut sink).unwrap(), 3);

    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (60, 50));
    assert_eq!(cfg.fps.num, 5);
    let idx: Vec<_> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, [0, 1, 2]);
    assert!(sink.is_finished());
}

#[test]
fn session_rejects_out_of_order_frames() {
    let a = low_res(3, ramp(3, 4, 4));
    let mut session = FrameSession::initialize(&a).unwrap();
    session.advance(1).unwrap();
    assert!(session.advance(1).is_err());
    assert!(session.advance(3).is_err());

    let mut sink = InMemorySink::new();
    assert_eq!(session.finalize(&mut sink, a.fps()).unwrap(), 1);
    assert_eq!(sink.frames()[0].0, FrameIndex(2));
}

#[test]
fn complex_fields_preview() {
    let data = (0..2 * 4 * 4)
        .map(|i| num_complex::Complex64::from_polar(1.0 + f64::from(i), f64::from(i)))
        .collect();
    let field = PhaseField::complex(&[2, 4, 4], data).unwrap();
    let a = low_res(2, field);
    assert!(a.field().unwrap().is_complex());
    assert_eq!(a.preview(Some(1)).unwrap().index, FrameIndex(1));
}

#[test]
fn gif_export_is_timestamped() {
    let dir = std::env::temp_dir().join(format!("patic_animate_{}", std::process::id()));
    let mut a = low_res(3, ramp(2, 4, 4));
    a.set_dpi(2.0).unwrap();
    let path = a.animate(ExportFormat::Gif, &dir).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("PAA_"));
    assert!(name.ends_with(".gif"));
    assert!(path.is_file());
    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn failed_export_leaves_no_artifact() {
    let dir = std::env::temp_dir().join(format!("patic_animate_fail_{}", std::process::id()));
    let a = Animator::new(3, None, None, None).unwrap();
    assert!(a.animate(ExportFormat::Gif, &dir).is_err());
    assert!(!dir.exists() || std::fs::read_dir(&dir).unwrap().next().is_none());
}
