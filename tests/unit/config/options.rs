use super::*;

#[test]
fn empty_document_yields_no_changes() {
    let opts = AnimatorOptions::from_json("{}").unwrap();
    assert_eq!(opts, AnimatorOptions::default());
    assert!(opts.changes().is_empty());
}

#[test]
fn changes_follow_fixed_order() {
    let opts = AnimatorOptions::from_json(
        r##"{
            "transparencies": { "patch": 0.3 },
            "mode": 2,
            "which": "Both",
            "colors": { "tick": "b", "point": "#00ff00" },
            "density": 0.2,
            "marker_type": "patch & tick"
        }"##,
    )
    .unwrap();
    let changes = opts.changes();
    assert_eq!(
        changes,
        vec![
            ConfigChange::Which(DisplayMode::Both),
            ConfigChange::Mode(CompositingMode::MappedOverField),
            ConfigChange::Density(0.2, Axis::Both),
            ConfigChange::Selection(GlyphSelection::PatchTick),
            ConfigChange::Color(SubType::Point, "#00ff00".parse().unwrap()),
            ConfigChange::Color(SubType::Tick, "b".parse().unwrap()),
            ConfigChange::Transparency(SubType::Patch, 0.3),
        ]
    );
}

#[test]
fn invalid_option_values_are_rejected() {
    assert!(AnimatorOptions::from_json(r#"{"which": "all"}"#).is_err());
    assert!(AnimatorOptions::from_json(r#"{"mode": 7}"#).is_err());
    assert!(AnimatorOptions::from_json(r#"{"colors": {"edge": "k"}}"#).is_err());
    assert!(AnimatorOptions::from_json(r#"{"unknown": 1}"#).is_err());
}

#[test]
fn colormap_and_face_color_parse() {
    let opts =
        AnimatorOptions::from_json(r#"{"colormap": "viridis", "face_color": "white"}"#).unwrap();
    assert_eq!(
        opts.changes(),
        vec![
            ConfigChange::Colormap(Colormap::Viridis),
            ConfigChange::FaceColor(Color::WHITE),
        ]
    );
}
