use super::*;

#[test]
fn option_strings_parse_case_insensitively() {
    assert_eq!("PF".parse::<DisplayMode>().unwrap(), DisplayMode::PhaseField);
    assert_eq!("Both".parse::<DisplayMode>().unwrap(), DisplayMode::Both);
    assert_eq!("SEPARATE".parse::<Grouping>().unwrap(), Grouping::Separate);
    assert_eq!("2".parse::<CompositingMode>().unwrap(), CompositingMode::MappedOverField);
    assert_eq!(
        "Point&Tick".parse::<GlyphSelection>().unwrap(),
        GlyphSelection::PointTick
    );
    assert_eq!(
        "patch & point".parse::<GlyphSelection>().unwrap(),
        GlyphSelection::PatchPoint
    );
}

#[test]
fn out_of_domain_values_name_value_and_allowed_set() {
    let err = "everything".parse::<DisplayMode>().unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("domain error: which"));
    assert!(msg.contains("'everything'"));
    assert!(msg.contains("'pf', 'op', 'both'"));

    assert!(matches!(
        CompositingMode::try_from(3u8),
        Err(PaticError::Domain { option: "mode", .. })
    ));
    assert!("tick & patch & point".parse::<GlyphSelection>().is_err());
    assert!("side-by-side".parse::<Grouping>().is_err());
}

#[test]
fn selection_membership() {
    assert!(GlyphSelection::All.shows(SubType::Tick));
    assert!(GlyphSelection::PatchTick.shows(SubType::Patch));
    assert!(!GlyphSelection::PatchTick.shows(SubType::Point));
    assert!(!GlyphSelection::Point.shows(SubType::Patch));
}

#[test]
fn defaults_match_documented_styles() {
    let cfg = DisplayConfig::default();
    assert_eq!(cfg.which, DisplayMode::PhaseField);
    assert_eq!(cfg.grouping, Grouping::Together);
    assert_eq!(cfg.mode, CompositingMode::Solid);
    assert_eq!(cfg.selection, GlyphSelection::All);
    assert_eq!(cfg.styles.patch.color, Color::BLACK);
    assert_eq!(cfg.styles.patch.linewidth, 0.0);
    assert_eq!(cfg.styles.patch.alpha, 0.5);
    assert_eq!(cfg.styles.point.linewidth, 0.2);
    assert_eq!(cfg.styles.tick.color, Color::RED);
    assert_eq!(cfg.styles.tick.linewidth, 0.5);
    assert_eq!(cfg.density, MarkerDensity { x: 0.1, y: 0.1 });
    assert_eq!(cfg.colormap, Colormap::Twilight);
    assert_eq!(cfg.face_color, Color::WHITESMOKE);
}

#[test]
fn layout_and_layer_queries() {
    let mut cfg = DisplayConfig::default();
    assert_eq!(cfg.layout(), Layout::Single);
    assert!(cfg.draws_field_mesh());

    cfg.which = DisplayMode::OrderParameter;
    assert_eq!(cfg.layout(), Layout::OrderParameterOnly);
    assert!(!cfg.draws_field_mesh());

    cfg.which = DisplayMode::Both;
    cfg.grouping = Grouping::Separate;
    assert_eq!(cfg.layout(), Layout::SideBySide);

    cfg.grouping = Grouping::Together;
    cfg.mode = CompositingMode::Mapped;
    assert!(cfg.glyphs_colormapped());
    assert!(!cfg.draws_field_mesh());

    cfg.mode = CompositingMode::MappedOverField;
    assert!(cfg.draws_field_mesh());
}

#[test]
fn config_serializes_with_option_strings() {
    let cfg = DisplayConfig {
        which: DisplayMode::Both,
        mode: CompositingMode::Mapped,
        selection: GlyphSelection::PatchTick,
        ..DisplayConfig::default()
    };
    let json = serde_json::to_value(&cfg).unwrap();
    assert_eq!(json["which"], "both");
    assert_eq!(json["mode"], 1);
    assert_eq!(json["selection"], "patch & tick");
    let back: DisplayConfig = serde_json::from_value(json).unwrap();
    assert_eq!(back, cfg);
}
