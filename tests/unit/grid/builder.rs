use super::*;

fn min_max(v: &[f64]) -> (f64, f64) {
    finite_min_max(v.iter().copied()).unwrap()
}

#[test]
fn limits_pair_produces_exact_extremes_and_shape() {
    for (lo, hi) in [(0.0, 1.0), (-3.5, 2.25), (10.0, 10.5)] {
        let spec = CoordSpec::limits(lo, hi);
        let g = GridState::from_specs(Some(&spec), Some(&spec), Some((7, 11))).unwrap();
        let grid = g.grid().unwrap();
        assert_eq!((grid.ny, grid.nx), (7, 11));
        assert_eq!(grid.x.len(), 77);
        assert_eq!(min_max(grid.x), (lo, hi));
        assert_eq!(min_max(grid.y), (lo, hi));
    }
}

#[test]
fn x_varies_along_columns_and_y_along_rows() {
    let g = GridState::from_specs(
        Some(&CoordSpec::limits(0.0, 2.0)),
        Some(&CoordSpec::limits(-1.0, 1.0)),
        Some((3, 5)),
    )
    .unwrap();
    let grid = g.grid().unwrap();
    assert_eq!(grid.site(0, 0), (0.0, -1.0));
    assert_eq!(grid.site(0, 4), (2.0, -1.0));
    assert_eq!(grid.site(2, 0), (0.0, 1.0));
    assert_eq!(grid.site(1, 2), (1.0, 0.0));
}

#[test]
fn single_axis_spec_is_replicated_onto_the_other_axis() {
    let g = GridState::from_specs(Some(&CoordSpec::limits(2.0, 4.0)), None, None).unwrap();
    assert_eq!(g.x_limits(), Some(Limits { min: 2.0, max: 4.0 }));
    assert_eq!(g.y_limits(), g.x_limits());

    let g = GridState::from_specs(None, Some(&CoordSpec::limits(-1.0, 0.0)), Some((4, 4))).unwrap();
    let grid = g.grid().unwrap();
    assert_eq!(min_max(grid.x), (-1.0, 0.0));
    assert_eq!(min_max(grid.y), (-1.0, 0.0));
}

#[test]
fn limits_before_field_defer_mesh_synthesis() {
    let mut g = GridState::from_specs(Some(&CoordSpec::limits(0.0, 5.0)), None, None).unwrap();
    assert!(g.grid().is_none());
    assert!(!g.has_x());

    g.rebuild(4, 6);
    let grid = g.grid().unwrap();
    assert_eq!((grid.ny, grid.nx), (4, 6));
    assert_eq!(min_max(grid.x), (0.0, 5.0));
}

#[test]
fn field_without_any_limits_defaults_to_unit_square() {
    let mut g = GridState::default();
    g.rebuild(3, 3);
    let grid = g.grid().unwrap();
    assert_eq!(grid.x_limits, Limits { min: 0.0, max: 1.0 });
    assert_eq!(grid.y_limits, Limits { min: 0.0, max: 1.0 });
}

#[test]
fn partial_limits_leave_grid_incomplete() {
    let mut g = GridState::default();
    g.set(&CoordSpec::limits(0.0, 1.0), Axis::X).unwrap();
    g.rebuild(5, 5);
    assert!(g.has_x());
    assert!(!g.has_y());
    assert!(g.grid().is_none());
}

#[test]
fn array_extremes_drive_uniform_mesh_unless_shape_matches() {
    let mut g = GridState::default();
    g.rebuild(2, 3);

    g.set(&CoordSpec::array_1d(vec![5.0, -2.0, 1.0, 3.0]), Axis::X)
        .unwrap();
    let grid = g.grid().unwrap();
    assert_eq!(&grid.x[0..3], &[-2.0, 1.5, 5.0]);

    // Non-uniform prebuilt coordinates are adopted verbatim.
    let custom = vec![0.0, 0.1, 0.9, 0.0, 0.1, 0.9];
    g.set(&CoordSpec::array_2d(2, 3, custom.clone()), Axis::X)
        .unwrap();
    assert_eq!(g.grid().unwrap().x, custom.as_slice());
    assert_eq!(g.x_limits(), Some(Limits { min: 0.0, max: 0.9 }));
}

#[test]
fn reshaping_never_reuses_stale_mesh() {
    let mut g = GridState::default();
    g.rebuild(2, 3);
    g.set(
        &CoordSpec::array_2d(2, 3, vec![0.0, 0.1, 0.9, 0.0, 0.1, 0.9]),
        Axis::X,
    )
    .unwrap();
    g.rebuild(4, 4);
    let grid = g.grid().unwrap();
    assert_eq!(grid.x.len(), 16);
    for (got, want) in grid.x[0..4].iter().zip([0.0, 0.3, 0.6, 0.9]) {
        assert!((got - want).abs() < 1e-12);
    }
}

#[test]
fn validation_errors_leave_state_untouched() {
    let mut g = GridState::default();
    g.rebuild(2, 2);
    let before = g.x_limits();

    let three = CoordSpec::Limits(vec![0.0, 1.0, 2.0]);
    assert!(matches!(g.set(&three, Axis::X), Err(PaticError::Shape(_))));

    let reversed = CoordSpec::limits(1.0, 0.0);
    assert!(matches!(g.set(&reversed, Axis::X), Err(PaticError::Range(_))));

    let equal = CoordSpec::limits(1.0, 1.0);
    assert!(g.set(&equal, Axis::X).is_err());

    let nan = CoordSpec::limits(f64::NAN, 1.0);
    assert!(g.set(&nan, Axis::X).is_err());

    let cube = CoordSpec::Array {
        shape: vec![1, 1, 2],
        data: vec![0.0, 1.0],
    };
    assert!(matches!(g.set(&cube, Axis::X), Err(PaticError::Shape(_))));

    let mismatched = CoordSpec::array_2d(3, 3, (0..9).map(f64::from).collect());
    assert!(matches!(g.set(&mismatched, Axis::Y), Err(PaticError::Shape(_))));

    assert_eq!(g.x_limits(), before);
}

#[test]
fn axis_parses_case_insensitively() {
    assert_eq!("X".parse::<Axis>().unwrap(), Axis::X);
    assert_eq!("both".parse::<Axis>().unwrap(), Axis::Both);
    let err = "z".parse::<Axis>().unwrap_err();
    assert!(matches!(err, PaticError::Domain { .. }));
}

#[test]
fn coord_spec_deserializes_from_pair_or_array_object() {
    let pair: CoordSpec = serde_json::from_str("[0.0, 2.5]").unwrap();
    assert_eq!(pair, CoordSpec::limits(0.0, 2.5));

    let arr: CoordSpec = serde_json::from_str(r#"{"shape":[3],"data":[1,2,3]}"#).unwrap();
    assert_eq!(arr, CoordSpec::array_1d(vec![1.0, 2.0, 3.0]));
}
