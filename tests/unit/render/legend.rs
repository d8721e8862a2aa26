use super::*;

#[test]
fn degree_one_labels_span_minus_pi_to_pi() {
    let labels = phase_tick_labels(1);
    assert_eq!(
        labels,
        ["-π", "-3π/4", "-π/2", "-π/4", "0", "π/4", "π/2", "3π/4", "π"].map(String::from)
    );
}

#[test]
fn higher_degrees_reduce_to_lowest_terms() {
    let labels = phase_tick_labels(2);
    assert_eq!(labels[0], "-π/2");
    assert_eq!(labels[2], "-π/4");
    assert_eq!(labels[1], "-3π/8");
    assert_eq!(labels[4], "0");
    assert_eq!(labels[8], "π/2");

    let labels = phase_tick_labels(6);
    assert_eq!(labels[0], "-π/6");
    assert_eq!(labels[6], "π/12");
    assert_eq!(labels[7], "π/8");
}

#[test]
fn phase_legend_places_nine_even_ticks() {
    let lo = -std::f64::consts::PI;
    let hi = std::f64::consts::PI;
    let legend = Legend::phase(Colormap::Twilight, lo, hi, 1);
    assert_eq!(legend.ticks.len(), TICK_COUNT);
    assert_eq!(legend.ticks[0].value, lo);
    assert_eq!(legend.ticks[8].value, hi);
    assert!(legend.ticks[4].value.abs() < 1e-12);
    assert_eq!(legend.ticks[4].label, "0");
    assert_eq!(legend.ticks[8].fraction, 1.0);
}

#[test]
fn linear_labels_trim_trailing_zeros() {
    let legend = Legend::linear(Colormap::Viridis, 0.0, 8.0);
    let labels: Vec<_> = legend.ticks.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, ["0", "1", "2", "3", "4", "5", "6", "7", "8"]);

    let legend = Legend::linear(Colormap::Viridis, -1.0, 1.0);
    assert_eq!(legend.ticks[1].label, "-0.75");
    assert_eq!(legend.ticks[4].label, "0");
}

#[test]
fn format_tick_handles_degenerate_step() {
    assert_eq!(format_tick(3.0, 0.0), "3");
    assert_eq!(format_tick(-0.0001, 0.5), "0");
}
