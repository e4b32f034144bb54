use super::*;
use crate::ast::{Element, Note, TimeSignature};
use crate::measure::Measure;
use crate::parser::parse;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn centers(windows: &[TapWindow]) -> Vec<f64> {
    windows.iter().map(TapWindow::center).collect()
}

fn assert_centers(windows: &[TapWindow], expected: &[f64]) {
    let actual = centers(windows);
    assert_eq!(actual.len(), expected.len(), "centers: {:?}", actual);
    for (a, e) in actual.iter().zip(expected) {
        assert!(approx(*a, *e), "expected {:?} but got {:?}", expected, actual);
    }
}

/// Tempo 60 and no lenience: one beat is one second and centers sit on note onsets.
fn exact() -> TimingConfig {
    TimingConfig::new(60.0, 0.0)
}

#[test]
fn test_quarter_notes_at_120_bpm() {
    let measures = parse("4/4: 1 1 1 1").unwrap();
    let windows = tap_windows(&measures, &TimingConfig::new(120.0, 0.1), 0.0);

    assert_centers(&windows, &[0.05, 0.55, 1.05, 1.55]);
    for window in &windows {
        assert!(approx(window.half_width(), 0.05));
    }
    // The first window never opens before the start time
    assert!(approx(windows[0].begin, 0.0));
}

#[test]
fn test_start_time_offsets_every_window() {
    let measures = parse("4/4: 1 1 1 1").unwrap();
    let windows = tap_windows(&measures, &exact(), 1.0);
    assert_centers(&windows, &[1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_rests_advance_time_without_windows() {
    let measures = parse("4/4: 1 1/R 1 1/R").unwrap();
    let taps = schedule(&measures, &exact(), 0.0);

    assert_eq!(taps.len(), 2);
    assert!(approx(taps[0].window.center(), 0.0));
    assert!(approx(taps[1].window.center(), 2.0));
    assert_eq!(taps[1].position, ElementPosition::top_level(2));
}

#[test]
fn test_tied_pair_emits_one_window() {
    let measures = parse("4/4: 0.5/C4/T 0.5/C4 1/R 1 1").unwrap();
    let taps = schedule(&measures, &exact(), 0.0);

    let positions: Vec<usize> = taps.iter().map(|t| t.position.element).collect();
    assert_eq!(positions, vec![0, 3, 4]);
    assert_centers(&tap_windows(&measures, &exact(), 0.0), &[0.0, 2.0, 3.0]);
}

#[test]
fn test_tie_to_different_pitch_is_not_suppressed() {
    let measures = parse("4/4: 1/C4/T 1/D4 1 1").unwrap();
    assert_eq!(tap_windows(&measures, &exact(), 0.0).len(), 4);
}

#[test]
fn test_tie_across_barline() {
    let measures = parse("4/4: 3 1/G4/T\n4/4: 1/G4 3").unwrap();
    let windows = tap_windows(&measures, &exact(), 0.0);
    assert_centers(&windows, &[0.0, 3.0, 5.0]);
}

#[test]
fn test_triplet_windows_use_real_durations() {
    let measures = parse("4/4: 3=(0.5-0.5-0.5) 3").unwrap();
    let taps = schedule(&measures, &exact(), 0.0);

    assert_centers(
        &taps.iter().map(|t| t.window).collect::<Vec<_>>(),
        &[0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0],
    );
    assert_eq!(taps[1].position, ElementPosition::in_tuplet(0, 1));
    assert_eq!(taps[3].position, ElementPosition::top_level(1));
}

#[test]
fn test_tie_out_of_tuplet_suppresses_following_note() {
    let measures = parse("4/4: 3=(0.5-0.5-0.5/C4/T) 0.5/C4 2.5").unwrap();
    let taps = schedule(&measures, &exact(), 0.0);

    assert_eq!(taps.len(), 4);
    assert_eq!(taps[2].position, ElementPosition::in_tuplet(0, 2));
    assert_eq!(taps[3].position, ElementPosition::top_level(2));
    assert!(approx(taps[3].window.center(), 1.5));
}

#[test]
fn test_tie_into_tuplet_suppresses_first_inner_note() {
    let measures = parse("4/4: 1/E4/T 3=(0.5/E4-0.5-0.5) 2").unwrap();
    let windows = tap_windows(&measures, &exact(), 0.0);
    assert_centers(&windows, &[0.0, 4.0 / 3.0, 5.0 / 3.0, 2.0]);
}

#[test]
fn test_tie_inside_tuplet() {
    let measures = parse("2/4: 3=(0.5/A4/T-0.5/A4-0.5) 1").unwrap();
    let taps = schedule(&measures, &exact(), 0.0);

    let positions: Vec<ElementPosition> = taps.iter().map(|t| t.position).collect();
    assert_eq!(
        positions,
        vec![
            ElementPosition::in_tuplet(0, 0),
            ElementPosition::in_tuplet(0, 2),
            ElementPosition::top_level(1),
        ]
    );
}

#[test]
fn test_tuplet_rest_advances_time() {
    let measures = parse("2/4: 3=(0.5/R-0.5-0.5) 1").unwrap();
    let windows = tap_windows(&measures, &exact(), 0.0);
    assert_centers(&windows, &[1.0 / 3.0, 2.0 / 3.0, 1.0]);
}

#[test]
fn test_windows_are_monotonic() {
    let source = "4/4: 0.5 0.5/R 3=(0.5-0.5/R-0.5) 0.25/C4/T 0.25/C4 0.5 1\n\
                  6/8: 2=(1-1) 1.5 1.5\n\
                  3/4: 1 1/R 1";
    let measures = parse(source).unwrap();
    let windows = tap_windows(&measures, &TimingConfig::new(140.0, 0.05), 2.0);

    assert!(!windows.is_empty());
    for pair in windows.windows(2) {
        assert!(pair[0].begin <= pair[1].begin, "{:?}", pair);
        assert!(pair[0].end <= pair[1].end, "{:?}", pair);
    }
}

#[test]
fn test_zero_tempo_does_not_panic() {
    let measures = parse("4/4: 1 1 1 1").unwrap();
    let windows = tap_windows(&measures, &TimingConfig::new(0.0, 0.1), 0.0);
    assert_eq!(windows.len(), 4);
}

#[test]
fn test_empty_input_has_no_windows() {
    assert!(tap_windows(&[], &TimingConfig::default(), 0.0).is_empty());
    assert_eq!(last_audible(&[]), None);
}

#[test]
fn test_last_audible_skips_trailing_rests_and_ties() {
    let measures = parse("4/4: 1 1/D4/T 1/D4 1/R").unwrap();
    assert_eq!(last_audible(&measures), Some(ElementPosition::top_level(1)));
    assert_eq!(audible_count(&measures), 2);

    let tuplet_end = parse("2/4: 1 3=(0.5-0.5-0.5/R)").unwrap();
    assert_eq!(last_audible(&tuplet_end), Some(ElementPosition::in_tuplet(1, 1)));

    let silent = parse("4/4: 4/R").unwrap();
    assert_eq!(last_audible(&silent), None);
}

#[test]
fn test_click_track_windows() {
    let measure = Measure::click_track(TimeSignature::default()).unwrap();
    let windows = tap_windows(&[measure], &exact(), 0.0);
    assert_centers(&windows, &[0.0, 0.25, 0.5, 0.75]);
}

#[test]
fn test_measures_built_by_hand() {
    let ts = TimeSignature::new(3, 4).unwrap();
    let elements = vec![
        Element::from(Note::new(1.5).unwrap()),
        Element::from(Note::new(1.5).unwrap()),
    ];
    let measure = Measure::new(elements, ts, None).unwrap();
    let windows = tap_windows(&[measure], &TimingConfig::new(90.0, 0.0), 0.0);
    assert_centers(&windows, &[0.0, 1.0]);
}

#[test]
fn test_timing_config_defaults() {
    let config = TimingConfig::default();
    assert_eq!(config.tempo, 100.0);
    assert_eq!(config.lenience_beats, 0.1);
    assert!(approx(config.lenience_seconds(), 0.06));
}

#[test]
fn test_window_contains_is_inclusive() {
    let window = TapWindow::around(1.0, 0.25);
    assert!(window.contains(0.75));
    assert!(window.contains(1.25));
    assert!(window.contains(1.0));
    assert!(!window.contains(1.2500001));
    assert!(!window.contains(0.7));
}

#[test]
fn test_timing_config_from_yaml() {
    let config: TimingConfig = serde_yaml::from_str("tempo: 90\n").unwrap();
    assert_eq!(config, TimingConfig::new(90.0, 0.1));

    let config: TimingConfig = serde_yaml::from_str("tempo: 72\nlenience-beats: 0.25\n").unwrap();
    assert_eq!(config.lenience_beats, 0.25);
}

#[test]
fn test_scheduled_tap_serializes_camel_case() {
    let measures = parse("2/4: 3=(0.5-0.5-0.5) 1").unwrap();
    let taps = schedule(&measures, &exact(), 0.0);
    let yaml = serde_yaml::to_string(&taps[0]).unwrap();

    assert!(yaml.contains("position:"), "{}", yaml);
    assert!(yaml.contains("inner: 0"), "{}", yaml);
    assert!(yaml.contains("begin:"), "{}", yaml);

    let top = serde_yaml::to_string(&taps[3]).unwrap();
    assert!(!top.contains("inner"), "{}", top);
}
