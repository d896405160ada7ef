use super::*;
use crate::normalize::pass::normalize_preset;
use crate::preset::model::PresetDef;
use serde_json::json;

fn ten_second_cycle() -> PhaseDurations {
    PhaseDurations {
        inhale: 4.0,
        hold_inhale: 0.0,
        exhale: 6.0,
        hold_exhale: 0.0,
    }
}

fn tap_timeline() -> GraphTimeline {
    let def = PresetDef {
        id: "t".into(),
        steps: json!([{"inhale": 4}, {"hold": "until_tap"}, {"exhale": 4}, {"hold": "until_tap"}, {"inhale": 2}])
            .as_array()
            .cloned(),
        ..PresetDef::default()
    };
    GraphTimeline::flatten(&normalize_preset(&def).unwrap(), UNTIL_TAP_DISPLAY_SECONDS)
}

#[test]
fn cyclic_scroll_geometry() {
    let mut r = GraphRenderer::new(GraphOptions::default(), Canvas::new(400, 124));
    let d = ten_second_cycle();
    let frame = r.render(GraphSource::Cyclic(&d), 2.0, Some(5.0));

    // Two ten-second cycles across 400 px.
    assert!((frame.seconds_per_pixel - 0.05).abs() < 1e-12);
    assert!((frame.anchor_x - 80.0).abs() < 1e-9);
    assert!((frame.visible_start - (2.0 - 4.0)).abs() < 1e-9);
    assert!((frame.visible_end - (2.0 + 16.0)).abs() < 1e-9);
    assert_eq!(r.points().len(), 201);
    assert!((frame.dot_level - 0.5).abs() < 1e-9);
    // 12 px padding, 100 px inner height.
    assert!((frame.dot_y - 62.0).abs() < 1e-9);

    let at_anchor = r.points()[40];
    assert_eq!(at_anchor.x, 80.0);
    assert!((at_anchor.y - frame.dot_y).abs() < 1e-9);
}

#[test]
fn anchor_ramps_in_and_rests_at_zero_when_idle() {
    let r = GraphRenderer::new(GraphOptions::default(), Canvas::new(500, 100));
    assert_eq!(r.anchor_x(None), 0.0);
    assert_eq!(r.anchor_x(Some(0.0)), 0.0);
    assert!((r.anchor_x(Some(0.6)) - 50.0).abs() < 1e-9);
    assert!((r.anchor_x(Some(1.2)) - 100.0).abs() < 1e-9);
    assert!((r.anchor_x(Some(60.0)) - 100.0).abs() < 1e-9);
}

#[test]
fn point_buffer_is_reused_across_frames_and_resizes() {
    let mut r = GraphRenderer::new(GraphOptions::default(), Canvas::new(300, 100));
    let d = ten_second_cycle();
    r.render(GraphSource::Cyclic(&d), 0.0, None);
    let cap = r.points.capacity();
    for i in 0..120 {
        r.render(GraphSource::Cyclic(&d), f64::from(i) / 60.0, Some(f64::from(i) / 60.0));
    }
    assert_eq!(r.points.capacity(), cap);
    assert_eq!(r.points().len(), 151);

    r.resize(Canvas::new(600, 100));
    let frame = r.render(GraphSource::Cyclic(&d), 3.0, Some(10.0));
    assert_eq!(r.points().len(), 301);
    assert!((frame.seconds_per_pixel - 20.0 / 600.0).abs() < 1e-12);

    r.resize(Canvas::new(0, 0));
    let frame = r.render(GraphSource::Cyclic(&d), 3.0, Some(10.0));
    assert!(r.points().is_empty());
    assert_eq!(frame.now_sec, 3.0);
}

#[test]
fn timeline_source_uses_fixed_window() {
    let mut r = GraphRenderer::new(GraphOptions::default(), Canvas::new(200, 100));
    let tl = tap_timeline();
    let frame = r.render(GraphSource::Timeline(&tl), 2.0, Some(5.0));
    assert!((frame.seconds_per_pixel - 0.1).abs() < 1e-12);
    assert!((frame.dot_level - 0.5).abs() < 1e-9);
}

#[test]
fn graph_clock_freezes_at_until_tap_boundary() {
    let tl = tap_timeline();
    let mut clock = ComposableGraphClock::new(0.0);

    assert_eq!(clock.graph_time(3.0, &tl, false), 3.0);
    assert_eq!(clock.graph_time(8.0, &tl, true), 8.0);
    // Placeholder for the first hold spans 4..14.
    assert_eq!(clock.graph_time(14.0, &tl, true), 14.0);
    assert_eq!(clock.paused_at(), Some(14.0));
    assert_eq!(clock.graph_time(40.0, &tl, true), 14.0);

    clock.advance_past_until_tap(40.0, &tl);
    assert_eq!(clock.paused_at(), None);
    assert_eq!(clock.until_tap_cursor(), 1);
    assert_eq!(clock.cycle_anchor(), 26.0);
    assert_eq!(clock.graph_time(41.0, &tl, false), 15.0);
}

#[test]
fn early_tap_jumps_graph_forward() {
    let tl = tap_timeline();
    let mut clock = ComposableGraphClock::new(0.0);
    assert_eq!(clock.graph_time(6.0, &tl, true), 6.0);
    clock.advance_past_until_tap(6.0, &tl);
    assert_eq!(clock.graph_time(6.0, &tl, false), 14.0);
    assert_eq!(clock.graph_time(7.0, &tl, false), 15.0);
}

#[test]
fn graph_clock_clamps_to_timeline_end() {
    let tl = tap_timeline();
    let mut clock = ComposableGraphClock::new(0.0);
    let end = tl.total_duration();
    assert_eq!(clock.graph_time(end + 50.0, &tl, false), end);

    let empty = GraphTimeline::default();
    let mut clock = ComposableGraphClock::new(5.0);
    assert_eq!(clock.graph_time(12.0, &empty, true), 7.0);
}
