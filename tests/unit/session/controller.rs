use super::*;
use crate::normalize::pass::normalize_preset;
use crate::preset::model::PresetDef;
use crate::session::cues::{Cue, RecordingCueSink};
use serde_json::json;

fn preset(steps: serde_json::Value) -> NormalizedPreset {
    let def = PresetDef {
        id: "t".into(),
        steps: steps.as_array().cloned(),
        ..PresetDef::default()
    };
    normalize_preset(&def).unwrap()
}

fn box_settings() -> Settings {
    let mut s = Settings::default();
    s.set_inhale_seconds(4.0);
    s.set_hold_inhale(2.0);
    s.set_exhale_seconds(4.0);
    s.set_hold_exhale(2.0);
    s
}

#[test]
fn simple_cycle_walks_all_four_phases_on_schedule() {
    let settings = box_settings();
    let mut sink = RecordingCueSink::new();
    let mut c = Controller::new(64);
    let mut cues = Cues {
        sink: &mut sink,
        settings: &settings,
    };
    c.begin_simple(0.0, &settings, &mut cues);
    assert_eq!(c.state().phase, Phase::Inhale);
    assert_eq!(c.advance(3.99, &settings, &mut cues), Advance::Steady);
    assert_eq!(c.advance(4.01, &settings, &mut cues), Advance::Moved(1));
    assert_eq!(c.state().phase, Phase::HoldInhale);
    // Scheduled, not observed.
    assert_eq!(c.state().anchor_sec, 4.0);
    assert_eq!(c.countdown(4.01), "2");
    c.advance(6.0, &settings, &mut cues);
    assert_eq!(c.state().phase, Phase::Exhale);
    c.advance(10.0, &settings, &mut cues);
    assert_eq!(c.state().phase, Phase::HoldExhale);
    c.advance(12.0, &settings, &mut cues);
    assert_eq!(c.state().phase, Phase::Inhale);
    assert_eq!(c.state().anchor_sec, 12.0);
    assert_eq!(c.instruction(), "Breathe in slowly through your nose");
}

#[test]
fn large_gap_catches_up_and_fires_only_landing_cues() {
    let settings = box_settings();
    let mut sink = RecordingCueSink::new();
    let mut c = Controller::new(64);
    {
        let mut cues = Cues {
            sink: &mut sink,
            settings: &settings,
        };
        c.begin_simple(0.0, &settings, &mut cues);
    }
    sink.take();
    {
        let mut cues = Cues {
            sink: &mut sink,
            settings: &settings,
        };
        // 2.5 cycles of 12 s plus 5 s: lands in the hold after inhale.
        assert_eq!(c.advance(29.0, &settings, &mut cues), Advance::Moved(9));
    }
    assert_eq!(c.state().phase, Phase::HoldInhale);
    assert_eq!(c.state().anchor_sec, 28.0);
    assert_eq!(
        sink.cues(),
        [
            Cue::Chime {
                freq_hz: 440.0,
                duration_sec: 0.3
            },
            Cue::Speak("Hold".into()),
            Cue::StopBreathingSound,
        ]
    );
}

#[test]
fn transition_cap_resyncs_to_now() {
    let settings = box_settings();
    let mut sink = RecordingCueSink::new();
    let mut c = Controller::new(4);
    let mut cues = Cues {
        sink: &mut sink,
        settings: &settings,
    };
    c.begin_simple(0.0, &settings, &mut cues);
    assert_eq!(c.advance(1_000.0, &settings, &mut cues), Advance::Moved(4));
    assert_eq!(c.state().anchor_sec, 1_000.0);
}

#[test]
fn settings_edits_apply_at_the_next_boundary() {
    let mut settings = Settings::default();
    let mut sink = RecordingCueSink::new();
    let mut c = Controller::new(64);
    {
        let mut cues = Cues {
            sink: &mut sink,
            settings: &settings,
        };
        c.begin_simple(0.0, &settings, &mut cues);
    }
    assert_eq!(c.state().duration, Some(4.0));
    settings.set_inhale_seconds(2.0);
    settings.set_exhale_seconds(3.0);
    let mut cues = Cues {
        sink: &mut sink,
        settings: &settings,
    };
    // Still the old four-second inhale.
    assert_eq!(c.advance(3.0, &settings, &mut cues), Advance::Steady);
    c.advance(4.0, &settings, &mut cues);
    assert_eq!(c.state().phase, Phase::Exhale);
    assert_eq!(c.state().duration, Some(3.0));
}

#[test]
fn zero_length_cycle_does_not_spin() {
    let mut settings = Settings::default();
    settings.set_inhale_seconds(0.0);
    settings.set_exhale_seconds(0.0);
    let mut sink = RecordingCueSink::new();
    let mut c = Controller::new(64);
    let mut cues = Cues {
        sink: &mut sink,
        settings: &settings,
    };
    c.begin_simple(0.0, &settings, &mut cues);
    assert_eq!(c.advance(5.0, &settings, &mut cues), Advance::Steady);
    assert_eq!(c.state().anchor_sec, 5.0);
}

#[test]
fn composable_runs_to_done() {
    let p = preset(json!([{"repeat": {"n": 2, "steps": [{"inhale": 2}, {"exhale": 3}]}}]));
    let settings = Settings::default();
    let mut sink = RecordingCueSink::new();
    let mut c = Controller::new(64);
    let mut cues = Cues {
        sink: &mut sink,
        settings: &settings,
    };
    assert_eq!(c.begin_composable(&p, 0.0, &mut cues), Advance::Moved(1));
    assert!(c.is_composable());
    assert_eq!(c.instruction(), "Breathe in");
    c.advance(2.0, &settings, &mut cues);
    assert_eq!(c.state().phase, Phase::Exhale);
    assert_eq!(c.advance(9.5, &settings, &mut cues), Advance::Moved(2));
    assert_eq!(c.state().phase, Phase::Exhale);
    assert_eq!(c.state().anchor_sec, 7.0);
    assert_eq!(c.advance(10.0, &settings, &mut cues), Advance::Finished);
    assert_eq!(c.state().phase, Phase::Done);
    assert_eq!(c.instruction(), DONE_INSTRUCTION);
    assert_eq!(c.advance(50.0, &settings, &mut cues), Advance::Steady);
}

#[test]
fn until_tap_hold_waits_for_tap() {
    let p = preset(json!([
        {"inhale": 2},
        {"hold": {"duration": "until_tap", "cue": "Hold as long as you can"}},
        {"inhale": {"duration": 1, "voice": "disabled", "chime": "disabled"}}
    ]));
    let settings = Settings::default();
    let mut sink = RecordingCueSink::new();
    let mut c = Controller::new(64);
    {
        let mut cues = Cues {
            sink: &mut sink,
            settings: &settings,
        };
        c.begin_composable(&p, 0.0, &mut cues);
        assert!(c.tap(1.0, &mut cues).is_none());
        c.advance(2.0, &settings, &mut cues);
        assert_eq!(c.state().phase, Phase::HoldUntilTap);
        assert!(c.state().awaiting_tap);
        assert_eq!(c.instruction(), "Hold as long as you can");
        assert_eq!(c.countdown(30.0), "");
        assert_eq!(c.advance(500.0, &settings, &mut cues), Advance::Steady);
    }
    sink.take();
    let mut cues = Cues {
        sink: &mut sink,
        settings: &settings,
    };
    assert_eq!(c.tap(41.5, &mut cues), Some(Advance::Moved(1)));
    assert_eq!(c.state().phase, Phase::Inhale);
    assert_eq!(c.state().anchor_sec, 41.5);
    assert!(!c.state().awaiting_tap);
    assert_eq!(sink.cues(), [Cue::InhaleSound(1.0)]);
}

#[test]
fn scale_tracks_breath_and_rests_with_shimmer() {
    let settings = box_settings();
    let mut sink = RecordingCueSink::new();
    let mut c = Controller::new(64);
    let opts = ScaleOptions::default();
    let ease = Ease::InOutSine;
    assert_eq!(c.scale(3.0, &opts, ease), 1.0);
    let mut cues = Cues {
        sink: &mut sink,
        settings: &settings,
    };
    c.begin_simple(0.0, &settings, &mut cues);
    assert!((c.scale(0.0, &opts, ease) - 1.0).abs() < 1e-9);
    assert!((c.scale(2.0, &opts, ease) - 1.4).abs() < 1e-9);
    c.advance(4.0, &settings, &mut cues);
    let s = c.scale(5.0, &opts, ease);
    assert!((s - 1.8).abs() <= 1.8 * 0.02 + 1e-12);
    c.advance(6.0, &settings, &mut cues);
    assert!((c.scale(6.0, &opts, ease) - 1.8).abs() < 1e-9);
    c.advance(10.0, &settings, &mut cues);
    let s = c.scale(11.0, &opts, ease);
    assert!((s - 1.0).abs() <= 0.02 + 1e-12);
}

#[test]
fn reset_is_idempotent() {
    let settings = Settings::default();
    let mut sink = RecordingCueSink::new();
    let mut c = Controller::new(64);
    let mut cues = Cues {
        sink: &mut sink,
        settings: &settings,
    };
    c.begin_simple(0.0, &settings, &mut cues);
    c.reset();
    c.reset();
    assert_eq!(c.state(), &PhaseState::default());
    assert_eq!(c.instruction(), READY_INSTRUCTION);
}
