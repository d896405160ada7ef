use super::*;
use crate::foundation::error::BreathError;

struct FailingSink;

impl CueSink for FailingSink {
    fn play_inhale_sound(&mut self, _d: f64) -> BreathResult<()> {
        Err(BreathError::Other(anyhow::anyhow!("no audio context")))
    }
    fn play_exhale_sound(&mut self, _d: f64) -> BreathResult<()> {
        Err(BreathError::Other(anyhow::anyhow!("no audio context")))
    }
    fn play_chime(&mut self, _f: f64, _d: f64) -> BreathResult<()> {
        Err(BreathError::Other(anyhow::anyhow!("no audio context")))
    }
    fn speak(&mut self, _t: &str) -> BreathResult<()> {
        Err(BreathError::Other(anyhow::anyhow!("no voices")))
    }
    fn stop_breathing_sound(&mut self) -> BreathResult<()> {
        Err(BreathError::Other(anyhow::anyhow!("no audio context")))
    }
    fn stop_all(&mut self) -> BreathResult<()> {
        Err(BreathError::Other(anyhow::anyhow!("no audio context")))
    }
    fn play_gong(&mut self) -> BreathResult<()> {
        Err(BreathError::Other(anyhow::anyhow!("no audio context")))
    }
}

#[test]
fn phase_plans_match_cue_table() {
    let p = CuePlan::for_phase(Phase::Inhale, Some(4.0), Some("Breathe in".into()), true).unwrap();
    assert_eq!(p.chime, Some((528.0, 0.5)));
    assert_eq!(p.breath, BreathSound::Inhale(4.0));

    let p = CuePlan::for_phase(Phase::Exhale, Some(6.0), None, true).unwrap();
    assert_eq!(p.chime, Some((396.0, 0.5)));
    assert_eq!(p.breath, BreathSound::Exhale(6.0));

    let p = CuePlan::for_phase(Phase::HoldUntilTap, None, None, false).unwrap();
    assert_eq!(p.chime, None);
    assert_eq!(p.breath, BreathSound::Stop);

    let p = CuePlan::for_phase(Phase::Inhale, Some(0.0), None, true).unwrap();
    assert_eq!(p.breath, BreathSound::Inhale(1.0));

    assert!(CuePlan::for_phase(Phase::Done, None, None, true).is_none());
}

#[test]
fn toggles_gate_sounds_but_not_stops() {
    let mut sink = RecordingCueSink::new();
    let settings = Settings {
        chime_enabled: false,
        voice_enabled: false,
        breathing_sounds_enabled: false,
        ..Settings::default()
    };
    let mut cues = Cues {
        sink: &mut sink,
        settings: &settings,
    };
    let inhale = CuePlan::for_phase(Phase::Inhale, Some(4.0), Some("Breathe in".into()), true).unwrap();
    cues.fire(&inhale);
    let hold = CuePlan::for_phase(Phase::Hold, Some(4.0), Some("Hold".into()), true).unwrap();
    cues.fire(&hold);
    cues.gong();
    cues.stop_all();
    assert_eq!(sink.cues(), [Cue::StopBreathingSound, Cue::Gong, Cue::StopAll]);
}

#[test]
fn enabled_plan_fires_in_order() {
    let mut sink = RecordingCueSink::new();
    let settings = Settings::default();
    let mut cues = Cues {
        sink: &mut sink,
        settings: &settings,
    };
    let plan = CuePlan::for_phase(Phase::Exhale, Some(6.0), Some("Breathe out".into()), true).unwrap();
    cues.fire(&plan);
    assert_eq!(
        sink.take(),
        [
            Cue::Chime {
                freq_hz: 396.0,
                duration_sec: 0.5
            },
            Cue::Speak("Breathe out".into()),
            Cue::ExhaleSound(6.0),
        ]
    );
    assert!(sink.cues().is_empty());
}

#[test]
fn failing_sink_is_swallowed() {
    let mut sink = FailingSink;
    let settings = Settings::default();
    let mut cues = Cues {
        sink: &mut sink,
        settings: &settings,
    };
    let plan = CuePlan::for_phase(Phase::Inhale, Some(4.0), Some("x".into()), true).unwrap();
    cues.fire(&plan);
    cues.stop_breathing_sound();
    cues.stop_all();
    cues.gong();
}
