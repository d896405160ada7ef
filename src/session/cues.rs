//! Audio, voice and chime side effects.
//!
//! The engine describes what a phase should sound like with a [`CuePlan`] and hands it to a
//! host-provided [`CueSink`]. Sink failures are logged and dropped; they never reach the
//! timeline.

use crate::foundation::error::BreathResult;
use crate::session::controller::Phase;
use crate::settings::model::Settings;

/// Inhale chime frequency (C).
pub const CHIME_INHALE_HZ: f64 = 528.0;
/// Exhale chime frequency (G).
pub const CHIME_EXHALE_HZ: f64 = 396.0;
/// Hold chime frequency (A).
pub const CHIME_HOLD_HZ: f64 = 440.0;
/// Breath chime length.
pub const CHIME_BREATH_SECONDS: f64 = 0.5;
/// Hold chime length.
pub const CHIME_HOLD_SECONDS: f64 = 0.3;
/// Interval reminder gong frequency, for sinks that synthesize it.
pub const GONG_HZ: f64 = 150.0;

/// Fire-and-forget audio/voice outputs implemented by the host.
pub trait CueSink {
    /// Start the inhale noise layer for `duration_sec`.
    fn play_inhale_sound(&mut self, duration_sec: f64) -> BreathResult<()>;
    /// Start the exhale noise layer for `duration_sec`.
    fn play_exhale_sound(&mut self, duration_sec: f64) -> BreathResult<()>;
    /// Play a sine chime.
    fn play_chime(&mut self, freq_hz: f64, duration_sec: f64) -> BreathResult<()>;
    /// Speak a prompt.
    fn speak(&mut self, text: &str) -> BreathResult<()>;
    /// Stop the noise layer.
    fn stop_breathing_sound(&mut self) -> BreathResult<()>;
    /// Silence everything (pause, reset, completion).
    fn stop_all(&mut self) -> BreathResult<()>;
    /// Interval reminder gong.
    fn play_gong(&mut self) -> BreathResult<()>;
}

/// One recorded sink call.
#[derive(Clone, Debug, PartialEq)]
pub enum Cue {
    /// `play_inhale_sound`
    InhaleSound(f64),
    /// `play_exhale_sound`
    ExhaleSound(f64),
    /// `play_chime`
    Chime {
        /// Frequency in Hz.
        freq_hz: f64,
        /// Length in seconds.
        duration_sec: f64,
    },
    /// `speak`
    Speak(String),
    /// `stop_breathing_sound`
    StopBreathingSound,
    /// `stop_all`
    StopAll,
    /// `play_gong`
    Gong,
}

/// Sink that records every call, for tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingCueSink {
    cues: Vec<Cue>,
}

impl RecordingCueSink {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls so far.
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Drain the recorded calls.
    pub fn take(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }
}

impl CueSink for RecordingCueSink {
    fn play_inhale_sound(&mut self, duration_sec: f64) -> BreathResult<()> {
        self.cues.push(Cue::InhaleSound(duration_sec));
        Ok(())
    }

    fn play_exhale_sound(&mut self, duration_sec: f64) -> BreathResult<()> {
        self.cues.push(Cue::ExhaleSound(duration_sec));
        Ok(())
    }

    fn play_chime(&mut self, freq_hz: f64, duration_sec: f64) -> BreathResult<()> {
        self.cues.push(Cue::Chime {
            freq_hz,
            duration_sec,
        });
        Ok(())
    }

    fn speak(&mut self, text: &str) -> BreathResult<()> {
        self.cues.push(Cue::Speak(text.to_owned()));
        Ok(())
    }

    fn stop_breathing_sound(&mut self) -> BreathResult<()> {
        self.cues.push(Cue::StopBreathingSound);
        Ok(())
    }

    fn stop_all(&mut self) -> BreathResult<()> {
        self.cues.push(Cue::StopAll);
        Ok(())
    }

    fn play_gong(&mut self) -> BreathResult<()> {
        self.cues.push(Cue::Gong);
        Ok(())
    }
}

/// Sink that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCueSink;

impl CueSink for NullCueSink {
    fn play_inhale_sound(&mut self, _duration_sec: f64) -> BreathResult<()> {
        Ok(())
    }
    fn play_exhale_sound(&mut self, _duration_sec: f64) -> BreathResult<()> {
        Ok(())
    }
    fn play_chime(&mut self, _freq_hz: f64, _duration_sec: f64) -> BreathResult<()> {
        Ok(())
    }
    fn speak(&mut self, _text: &str) -> BreathResult<()> {
        Ok(())
    }
    fn stop_breathing_sound(&mut self) -> BreathResult<()> {
        Ok(())
    }
    fn stop_all(&mut self) -> BreathResult<()> {
        Ok(())
    }
    fn play_gong(&mut self) -> BreathResult<()> {
        Ok(())
    }
}

/// Sink that reports cues as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCueSink;

impl CueSink for TracingCueSink {
    fn play_inhale_sound(&mut self, duration_sec: f64) -> BreathResult<()> {
        tracing::info!(duration_sec, "cue: inhale sound");
        Ok(())
    }
    fn play_exhale_sound(&mut self, duration_sec: f64) -> BreathResult<()> {
        tracing::info!(duration_sec, "cue: exhale sound");
        Ok(())
    }
    fn play_chime(&mut self, freq_hz: f64, duration_sec: f64) -> BreathResult<()> {
        tracing::info!(freq_hz, duration_sec, "cue: chime");
        Ok(())
    }
    fn speak(&mut self, text: &str) -> BreathResult<()> {
        tracing::info!(text, "cue: speak");
        Ok(())
    }
    fn stop_breathing_sound(&mut self) -> BreathResult<()> {
        tracing::debug!("cue: stop breathing sound");
        Ok(())
    }
    fn stop_all(&mut self) -> BreathResult<()> {
        tracing::debug!("cue: stop all");
        Ok(())
    }
    fn play_gong(&mut self) -> BreathResult<()> {
        tracing::info!(freq_hz = GONG_HZ, "cue: gong");
        Ok(())
    }
}

/// Noise-layer action for a phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BreathSound {
    /// Inhale layer for this many seconds.
    Inhale(f64),
    /// Exhale layer for this many seconds.
    Exhale(f64),
    /// Silence the layer.
    Stop,
}

/// Everything a phase entry should sound like.
#[derive(Clone, Debug, PartialEq)]
pub struct CuePlan {
    /// `(freq_hz, duration_sec)`
    pub chime: Option<(f64, f64)>,
    /// Spoken prompt.
    pub speech: Option<String>,
    /// Noise layer.
    pub breath: BreathSound,
}

impl CuePlan {
    /// Plan for entering `phase`. `duration` is the phase length when known; the noise layer
    /// falls back to one second for until-tap or zero-length steps.
    pub fn for_phase(
        phase: Phase,
        duration: Option<f64>,
        speech: Option<String>,
        chime: bool,
    ) -> Option<Self> {
        let sound_secs = duration.filter(|d| *d > 0.0).unwrap_or(1.0);
        let (tone, breath) = match phase {
            Phase::Inhale => (
                (CHIME_INHALE_HZ, CHIME_BREATH_SECONDS),
                BreathSound::Inhale(sound_secs),
            ),
            Phase::Exhale => (
                (CHIME_EXHALE_HZ, CHIME_BREATH_SECONDS),
                BreathSound::Exhale(sound_secs),
            ),
            Phase::HoldInhale | Phase::HoldExhale | Phase::Hold | Phase::HoldUntilTap => {
                ((CHIME_HOLD_HZ, CHIME_HOLD_SECONDS), BreathSound::Stop)
            }
            Phase::Ready | Phase::Done => return None,
        };
        Some(Self {
            chime: chime.then_some(tone),
            speech,
            breath,
        })
    }
}

fn guard(cue: &'static str, r: BreathResult<()>) {
    if let Err(e) = r {
        tracing::warn!(cue, error = %e, "cue sink call failed; continuing");
    }
}

/// A sink gated by the audio toggles in [`Settings`].
pub(crate) struct Cues<'a> {
    pub(crate) sink: &'a mut dyn CueSink,
    pub(crate) settings: &'a Settings,
}

impl Cues<'_> {
    pub(crate) fn fire(&mut self, plan: &CuePlan) {
        if let Some((freq, secs)) = plan.chime
            && self.settings.chime_enabled
        {
            guard("chime", self.sink.play_chime(freq, secs));
        }
        if let Some(text) = &plan.speech
            && self.settings.voice_enabled
        {
            guard("speak", self.sink.speak(text));
        }
        match plan.breath {
            BreathSound::Inhale(d) if self.settings.breathing_sounds_enabled => {
                guard("inhale sound", self.sink.play_inhale_sound(d));
            }
            BreathSound::Exhale(d) if self.settings.breathing_sounds_enabled => {
                guard("exhale sound", self.sink.play_exhale_sound(d));
            }
            BreathSound::Inhale(_) | BreathSound::Exhale(_) => {}
            BreathSound::Stop => guard("stop breathing sound", self.sink.stop_breathing_sound()),
        }
    }

    pub(crate) fn stop_breathing_sound(&mut self) {
        guard("stop breathing sound", self.sink.stop_breathing_sound());
    }

    pub(crate) fn stop_all(&mut self) {
        guard("stop all", self.sink.stop_all());
    }

    pub(crate) fn gong(&mut self) {
        guard("gong", self.sink.play_gong());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/cues.rs"]
mod tests;
