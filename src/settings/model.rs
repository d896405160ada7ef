//! User settings and the slider operations that edit them.

use crate::foundation::error::{BreathError, BreathResult};
use serde::{Deserialize, Serialize};

/// Lowest BPM the live slider may set; keeps `60 / bpm` finite.
pub const MIN_BPM: f64 = 1.0;

/// Which pair of settings is authoritative for the simple rhythm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathMode {
    /// `bpm` + `exhaleRatio` drive the rhythm; explicit seconds follow for display.
    #[default]
    Bpm,
    /// `inhaleSeconds` / `exhaleSeconds` drive the rhythm.
    Seconds,
}

/// Mutable user configuration for the simple rhythm, audio toggles and reminders.
///
/// Field names serialize in camelCase so a persisted payload stays compatible with the
/// key-value store the host already writes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Breaths per minute.
    pub bpm: f64,
    /// Exhale length as a multiple of the inhale length.
    pub exhale_ratio: f64,
    /// Hold after inhale, seconds.
    pub hold_inhale: f64,
    /// Hold after exhale, seconds.
    pub hold_exhale: f64,
    /// Authoritative rhythm source.
    pub mode: BreathMode,
    /// Explicit inhale seconds (authoritative in [`BreathMode::Seconds`]).
    pub inhale_seconds: f64,
    /// Explicit exhale seconds (authoritative in [`BreathMode::Seconds`]).
    pub exhale_seconds: f64,
    /// Play the inhale/exhale noise layer.
    pub breathing_sounds_enabled: bool,
    /// Play phase chimes.
    pub chime_enabled: bool,
    /// Speak phase prompts.
    pub voice_enabled: bool,
    /// Gong reminder interval in minutes; `0` disables reminders.
    pub interval_minutes: u32,
    /// Last selected preset id, handed to persistence with the rest of the settings.
    pub selected_preset_id: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bpm: 6.0,
            exhale_ratio: 1.5,
            hold_inhale: 0.0,
            hold_exhale: 0.0,
            mode: BreathMode::Bpm,
            inhale_seconds: 4.0,
            exhale_seconds: 6.0,
            breathing_sounds_enabled: true,
            chime_enabled: true,
            voice_enabled: true,
            interval_minutes: 1,
            selected_preset_id: None,
        }
    }
}

/// Flat four-phase rhythm carried by a simple preset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimpleRhythm {
    /// Inhale seconds.
    pub inhale: f64,
    /// Hold-after-inhale seconds.
    pub hold_inhale: f64,
    /// Exhale seconds.
    pub exhale: f64,
    /// Hold-after-exhale seconds.
    pub hold_exhale: f64,
    /// Mode forced by the preset; `None` means seconds.
    pub mode: Option<BreathMode>,
}

impl SimpleRhythm {
    /// Sum of the four phases.
    pub fn total(&self) -> f64 {
        self.inhale + self.hold_inhale + self.exhale + self.hold_exhale
    }
}

impl Settings {
    /// Parse a persisted payload.
    pub fn from_json(s: &str) -> BreathResult<Self> {
        serde_json::from_str(s).map_err(|e| BreathError::serde(format!("parse settings: {e}")))
    }

    /// Serialize for persistence.
    pub fn to_json(&self) -> BreathResult<String> {
        serde_json::to_string(self).map_err(|e| BreathError::serde(format!("write settings: {e}")))
    }

    /// Set BPM from the live slider and keep the explicit seconds proportionally in sync.
    pub fn set_bpm(&mut self, bpm: f64) {
        let bpm = if bpm.is_finite() { bpm.max(MIN_BPM) } else { MIN_BPM };
        self.bpm = bpm;
        self.mode = BreathMode::Bpm;

        let current_total =
            self.inhale_seconds + self.hold_inhale + self.exhale_seconds + self.hold_exhale;
        if current_total > 0.0 {
            let scale = (60.0 / bpm) / current_total;
            self.inhale_seconds *= scale;
            self.hold_inhale *= scale;
            self.exhale_seconds *= scale;
            self.hold_exhale *= scale;
        }
        self.resync_ratio();
    }

    /// Set explicit inhale seconds; switches to seconds mode.
    pub fn set_inhale_seconds(&mut self, secs: f64) {
        self.inhale_seconds = floor_secs(secs);
        self.mode = BreathMode::Seconds;
        self.resync_ratio();
    }

    /// Set explicit exhale seconds; switches to seconds mode.
    pub fn set_exhale_seconds(&mut self, secs: f64) {
        self.exhale_seconds = floor_secs(secs);
        self.mode = BreathMode::Seconds;
        self.resync_ratio();
    }

    /// Set the hold after inhale; switches to seconds mode.
    pub fn set_hold_inhale(&mut self, secs: f64) {
        self.hold_inhale = floor_secs(secs);
        self.mode = BreathMode::Seconds;
    }

    /// Set the hold after exhale; switches to seconds mode.
    pub fn set_hold_exhale(&mut self, secs: f64) {
        self.hold_exhale = floor_secs(secs);
        self.mode = BreathMode::Seconds;
    }

    /// Copy a simple preset's rhythm into the settings.
    pub fn apply_simple_preset(&mut self, rhythm: &SimpleRhythm) {
        self.inhale_seconds = rhythm.inhale;
        self.hold_inhale = rhythm.hold_inhale;
        self.exhale_seconds = rhythm.exhale;
        self.hold_exhale = rhythm.hold_exhale;

        let total = rhythm.total();
        if total > 0.0 {
            self.bpm = (60.0 / total).round().max(MIN_BPM);
        }
        if rhythm.inhale > 0.0 {
            self.exhale_ratio = if rhythm.exhale > 0.0 {
                rhythm.exhale / rhythm.inhale
            } else {
                1.0
            };
        }
        self.mode = rhythm.mode.unwrap_or(BreathMode::Seconds);
    }

    /// Exhale ratio as displayed (`1:<ratio>`).
    pub fn exhale_ratio_display(&self) -> String {
        let ratio = if self.inhale_seconds > 0.0 {
            self.exhale_seconds / self.inhale_seconds
        } else {
            self.exhale_ratio
        };
        format!("1:{}", format_ratio(ratio))
    }

    /// `in/holdIn/ex/holdEx` summary of the explicit seconds.
    pub fn rhythm_string(&self) -> String {
        [
            self.inhale_seconds,
            self.hold_inhale,
            self.exhale_seconds,
            self.hold_exhale,
        ]
        .map(format_seconds)
        .join("/")
    }

    fn resync_ratio(&mut self) {
        if self.inhale_seconds > 0.0 {
            self.exhale_ratio = self.exhale_seconds / self.inhale_seconds;
        }
    }
}

fn floor_secs(secs: f64) -> f64 {
    if secs.is_finite() { secs.max(0.0) } else { 0.0 }
}

/// One decimal; whole numbers print without a fractional part.
pub fn format_seconds(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if (rounded - rounded.round()).abs() < 0.05 {
        format!("{}", rounded.round() as i64)
    } else {
        format!("{rounded:.1}")
    }
}

fn format_ratio(value: f64) -> String {
    let s = format!("{:.1}", (value * 10.0).round() / 10.0);
    s.strip_suffix(".0").map(str::to_owned).unwrap_or(s)
}

#[cfg(test)]
#[path = "../../tests/unit/settings/model.rs"]
mod tests;
