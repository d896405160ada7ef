//! Simple-mode phase durations.
//!
//! Everything here is pure and O(1); the session calls it on every phase boundary and the
//! graph calls it on every frame.

use crate::settings::model::{BreathMode, MIN_BPM, Settings};

/// Minimum seconds left for inhale + exhale when holds eat the whole cycle.
pub const MIN_BREATHING_SECONDS: f64 = 0.5;
/// Smallest exhale ratio honored by the BPM split.
pub const MIN_EXHALE_RATIO: f64 = 0.1;

/// The four phases of the simple cyclic model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CyclePhase {
    /// Breathe in.
    Inhale,
    /// Hold with full lungs.
    HoldInhale,
    /// Breathe out.
    Exhale,
    /// Hold with empty lungs.
    HoldExhale,
}

impl CyclePhase {
    /// Next phase, skipping holds whose duration is zero.
    pub fn next(self, durations: &PhaseDurations) -> Self {
        match self {
            Self::Inhale if durations.hold_inhale > 0.0 => Self::HoldInhale,
            Self::Inhale | Self::HoldInhale => Self::Exhale,
            Self::Exhale if durations.hold_exhale > 0.0 => Self::HoldExhale,
            Self::Exhale | Self::HoldExhale => Self::Inhale,
        }
    }

    /// Return `true` for the two hold phases.
    pub fn is_hold(self) -> bool {
        matches!(self, Self::HoldInhale | Self::HoldExhale)
    }
}

/// Inhale/exhale split produced by the BPM calculator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BreathSplit {
    /// Inhale seconds.
    pub inhale: f64,
    /// Exhale seconds.
    pub exhale: f64,
}

/// Seconds spent in each phase of one simple cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDurations {
    /// Inhale seconds.
    pub inhale: f64,
    /// Hold-after-inhale seconds.
    pub hold_inhale: f64,
    /// Exhale seconds.
    pub exhale: f64,
    /// Hold-after-exhale seconds.
    pub hold_exhale: f64,
}

impl PhaseDurations {
    /// Length of one full cycle.
    pub fn total(&self) -> f64 {
        self.inhale + self.hold_inhale + self.exhale + self.hold_exhale
    }

    /// Duration of `phase`.
    pub fn of(&self, phase: CyclePhase) -> f64 {
        match phase {
            CyclePhase::Inhale => self.inhale,
            CyclePhase::HoldInhale => self.hold_inhale,
            CyclePhase::Exhale => self.exhale,
            CyclePhase::HoldExhale => self.hold_exhale,
        }
    }
}

/// Split one BPM cycle into inhale and exhale around the holds.
///
/// The breathing budget never drops below [`MIN_BREATHING_SECONDS`] and the ratio never below
/// [`MIN_EXHALE_RATIO`], so both results are always strictly positive.
pub fn calculate_durations_from_bpm_ratio(
    bpm: f64,
    exhale_ratio: f64,
    hold_inhale: f64,
    hold_exhale: f64,
) -> BreathSplit {
    let bpm = if bpm.is_finite() && bpm > 0.0 {
        bpm
    } else {
        MIN_BPM
    };
    let cycle = 60.0 / bpm;
    let holds = hold_inhale.max(0.0) + hold_exhale.max(0.0);
    let budget = (cycle - holds).max(MIN_BREATHING_SECONDS);
    let ratio = if exhale_ratio.is_finite() {
        exhale_ratio.max(MIN_EXHALE_RATIO)
    } else {
        MIN_EXHALE_RATIO
    };

    let inhale = budget / (1.0 + ratio);
    BreathSplit {
        inhale,
        exhale: inhale * ratio,
    }
}

/// Phase durations for the simple model, read fresh from `settings`.
pub fn calculate_phase_durations(settings: &Settings) -> PhaseDurations {
    let hold_inhale = settings.hold_inhale.max(0.0);
    let hold_exhale = settings.hold_exhale.max(0.0);
    let split = match settings.mode {
        BreathMode::Seconds => BreathSplit {
            inhale: settings.inhale_seconds.max(0.0),
            exhale: settings.exhale_seconds.max(0.0),
        },
        BreathMode::Bpm => calculate_durations_from_bpm_ratio(
            settings.bpm,
            settings.exhale_ratio,
            hold_inhale,
            hold_exhale,
        ),
    };
    PhaseDurations {
        inhale: split.inhale,
        hold_inhale,
        exhale: split.exhale,
        hold_exhale,
    }
}

/// Countdown text: whole seconds from 10 up, otherwise one decimal without a trailing `.0`.
pub fn format_countdown_seconds(value: f64) -> String {
    let clamped = if value.is_finite() { value.max(0.0) } else { 0.0 };
    if clamped >= 10.0 {
        return format!("{}", clamped.round() as i64);
    }
    let s = format!("{clamped:.1}");
    s.strip_suffix(".0").map(str::to_owned).unwrap_or(s)
}

#[cfg(test)]
#[path = "../../tests/unit/rhythm/durations.rs"]
mod tests;
