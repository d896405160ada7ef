//! Phase state machines for simple and composable sessions.
//!
//! Both machines measure elapsed time against `anchor_sec`, the scheduled session-clock time at
//! which the current phase began. A late frame therefore never shifts later phases.

use crate::animation::ease::Ease;
use crate::normalize::ir::{NormalizedPreset, StepKind, VoiceCue};
use crate::rhythm::durations::{
    CyclePhase, PhaseDurations, calculate_phase_durations, format_countdown_seconds,
};
use crate::session::cues::{CuePlan, Cues};
use crate::settings::model::Settings;
use crate::timeline::iterator::{ResolvedStep, StepIterator};

/// Visible phase of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Not started, or reset.
    #[default]
    Ready,
    /// Breathing in.
    Inhale,
    /// Simple mode: hold after inhale.
    HoldInhale,
    /// Breathing out.
    Exhale,
    /// Simple mode: hold after exhale.
    HoldExhale,
    /// Composable mode: timed hold.
    Hold,
    /// Composable mode: hold ended by a tap.
    HoldUntilTap,
    /// Composable preset finished.
    Done,
}

impl Phase {
    /// Short label shown in the circle.
    pub fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Inhale => "Inhale",
            Self::Exhale => "Exhale",
            Self::HoldInhale | Self::HoldExhale | Self::Hold | Self::HoldUntilTap => "Hold",
            Self::Done => "Done",
        }
    }

    /// Return `true` for every hold variant.
    pub fn is_hold(self) -> bool {
        matches!(
            self,
            Self::HoldInhale | Self::HoldExhale | Self::Hold | Self::HoldUntilTap
        )
    }

    fn from_cycle(p: CyclePhase) -> Self {
        match p {
            CyclePhase::Inhale => Self::Inhale,
            CyclePhase::HoldInhale => Self::HoldInhale,
            CyclePhase::Exhale => Self::Exhale,
            CyclePhase::HoldExhale => Self::HoldExhale,
        }
    }

    fn simple_instruction(self) -> &'static str {
        match self {
            Self::Inhale => "Breathe in slowly through your nose",
            Self::HoldInhale => "Hold your breath gently",
            Self::Exhale => "Release slowly through your mouth",
            Self::HoldExhale => "Rest before the next breath",
            _ => "",
        }
    }

    fn simple_voice(self) -> Option<&'static str> {
        match self {
            Self::Inhale => Some("Breathe in"),
            Self::Exhale => Some("Breathe out"),
            Self::HoldInhale | Self::HoldExhale => Some("Hold"),
            _ => None,
        }
    }

    fn composable_instruction(self) -> &'static str {
        match self {
            Self::Inhale => "Breathe in",
            Self::Exhale => "Breathe out",
            Self::Hold => "Hold",
            Self::HoldUntilTap => "Hold; tap when you are ready",
            _ => "",
        }
    }
}

/// Instruction shown before a session starts.
pub const READY_INSTRUCTION: &str = "Tap the circle or graph to begin.";
/// Instruction shown when a composable preset completes.
pub const DONE_INSTRUCTION: &str = "Session complete";

/// Current phase and its timing.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseState {
    /// Phase.
    pub phase: Phase,
    /// Session-clock seconds at which the phase began.
    pub anchor_sec: f64,
    /// Phase length; `None` while waiting for a tap or when idle.
    pub duration: Option<f64>,
    /// A tap is required to leave the phase.
    pub awaiting_tap: bool,
}

impl PhaseState {
    /// Seconds left in the phase at `now_sec`, if the phase is timed.
    pub fn remaining(&self, now_sec: f64) -> Option<f64> {
        self.duration
            .map(|d| (d - (now_sec - self.anchor_sec)).max(0.0))
    }
}

/// Visual tuning for the breathing circle.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaleOptions {
    /// Scale with empty lungs.
    pub min: f64,
    /// Scale with full lungs.
    pub max: f64,
    /// Relative amplitude of the hold shimmer.
    pub hold_amplitude: f64,
    /// Divisor applied to session milliseconds for the shimmer sine.
    pub hold_period_ms: f64,
}

impl Default for ScaleOptions {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 1.8,
            hold_amplitude: 0.02,
            hold_period_ms: 400.0,
        }
    }
}

/// Outcome of advancing the controller to a new time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    /// Still in the same phase.
    Steady,
    /// Moved through this many phase boundaries.
    Moved(u32),
    /// The composable preset ran out of steps.
    Finished,
}

#[derive(Debug, Clone)]
enum Machine {
    Idle,
    Simple {
        cycle: CyclePhase,
    },
    Composable {
        iter: StepIterator,
        step: Option<ResolvedStep>,
    },
    Finished,
}

/// Owns the phase state for one session.
#[derive(Debug, Clone)]
pub struct Controller {
    state: PhaseState,
    machine: Machine,
    instruction: String,
    rest_level: f64,
    max_transitions: u32,
}

impl Controller {
    /// Idle controller. `max_transitions` bounds catch-up work for a single late frame.
    pub fn new(max_transitions: u32) -> Self {
        Self {
            state: PhaseState::default(),
            machine: Machine::Idle,
            instruction: READY_INSTRUCTION.to_owned(),
            rest_level: 0.0,
            max_transitions: max_transitions.max(1),
        }
    }

    /// Current phase state.
    pub fn state(&self) -> &PhaseState {
        &self.state
    }

    /// Current instruction text.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Return `true` while running a composable preset.
    pub fn is_composable(&self) -> bool {
        matches!(self.machine, Machine::Composable { .. })
    }

    /// Back to `Ready`. Idempotent.
    pub fn reset(&mut self) {
        *self = Self::new(self.max_transitions);
    }

    /// Start the simple cycle at inhale, anchored at `at_sec`.
    pub(crate) fn begin_simple(&mut self, at_sec: f64, settings: &Settings, cues: &mut Cues<'_>) {
        self.machine = Machine::Simple {
            cycle: CyclePhase::Inhale,
        };
        self.rest_level = 0.0;
        let d = calculate_phase_durations(settings);
        self.enter_simple(CyclePhase::Inhale, at_sec, &d);
        self.fire_simple(cues);
    }

    /// Start `preset` from its first step, anchored at `at_sec`.
    pub(crate) fn begin_composable(
        &mut self,
        preset: &NormalizedPreset,
        at_sec: f64,
        cues: &mut Cues<'_>,
    ) -> Advance {
        let mut iter = StepIterator::new(preset);
        let first = iter.next_primitive();
        self.machine = Machine::Composable { iter, step: None };
        self.rest_level = 0.0;
        match first {
            Some(step) => {
                self.enter_step(step, at_sec);
                self.fire_step(cues);
                Advance::Moved(1)
            }
            None => {
                self.finish();
                Advance::Finished
            }
        }
    }

    fn enter_simple(&mut self, cycle: CyclePhase, at_sec: f64, d: &PhaseDurations) {
        let phase = Phase::from_cycle(cycle);
        if let Machine::Simple { cycle: c } = &mut self.machine {
            *c = cycle;
        }
        self.note_level(phase);
        self.state = PhaseState {
            phase,
            anchor_sec: at_sec,
            duration: Some(d.of(cycle)),
            awaiting_tap: false,
        };
        self.instruction = phase.simple_instruction().to_owned();
        tracing::debug!(?phase, anchor = at_sec, duration = d.of(cycle), "phase");
    }

    /// Replay the entry cues of the current phase.
    pub(crate) fn fire_landing(&self, cues: &mut Cues<'_>) {
        match self.machine {
            Machine::Simple { .. } => self.fire_simple(cues),
            Machine::Composable { .. } => self.fire_step(cues),
            _ => {}
        }
    }

    fn fire_simple(&self, cues: &mut Cues<'_>) {
        let phase = self.state.phase;
        if let Some(plan) = CuePlan::for_phase(
            phase,
            self.state.duration,
            phase.simple_voice().map(str::to_owned),
            true,
        ) {
            cues.fire(&plan);
        }
    }

    fn enter_step(&mut self, step: ResolvedStep, at_sec: f64) {
        let awaiting_tap = step.awaits_tap();
        let phase = match step.kind {
            StepKind::Inhale => Phase::Inhale,
            StepKind::Exhale => Phase::Exhale,
            StepKind::Hold if awaiting_tap => Phase::HoldUntilTap,
            StepKind::Hold => Phase::Hold,
        };
        self.note_level(phase);
        self.state = PhaseState {
            phase,
            anchor_sec: at_sec,
            duration: step.duration.seconds(),
            awaiting_tap,
        };
        self.instruction = step
            .prompt
            .cue
            .clone()
            .unwrap_or_else(|| phase.composable_instruction().to_owned());
        tracing::debug!(?phase, id = ?step.id, anchor = at_sec, duration = ?self.state.duration, "step");
        if let Machine::Composable { step: slot, .. } = &mut self.machine {
            *slot = Some(step);
        }
    }

    fn fire_step(&self, cues: &mut Cues<'_>) {
        let Machine::Composable {
            step: Some(step), ..
        } = &self.machine
        else {
            return;
        };
        let speech = match &step.prompt.voice {
            VoiceCue::Disabled => None,
            VoiceCue::Text(t) => Some(t.clone()),
            VoiceCue::Default => Some(self.instruction.clone()).filter(|s| !s.is_empty()),
        };
        if let Some(plan) =
            CuePlan::for_phase(self.state.phase, self.state.duration, speech, step.prompt.chime)
        {
            cues.fire(&plan);
        }
    }

    fn note_level(&mut self, phase: Phase) {
        match phase {
            Phase::Inhale => self.rest_level = 1.0,
            Phase::Exhale => self.rest_level = 0.0,
            _ => {}
        }
    }

    fn finish(&mut self) {
        self.machine = Machine::Finished;
        self.state = PhaseState {
            phase: Phase::Done,
            anchor_sec: self.state.anchor_sec,
            duration: None,
            awaiting_tap: false,
        };
        self.instruction = DONE_INSTRUCTION.to_owned();
        tracing::info!("composable preset complete");
    }

    /// Move through every phase boundary at or before `now_sec`.
    ///
    /// Simple-mode durations are read from `settings` at each boundary, so edits land on the
    /// next phase. Cues fire once, for the phase the controller lands in.
    pub(crate) fn advance(
        &mut self,
        now_sec: f64,
        settings: &Settings,
        cues: &mut Cues<'_>,
    ) -> Advance {
        let mut moved = 0u32;
        loop {
            let Some(d) = self.state.duration else {
                break;
            };
            if now_sec - self.state.anchor_sec < d {
                break;
            }
            if moved >= self.max_transitions {
                tracing::warn!(
                    moved,
                    phase = ?self.state.phase,
                    "frame gap too large; resyncing phase anchor to now"
                );
                self.state.anchor_sec = now_sec;
                break;
            }
            let scheduled = self.state.anchor_sec + d;
            match &mut self.machine {
                Machine::Simple { cycle } => {
                    let fresh = calculate_phase_durations(settings);
                    if fresh.total() <= 0.0 {
                        self.state.anchor_sec = now_sec;
                        break;
                    }
                    let next = cycle.next(&fresh);
                    self.enter_simple(next, scheduled, &fresh);
                }
                Machine::Composable { iter, .. } => match iter.next_primitive() {
                    Some(step) => self.enter_step(step, scheduled),
                    None => {
                        self.finish();
                        return Advance::Finished;
                    }
                },
                Machine::Idle | Machine::Finished => break,
            }
            moved += 1;
        }

        if moved == 0 {
            return Advance::Steady;
        }
        if moved > 1 {
            tracing::debug!(skipped = moved - 1, "late frame skipped phases");
        }
        match self.machine {
            Machine::Simple { .. } => self.fire_simple(cues),
            Machine::Composable { .. } => self.fire_step(cues),
            Machine::Idle | Machine::Finished => {}
        }
        Advance::Moved(moved)
    }

    /// Tap during an until-tap hold: stop the innermost until-tap repeat and move on at `now_sec`.
    ///
    /// Returns `None` when the tap is not meaningful for the current phase.
    pub(crate) fn tap(&mut self, now_sec: f64, cues: &mut Cues<'_>) -> Option<Advance> {
        if !self.state.awaiting_tap {
            return None;
        }
        let Machine::Composable { iter, .. } = &mut self.machine else {
            return None;
        };
        iter.request_until_tap_stop();
        match iter.next_primitive() {
            Some(step) => {
                self.enter_step(step, now_sec);
                self.fire_step(cues);
                Some(Advance::Moved(1))
            }
            None => {
                self.finish();
                Some(Advance::Finished)
            }
        }
    }

    /// Breathing-circle scale at `now_sec`.
    pub fn scale(&self, now_sec: f64, opts: &ScaleOptions, ease: Ease) -> f64 {
        let span = opts.max - opts.min;
        let progress = match self.state.duration {
            Some(d) if d > 0.0 => (now_sec - self.state.anchor_sec) / d,
            _ => 1.0,
        };
        match self.state.phase {
            Phase::Inhale => opts.min + ease.apply(progress) * span,
            Phase::Exhale => opts.max - ease.apply(progress) * span,
            p if p.is_hold() => {
                let base = opts.min + self.rest_level * span;
                let shimmer = if opts.hold_period_ms > 0.0 {
                    opts.hold_amplitude * (now_sec * 1000.0 / opts.hold_period_ms).sin()
                } else {
                    0.0
                };
                base * (1.0 + shimmer)
            }
            _ => opts.min,
        }
    }

    /// Countdown text: remaining seconds for timed holds, empty otherwise.
    pub fn countdown(&self, now_sec: f64) -> String {
        if !self.state.phase.is_hold() {
            return String::new();
        }
        self.state
            .remaining(now_sec)
            .map(format_countdown_seconds)
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
