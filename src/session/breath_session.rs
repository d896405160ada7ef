//! The session facade a host drives once per frame.
//!
//! [`BreathSession`] owns the settings snapshot, the pause-aware clock, the phase controller, the
//! selected preset and the waveform sampler. Hosts call [`BreathSession::tick`] with the frame
//! timestamp and paint the returned [`FrameOutput`]; discrete UI events (tap, preset change,
//! slider edit) go through the other methods between frames.

use crate::foundation::core::{Canvas, Millis, non_negative_secs};
use crate::foundation::error::{BreathError, BreathResult};
use crate::graph::renderer::{
    ComposableGraphClock, GraphFrame, GraphOptions, GraphPoint, GraphRenderer, GraphSource,
};
use crate::graph::timeline::GraphTimeline;
use crate::preset::configurable::PresetSelection;
use crate::preset::model::{ConfigurableEntry, PresetDef, PresetKind};
use crate::rhythm::durations::{PhaseDurations, calculate_phase_durations};
use crate::session::clock::SessionClock;
use crate::session::controller::{Advance, Controller, Phase, PhaseState, ScaleOptions};
use crate::session::cues::{CueSink, Cues, NullCueSink};
use crate::settings::model::Settings;

/// Tuning for a session.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionOptions {
    /// Waveform layout.
    pub graph: GraphOptions,
    /// Breathing-circle scale.
    pub scale: ScaleOptions,
    /// Phase boundaries one tick may cross before the phase anchor resyncs to now.
    pub max_transitions_per_tick: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            graph: GraphOptions::default(),
            scale: ScaleOptions::default(),
            max_transitions_per_tick: 128,
        }
    }
}

impl SessionOptions {
    /// Reject options that would make the graph or scale math meaningless.
    pub fn validate(&self) -> BreathResult<()> {
        let g = &self.graph;
        non_negative_secs("anchorRampSeconds", g.anchor_ramp_seconds)?;
        non_negative_secs("untilTapDisplaySeconds", g.until_tap_display_seconds)?;
        non_negative_secs("composableWindowSeconds", g.composable_window_seconds)?;
        non_negative_secs("holdPeriodMs", self.scale.hold_period_ms)?;
        if !(0.0..=1.0).contains(&g.anchor_fraction) {
            return Err(BreathError::validation(
                "anchorFraction must be within [0, 1]",
            ));
        }
        if !g.cycles_visible.is_finite() || g.cycles_visible <= 0.0 {
            return Err(BreathError::validation("cyclesVisible must be positive"));
        }
        if !(self.scale.min.is_finite() && self.scale.max.is_finite()) {
            return Err(BreathError::validation("scale range must be finite"));
        }
        Ok(())
    }
}

/// Coarse lifecycle of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RunState {
    /// Never started, or reset.
    #[default]
    Idle,
    /// Clock running; frames should keep coming.
    Running,
    /// Clock frozen.
    Paused,
    /// A composable preset ran out of steps.
    Finished,
}

/// Everything the host paints for one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameOutput {
    /// Current phase.
    pub phase: Phase,
    /// Short phase label.
    pub label: &'static str,
    /// Instruction line.
    pub instruction: String,
    /// Hold countdown, or empty.
    pub countdown: String,
    /// Breathing-circle scale factor.
    pub scale: f64,
    /// Elapsed session time as `MM:SS`.
    pub timer: String,
    /// Interval reminder raised on this frame.
    pub notification: Option<String>,
    /// Waveform scroll state; points are read with [`BreathSession::graph_points`].
    pub graph: GraphFrame,
    /// The current hold ends on a tap.
    pub awaiting_tap: bool,
    /// Lifecycle state after this frame.
    pub run_state: RunState,
    /// Session-clock seconds at this frame.
    pub session_sec: f64,
}

/// Result of [`BreathSession::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    /// Frame to paint.
    pub output: FrameOutput,
    /// The host should schedule another frame.
    pub request_next: bool,
}

#[derive(Clone, Debug)]
struct ActiveComposable {
    selection: PresetSelection,
    timeline: GraphTimeline,
    graph_clock: ComposableGraphClock,
}

impl ActiveComposable {
    fn new(selection: PresetSelection, until_tap_display_seconds: f64) -> Self {
        let timeline = GraphTimeline::flatten(selection.normalized(), until_tap_display_seconds);
        Self {
            selection,
            timeline,
            graph_clock: ComposableGraphClock::new(0.0),
        }
    }
}

/// A single guided-breathing session.
pub struct BreathSession<S: CueSink> {
    settings: Settings,
    opts: SessionOptions,
    sink: S,
    clock: SessionClock,
    run: RunState,
    composable: Option<ActiveComposable>,
    renderer: GraphRenderer,
    controller: Controller,
    intervals_notified: u64,
    notification: Option<String>,
    landing_cues_deferred: bool,
}

impl<S: CueSink> BreathSession<S> {
    /// Idle session drawing onto `canvas`.
    pub fn new(
        settings: Settings,
        sink: S,
        opts: SessionOptions,
        canvas: Canvas,
    ) -> BreathResult<Self> {
        opts.validate()?;
        Ok(Self {
            settings,
            renderer: GraphRenderer::new(opts.graph, canvas),
            controller: Controller::new(opts.max_transitions_per_tick),
            opts,
            sink,
            clock: SessionClock::new(),
            run: RunState::Idle,
            composable: None,
            intervals_notified: 0,
            notification: None,
            landing_cues_deferred: false,
        })
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable settings. Simple-mode rhythm edits take effect at the next phase boundary; call
    /// [`BreathSession::apply_settings_change`] to realign immediately.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Options in use.
    pub fn options(&self) -> &SessionOptions {
        &self.opts
    }

    /// Cue sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable cue sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Lifecycle state.
    pub fn run_state(&self) -> RunState {
        self.run
    }

    /// Current phase and timing.
    pub fn phase_state(&self) -> &PhaseState {
        self.controller.state()
    }

    /// Selected composable preset, if any.
    pub fn selection(&self) -> Option<&PresetSelection> {
        self.composable.as_ref().map(|a| &a.selection)
    }

    /// Flattened graph of the selected composable preset, if any.
    pub fn timeline(&self) -> Option<&GraphTimeline> {
        self.composable.as_ref().map(|a| &a.timeline)
    }

    /// Pause-aware session seconds at `now`.
    pub fn elapsed_seconds(&self, now: Millis) -> f64 {
        self.clock.elapsed_seconds(now)
    }

    /// Waveform points produced by the last tick.
    pub fn graph_points(&self) -> &[GraphPoint] {
        self.renderer.points()
    }

    /// Resize the waveform surface.
    pub fn resize_graph(&mut self, canvas: Canvas) {
        self.renderer.resize(canvas);
    }

    fn is_active(&self) -> bool {
        matches!(self.run, RunState::Running | RunState::Paused)
    }

    /// Make `def` the active preset.
    ///
    /// Simple presets write their rhythm into the settings. Composable presets are normalized
    /// first; a rejected preset leaves the session exactly as it was. While a session is active
    /// the new preset starts over at "now".
    #[tracing::instrument(skip(self, def), fields(preset = %def.id))]
    pub fn select_preset(&mut self, def: &PresetDef, now: Millis) -> BreathResult<()> {
        match def.kind() {
            PresetKind::Simple(rhythm) => {
                self.settings.apply_simple_preset(&rhythm);
                self.composable = None;
            }
            PresetKind::Composable => {
                let selection = PresetSelection::new(def)?;
                self.composable = Some(ActiveComposable::new(
                    selection,
                    self.opts.graph.until_tap_display_seconds,
                ));
            }
        }
        self.settings.selected_preset_id = Some(def.id.clone());
        tracing::info!(label = def.display_label(), "preset selected");
        self.after_preset_change(now);
        Ok(())
    }

    /// Drop the preset and go back to the settings-driven cycle.
    pub fn clear_preset(&mut self, now: Millis) {
        self.composable = None;
        self.settings.selected_preset_id = None;
        tracing::info!("preset cleared");
        self.after_preset_change(now);
    }

    /// Edit a configurable value of the selected composable preset.
    pub fn set_configurable(
        &mut self,
        entry: &ConfigurableEntry,
        value: serde_json::Value,
        now: Millis,
    ) -> BreathResult<()> {
        let Some(active) = self.composable.as_mut() else {
            return Err(BreathError::session("no composable preset selected"));
        };
        active.selection.set_value(entry, value)?;
        active.timeline = GraphTimeline::flatten(
            active.selection.normalized(),
            self.opts.graph.until_tap_display_seconds,
        );
        tracing::info!(path = %entry.path, "configurable value changed");
        self.after_preset_change(now);
        Ok(())
    }

    /// Restart the simple cycle at inhale so a settings edit applies right away.
    pub fn apply_settings_change(&mut self, now: Millis) {
        if self.composable.is_none() && self.is_active() {
            self.restart_phases(now);
        }
    }

    /// Toggle the breathing noise layer, silencing it at once when disabled.
    pub fn set_breathing_sounds(&mut self, enabled: bool) {
        self.settings.breathing_sounds_enabled = enabled;
        if !enabled {
            Cues {
                sink: &mut self.sink,
                settings: &self.settings,
            }
            .stop_breathing_sound();
        }
    }

    fn after_preset_change(&mut self, now: Millis) {
        match self.run {
            RunState::Running | RunState::Paused => self.restart_phases(now),
            RunState::Finished => self.reset(),
            RunState::Idle => {}
        }
    }

    fn restart_phases(&mut self, now: Millis) {
        let t = self.clock.elapsed_seconds(now);
        // While paused the new phase is silent until `resume`.
        let paused = self.run == RunState::Paused;
        let mut muted = NullCueSink;
        let sink: &mut dyn CueSink = if paused { &mut muted } else { &mut self.sink };
        let mut cues = Cues {
            sink,
            settings: &self.settings,
        };
        let finished = match self.composable.as_mut() {
            Some(active) => {
                active.graph_clock = ComposableGraphClock::new(t);
                let normalized = active.selection.normalized();
                self.controller.begin_composable(normalized, t, &mut cues) == Advance::Finished
            }
            None => {
                self.controller.begin_simple(t, &self.settings, &mut cues);
                false
            }
        };
        self.landing_cues_deferred = paused && !finished;
        if finished {
            self.finish(now);
        }
    }

    /// Start, or resume when paused. A finished session starts over.
    pub fn start(&mut self, now: Millis) {
        match self.run {
            RunState::Running => {}
            RunState::Paused => self.resume(now),
            RunState::Idle | RunState::Finished => {
                self.clock.start(now);
                self.intervals_notified = 0;
                self.notification = None;
                self.run = RunState::Running;
                tracing::info!(composable = self.composable.is_some(), "session started");
                self.restart_phases(now);
            }
        }
    }

    /// Freeze the clock and silence audio.
    pub fn pause(&mut self, now: Millis) {
        if self.run != RunState::Running {
            return;
        }
        self.clock.pause(now);
        self.run = RunState::Paused;
        Cues {
            sink: &mut self.sink,
            settings: &self.settings,
        }
        .stop_all();
        tracing::info!(at = self.clock.elapsed_seconds(now), "session paused");
    }

    /// Continue from a pause; the current phase keeps its anchor.
    pub fn resume(&mut self, now: Millis) {
        if self.run != RunState::Paused {
            return;
        }
        self.clock.resume(now);
        self.run = RunState::Running;
        if std::mem::take(&mut self.landing_cues_deferred) {
            self.controller.fire_landing(&mut Cues {
                sink: &mut self.sink,
                settings: &self.settings,
            });
        }
        tracing::info!(at = self.clock.elapsed_seconds(now), "session resumed");
    }

    /// Circle tap: ends an until-tap hold, otherwise starts or pauses.
    pub fn toggle(&mut self, now: Millis) -> RunState {
        if self.run == RunState::Running && self.controller.state().awaiting_tap {
            self.tap(now);
        } else if self.run == RunState::Running {
            self.pause(now);
        } else {
            self.start(now);
        }
        self.run
    }

    /// End the current until-tap hold. Returns `false` when there is nothing to end.
    pub fn tap(&mut self, now: Millis) -> bool {
        if self.run != RunState::Running || !self.controller.state().awaiting_tap {
            return false;
        }
        let t = self.clock.elapsed_seconds(now);
        if let Some(active) = self.composable.as_mut() {
            active.graph_clock.advance_past_until_tap(t, &active.timeline);
        }
        let mut cues = Cues {
            sink: &mut self.sink,
            settings: &self.settings,
        };
        let outcome = self.controller.tap(t, &mut cues);
        tracing::debug!(at = t, ?outcome, "tap");
        if outcome == Some(Advance::Finished) {
            self.finish(now);
        }
        outcome.is_some()
    }

    /// Back to `Ready`, keeping the selected preset. Idempotent.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.controller.reset();
        self.run = RunState::Idle;
        self.intervals_notified = 0;
        self.notification = None;
        self.landing_cues_deferred = false;
        if let Some(active) = self.composable.as_mut() {
            active.graph_clock = ComposableGraphClock::new(0.0);
        }
        Cues {
            sink: &mut self.sink,
            settings: &self.settings,
        }
        .stop_all();
        tracing::info!("session reset");
    }

    fn finish(&mut self, now: Millis) {
        self.clock.pause(now);
        self.run = RunState::Finished;
        Cues {
            sink: &mut self.sink,
            settings: &self.settings,
        }
        .stop_all();
    }

    fn check_interval(&mut self, t: f64) {
        let minutes = self.settings.interval_minutes;
        if minutes == 0 {
            return;
        }
        let k = (t / (f64::from(minutes) * 60.0)).floor() as u64;
        if k <= self.intervals_notified {
            return;
        }
        self.intervals_notified = k;
        let total = k * u64::from(minutes);
        let unit = if total == 1 { "minute" } else { "minutes" };
        let text = format!("{total} {unit} completed!");
        tracing::info!(minutes = total, "interval reached");
        Cues {
            sink: &mut self.sink,
            settings: &self.settings,
        }
        .gong();
        self.notification = Some(text);
    }

    /// Advance to `now` and describe the frame.
    pub fn tick(&mut self, now: Millis) -> Tick {
        let t = self.clock.elapsed_seconds(now);
        if self.run == RunState::Running {
            let mut cues = Cues {
                sink: &mut self.sink,
                settings: &self.settings,
            };
            if self.controller.advance(t, &self.settings, &mut cues) == Advance::Finished {
                self.finish(now);
            }
            self.check_interval(t);
        }

        let state = *self.controller.state();
        let since_start = (self.run != RunState::Idle).then_some(t);
        let graph = match self.composable.as_mut() {
            Some(active) => {
                let gt = if self.run == RunState::Idle {
                    0.0
                } else {
                    active
                        .graph_clock
                        .graph_time(t, &active.timeline, state.awaiting_tap)
                };
                self.renderer
                    .render(GraphSource::Timeline(&active.timeline), gt, since_start)
            }
            None => {
                let d = calculate_phase_durations(&self.settings);
                let gt = cycle_graph_time(&state, &d, t);
                self.renderer.render(GraphSource::Cyclic(&d), gt, since_start)
            }
        };

        let output = FrameOutput {
            phase: state.phase,
            label: state.phase.label(),
            instruction: self.controller.instruction().to_owned(),
            countdown: self.controller.countdown(t),
            scale: self
                .controller
                .scale(t, &self.opts.scale, self.opts.graph.ease),
            timer: format_timer(t),
            notification: self.notification.take(),
            graph,
            awaiting_tap: state.awaiting_tap,
            run_state: self.run,
            session_sec: t,
        };
        Tick {
            output,
            request_next: self.run == RunState::Running,
        }
    }
}

/// Position inside the simple cycle that matches the controller's phase, so the waveform dot
/// and the circle agree even after settings edits or a resync.
fn cycle_graph_time(state: &PhaseState, d: &PhaseDurations, t: f64) -> f64 {
    let offset = match state.phase {
        Phase::Inhale => 0.0,
        Phase::HoldInhale => d.inhale,
        Phase::Exhale => d.inhale + d.hold_inhale,
        Phase::HoldExhale => d.inhale + d.hold_inhale + d.exhale,
        _ => return 0.0,
    };
    // The phase keeps the length it was entered with; edits land at the boundary.
    let len = state.duration.unwrap_or(0.0).max(0.0);
    offset + (t - state.anchor_sec).clamp(0.0, len)
}

/// Whole elapsed seconds as `MM:SS`; minutes keep counting past an hour.
pub fn format_timer(secs: f64) -> String {
    let s = if secs.is_finite() { secs.max(0.0).floor() as u64 } else { 0 };
    format!("{:02}:{:02}", s / 60, s % 60)
}

#[cfg(test)]
#[path = "../../tests/unit/session/breath_session.rs"]
mod tests;
