//! Breathline is a breath-timeline engine for guided breathing.
//!
//! It turns settings or a declarative preset into a phase timeline, keeps that timeline on a
//! pause-aware clock, and produces per-frame output for a host to paint and voice:
//!
//! - Parse a [`PresetLibrary`] and select a preset on a [`BreathSession`]
//! - Call [`BreathSession::tick`] once per frame (or let an [`AnimationLoop`] do it)
//! - Paint the returned [`FrameOutput`] and waveform points; play cues through a [`CueSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod animation;
pub mod driver;
pub mod foundation;
pub mod graph;
pub mod normalize;
pub mod preset;
pub mod rhythm;
pub mod session;
pub mod settings;
pub mod timeline;

pub use crate::animation::ease::Ease;
pub use crate::driver::animation_loop::{
    AnimationLoop, FrameHandle, FrameScheduler, ManualScheduler, run_headless,
};
pub use crate::foundation::core::{Canvas, Millis};
pub use crate::foundation::error::{BreathError, BreathResult};
pub use crate::graph::renderer::{GraphFrame, GraphOptions, GraphPoint, GraphRenderer, GraphSource};
pub use crate::graph::timeline::{GraphTimeline, TimelineEntry};
pub use crate::normalize::ir::NormalizedPreset;
pub use crate::normalize::pass::normalize_preset;
pub use crate::preset::configurable::PresetSelection;
pub use crate::preset::model::{ConfigurableEntry, PresetDef, PresetKind, PresetLibrary};
pub use crate::rhythm::durations::{
    PhaseDurations, calculate_durations_from_bpm_ratio, calculate_phase_durations,
};
pub use crate::session::breath_session::{
    BreathSession, FrameOutput, RunState, SessionOptions, Tick,
};
pub use crate::session::controller::{Phase, PhaseState, ScaleOptions};
pub use crate::session::cues::{CueSink, NullCueSink, RecordingCueSink, TracingCueSink};
pub use crate::settings::model::{BreathMode, Settings};
pub use crate::settings::store::{InMemoryStore, KeyValueStore};
pub use crate::timeline::iterator::{ResolvedStep, StepIterator};
