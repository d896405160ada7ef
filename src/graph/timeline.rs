//! Flattened, time-stamped view of a composable preset for the waveform.
//!
//! Display only: until-tap holds take a fixed placeholder length and until-tap repeats show one
//! pass. The running session never reads durations from here.

use crate::animation::ease::Ease;
use crate::normalize::ir::{NormalizedPreset, RepeatCount, Step, StepKind, StepValue};
use crate::timeline::iterator::{BpmScope, resolve_amount};

/// Seconds an until-tap hold occupies on the graph.
pub const UNTIL_TAP_DISPLAY_SECONDS: f64 = 10.0;

/// Upper bound on flattened entries; larger presets are truncated for display.
pub const MAX_TIMELINE_ENTRIES: usize = 100_000;

/// One primitive placed on the graph.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// Kind.
    #[serde(rename = "type")]
    pub kind: StepKind,
    /// Displayed seconds.
    pub duration: f64,
    /// Start on the graph clock.
    pub start_time: f64,
    /// End on the graph clock.
    pub end_time: f64,
    /// Until-tap hold shown with the placeholder length.
    pub is_until_tap: bool,
    /// Level a hold rests at: 1 after an inhale, 0 after an exhale or at the start.
    pub hold_level: f64,
}

/// Flattened composable preset.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphTimeline {
    entries: Vec<TimelineEntry>,
    total_duration: f64,
    #[serde(skip)]
    until_tap: Vec<usize>,
    #[serde(skip)]
    truncated: bool,
}

struct Flattener {
    entries: Vec<TimelineEntry>,
    until_tap: Vec<usize>,
    clock: f64,
    level: f64,
    display_seconds: f64,
    truncated: bool,
}

impl Flattener {
    fn steps(&mut self, steps: &[Step], scope: Option<BpmScope>) {
        for step in steps {
            if self.truncated {
                return;
            }
            match step {
                Step::Repeat(block) => {
                    let child_scope = match (block.bpm, block.ratio_total) {
                        (Some(bpm), Some(total)) => Some(BpmScope::new(bpm, total)),
                        _ => scope,
                    };
                    let passes = match block.count {
                        RepeatCount::Times(n) => n,
                        RepeatCount::UntilTap => 1,
                    };
                    for _ in 0..passes {
                        self.steps(&block.steps, child_scope);
                        if self.truncated {
                            return;
                        }
                    }
                }
                Step::Primitive(p) => {
                    if self.entries.len() >= MAX_TIMELINE_ENTRIES {
                        self.truncated = true;
                        return;
                    }
                    let (duration, is_until_tap) = match p.value {
                        StepValue::UntilTap => (self.display_seconds, true),
                        StepValue::Amount(v) => (resolve_amount(v, scope), false),
                    };
                    let hold_level = self.level;
                    match p.kind {
                        StepKind::Inhale => self.level = 1.0,
                        StepKind::Exhale => self.level = 0.0,
                        StepKind::Hold => {}
                    }
                    if is_until_tap {
                        self.until_tap.push(self.entries.len());
                    }
                    self.entries.push(TimelineEntry {
                        kind: p.kind,
                        duration,
                        start_time: self.clock,
                        end_time: self.clock + duration,
                        is_until_tap,
                        hold_level,
                    });
                    self.clock += duration;
                }
            }
        }
    }
}

impl GraphTimeline {
    /// Flatten `preset`, expanding repeat counts and showing until-tap holds as
    /// `until_tap_display_seconds`.
    #[tracing::instrument(skip(preset), fields(preset = %preset.id))]
    pub fn flatten(preset: &NormalizedPreset, until_tap_display_seconds: f64) -> Self {
        let mut f = Flattener {
            entries: Vec::new(),
            until_tap: Vec::new(),
            clock: 0.0,
            level: 0.0,
            display_seconds: until_tap_display_seconds.max(0.0),
            truncated: false,
        };
        f.steps(&preset.steps, None);
        if f.truncated {
            tracing::warn!(
                entries = MAX_TIMELINE_ENTRIES,
                "graph timeline truncated; preset too long to display in full"
            );
        }
        tracing::debug!(entries = f.entries.len(), total = f.clock, "graph timeline built");
        Self {
            entries: f.entries,
            total_duration: f.clock,
            until_tap: f.until_tap,
            truncated: f.truncated,
        }
    }

    /// Entries in graph order.
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    /// End time of the last entry.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Return `true` when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return `true` if the preset exceeded [`MAX_TIMELINE_ENTRIES`].
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Number of until-tap holds on the graph.
    pub fn until_tap_count(&self) -> usize {
        self.until_tap.len()
    }

    /// The `k`-th until-tap hold.
    pub fn until_tap_entry(&self, k: usize) -> Option<&TimelineEntry> {
        self.until_tap.get(k).and_then(|&i| self.entries.get(i))
    }

    /// Entry covering `time_sec`; zero-length entries are never returned.
    pub fn entry_at(&self, time_sec: f64) -> Option<&TimelineEntry> {
        if time_sec < 0.0 || time_sec >= self.total_duration {
            return None;
        }
        let i = self.entries.partition_point(|e| e.end_time <= time_sec);
        self.entries.get(i)
    }

    /// Breath level at `time_sec`. Before the start and past the end the lungs read empty.
    pub fn value_at(&self, time_sec: f64, ease: Ease) -> f64 {
        let Some(e) = self.entry_at(time_sec) else {
            return 0.0;
        };
        let progress = if e.duration > 0.0 {
            ((time_sec - e.start_time) / e.duration).min(1.0)
        } else {
            1.0
        };
        match e.kind {
            StepKind::Inhale => ease.apply(progress),
            StepKind::Exhale => 1.0 - ease.apply(progress),
            StepKind::Hold => e.hold_level,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/timeline.rs"]
mod tests;
