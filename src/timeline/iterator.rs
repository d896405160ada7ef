//! Lazy walker over a normalized preset.
//!
//! A stack of [`ExecutionFrame`]s (innermost last) marks the current position. Each call to
//! [`StepIterator::next_primitive`] advances until it can yield one primitive with a concrete
//! duration, entering and leaving repeat blocks as needed.

use crate::normalize::ir::{NormalizedPreset, Prompt, RepeatCount, Step, StepKind, StepValue};
use std::sync::Arc;

/// BPM context shared by every primitive under a BPM block, nested plain repeats included.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BpmScope {
    pub(crate) cycle_seconds: f64,
    pub(crate) ratio_total: f64,
}

impl BpmScope {
    pub(crate) fn new(bpm: f64, ratio_total: f64) -> Self {
        Self {
            cycle_seconds: 60.0 / bpm,
            ratio_total,
        }
    }

    /// Seconds for `amount` ratio units.
    pub(crate) fn seconds(self, amount: f64) -> f64 {
        self.cycle_seconds * amount / self.ratio_total
    }
}

/// Seconds for a primitive amount under an optional BPM scope.
pub(crate) fn resolve_amount(amount: f64, scope: Option<BpmScope>) -> f64 {
    match scope {
        Some(s) => s.seconds(amount),
        None => amount,
    }
}

/// Concrete duration of a yielded step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepDuration {
    /// Ends after this many seconds.
    Seconds(f64),
    /// Ends on a tap.
    UntilTap,
}

impl StepDuration {
    /// Seconds, or `None` for until-tap.
    pub fn seconds(self) -> Option<f64> {
        match self {
            Self::Seconds(s) => Some(s),
            Self::UntilTap => None,
        }
    }
}

/// A primitive with its duration resolved against the enclosing BPM scope.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStep {
    /// Step id, if any.
    pub id: Option<String>,
    /// Kind.
    pub kind: StepKind,
    /// Resolved duration.
    pub duration: StepDuration,
    /// Prompt overrides.
    pub prompt: Prompt,
}

impl ResolvedStep {
    /// Return `true` for a hold that waits for a tap.
    pub fn awaits_tap(&self) -> bool {
        self.duration == StepDuration::UntilTap
    }
}

#[derive(Clone, Debug)]
struct ExecutionFrame {
    id: Option<String>,
    steps: Arc<[Step]>,
    index: usize,
    scope: Option<BpmScope>,
    repeat_total: u32,
    repeat_until_tap: bool,
    iteration: u32,
}

impl ExecutionFrame {
    fn root(steps: Arc<[Step]>) -> Self {
        Self {
            id: None,
            steps,
            index: 0,
            scope: None,
            repeat_total: 1,
            repeat_until_tap: false,
            iteration: 0,
        }
    }
}

/// Stack-based iterator producing one primitive at a time.
#[derive(Clone, Debug)]
pub struct StepIterator {
    stack: Vec<ExecutionFrame>,
    stop_frame: Option<usize>,
}

impl StepIterator {
    /// Start at the first step of `preset`.
    pub fn new(preset: &NormalizedPreset) -> Self {
        Self {
            stack: vec![ExecutionFrame::root(Arc::clone(&preset.steps))],
            stop_frame: None,
        }
    }

    /// Return `true` once the preset has been fully consumed.
    pub fn is_finished(&self) -> bool {
        self.stack.is_empty()
    }

    /// Current nesting depth (root frame included).
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Completed iterations of the innermost frame.
    pub fn current_iteration(&self) -> Option<u32> {
        self.stack.last().map(|f| f.iteration)
    }

    /// Ask the innermost until-tap repeat to finish after its current pass.
    ///
    /// Returns `false` when no until-tap repeat is active.
    pub fn request_until_tap_stop(&mut self) -> bool {
        let found = self.stack.iter().rposition(|f| f.repeat_until_tap);
        if let Some(i) = found {
            tracing::debug!(frame = i, id = ?self.stack[i].id, "until-tap repeat stop requested");
            self.stop_frame = Some(i);
        }
        found.is_some()
    }

    /// Advance to the next primitive. `None` means the preset is complete.
    pub fn next_primitive(&mut self) -> Option<ResolvedStep> {
        loop {
            let depth = self.stack.len();
            let frame = self.stack.last_mut()?;

            if frame.index >= frame.steps.len() {
                let stop = self.stop_frame == Some(depth - 1);
                let again = if frame.repeat_until_tap {
                    !stop
                } else {
                    frame.iteration + 1 < frame.repeat_total
                };
                if again {
                    frame.index = 0;
                    frame.iteration += 1;
                } else {
                    if stop {
                        self.stop_frame = None;
                    }
                    self.stack.pop();
                }
                continue;
            }

            let scope = frame.scope;
            let step = &frame.steps[frame.index];
            frame.index += 1;

            match step {
                Step::Repeat(block) => {
                    let child_scope = match (block.bpm, block.ratio_total) {
                        (Some(bpm), Some(total)) => Some(BpmScope::new(bpm, total)),
                        _ => scope,
                    };
                    let (repeat_total, repeat_until_tap) = match block.count {
                        RepeatCount::Times(n) => (n, false),
                        RepeatCount::UntilTap => (1, true),
                    };
                    let child = ExecutionFrame {
                        id: block.id.clone(),
                        steps: Arc::clone(&block.steps),
                        index: 0,
                        scope: child_scope,
                        repeat_total,
                        repeat_until_tap,
                        iteration: 0,
                    };
                    self.stack.push(child);
                }
                Step::Primitive(p) => {
                    let duration = match p.value {
                        StepValue::UntilTap => StepDuration::UntilTap,
                        StepValue::Amount(v) => StepDuration::Seconds(resolve_amount(v, scope)),
                    };
                    return Some(ResolvedStep {
                        id: p.id.clone(),
                        kind: p.kind,
                        duration,
                        prompt: p.prompt.clone(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/iterator.rs"]
mod tests;
