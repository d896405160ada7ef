//! Normalized composable preset tree.
//!
//! Built once per preset selection by [`crate::normalize::pass::normalize_preset`] and shared
//! read-only afterwards; children live behind `Arc<[Step]>` so iterator frames can hold a slice
//! without copying the tree.

use crate::preset::model::ConfigurableEntry;
use std::sync::Arc;

/// Breath primitive kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Breathe in.
    Inhale,
    /// Breathe out.
    Exhale,
    /// Hold at the current lung level.
    Hold,
}

impl StepKind {
    /// Key used in preset files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inhale => "inhale",
            Self::Exhale => "exhale",
            Self::Hold => "hold",
        }
    }
}

/// Primitive amount: ratio units inside a BPM block, seconds elsewhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepValue {
    /// Finite, non-negative amount.
    Amount(f64),
    /// Ended by a user tap. Holds only.
    UntilTap,
}

impl StepValue {
    /// The amount, or `0` for until-tap.
    pub fn amount_or_zero(self) -> f64 {
        match self {
            Self::Amount(v) => v,
            Self::UntilTap => 0.0,
        }
    }
}

/// Repeat block iteration count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepeatCount {
    /// Run the body this many times (at least once).
    Times(u32),
    /// Loop until a tap stops the block.
    UntilTap,
}

/// Voice override for a primitive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum VoiceCue {
    /// Speak the cue text.
    #[default]
    Default,
    /// Stay silent.
    Disabled,
    /// Speak this text instead of the cue.
    Text(String),
}

/// Per-step prompt overrides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    /// Instruction text replacing the phase default.
    pub cue: Option<String>,
    /// Voice override.
    pub voice: VoiceCue,
    /// `false` when the preset disabled the chime for this step.
    pub chime: bool,
}

impl Default for Prompt {
    fn default() -> Self {
        Self {
            cue: None,
            voice: VoiceCue::Default,
            chime: true,
        }
    }
}

/// One inhale, exhale or hold.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimitiveStep {
    /// Step id, if the preset gave one.
    pub id: Option<String>,
    /// Kind.
    pub kind: StepKind,
    /// Amount.
    pub value: StepValue,
    /// Prompt overrides.
    pub prompt: Prompt,
}

impl PrimitiveStep {
    /// Return `true` for a hold that waits for a tap.
    pub fn is_until_tap(&self) -> bool {
        self.value == StepValue::UntilTap
    }
}

/// A block repeating its children.
#[derive(Clone, Debug, PartialEq)]
pub struct RepeatBlock {
    /// Block id (`id` on the step or inside `repeat`).
    pub id: Option<String>,
    /// Iteration count.
    pub count: RepeatCount,
    /// Target BPM; children are then ratio units of one `60 / bpm` cycle.
    pub bpm: Option<f64>,
    /// Sum of direct primitive children's amounts when `bpm` is set.
    pub ratio_total: Option<f64>,
    /// Body.
    pub steps: Arc<[Step]>,
}

/// Normalized step.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Breath primitive.
    Primitive(PrimitiveStep),
    /// Nested block.
    Repeat(RepeatBlock),
}

/// Validated, immutable compiled preset.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedPreset {
    /// Preset id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Top-level steps.
    pub steps: Arc<[Step]>,
    /// Editable entries.
    pub configurable: Vec<ConfigurableEntry>,
}
