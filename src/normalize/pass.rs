//! Validation and normalization of composable presets into the step IR.

use crate::foundation::core::json_number;
use crate::foundation::error::BreathError;
use crate::normalize::ir::{
    NormalizedPreset, PrimitiveStep, Prompt, RepeatBlock, RepeatCount, Step, StepKind, StepValue,
    VoiceCue,
};
use crate::preset::model::PresetDef;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Literal marking an indefinite, tap-terminated value.
pub const UNTIL_TAP: &str = "until_tap";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathElem {
    Field(&'static str),
    Index(usize),
}

/// First validation failure, located in the raw preset.
#[derive(Debug, Clone)]
pub(crate) struct NormalizeError {
    pub(crate) path: Vec<PathElem>,
    pub(crate) message: String,
}

impl NormalizeError {
    fn at(path: &[PathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

impl std::error::Error for NormalizeError {}

impl From<NormalizeError> for BreathError {
    fn from(e: NormalizeError) -> Self {
        BreathError::validation(e.to_string())
    }
}

fn format_path(path: &[PathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            PathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            PathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// Ancestor facts passed down the recursion.
#[derive(Clone, Copy, Debug, Default)]
struct AncestorCtx {
    has_bpm: bool,
}

/// Validate and compile a composable preset.
///
/// Fails on the first problem with a `$.steps[i]...` location.
#[tracing::instrument(skip(def), fields(preset = %def.id))]
pub fn normalize_preset(def: &PresetDef) -> Result<NormalizedPreset, BreathError> {
    let Some(raw_steps) = def.steps.as_deref() else {
        return Err(NormalizeError::at(&[], "preset has no steps").into());
    };
    let mut path = vec![PathElem::Field("steps")];
    let steps = normalize_steps(raw_steps, AncestorCtx::default(), &mut path).map_err(|e| {
        tracing::warn!(error = %e, "preset rejected");
        e
    })?;
    Ok(NormalizedPreset {
        id: def.id.clone(),
        label: def.display_label().to_owned(),
        steps,
        configurable: def.configurable_entries(),
    })
}

fn normalize_steps(
    raw: &[Value],
    ctx: AncestorCtx,
    path: &mut Vec<PathElem>,
) -> Result<Arc<[Step]>, NormalizeError> {
    let mut out = Vec::with_capacity(raw.len());
    for (i, step) in raw.iter().enumerate() {
        path.push(PathElem::Index(i));
        out.push(normalize_step(step, ctx, path)?);
        path.pop();
    }
    Ok(out.into())
}

fn id_of(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn normalize_step(
    raw: &Value,
    ctx: AncestorCtx,
    path: &mut Vec<PathElem>,
) -> Result<Step, NormalizeError> {
    let Some(obj) = raw.as_object() else {
        return Err(NormalizeError::at(path, "step must be an object"));
    };

    if let Some(repeat) = obj.get("repeat").filter(|v| !v.is_null()) {
        let id = id_of(obj.get("id")).or_else(|| id_of(repeat.get("id")));
        path.push(PathElem::Field("repeat"));
        let block = normalize_repeat(repeat, id, ctx, path)?;
        path.pop();
        return Ok(Step::Repeat(block));
    }

    let Some((key, kind, payload)) = [
        ("inhale", StepKind::Inhale),
        ("exhale", StepKind::Exhale),
        ("hold", StepKind::Hold),
    ]
    .into_iter()
    .find_map(|(k, kind)| obj.get(k).map(|v| (k, kind, v))) else {
        return Err(NormalizeError::at(
            path,
            "step must be inhale, exhale, hold or repeat",
        ));
    };

    path.push(PathElem::Field(key));
    let step = normalize_primitive(kind, payload, id_of(obj.get("id")), ctx, path)?;
    path.pop();
    Ok(Step::Primitive(step))
}

fn normalize_primitive(
    kind: StepKind,
    raw: &Value,
    id: Option<String>,
    ctx: AncestorCtx,
    path: &[PathElem],
) -> Result<PrimitiveStep, NormalizeError> {
    let payload = raw.as_object();
    let amount = match payload {
        Some(m) => m
            .get("duration")
            .filter(|v| !v.is_null())
            .or_else(|| m.get("value")),
        None => Some(raw),
    };

    let value = if amount.and_then(Value::as_str) == Some(UNTIL_TAP) {
        if kind != StepKind::Hold {
            return Err(NormalizeError::at(path, "until_tap only valid for hold"));
        }
        if ctx.has_bpm {
            return Err(NormalizeError::at(
                path,
                "until_tap holds are not allowed inside a BPM block",
            ));
        }
        StepValue::UntilTap
    } else {
        match amount.and_then(json_number) {
            Some(v) if v >= 0.0 => StepValue::Amount(v),
            _ => {
                return Err(NormalizeError::at(
                    path,
                    "duration must be a non-negative number",
                ));
            }
        }
    };

    Ok(PrimitiveStep {
        id,
        kind,
        value,
        prompt: payload.map(prompt_of).unwrap_or_default(),
    })
}

fn prompt_of(m: &Map<String, Value>) -> Prompt {
    let cue = match m.get("cue") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    };
    let voice = match m.get("voice") {
        Some(Value::String(s)) if s == "disabled" => VoiceCue::Disabled,
        Some(Value::Bool(false)) => VoiceCue::Disabled,
        Some(Value::String(s)) => VoiceCue::Text(s.clone()),
        _ => VoiceCue::Default,
    };
    let chime = !matches!(m.get("chime"), Some(Value::Bool(false)))
        && m.get("chime").and_then(Value::as_str) != Some("disabled");
    Prompt { cue, voice, chime }
}

fn normalize_repeat(
    raw: &Value,
    id: Option<String>,
    ctx: AncestorCtx,
    path: &mut Vec<PathElem>,
) -> Result<RepeatBlock, NormalizeError> {
    let Some(obj) = raw.as_object() else {
        return Err(NormalizeError::at(path, "repeat must be an object"));
    };

    let bpm_raw = obj.get("bpm").filter(|v| !v.is_null());
    if bpm_raw.is_some() && ctx.has_bpm {
        return Err(NormalizeError::at(
            path,
            "nested BPM repeat blocks are not allowed",
        ));
    }

    let count = match obj.get("n") {
        Some(v) if v.as_str() == Some(UNTIL_TAP) => RepeatCount::UntilTap,
        Some(v) => match json_number(v) {
            Some(n) if n >= 1.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => {
                RepeatCount::Times(n as u32)
            }
            _ => {
                return Err(NormalizeError::at(
                    path,
                    "n must be a positive integer or until_tap",
                ));
            }
        },
        None => {
            return Err(NormalizeError::at(
                path,
                "n must be a positive integer or until_tap",
            ));
        }
    };

    let raw_steps = obj
        .get("steps")
        .and_then(Value::as_array)
        .filter(|s| !s.is_empty());
    let Some(raw_steps) = raw_steps else {
        return Err(NormalizeError::at(path, "repeat block must contain steps"));
    };

    let bpm = match bpm_raw {
        Some(v) => match json_number(v) {
            Some(b) if b > 0.0 => Some(b),
            _ => {
                return Err(NormalizeError::at(path, "bpm must be a positive number"));
            }
        },
        None => None,
    };

    let child_ctx = AncestorCtx {
        has_bpm: ctx.has_bpm || bpm.is_some(),
    };
    path.push(PathElem::Field("steps"));
    let steps = normalize_steps(raw_steps, child_ctx, path)?;
    path.pop();

    let ratio_total = match bpm {
        Some(_) => {
            let total: f64 = steps
                .iter()
                .filter_map(|s| match s {
                    Step::Primitive(p) => Some(p.value.amount_or_zero()),
                    Step::Repeat(_) => None,
                })
                .sum();
            if total <= 0.0 {
                return Err(NormalizeError::at(
                    path,
                    "BPM blocks must have a positive total of primitive durations",
                ));
            }
            Some(total)
        }
        None => None,
    };

    Ok(RepeatBlock {
        id,
        count,
        bpm,
        ratio_total,
        steps,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/pass.rs"]
mod tests;
