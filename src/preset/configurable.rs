//! `|`-separated paths into a raw composable preset, and the atomic edit surface built on them.
//!
//! Path segments: `repeat` enters a repeat block (the current node's own, or the first repeat step
//! of the current array / `steps`), `steps` enters a steps array, any other segment inside an
//! array picks the step whose `id` (or `repeat.id`) matches, falling back to a numeric index.
//! Everywhere else a segment is a plain property name.

use crate::foundation::error::{BreathError, BreathResult};
use crate::normalize::ir::NormalizedPreset;
use crate::normalize::pass::normalize_preset;
use crate::preset::model::{ConfigurableEntry, PresetDef};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Hop {
    Key(String),
    Index(usize),
}

fn step_id(step: &Value) -> Option<&str> {
    step.get("id")
        .and_then(Value::as_str)
        .or_else(|| step.get("repeat")?.get("id")?.as_str())
}

fn first_repeat(steps: &[Value]) -> Option<usize> {
    steps
        .iter()
        .position(|s| s.get("repeat").is_some_and(Value::is_object))
}

fn hops(current: &Value, segment: &str) -> Option<Vec<Hop>> {
    let steps = current.get("steps").and_then(Value::as_array);
    match segment {
        "repeat" => {
            if current.get("repeat").is_some_and(Value::is_object) {
                Some(vec![Hop::Key("repeat".into())])
            } else if let Some(arr) = current.as_array() {
                let i = first_repeat(arr)?;
                Some(vec![Hop::Index(i), Hop::Key("repeat".into())])
            } else {
                let i = first_repeat(steps?)?;
                Some(vec![
                    Hop::Key("steps".into()),
                    Hop::Index(i),
                    Hop::Key("repeat".into()),
                ])
            }
        }
        "steps" if steps.is_some() => Some(vec![Hop::Key("steps".into())]),
        "steps" if current.is_array() => Some(Vec::new()),
        "steps" => None,
        _ => {
            if let Some(arr) = current.as_array() {
                let i = arr
                    .iter()
                    .position(|s| step_id(s) == Some(segment))
                    .or_else(|| segment.parse::<usize>().ok().filter(|&i| i < arr.len()))?;
                Some(vec![Hop::Index(i)])
            } else if current.get(segment).is_some() {
                Some(vec![Hop::Key(segment.to_owned())])
            } else {
                None
            }
        }
    }
}

fn follow<'a>(mut v: &'a Value, route: &[Hop]) -> Option<&'a Value> {
    for hop in route {
        v = match hop {
            Hop::Key(k) => v.get(k.as_str())?,
            Hop::Index(i) => v.get(*i)?,
        };
    }
    Some(v)
}

fn follow_mut<'a>(mut v: &'a mut Value, route: &[Hop]) -> Option<&'a mut Value> {
    for hop in route {
        v = match hop {
            Hop::Key(k) => v.get_mut(k.as_str())?,
            Hop::Index(i) => v.get_mut(*i)?,
        };
    }
    Some(v)
}

fn resolve(root: &Value, segments: &[&str]) -> Option<Vec<Hop>> {
    let mut route = Vec::new();
    let mut current = root;
    for seg in segments {
        let next = hops(current, seg)?;
        current = follow(current, &next)?;
        route.extend(next);
    }
    Some(route)
}

/// Read the value a configurable entry addresses.
pub fn get_configurable_value<'a>(preset: &'a Value, entry: &ConfigurableEntry) -> Option<&'a Value> {
    if entry.path.is_empty() {
        return None;
    }
    let segments: Vec<&str> = entry.path.split('|').collect();
    let route = resolve(preset, &segments)?;
    follow(preset, &route)
}

/// Write `value` at the entry's path. Returns `false` when the path does not resolve.
pub fn set_configurable_value(preset: &mut Value, entry: &ConfigurableEntry, value: Value) -> bool {
    let mut segments: Vec<&str> = entry.path.split('|').collect();
    let Some(last) = segments.pop().filter(|s| !s.is_empty()) else {
        return false;
    };
    let Some(route) = resolve(preset, &segments) else {
        return false;
    };
    match follow_mut(preset, &route) {
        Some(Value::Object(map)) => {
            map.insert(last.to_owned(), value);
            true
        }
        Some(Value::Array(arr)) => match last.parse::<usize>().ok().and_then(|i| arr.get_mut(i)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        },
        _ => false,
    }
}

/// Human-readable label for a configurable entry.
pub fn configurable_label(entry: &ConfigurableEntry) -> String {
    if entry.path.is_empty() {
        return "Unknown".to_owned();
    }
    if let Some(label) = &entry.label {
        return label.clone();
    }

    let segments: Vec<&str> = entry.path.split('|').collect();
    let last = segments.last().copied().unwrap_or_default();
    let context = segments
        .iter()
        .rev()
        .find(|s| !matches!(**s, "repeat" | "steps" | "n" | "bpm"))
        .map(|s| match *s {
            "breaths" => "Breaths",
            other => other,
        });
    let nested = segments.iter().filter(|s| **s == "repeat").count() > 1;

    match (last, context) {
        ("n", Some(ctx)) if nested => format!("{ctx} per Cycle"),
        ("n", _) => "Number of Cycles".to_owned(),
        ("bpm", Some(ctx)) => format!("{ctx} BPM"),
        ("bpm", None) => "Breaths per Minute".to_owned(),
        (other, _) => other.to_owned(),
    }
}

/// Slider configuration for a configurable entry.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ConfigurableInput {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
    /// Step size.
    pub step: f64,
    /// Suffix appended to the displayed value.
    pub unit: &'static str,
}

/// Input range for an entry, keyed on the property it edits.
pub fn configurable_input(entry: &ConfigurableEntry) -> ConfigurableInput {
    match entry.path.rsplit('|').next().unwrap_or_default() {
        "n" => ConfigurableInput {
            min: 1.0,
            max: 60.0,
            step: 1.0,
            unit: "",
        },
        "bpm" => ConfigurableInput {
            min: 5.0,
            max: 60.0,
            step: 1.0,
            unit: " BPM",
        },
        _ => ConfigurableInput {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            unit: "",
        },
    }
}

/// JSON number for a slider value; whole numbers stay integers so `n` reads back as `3`, not `3.0`.
pub fn number_value(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Value::from(v as i64)
    } else {
        serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
    }
}

/// A selected composable preset: its raw tree plus the normalized form compiled from it.
///
/// Both halves are replaced together. A failed edit leaves the last good pair in place.
#[derive(Clone, Debug)]
pub struct PresetSelection {
    def: PresetDef,
    raw: Value,
    normalized: Arc<NormalizedPreset>,
}

impl PresetSelection {
    /// Normalize `def` and capture its raw tree.
    pub fn new(def: &PresetDef) -> BreathResult<Self> {
        let normalized = normalize_preset(def)?;
        Ok(Self {
            def: def.clone(),
            raw: def.to_value()?,
            normalized: Arc::new(normalized),
        })
    }

    /// Current preset definition (reflects accepted edits).
    pub fn def(&self) -> &PresetDef {
        &self.def
    }

    /// Current raw tree.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Current normalized preset.
    pub fn normalized(&self) -> &Arc<NormalizedPreset> {
        &self.normalized
    }

    /// Editable entries.
    pub fn entries(&self) -> &[ConfigurableEntry] {
        &self.normalized.configurable
    }

    /// Current value at `entry`.
    pub fn value(&self, entry: &ConfigurableEntry) -> Option<&Value> {
        get_configurable_value(&self.raw, entry)
    }

    /// Write a value, re-normalize, and swap both halves in on success.
    pub fn set_value(&mut self, entry: &ConfigurableEntry, value: Value) -> BreathResult<()> {
        let mut raw = self.raw.clone();
        if !set_configurable_value(&mut raw, entry, value) {
            return Err(BreathError::validation(format!(
                "configurable path `{}` does not resolve",
                entry.path
            )));
        }
        let def = PresetDef::from_value(raw.clone())?;
        let normalized = normalize_preset(&def)?;
        self.def = def;
        self.raw = raw;
        self.normalized = Arc::new(normalized);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preset/configurable.rs"]
mod tests;
