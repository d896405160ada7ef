//! Boundary model for preset files.
//!
//! Presets arrive as JSON or YAML. Simple presets carry flat phase seconds; composable presets
//! carry a `steps` tree that stays raw JSON here and is owned by [`crate::normalize`].

use crate::foundation::error::{BreathError, BreathResult};
use crate::settings::model::{BreathMode, SimpleRhythm};
use serde::{Deserialize, Serialize};

/// Category used when a preset does not name one.
pub const DEFAULT_CATEGORY: &str = "Presets";

/// One preset as written in a preset file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetDef {
    /// Stable id; also what settings persist as `selectedPresetId`.
    pub id: String,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Tooltip text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Grouping header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Mode forced onto settings by a simple preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<BreathMode>,
    /// Simple preset: inhale seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inhale: Option<f64>,
    /// Simple preset: hold-after-inhale seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_inhale: Option<f64>,
    /// Simple preset: exhale seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exhale: Option<f64>,
    /// Simple preset: hold-after-exhale seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_exhale: Option<f64>,
    /// Composable preset: raw step tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<serde_json::Value>>,
    /// Values the user may edit on a composable preset.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configurable: Vec<ConfigurableEntryDef>,
}

/// A configurable entry as written: a bare path or a path with an explicit label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigurableEntryDef {
    /// `"repeat|n"`
    Path(String),
    /// `{ path: "repeat|n", label: "Rounds" }`
    Labeled {
        /// `|`-separated path into the raw preset.
        path: String,
        /// Explicit label.
        #[serde(default)]
        label: Option<String>,
    },
}

/// Normalized configurable entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigurableEntry {
    /// `|`-separated path into the raw preset.
    pub path: String,
    /// Explicit label, if any.
    pub label: Option<String>,
}

impl From<&ConfigurableEntryDef> for ConfigurableEntry {
    fn from(def: &ConfigurableEntryDef) -> Self {
        match def {
            ConfigurableEntryDef::Path(path) => Self {
                path: path.clone(),
                label: None,
            },
            ConfigurableEntryDef::Labeled { path, label } => Self {
                path: path.clone(),
                label: label.clone().filter(|l| !l.is_empty()),
            },
        }
    }
}

/// How a preset drives the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PresetKind {
    /// Flat four-phase rhythm written into settings.
    Simple(SimpleRhythm),
    /// Step tree run through the normalizer and iterator.
    Composable,
}

impl PresetDef {
    /// Classify the preset. A `steps` array makes it composable.
    pub fn kind(&self) -> PresetKind {
        if self.steps.is_some() {
            return PresetKind::Composable;
        }
        let secs = |v: Option<f64>| v.filter(|x| x.is_finite()).unwrap_or(0.0).max(0.0);
        PresetKind::Simple(SimpleRhythm {
            inhale: secs(self.inhale),
            hold_inhale: secs(self.hold_inhale),
            exhale: secs(self.exhale),
            hold_exhale: secs(self.hold_exhale),
            mode: self.mode,
        })
    }

    /// Label if present, else the id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// Category if present, else [`DEFAULT_CATEGORY`].
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    /// Configurable entries in normalized form.
    pub fn configurable_entries(&self) -> Vec<ConfigurableEntry> {
        self.configurable.iter().map(ConfigurableEntry::from).collect()
    }

    /// Raw JSON tree, the surface configurable paths address.
    pub fn to_value(&self) -> BreathResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| BreathError::serde(format!("preset to json: {e}")))
    }

    /// Rebuild a preset from its raw JSON tree.
    pub fn from_value(v: serde_json::Value) -> BreathResult<Self> {
        serde_json::from_value(v).map_err(|e| BreathError::serde(format!("preset from json: {e}")))
    }
}

/// The full list of presets loaded from a preset file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetLibrary {
    /// Presets in file order.
    #[serde(default)]
    pub presets: Vec<PresetDef>,
}

impl PresetLibrary {
    /// Parse a JSON preset file.
    pub fn from_json_reader<R: std::io::Read>(r: R) -> BreathResult<Self> {
        serde_json::from_reader(r).map_err(|e| BreathError::serde(format!("parse presets: {e}")))
    }

    /// Parse a JSON preset file from a string.
    pub fn from_json_str(s: &str) -> BreathResult<Self> {
        Self::from_json_reader(s.as_bytes())
    }

    /// Parse a YAML preset file.
    pub fn from_yaml_str(s: &str) -> BreathResult<Self> {
        serde_yaml::from_str(s).map_err(|e| BreathError::serde(format!("parse presets: {e}")))
    }

    /// Look a preset up by id.
    pub fn find(&self, id: &str) -> Option<&PresetDef> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Presets grouped by category, categories in first-seen order.
    pub fn by_category(&self) -> Vec<(&str, Vec<&PresetDef>)> {
        let mut groups: Vec<(&str, Vec<&PresetDef>)> = Vec::new();
        for p in &self.presets {
            let cat = p.category_or_default();
            match groups.iter_mut().find(|(c, _)| *c == cat) {
                Some((_, list)) => list.push(p),
                None => groups.push((cat, vec![p])),
            }
        }
        groups
    }
}

#[cfg(test)]
#[path = "../../tests/unit/preset/model.rs"]
mod tests;
