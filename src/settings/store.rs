//! Key-value persistence for [`Settings`](crate::settings::model::Settings).

use crate::foundation::error::BreathResult;
use crate::settings::model::Settings;
use std::collections::BTreeMap;

/// Storage key under which serialized [`Settings`] are kept.
pub const SETTINGS_KEY: &str = "breathing_app_settings";

/// Opaque string key-value persistence owned by the host (cookies, local storage, a file...).
pub trait KeyValueStore {
    /// Read a value, `None` when absent.
    fn get(&self, key: &str) -> BreathResult<Option<String>>;
    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: String) -> BreathResult<()>;
}

/// In-memory store for tests and the CLI.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    values: BTreeMap<String, String>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> BreathResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> BreathResult<()> {
        self.values.insert(key.to_owned(), value);
        Ok(())
    }
}

impl Settings {
    /// Hand the settings to the host store.
    pub fn persist(&self, store: &mut dyn KeyValueStore) -> BreathResult<()> {
        store.set(SETTINGS_KEY, self.to_json()?)
    }

    /// Load settings from the host store.
    ///
    /// Missing or unreadable payloads yield defaults; a corrupt cookie must never block startup.
    pub fn restore(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "settings store read failed; using defaults");
                return Self::default();
            }
        };
        Self::from_json(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored settings unreadable; using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/settings/store.rs"]
mod tests;
