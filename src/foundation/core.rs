//! Timestamps, canvas size and small numeric helpers.

use crate::foundation::error::{BreathError, BreathResult};

/// Platform paint timestamp in milliseconds (the `requestAnimationFrame` time base).
///
/// Only differences between two timestamps carry meaning; the origin is whatever the host uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Millis(pub f64);

impl Millis {
    /// Build a timestamp from seconds.
    pub fn from_secs(secs: f64) -> Self {
        Self(secs * 1000.0)
    }

    /// Milliseconds elapsed since `earlier`. Negative when `earlier` is in the future.
    pub fn since(self, earlier: Millis) -> f64 {
        self.0 - earlier.0
    }

    /// Shift by `ms` milliseconds.
    pub fn offset(self, ms: f64) -> Self {
        Self(self.0 + ms)
    }
}

/// Graph surface dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas; zero-sized surfaces are allowed (hidden graph) and simply render nothing.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Return `true` when nothing can be drawn.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Parse a finite number from a JSON scalar (numbers and numeric strings both count).
pub(crate) fn json_number(v: &serde_json::Value) -> Option<f64> {
    let n = match v {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Reject non-finite or negative seconds values.
pub(crate) fn non_negative_secs(what: &str, v: f64) -> BreathResult<f64> {
    if !v.is_finite() || v < 0.0 {
        return Err(BreathError::validation(format!(
            "{what} must be a finite, non-negative number of seconds"
        )));
    }
    Ok(v)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
