//! Crate error type.

/// Convenience result type used across breathline.
pub type BreathResult<T> = Result<T, BreathError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum BreathError {
    /// Invalid user-provided preset or settings data.
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation that does not make sense for the current session state.
    #[error("session error: {0}")]
    Session(String),

    /// Errors when serializing or deserializing settings and preset files.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from sinks, stores or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BreathError {
    /// Build a [`BreathError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BreathError::Session`] value.
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }

    /// Build a [`BreathError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
