//! Preset files and configurable values.

pub mod configurable;
pub mod model;
