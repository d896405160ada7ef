//! Stack-based walk over a normalized preset.

pub mod iterator;
