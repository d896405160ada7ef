//! Simple-mode phase durations.

pub mod durations;
