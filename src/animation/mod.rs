//! Easing curves.

pub mod ease;
