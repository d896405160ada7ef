//! Clock, phase controller, cues and the per-frame session facade.

pub mod breath_session;
pub mod clock;
pub mod controller;
pub mod cues;
