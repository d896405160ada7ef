//! Breath waveform: level functions and the scrolling sampler.

pub mod cyclic;
pub mod renderer;
pub mod timeline;
