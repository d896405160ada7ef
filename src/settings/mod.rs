//! User settings and their persistence seam.

pub mod model;
pub mod store;
