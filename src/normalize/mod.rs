//! Composable preset validation and the normalized step tree.

pub mod ir;
pub mod pass;
