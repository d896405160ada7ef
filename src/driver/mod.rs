//! Frame scheduling around a session.

pub mod animation_loop;
