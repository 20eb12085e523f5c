//! HTTP handler modules.

pub mod ai;
pub mod auth;
pub mod notes;
