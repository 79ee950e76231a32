//! Shared helpers

pub mod text;
pub mod time;
