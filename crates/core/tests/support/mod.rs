//! Shared test helpers for `cadence-core` integration tests.
//!
//! In-memory calendar and mailbox clients plus a scripted LLM provider, so
//! service tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod calendar;
pub mod email;
pub mod providers;
