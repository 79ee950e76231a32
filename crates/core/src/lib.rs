//! # Cadence Core
//!
//! Scheduling intelligence services - no HTTP or filesystem code.
//!
//! This crate contains:
//! - The LLM provider port and the fallback router
//! - Pattern learning, natural-language scheduling and email analysis
//! - Meeting history analytics, the focus-time optimizer, meeting-time
//!   scoring and conflict detection
//! - Calendar and email client ports (traits)
//!
//! ## Architecture Principles
//! - Only depends on `cadence-domain`
//! - Provider adapters and configuration loading live in `cadence-infra`
//! - All external systems via traits
//! - Every operation takes a [`CallContext`] for cancellation and deadlines

pub mod ai;
pub mod analytics;
pub mod calendar_ports;
pub mod context;
pub mod email_ports;
pub mod utils;

// Re-export specific items to avoid ambiguity
pub use ai::{
    AiScheduler, Attempt, EmailAnalyzer, LlmProvider, LlmRouter, PatternLearner, StreamCallback,
    StubToolExecutor, ToolExecutor,
};
pub use analytics::{ConflictResolver, FocusOptimizer, MeetingPatternAnalyzer, MeetingScorer};
pub use calendar_ports::{collect_events, CalendarClient};
pub use context::CallContext;
pub use email_ports::EmailClient;
