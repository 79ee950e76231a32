//! Calendar analytics
//!
//! Deterministic meeting-history statistics, the focus-time optimizer,
//! meeting-time scoring and conflict detection built on them. Nothing here
//! calls a language model.

pub mod adaptive;
pub mod conflicts;
pub mod focus_optimizer;
pub mod history;
pub mod scorer;

pub use conflicts::ConflictResolver;
pub use focus_optimizer::FocusOptimizer;
pub use history::MeetingPatternAnalyzer;
pub use scorer::MeetingScorer;
