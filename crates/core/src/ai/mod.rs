//! Language-model services
//!
//! Provider ports, the fallback router, and the services built on it:
//! pattern learning, natural-language scheduling and email analysis.

pub mod email_analyzer;
pub mod email_prompts;
pub mod pattern_analysis;
pub mod pattern_learner;
pub mod ports;
pub mod router;
pub mod scheduler;
pub mod tool_executor;
pub mod tools;

pub use email_analyzer::EmailAnalyzer;
pub use pattern_learner::PatternLearner;
pub use ports::{LlmProvider, StreamCallback, ToolExecutor};
pub use router::{Attempt, LlmRouter};
pub use scheduler::AiScheduler;
pub use tool_executor::StubToolExecutor;
