//! Domain constants
//!
//! Thresholds and defaults shared by the analysis services and the provider
//! adapters.

// Pattern analysis
pub const MIN_PATTERN_SAMPLES: usize = 3;
/// Sample count at which a pattern's confidence saturates at 1.0.
pub const CONFIDENCE_SATURATION_SAMPLES: f64 = 20.0;
pub const HISTORY_EVENT_LIMIT: u32 = 200;
/// Roughly twelve weeks in a 90-day window; used to turn per-weekday counts
/// into a per-day density.
pub const DENSITY_WEEKS: f64 = 12.0;
pub const FOCUS_ANALYSIS_DAYS: i64 = 90;
pub const ADAPTIVE_LOOKAHEAD_DAYS: i64 = 14;
pub const WORKDAY_START_HOUR: u32 = 9;
pub const WORKDAY_END_HOUR: u32 = 17;

// LLM synthesis
pub const RECOMMENDATION_TEMPERATURE: f32 = 0.7;
pub const RECOMMENDATION_MAX_TOKENS: u32 = 500;
pub const SCHEDULER_TEMPERATURE: f32 = 0.7;
pub const SCHEDULER_MAX_TOKENS: u32 = 2000;
pub const ANALYSIS_TEMPERATURE: f32 = 0.3;
pub const ANALYSIS_MAX_TOKENS: u32 = 2000;
pub const RECOMMENDATIONS_UNAVAILABLE: &str = "Unable to generate AI recommendations";
pub const NO_RECOMMENDATIONS: &str = "No specific recommendations available";

// Email analysis
pub const THREAD_MESSAGE_LIMIT: u32 = 100;
pub const THREAD_BODY_PREVIEW_CHARS: usize = 500;
pub const INBOX_SNIPPET_CHARS: usize = 200;
pub const DEFAULT_MEETING_MINUTES: u32 = 30;

// Provider names
pub const PROVIDER_OLLAMA: &str = "ollama";
pub const PROVIDER_CLAUDE: &str = "claude";
pub const PROVIDER_OPENAI: &str = "openai";
pub const PROVIDER_GROQ: &str = "groq";
pub const KNOWN_PROVIDERS: [&str; 4] =
    [PROVIDER_OLLAMA, PROVIDER_CLAUDE, PROVIDER_OPENAI, PROVIDER_GROQ];

// Provider defaults
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-70b-versatile";
