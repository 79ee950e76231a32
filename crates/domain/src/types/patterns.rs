//! Pattern-analysis results
//!
//! Two families live here: [`SchedulingPatterns`], the LLM-assisted summary
//! of calendar behaviour, and [`MeetingAnalysis`], the per-weekday/per-hour
//! statistics the focus optimizer builds on. Neither is persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Scheduling patterns
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnPatternsRequest {
    pub grant_id: String,
    pub lookback_days: i64,
    /// Reported back to callers; does not filter patterns.
    #[serde(default)]
    pub min_confidence: f64,
    #[serde(default)]
    pub include_recurring: bool,
}

impl LearnPatternsRequest {
    pub fn new(grant_id: impl Into<String>, lookback_days: i64) -> Self {
        Self {
            grant_id: grant_id.into(),
            lookback_days,
            min_confidence: 0.0,
            include_recurring: false,
        }
    }

    #[must_use]
    pub const fn with_recurring(mut self, include: bool) -> Self {
        self.include_recurring = include;
        self
    }
}

/// Span actually covered by the analyzed events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPeriod {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptancePattern {
    /// e.g. "Monday 9-11 AM"
    pub time_slot: String,
    /// 0-1
    pub accept_rate: f64,
    pub event_count: usize,
    pub description: String,
    /// 0-1, grows with sample size
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationPattern {
    pub meeting_type: String,
    /// Minutes
    pub scheduled_duration: i64,
    /// Minutes. Equal to `scheduled_duration` until real end-of-use tracking
    /// exists upstream.
    pub actual_duration: i64,
    pub variance: i64,
    pub event_count: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimezonePattern {
    pub timezone: String,
    pub event_count: usize,
    /// Share of all analyzed events, 0-1
    pub percentage: f64,
    pub preferred_time: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductivityInsight {
    /// e.g. `high_meeting_density`, `low_meeting_density`
    pub insight_type: String,
    pub time_slot: String,
    /// 0-100
    pub score: u32,
    pub description: String,
    pub based_on: Vec<String>,
}

/// Result of one pattern-learning pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingPatterns {
    pub user_id: String,
    pub analysis_period: AnalysisPeriod,
    pub acceptance_patterns: Vec<AcceptancePattern>,
    pub duration_patterns: Vec<DurationPattern>,
    pub timezone_patterns: Vec<TimezonePattern>,
    pub productivity_insights: Vec<ProductivityInsight>,
    pub recommendations: Vec<String>,
    pub total_events_analyzed: usize,
    pub generated_at: DateTime<Utc>,
}

// ============================================================================
// Meeting history analysis
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Acceptance rates keyed by weekday ("Monday"), hour ("09:00") and both
/// ("Monday-09:00")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcceptancePatterns {
    pub by_day_of_week: BTreeMap<String, f64>,
    pub by_time_of_day: BTreeMap<String, f64>,
    pub by_day_and_time: BTreeMap<String, f64>,
    pub overall: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    /// Minutes
    pub average_scheduled: i64,
    /// Minutes
    pub average_actual: i64,
    /// Standard deviation of durations, minutes
    pub variance: f64,
    /// Share of meetings that ran over, 0-1
    pub overrun_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationPatterns {
    pub by_participant: BTreeMap<String, DurationStats>,
    pub by_type: BTreeMap<String, DurationStats>,
    pub overall: DurationStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezonePatterns {
    pub preferred_times: BTreeMap<String, Vec<String>>,
    pub distribution: BTreeMap<String, usize>,
    pub cross_tz_times: Vec<String>,
}

/// A recurring weekly window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub day_of_week: String,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
    /// 0-100
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductivityPatterns {
    pub peak_focus: Vec<TimeBlock>,
    pub low_energy: Vec<TimeBlock>,
    /// Weekday -> average meetings per day
    pub meeting_density: BTreeMap<String, f64>,
    /// Best peak-focus block per weekday, Monday first
    pub focus_blocks: Vec<TimeBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParticipantPattern {
    pub email: String,
    pub meeting_count: usize,
    pub acceptance_rate: f64,
    pub preferred_days: Vec<String>,
    pub preferred_times: Vec<String>,
    /// Minutes
    pub average_duration: i64,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingPattern {
    #[serde(default)]
    pub user_email: String,
    pub analyzed_period: DateRange,
    pub last_updated: DateTime<Utc>,
    pub acceptance: AcceptancePatterns,
    pub duration: DurationPatterns,
    pub timezone: TimezonePatterns,
    pub productivity: ProductivityPatterns,
    pub participants: BTreeMap<String, ParticipantPattern>,
}

/// Actionable suggestion derived from meeting history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// `focus_time`, `decline_pattern`, `duration_adjustment`
    #[serde(rename = "type")]
    pub kind: String,
    /// high, medium, low
    pub priority: String,
    pub title: String,
    pub description: String,
    /// 0-100
    pub confidence: f64,
    pub action: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingAnalysis {
    pub period: DateRange,
    pub total_meetings: usize,
    /// `None` when the period holds no meetings.
    pub patterns: Option<MeetingPattern>,
    pub recommendations: Vec<Recommendation>,
    pub insights: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_exclude_recurring() {
        let req: LearnPatternsRequest =
            serde_json::from_str(r#"{"grant_id": "g", "lookback_days": 30}"#).unwrap();

        assert!(!req.include_recurring);
        assert!(req.min_confidence.abs() < f64::EPSILON);
        assert!(LearnPatternsRequest::new("g", 7).with_recurring(true).include_recurring);
    }

    #[test]
    fn recommendation_serializes_kind_as_type() {
        let rec = Recommendation {
            kind: "focus_time".into(),
            priority: "high".into(),
            title: "Block Tuesday".into(),
            description: String::new(),
            confidence: 90.0,
            action: String::new(),
            impact: String::new(),
        };
        assert_eq!(serde_json::to_value(&rec).unwrap()["type"], "focus_time");
    }
}
