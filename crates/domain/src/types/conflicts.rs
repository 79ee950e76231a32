//! Meeting-time scoring and conflict analysis results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_str_enum;
use crate::types::calendar::Event;

/// Predicted fit of a proposed meeting time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingScore {
    /// 0-100
    pub score: i32,
    /// 0-100, share of pattern families that had data
    pub confidence: f64,
    /// Historical acceptance rate for the slot, 0-1
    pub success_rate: f64,
    pub factors: Vec<ScoreFactor>,
    pub recommendation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_times: Vec<DateTime<Utc>>,
}

/// One contribution to a [`MeetingScore`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub name: String,
    /// Signed, relative to an average slot
    pub impact: i32,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    /// Overlapping times
    Hard,
    SoftBackToBack,
    SoftFocusTime,
    SoftOverload,
}

impl_str_enum!(ConflictType {
    Hard => "hard",
    SoftBackToBack => "soft_back_to_back",
    SoftFocusTime => "soft_focus_time",
    SoftOverload => "soft_overload",
});

impl ConflictType {
    pub const fn is_hard(self) -> bool {
        matches!(self, Self::Hard)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl_str_enum!(ConflictSeverity {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

/// A scheduling problem with a proposed event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ConflictType,
    pub severity: ConflictSeverity,
    /// Absent for focus-time and overload conflicts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_event: Option<Event>,
    pub description: String,
    pub impact: String,
    pub suggestion: String,
    pub can_auto_resolve: bool,
}

/// Alternative slot for a conflicting meeting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RescheduleOption {
    pub proposed_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// 0-100
    pub score: i32,
    pub confidence: f64,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    /// Soft conflicts that remain at this slot
    pub conflicts: Vec<Conflict>,
    /// Share of participants available, 0-1
    pub participant_match: f64,
    pub ai_insight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictAnalysis {
    pub proposed_event: Event,
    pub hard_conflicts: Vec<Conflict>,
    pub soft_conflicts: Vec<Conflict>,
    pub total_conflicts: usize,
    /// False whenever a hard conflict exists.
    pub can_proceed: bool,
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_times: Vec<RescheduleOption>,
    pub ai_recommendation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_kind_serializes_as_type() {
        let conflict = Conflict {
            id: "soft_b2b_e1".into(),
            kind: ConflictType::SoftBackToBack,
            severity: ConflictSeverity::Medium,
            conflicting_event: None,
            description: String::new(),
            impact: String::new(),
            suggestion: String::new(),
            can_auto_resolve: true,
        };

        let json = serde_json::to_value(&conflict).unwrap();
        assert_eq!(json["type"], "soft_back_to_back");
        assert_eq!(json["severity"], "medium");
        assert!(json.get("conflicting_event").is_none());
    }

    #[test]
    fn severity_orders_by_urgency() {
        assert!(ConflictSeverity::Critical > ConflictSeverity::High);
        assert!(ConflictSeverity::Low < ConflictSeverity::Medium);
        assert_eq!("CRITICAL".parse::<ConflictSeverity>().unwrap(), ConflictSeverity::Critical);
        assert!(ConflictType::Hard.is_hard());
    }
}
