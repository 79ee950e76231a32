//! Focus-time protection and adaptive scheduling types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_str_enum;
use crate::types::email::MeetingPriority;
use crate::types::patterns::{DateRange, DurationStats, TimeBlock};

/// A clock range within a day, "HH:MM"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_time: String,
    pub end_time: String,
}

impl TimeRange {
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self { start_time: start_time.into(), end_time: end_time.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct FocusTimeNotificationPrefs {
    pub notify_on_decline: bool,
    pub notify_on_override: bool,
    pub notify_on_adaptation: bool,
    pub daily_summary: bool,
    pub weekly_summary: bool,
}

impl Default for FocusTimeNotificationPrefs {
    fn default() -> Self {
        Self {
            notify_on_decline: true,
            notify_on_override: true,
            notify_on_adaptation: true,
            daily_summary: true,
            weekly_summary: true,
        }
    }
}

/// User preferences for focus-time protection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FocusTimeSettings {
    pub target_hours_per_week: f64,
    /// Minutes
    pub min_block_duration: i64,
    /// Minutes; 0 disables the cap
    pub max_block_duration: i64,
    /// Weekday names to protect; empty means every day.
    pub protected_days: Vec<String>,
    pub excluded_time_ranges: Vec<TimeRange>,
    pub notification_settings: FocusTimeNotificationPrefs,
    pub enabled: bool,
    pub auto_block: bool,
    pub auto_decline: bool,
    pub allow_urgent_override: bool,
    pub require_approval: bool,
}

impl Default for FocusTimeSettings {
    fn default() -> Self {
        Self {
            target_hours_per_week: 14.0,
            min_block_duration: 60,
            max_block_duration: 240,
            protected_days: Vec::new(),
            excluded_time_ranges: Vec::new(),
            notification_settings: FocusTimeNotificationPrefs::default(),
            enabled: true,
            auto_block: true,
            auto_decline: false,
            allow_urgent_override: true,
            require_approval: true,
        }
    }
}

/// A recommended weekly focus window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusTimeBlock {
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    /// Minutes
    pub duration: i64,
    pub score: f64,
    pub reason: String,
    /// Meetings that would collide with this block
    pub conflicts: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusTimeAnalysis {
    pub user_email: String,
    pub analyzed_period: DateRange,
    pub generated_at: DateTime<Utc>,
    pub peak_productivity: Vec<TimeBlock>,
    pub deep_work_sessions: DurationStats,
    pub most_productive_day: String,
    pub least_productive_day: String,
    pub recommended_blocks: Vec<FocusTimeBlock>,
    /// Hours per week already protected
    pub current_protection: f64,
    /// Hours per week the user wants protected
    pub target_protection: f64,
    pub insights: Vec<String>,
    /// 0-100
    pub confidence: f64,
}

/// How a protected block handles incoming meeting requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct FocusProtectionRule {
    pub decline_message: String,
    #[serde(default)]
    pub alternative_times: Vec<String>,
    pub auto_decline: bool,
    pub suggest_alternatives: bool,
    pub allow_critical_meeting: bool,
    pub require_approval: bool,
}

/// A focus block materialized on the calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedBlock {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub calendar_event_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub recurrence_pattern: String,
    pub priority: MeetingPriority,
    pub reason: String,
    pub protection_rules: FocusProtectionRule,
    /// Minutes
    pub duration: i64,
    pub is_recurring: bool,
    pub allow_override: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Denied,
    Expired,
}

impl_str_enum!(ApprovalStatus {
    Pending => "pending",
    Approved => "approved",
    Denied => "denied",
    Expired => "expired",
});

/// External signal prompting a reschedule proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveTrigger {
    DeadlineChange,
    MeetingOverload,
    PriorityShift,
    FocusTimeAtRisk,
    ConflictDetected,
    PatternDetected,
}

impl_str_enum!(AdaptiveTrigger {
    DeadlineChange => "deadline_change",
    MeetingOverload => "meeting_overload",
    PriorityShift => "priority_shift",
    FocusTimeAtRisk => "focus_time_at_risk",
    ConflictDetected => "conflict_detected",
    PatternDetected => "pattern_detected",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveChangeType {
    IncreaseFocusTime,
    RescheduleMeeting,
    ShortenMeeting,
    DeclineMeeting,
    MoveMeetingLater,
    ProtectBlock,
}

impl_str_enum!(AdaptiveChangeType {
    IncreaseFocusTime => "increase_focus_time",
    RescheduleMeeting => "reschedule_meeting",
    ShortenMeeting => "shorten_meeting",
    DeclineMeeting => "decline_meeting",
    MoveMeetingLater => "move_meeting_later",
    ProtectBlock => "protect_block",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationAction {
    Reschedule,
    Shorten,
    Decline,
    Protect,
}

impl_str_enum!(ModificationAction {
    Reschedule => "reschedule",
    Shorten => "shorten",
    Decline => "decline",
    Protect => "protect",
});

/// One proposed change to an upcoming event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleModification {
    /// Empty for changes not tied to an event (e.g. adding focus blocks).
    #[serde(default)]
    pub event_id: String,
    pub action: ModificationAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_start_time: Option<DateTime<Utc>>,
    /// Minutes
    #[serde(default)]
    pub old_duration: i64,
    /// Minutes
    #[serde(default)]
    pub new_duration: i64,
    pub description: String,
}

impl ScheduleModification {
    pub fn new(
        event_id: impl Into<String>,
        action: ModificationAction,
        description: impl Into<String>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            action,
            old_start_time: None,
            new_start_time: None,
            old_duration: 0,
            new_duration: 0,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveImpact {
    /// Hours
    pub focus_time_gained: f64,
    pub meetings_rescheduled: u32,
    pub meetings_declined: u32,
    /// Minutes
    pub duration_saved: i64,
    pub conflicts_resolved: u32,
    pub participants_affected: u32,
    pub predicted_benefit: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risks: Vec<String>,
}

/// A reschedule proposal; never applied automatically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveScheduleChange {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub trigger: AdaptiveTrigger,
    pub change_type: AdaptiveChangeType,
    pub affected_events: Vec<String>,
    pub changes: Vec<ScheduleModification>,
    pub reason: String,
    pub impact: AdaptiveImpact,
    pub user_approval: ApprovalStatus,
    pub auto_applied: bool,
    /// 0-100
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationOptimization {
    pub event_id: String,
    /// Minutes
    pub current_duration: i64,
    /// Minutes
    pub recommended_duration: i64,
    pub historical_data: DurationStats,
    /// Minutes, never negative
    pub time_savings: i64,
    /// 0-100
    pub confidence: f64,
    pub reason: String,
    pub recommendation: String,
}
