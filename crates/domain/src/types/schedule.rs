//! Natural-language scheduling requests and ranked options

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Free-text request, e.g. "30 minutes with the Berlin team next week"
    pub query: String,
    pub grant_id: String,
    /// IANA id; blank means UTC
    #[serde(default)]
    pub user_timezone: String,
    /// 0 keeps every option the model returned
    #[serde(default)]
    pub max_options: usize,
}

impl ScheduleRequest {
    pub fn new(query: impl Into<String>, grant_id: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            grant_id: grant_id.into(),
            user_timezone: String::new(),
            max_options: 0,
        }
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.user_timezone = timezone.into();
        self
    }

    #[must_use]
    pub const fn with_max_options(mut self, max_options: usize) -> Self {
        self.max_options = max_options;
        self
    }
}

/// A meeting time as one participant sees it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantTime {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_time: Option<DateTime<FixedOffset>>,
    /// e.g. "9:00 AM - 10:00 AM EST"
    #[serde(default)]
    pub time_desc: String,
    /// e.g. "Morning", "End of day"
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleOption {
    pub rank: u32,
    /// 0-100
    pub score: u32,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub participants: BTreeMap<String, ParticipantTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    /// Never empty
    pub options: Vec<ScheduleOption>,
    /// Raw final model answer
    pub analysis: String,
    pub provider_used: String,
    pub tokens_used: u32,
}
