//! Email records and thread-analysis results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_str_enum;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailParticipant {
    #[serde(default)]
    pub name: String,
    pub email: String,
}

impl EmailParticipant {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self { name: name.into(), email: email.into() }
    }

    /// `Name <email>` when a name is known, else the bare address.
    pub fn display(&self) -> String {
        if self.name.is_empty() {
            self.email.clone()
        } else {
            format!("{} <{}>", self.name, self.email)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub participants: Vec<EmailParticipant>,
    #[serde(default)]
    pub message_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub from: Vec<EmailParticipant>,
    #[serde(default)]
    pub to: Vec<EmailParticipant>,
    #[serde(default)]
    pub cc: Vec<EmailParticipant>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub snippet: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub starred: bool,
}

/// Filter for listing messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unread: Option<bool>,
}

/// How hard a meeting is to move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingPriority {
    Critical,
    Urgent,
    High,
    #[default]
    Medium,
    Low,
    Flexible,
}

impl_str_enum!(MeetingPriority {
    Critical => "critical",
    Urgent => "urgent",
    High => "high",
    Medium => "medium",
    Low => "low",
    Flexible => "flexible",
});

/// How involved a participant is in a thread
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvolvementLevel {
    High,
    Medium,
    #[default]
    Low,
}

impl_str_enum!(InvolvementLevel {
    High => "high",
    Medium => "medium",
    Low => "low",
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub email: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub required: bool,
    pub involvement: InvolvementLevel,
    pub mention_count: usize,
    pub message_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub title: String,
    /// Minutes
    pub duration: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingAgenda {
    pub title: String,
    /// Sum of item durations, minutes
    pub duration: u32,
    pub items: Vec<AgendaItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAnalysisRequest {
    pub thread_id: String,
    #[serde(default)]
    pub include_agenda: bool,
    #[serde(default)]
    pub include_time: bool,
}

/// Meeting context extracted from an email thread
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailThreadAnalysis {
    pub thread_id: String,
    pub subject: String,
    pub message_count: usize,
    pub participant_count: usize,
    pub purpose: String,
    pub topics: Vec<String>,
    pub priority: MeetingPriority,
    /// Minutes
    pub suggested_duration: u32,
    pub participants: Vec<ParticipantInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agenda: Option<MeetingAgenda>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urgency_indicators: Vec<String>,
    #[serde(default)]
    pub provider_used: String,
    #[serde(default)]
    pub tokens_used: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxSummaryRequest {
    pub messages: Vec<Message>,
    /// Bypass the fallback chain and use this provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailCategory {
    pub name: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub subjects: Vec<String>,
}

/// An email that needs attention
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub subject: String,
    #[serde(default)]
    pub from: String,
    /// high, medium, low
    #[serde(default)]
    pub urgency: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxSummary {
    pub summary: String,
    #[serde(default)]
    pub categories: Vec<EmailCategory>,
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub provider_used: String,
    #[serde(default)]
    pub tokens_used: u32,
}
