//! Calendar records consumed from the external calendar client
//!
//! Instants are Unix seconds; zones are IANA ids. Events are read-only input
//! to the analysis services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub is_primary: bool,
}

/// When an event happens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWhen {
    pub start_time: i64,
    pub end_time: i64,
    #[serde(default)]
    pub start_timezone: String,
    #[serde(default)]
    pub end_timezone: String,
}

impl EventWhen {
    pub fn new(start_time: i64, end_time: i64, timezone: impl Into<String>) -> Self {
        let timezone = timezone.into();
        Self { start_time, end_time, start_timezone: timezone.clone(), end_timezone: timezone }
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.start_time, 0)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.end_time, 0)
    }

    /// Scheduled length in whole minutes, truncated.
    pub const fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time) / 60
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// yes, no, maybe, noreply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Participant {
    pub fn new(email: impl Into<String>) -> Self {
        Self { email: email.into(), name: None, status: None }
    }
}

/// Calendar occurrence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub calendar_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub when: EventWhen,
    #[serde(default)]
    pub participants: Vec<Participant>,
    /// confirmed, cancelled, tentative
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub busy: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_event_id: Option<String>,
}

impl Event {
    /// Part of a recurring series (has a rule or points at a master event).
    pub fn is_recurring(&self) -> bool {
        !self.recurrence.is_empty()
            || self.master_event_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == "confirmed"
    }
}

/// Filter for listing events on one calendar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    pub start: i64,
    pub end: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub when: EventWhen,
    #[serde(default)]
    pub participants: Vec<Participant>,
    pub busy: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
}
