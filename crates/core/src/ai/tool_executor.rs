//! Placeholder tool implementations
//!
//! Returns canned success payloads so the tool-calling loop works end to
//! end. Swap in a real [`ToolExecutor`] once calendar and timezone engines
//! are wired up.

use async_trait::async_trait;
use cadence_domain::{CadenceError, Result};
use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};

use super::ports::ToolExecutor;
use super::tools::{
    CHECK_DST, CREATE_EVENT, FIND_MEETING_TIME, GET_AVAILABILITY, GET_TIMEZONE_INFO,
    VALIDATE_WORKING_HOURS,
};
use crate::context::CallContext;

#[derive(Debug, Clone, Copy, Default)]
pub struct StubToolExecutor;

impl StubToolExecutor {
    pub const fn new() -> Self {
        Self
    }
}

fn arg<'a>(arguments: &'a Map<String, Value>, name: &str) -> &'a str {
    arguments.get(name).and_then(Value::as_str).unwrap_or_default()
}

#[async_trait]
impl ToolExecutor for StubToolExecutor {
    async fn execute(
        &self,
        ctx: &CallContext,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<String> {
        ctx.check()?;

        let payload = match name {
            FIND_MEETING_TIME => json!({
                "status": "success",
                "message": "Found 3 available time slots",
                "slots": [
                    {"start": (Utc::now() + Duration::hours(24)).to_rfc3339(), "score": 95}
                ]
            }),
            CHECK_DST => json!({
                "status": "success",
                "time": arg(arguments, "time"),
                "timezone": arg(arguments, "timezone"),
                "isDST": false,
                "warning": ""
            }),
            VALIDATE_WORKING_HOURS => json!({
                "status": "success",
                "isValid": true,
                "violations": []
            }),
            CREATE_EVENT => json!({
                "status": "success",
                "eventID": format!("event-{}", Utc::now().format("%Y%m%d%H%M%S")),
                "title": arg(arguments, "title"),
                "message": "Event created successfully"
            }),
            GET_AVAILABILITY => json!({
                "status": "success",
                "availableSlots": [],
                "busySlots": []
            }),
            GET_TIMEZONE_INFO => json!({
                "status": "success",
                "email": arg(arguments, "email"),
                "timezone": "America/New_York",
                "offset": "-05:00",
                "isDST": false
            }),
            other => return Err(CadenceError::InvalidInput(format!("unknown function: {other}"))),
        };

        Ok(serde_json::to_string(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), Value::String((*v).to_string()))).collect()
    }

    async fn run(name: &str, arguments: Map<String, Value>) -> Result<Value> {
        let raw = StubToolExecutor::new().execute(&CallContext::new(), name, &arguments).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    #[tokio::test]
    async fn check_dst_echoes_arguments() {
        let out = run(CHECK_DST, args(&[("time", "2025-03-09T02:30:00-08:00"), ("timezone", "America/Los_Angeles")]))
            .await
            .unwrap();

        assert_eq!(out["status"], "success");
        assert_eq!(out["timezone"], "America/Los_Angeles");
        assert_eq!(out["isDST"], false);
    }

    #[tokio::test]
    async fn create_event_stamps_an_id() {
        let out = run(CREATE_EVENT, args(&[("title", "Sync")])).await.unwrap();

        assert_eq!(out["title"], "Sync");
        assert!(out["eventID"].as_str().unwrap().starts_with("event-"));
    }

    #[tokio::test]
    async fn missing_arguments_become_empty_strings() {
        let out = run(GET_TIMEZONE_INFO, Map::new()).await.unwrap();
        assert_eq!(out["email"], "");
        assert_eq!(out["timezone"], "America/New_York");
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let err = run("bookFlight", Map::new()).await.unwrap_err();
        assert_eq!(err, CadenceError::InvalidInput("unknown function: bookFlight".to_string()));
    }
}
