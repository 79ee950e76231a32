//! Calendar client port interfaces
//!
//! The calendar/email SaaS client lives outside this crate; the services
//! only see these traits.

use async_trait::async_trait;
use cadence_domain::{CadenceError, Calendar, CreateEventRequest, Event, EventQuery, Result};
use tracing::warn;

use crate::context::CallContext;

/// Trait for calendar read/write operations
#[async_trait]
pub trait CalendarClient: Send + Sync {
    /// List every calendar the grant can see
    async fn get_calendars(&self, ctx: &CallContext, grant_id: &str) -> Result<Vec<Calendar>>;

    /// List events on one calendar inside the query window
    async fn get_events(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<Event>>;

    /// Fetch a single event
    async fn get_event(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<Event>;

    /// Create an event and return it as stored
    async fn create_event(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        calendar_id: &str,
        request: &CreateEventRequest,
    ) -> Result<Event>;
}

/// Collect events across every calendar of a grant.
///
/// Listing the calendars is load-bearing; a failure on an individual
/// calendar is logged and that calendar skipped.
pub async fn collect_events(
    client: &dyn CalendarClient,
    ctx: &CallContext,
    grant_id: &str,
    query: &EventQuery,
) -> Result<Vec<Event>> {
    let calendars = client.get_calendars(ctx, grant_id).await?;

    let mut events = Vec::new();
    for calendar in &calendars {
        match client.get_events(ctx, grant_id, &calendar.id, query).await {
            Ok(batch) => events.extend(batch),
            Err(err @ CadenceError::Cancelled(_)) => return Err(err),
            Err(err) => {
                warn!(calendar_id = %calendar.id, error = %err, "Skipping calendar after fetch error");
            }
        }
    }

    Ok(events)
}
