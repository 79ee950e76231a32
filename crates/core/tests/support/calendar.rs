use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cadence_core::{CalendarClient, CallContext};
use cadence_domain::{
    CadenceError, Calendar, CreateEventRequest, Event, EventQuery, EventWhen, Participant,
    Result as DomainResult,
};

/// In-memory mock for `CalendarClient`.
///
/// Every calendar returns the same seeded events regardless of the query
/// window, so tests control history and lookahead directly. Created events
/// are recorded for assertions.
#[derive(Default, Clone)]
pub struct MockCalendarClient {
    calendars: Arc<Mutex<Vec<Calendar>>>,
    events: Arc<Mutex<Vec<Event>>>,
    created: Arc<Mutex<Vec<(String, CreateEventRequest)>>>,
    queries: Arc<Mutex<Vec<EventQuery>>>,
}

impl MockCalendarClient {
    /// Create a mock with a single primary calendar seeded with `events`.
    pub fn new(events: Vec<Event>) -> Self {
        let mock = Self::default();
        mock.calendars.lock().unwrap().push(Calendar {
            id: "primary".into(),
            name: "Work".into(),
            timezone: Some("UTC".into()),
            read_only: false,
            is_primary: true,
        });
        *mock.events.lock().unwrap() = events;
        mock
    }

    /// Replace the calendar list (empty simulates an account with none).
    pub fn with_calendars(self, calendars: Vec<Calendar>) -> Self {
        *self.calendars.lock().unwrap() = calendars;
        self
    }

    pub fn created(&self) -> Vec<(String, CreateEventRequest)> {
        self.created.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<EventQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarClient for MockCalendarClient {
    async fn get_calendars(&self, ctx: &CallContext, _grant_id: &str) -> DomainResult<Vec<Calendar>> {
        ctx.check()?;
        Ok(self.calendars.lock().unwrap().clone())
    }

    async fn get_events(
        &self,
        ctx: &CallContext,
        _grant_id: &str,
        _calendar_id: &str,
        query: &EventQuery,
    ) -> DomainResult<Vec<Event>> {
        ctx.check()?;
        self.queries.lock().unwrap().push(*query);
        let events = self.events.lock().unwrap().clone();
        Ok(match query.limit {
            Some(limit) => events.into_iter().take(limit as usize).collect(),
            None => events,
        })
    }

    async fn get_event(
        &self,
        ctx: &CallContext,
        _grant_id: &str,
        _calendar_id: &str,
        event_id: &str,
    ) -> DomainResult<Event> {
        ctx.check()?;
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|event| event.id == event_id)
            .cloned()
            .ok_or_else(|| CadenceError::NotFound(format!("event {event_id}")))
    }

    async fn create_event(
        &self,
        ctx: &CallContext,
        _grant_id: &str,
        calendar_id: &str,
        request: &CreateEventRequest,
    ) -> DomainResult<Event> {
        ctx.check()?;
        let mut created = self.created.lock().unwrap();
        created.push((calendar_id.to_string(), request.clone()));
        Ok(Event {
            id: format!("created-{}", created.len()),
            calendar_id: calendar_id.to_string(),
            title: request.title.clone(),
            description: request.description.clone(),
            when: request.when.clone(),
            busy: request.busy,
            ..Event::default()
        })
    }
}

/// Confirmed event starting at `start` (Unix seconds) in `tz`.
pub fn event(id: &str, title: &str, start: i64, minutes: i64, tz: &str) -> Event {
    Event {
        id: id.into(),
        calendar_id: "primary".into(),
        title: title.into(),
        when: EventWhen::new(start, start + minutes * 60, tz),
        status: "confirmed".into(),
        busy: true,
        ..Event::default()
    }
}

/// Attach participants by email.
pub fn with_participants(mut event: Event, emails: &[&str]) -> Event {
    event.participants = emails.iter().map(|email| Participant::new(*email)).collect();
    event
}
