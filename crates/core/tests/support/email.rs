use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cadence_core::{CallContext, EmailClient};
use cadence_domain::{
    CadenceError, EmailParticipant, Message, MessageQuery, Result as DomainResult, Thread,
};
use chrono::{DateTime, Utc};

/// In-memory mock for `EmailClient` holding one thread and its messages.
#[derive(Default, Clone)]
pub struct MockEmailClient {
    thread: Arc<Mutex<Option<Thread>>>,
    messages: Arc<Mutex<Vec<Message>>>,
    queries: Arc<Mutex<Vec<MessageQuery>>>,
}

impl MockEmailClient {
    pub fn new(thread: Thread, messages: Vec<Message>) -> Self {
        Self {
            thread: Arc::new(Mutex::new(Some(thread))),
            messages: Arc::new(Mutex::new(messages)),
            queries: Arc::default(),
        }
    }

    pub fn queries(&self) -> Vec<MessageQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailClient for MockEmailClient {
    async fn get_thread(&self, ctx: &CallContext, _grant_id: &str, thread_id: &str) -> DomainResult<Thread> {
        ctx.check()?;
        self.thread
            .lock()
            .unwrap()
            .clone()
            .filter(|thread| thread.id == thread_id)
            .ok_or_else(|| CadenceError::NotFound(format!("thread {thread_id}")))
    }

    async fn get_messages(
        &self,
        ctx: &CallContext,
        _grant_id: &str,
        query: &MessageQuery,
    ) -> DomainResult<Vec<Message>> {
        ctx.check()?;
        self.queries.lock().unwrap().push(query.clone());
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| query.thread_id.as_ref().map_or(true, |id| &m.thread_id == id))
            .cloned()
            .collect())
    }
}

pub fn thread(id: &str, subject: &str, emails: &[&str]) -> Thread {
    Thread {
        id: id.into(),
        subject: subject.into(),
        participants: emails.iter().map(|email| EmailParticipant::new("", *email)).collect(),
        message_ids: Vec::new(),
    }
}

pub fn message(thread_id: &str, from: &str, body: &str, date: DateTime<Utc>) -> Message {
    Message {
        id: format!("{thread_id}-{}", date.timestamp()),
        thread_id: thread_id.into(),
        subject: "Q3 roadmap".into(),
        from: vec![EmailParticipant::new("", from)],
        to: Vec::new(),
        cc: Vec::new(),
        body: body.into(),
        snippet: body.chars().take(40).collect(),
        date,
        unread: true,
        starred: false,
    }
}
