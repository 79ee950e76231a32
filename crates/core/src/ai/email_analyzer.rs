//! Email thread and inbox analysis

use std::collections::HashSet;
use std::sync::Arc;

use cadence_domain::constants::{ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE, THREAD_MESSAGE_LIMIT};
use cadence_domain::{
    CadenceError, ChatMessage, ChatRequest, EmailAnalysisRequest, EmailThreadAnalysis,
    InboxSummary, InboxSummaryRequest, InvolvementLevel, Message, MessageQuery, ParticipantInfo,
    Result, Thread,
};
use chrono::Duration;
use tracing::{debug, info};

use super::email_prompts::{
    build_analysis_prompt, build_inbox_prompt, build_thread_context, parse_analysis_response,
    parse_inbox_response, INBOX_SYSTEM_PROMPT, THREAD_SYSTEM_PROMPT,
};
use super::router::LlmRouter;
use crate::context::CallContext;
use crate::email_ports::EmailClient;

const URGENT_KEYWORDS: [&str; 9] = [
    "urgent",
    "asap",
    "immediately",
    "critical",
    "emergency",
    "deadline",
    "today",
    "tomorrow",
    "this week",
];

/// Extracts meeting context from email threads and summarises inboxes
pub struct EmailAnalyzer {
    email: Arc<dyn EmailClient>,
    router: Arc<LlmRouter>,
}

impl EmailAnalyzer {
    pub fn new(email: Arc<dyn EmailClient>, router: Arc<LlmRouter>) -> Self {
        Self { email, router }
    }

    /// Analyze one thread: LLM-derived purpose, topics, priority, duration
    /// and agenda, plus locally computed participant involvement and
    /// urgency indicators.
    pub async fn analyze_thread(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        thread_id: &str,
        request: &EmailAnalysisRequest,
    ) -> Result<EmailThreadAnalysis> {
        let thread = self.email.get_thread(ctx, grant_id, thread_id).await?;

        let query = MessageQuery {
            thread_id: Some(thread_id.to_string()),
            limit: Some(THREAD_MESSAGE_LIMIT),
            unread: None,
        };
        let messages = self.email.get_messages(ctx, grant_id, &query).await?;
        if messages.is_empty() {
            return Err(CadenceError::InsufficientData("thread has no messages".to_string()));
        }

        let prompt = build_analysis_prompt(&build_thread_context(&thread, &messages), request);
        let chat = ChatRequest::new(vec![
            ChatMessage::system(THREAD_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .with_temperature(ANALYSIS_TEMPERATURE)
        .with_max_tokens(ANALYSIS_MAX_TOKENS);

        let response = self.router.chat(ctx, &chat).await?;

        let mut analysis = parse_analysis_response(&response.content, request);
        analysis.thread_id = thread_id.to_string();
        analysis.subject = thread.subject.clone();
        analysis.message_count = messages.len();
        analysis.participant_count = thread.participants.len();
        analysis.participants = analyze_participants(&thread, &messages);
        analysis.urgency_indicators = detect_urgency_indicators(&messages);
        analysis.provider_used = response.provider;
        analysis.tokens_used = response.usage.total_tokens;

        info!(
            thread_id = %thread_id,
            messages = messages.len(),
            priority = %analysis.priority,
            "Analyzed email thread"
        );
        Ok(analysis)
    }

    /// Summarise a batch of messages. Uses the requested provider when set,
    /// the fallback chain otherwise. An answer without parseable JSON
    /// becomes the summary text.
    pub async fn analyze_inbox(
        &self,
        ctx: &CallContext,
        request: &InboxSummaryRequest,
    ) -> Result<InboxSummary> {
        if request.messages.is_empty() {
            return Err(CadenceError::InvalidInput("no messages to analyze".to_string()));
        }

        let chat = ChatRequest::new(vec![
            ChatMessage::system(INBOX_SYSTEM_PROMPT),
            ChatMessage::user(build_inbox_prompt(&request.messages)),
        ])
        .with_temperature(ANALYSIS_TEMPERATURE);

        let response = match request.provider.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => self.router.chat_with_provider(ctx, name, &chat).await?,
            None => self.router.chat(ctx, &chat).await?,
        };

        let mut summary = parse_inbox_response(&response.content).unwrap_or_else(|| {
            debug!("Inbox answer was not JSON, returning raw text");
            InboxSummary { summary: response.content.clone(), ..InboxSummary::default() }
        });
        summary.provider_used = response.provider;
        summary.tokens_used = response.usage.total_tokens;
        Ok(summary)
    }
}

/// Involvement per thread participant, in thread order.
///
/// High when the participant sent more than 30% of messages or is mentioned
/// in more than three bodies; medium for more than one message or any
/// mention; low otherwise. High and medium participants are required.
pub fn analyze_participants(thread: &Thread, messages: &[Message]) -> Vec<ParticipantInfo> {
    let mut participants: Vec<ParticipantInfo> = thread
        .participants
        .iter()
        .map(|p| ParticipantInfo {
            email: p.email.clone(),
            name: p.name.clone(),
            ..ParticipantInfo::default()
        })
        .collect();

    for message in messages {
        for sender in &message.from {
            if let Some(info) = participants.iter_mut().find(|p| p.email == sender.email) {
                info.message_count += 1;
                info.last_message_at = Some(message.date);
            }
        }

        let body = message.body.to_lowercase();
        for info in &mut participants {
            if body.contains(&info.email.to_lowercase()) {
                info.mention_count += 1;
            }
        }
    }

    let total = messages.len() as f64;
    for info in &mut participants {
        let share = info.message_count as f64 / total;
        info.involvement = if total > 0.0 && (share > 0.3 || info.mention_count > 3) {
            InvolvementLevel::High
        } else if info.message_count > 1 || info.mention_count > 0 {
            InvolvementLevel::Medium
        } else {
            InvolvementLevel::Low
        };
        info.required = info.involvement != InvolvementLevel::Low;
    }

    participants
}

/// Urgency signals: keywords in subjects or bodies, a burst of messages
/// within a day, and a wide set of senders. Deduplicated in first-seen
/// order.
pub fn detect_urgency_indicators(messages: &[Message]) -> Vec<String> {
    let mut indicators = Vec::new();

    for message in messages {
        let body = message.body.to_lowercase();
        let subject = message.subject.to_lowercase();
        for keyword in URGENT_KEYWORDS {
            if body.contains(keyword) || subject.contains(keyword) {
                indicators.push(format!("Contains urgent keyword: '{keyword}'"));
            }
        }
    }

    if messages.len() > 5 {
        let earliest = messages.iter().map(|m| m.date).min();
        let latest = messages.iter().map(|m| m.date).max();
        if let (Some(earliest), Some(latest)) = (earliest, latest) {
            let span = latest - earliest;
            if span < Duration::hours(24) {
                indicators.push(format!(
                    "{} messages in {}h (high activity)",
                    messages.len(),
                    (span.num_minutes() + 30) / 60
                ));
            }
        }
    }

    let senders: HashSet<&str> =
        messages.iter().flat_map(|m| m.from.iter().map(|p| p.email.as_str())).collect();
    if senders.len() > 5 {
        indicators.push(format!("{} participants (broad reach)", senders.len()));
    }

    let mut seen = HashSet::new();
    indicators.retain(|indicator| seen.insert(indicator.clone()));
    indicators
}
