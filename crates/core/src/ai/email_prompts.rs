//! Prompt builders and response parsers for email analysis
//!
//! Thread analysis uses a line-oriented format (`PURPOSE:`, `TOPICS:`,
//! `PRIORITY:`, `DURATION:`, `AGENDA:`); inbox summaries ask for a JSON
//! object. Both parsers are lenient and fill defaults instead of failing.

use std::fmt::Write as _;

use cadence_domain::constants::{
    DEFAULT_MEETING_MINUTES, INBOX_SNIPPET_CHARS, THREAD_BODY_PREVIEW_CHARS,
};
use cadence_domain::{
    AgendaItem, EmailAnalysisRequest, EmailParticipant, EmailThreadAnalysis, InboxSummary,
    MeetingAgenda, MeetingPriority, Message, Thread,
};

use crate::utils::text::{outermost_span, truncate_chars};

pub(crate) const THREAD_SYSTEM_PROMPT: &str = "You are an expert meeting scheduler and email analyst. \
     Analyze email threads to extract meeting context, topics, priority, and participant involvement.";

pub(crate) const INBOX_SYSTEM_PROMPT: &str = r#"You are an email analyst. Analyze the provided emails and return a JSON response with the following structure:

{
  "summary": "A brief 2-3 sentence overview of the inbox",
  "categories": [
    {
      "name": "Category name (e.g., Work, Personal, Newsletters, Promotions)",
      "count": 3,
      "subjects": ["Subject 1", "Subject 2", "Subject 3"]
    }
  ],
  "action_items": [
    {
      "subject": "Email subject",
      "from": "sender@example.com",
      "urgency": "high|medium|low",
      "reason": "Why this needs attention"
    }
  ],
  "highlights": [
    "Key point or important information from the emails",
    "Another key insight"
  ]
}

Guidelines:
- Categories should group similar emails (Work, Personal, Newsletters, Social, Promotions, Updates)
- Action items are emails that likely need a response or action
- Urgency levels: high (time-sensitive, important), medium (should respond soon), low (informational)
- Highlights should capture 3-5 key points from across all emails
- Keep the summary concise and actionable
- Focus on what matters most to the user

Respond ONLY with valid JSON, no additional text."#;

/// Plain-text digest of a thread for the analysis prompt.
///
/// Messages arrive newest first from the client and are written oldest
/// first so the conversation reads top to bottom.
pub fn build_thread_context(thread: &Thread, messages: &[Message]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Email Thread: {}", thread.subject);
    let _ = writeln!(out, "Participants: {}", thread.participants.len());
    let _ = writeln!(out, "Messages: {}\n", messages.len());

    out.push_str("Participants:\n");
    for participant in &thread.participants {
        let _ = writeln!(out, "- {}", participant.display());
    }
    out.push('\n');

    out.push_str("Message Thread:\n");
    for message in messages.iter().rev() {
        let sender = message.from.first().map_or("Unknown", |p| {
            if p.name.is_empty() {
                p.email.as_str()
            } else {
                p.name.as_str()
            }
        });
        let timestamp = message.date.format("%b %-d, %Y %-I:%M %p");

        let _ = writeln!(out, "\n[{timestamp}] {sender}:");
        out.push_str(&truncate_chars(&message.body, THREAD_BODY_PREVIEW_CHARS));
        out.push('\n');
    }

    out
}

/// User prompt for thread analysis, including the response format.
pub fn build_analysis_prompt(thread_context: &str, request: &EmailAnalysisRequest) -> String {
    let mut out = String::from("Analyze the following email thread and provide:\n\n");
    out.push_str("1. The primary purpose of the discussion (1 sentence)\n");
    out.push_str("2. Key topics discussed (list 2-5 topics)\n");
    out.push_str("3. Priority level (low, medium, high, or urgent) with reasoning\n");
    out.push_str("4. Suggested meeting duration in minutes\n");
    if request.include_agenda {
        out.push_str("5. A structured meeting agenda with items and estimated durations\n");
    }
    if request.include_time {
        out.push_str("6. Best time for the meeting considering participant timezones\n");
    }

    out.push_str("\nFormat your response as follows:\n");
    out.push_str("PURPOSE: [purpose]\n");
    out.push_str("TOPICS:\n- [topic 1]\n- [topic 2]\n");
    out.push_str("PRIORITY: [level] - [reasoning]\n");
    out.push_str("DURATION: [minutes] minutes - [reasoning]\n");
    if request.include_agenda {
        out.push_str(
            "AGENDA:\n## [Agenda Title]\n### Item 1: [title] ([duration] min)\n[description]\n",
        );
    }

    out.push_str("\n---\n\n");
    out.push_str(thread_context);
    out
}

/// Parse the line-oriented analysis answer.
///
/// Missing duration defaults to 30 minutes, and a missing or unknown
/// priority to medium. The agenda is only read when it was requested.
pub fn parse_analysis_response(content: &str, request: &EmailAnalysisRequest) -> EmailThreadAnalysis {
    let mut analysis = EmailThreadAnalysis {
        thread_id: request.thread_id.clone(),
        ..EmailThreadAnalysis::default()
    };
    let mut duration = 0;

    let lines: Vec<&str> = content.lines().collect();
    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();

        if let Some(rest) = line.strip_prefix("PURPOSE:") {
            analysis.purpose = rest.trim().to_string();
        } else if line.starts_with("TOPICS:") {
            analysis.topics.extend(
                lines[i + 1..]
                    .iter()
                    .map(|l| l.trim())
                    .map_while(|l| l.strip_prefix("- "))
                    .map(|topic| topic.trim().to_string()),
            );
        } else if let Some(rest) = line.strip_prefix("PRIORITY:") {
            let level = rest.split('-').next().unwrap_or_default();
            analysis.priority = level.parse().unwrap_or(MeetingPriority::Medium);
        } else if let Some(rest) = line.strip_prefix("DURATION:") {
            duration = rest.split_whitespace().next().and_then(leading_int).unwrap_or(0);
        } else if request.include_agenda && line.starts_with("AGENDA:") {
            analysis.agenda = Some(parse_agenda(&lines[i + 1..]));
        }
    }

    analysis.suggested_duration = if duration == 0 { DEFAULT_MEETING_MINUTES } else { duration };
    analysis
}

/// `## Title`, then `### Item (N min)` headings each followed by
/// description lines.
pub fn parse_agenda(lines: &[&str]) -> MeetingAgenda {
    let mut agenda = MeetingAgenda::default();
    let mut current: Option<AgendaItem> = None;

    for raw in lines {
        let line = raw.trim();

        if let Some(title) = line.strip_prefix("### ") {
            agenda.items.extend(current.take());
            current = Some(parse_agenda_heading(title));
        } else if let Some(title) = line.strip_prefix("## ") {
            agenda.title = title.to_string();
        } else if !line.is_empty() && !line.starts_with('#') {
            if let Some(item) = current.as_mut() {
                if !item.description.is_empty() {
                    item.description.push(' ');
                }
                item.description.push_str(line);
            }
        }
    }
    agenda.items.extend(current);

    agenda.duration = agenda.items.iter().map(|item| item.duration).sum();
    agenda
}

fn parse_agenda_heading(heading: &str) -> AgendaItem {
    let minutes = heading.find('(').and_then(|open| {
        let close = heading.find(')').filter(|&close| close > open)?;
        Some((open, leading_int(&heading[open + 1..close]).unwrap_or(0)))
    });

    match minutes {
        Some((open, duration)) => AgendaItem {
            title: heading[..open].trim().to_string(),
            duration,
            description: String::new(),
        },
        None => AgendaItem { title: heading.to_string(), ..AgendaItem::default() },
    }
}

fn leading_int(text: &str) -> Option<u32> {
    let text = text.trim_start();
    let end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    text[..end].parse().ok()
}

/// User prompt listing each message's sender, subject, date and preview.
pub fn build_inbox_prompt(messages: &[Message]) -> String {
    let mut out = format!("Analyze these {} emails and provide insights:\n\n", messages.len());

    for (i, message) in messages.iter().enumerate() {
        let _ = writeln!(out, "--- Email {} ---", i + 1);
        let _ = writeln!(out, "From: {}", format_senders(&message.from));
        let _ = writeln!(out, "Subject: {}", message.subject);
        let _ = writeln!(out, "Date: {}", message.date.to_rfc3339());
        if !message.snippet.is_empty() {
            let _ = writeln!(out, "Preview: {}", truncate_chars(&message.snippet, INBOX_SNIPPET_CHARS));
        }
        if message.unread {
            out.push_str("Status: UNREAD\n");
        }
        if message.starred {
            out.push_str("Status: STARRED\n");
        }
        out.push('\n');
    }

    out
}

fn format_senders(senders: &[EmailParticipant]) -> String {
    if senders.is_empty() {
        return "Unknown".to_string();
    }
    senders.iter().map(EmailParticipant::display).collect::<Vec<_>>().join(", ")
}

/// JSON object between the first `{` and last `}`; `None` when absent or
/// malformed.
pub fn parse_inbox_response(content: &str) -> Option<InboxSummary> {
    let json = outermost_span(content.trim(), '{', '}')?;
    serde_json::from_str(json).ok()
}
