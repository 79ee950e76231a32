mod support;

use std::sync::Arc;

use cadence_core::{CallContext, LlmProvider, LlmRouter, PatternLearner};
use cadence_domain::constants::RECOMMENDATIONS_UNAVAILABLE;
use cadence_domain::{CadenceError, LearnPatternsRequest};
use support::calendar::{event, MockCalendarClient};
use support::providers::ScriptedProvider;

// Monday 2024-01-08 10:00 UTC
const MONDAY_10AM: i64 = 1_704_708_000;
const WEEK: i64 = 7 * 24 * 3600;
const DAY: i64 = 24 * 3600;

fn history() -> Vec<cadence_domain::Event> {
    let mut events: Vec<_> = (0..3)
        .map(|i| event(&format!("plan-{i}"), "Planning sync", MONDAY_10AM + i * WEEK, 30, "UTC"))
        .collect();

    let mut tentative = event("plan-3", "Planning sync", MONDAY_10AM + 3 * WEEK, 30, "UTC");
    tentative.status = "tentative".into();
    tentative.busy = false;
    events.push(tentative);

    // Tuesday 09:00 standups of 15, 15 and 20 minutes
    for (i, minutes) in [15, 15, 20].into_iter().enumerate() {
        let start = MONDAY_10AM + DAY - 3600 + i as i64 * WEEK;
        events.push(event(&format!("standup-{i}"), "Daily standup", start, minutes, "UTC"));
    }
    events
}

fn router(provider: &Arc<ScriptedProvider>) -> Arc<LlmRouter> {
    let providers: Vec<Arc<dyn LlmProvider>> = vec![provider.clone()];
    Arc::new(LlmRouter::new(providers, "ollama", None))
}

#[tokio::test]
async fn learns_acceptance_durations_and_recommendations() {
    let provider = ScriptedProvider::new("ollama")
        .reply("1. Protect Tuesday mornings for deep work\n2. Keep planning on Monday mornings\nok");
    let learner = PatternLearner::new(Arc::new(MockCalendarClient::new(history())), router(&provider));

    let patterns = learner
        .learn_patterns(&CallContext::new(), &LearnPatternsRequest::new("grant-1", 30))
        .await
        .expect("patterns");

    assert_eq!(patterns.total_events_analyzed, 7);

    let monday = patterns
        .acceptance_patterns
        .iter()
        .find(|p| p.time_slot == "Monday 9-11 AM")
        .expect("monday slot");
    assert!((monday.accept_rate - 0.75).abs() < 1e-9);
    assert_eq!(monday.event_count, 4);
    assert_eq!(monday.description, "Moderate acceptance rate");
    assert_eq!(patterns.acceptance_patterns[0].time_slot, "Tuesday 9-11 AM");

    let standup = patterns
        .duration_patterns
        .iter()
        .find(|p| p.meeting_type == "Standup")
        .expect("standup durations");
    assert_eq!(standup.scheduled_duration, 16);
    assert_eq!(standup.actual_duration, 16);
    assert_eq!(standup.variance, 0);

    assert_eq!(
        patterns.recommendations,
        vec!["Protect Tuesday mornings for deep work", "Keep planning on Monday mornings"]
    );
    assert_eq!(provider.requests().len(), 1);
}

#[tokio::test]
async fn provider_failure_keeps_statistics() {
    let provider = ScriptedProvider::new("ollama").fail(CadenceError::Network("connection refused".into()));
    let learner = PatternLearner::new(Arc::new(MockCalendarClient::new(history())), router(&provider));

    let patterns = learner
        .learn_patterns(&CallContext::new(), &LearnPatternsRequest::new("grant-1", 30))
        .await
        .expect("patterns despite provider failure");

    assert_eq!(patterns.recommendations, vec![RECOMMENDATIONS_UNAVAILABLE]);
    assert!(!patterns.acceptance_patterns.is_empty());
}

#[tokio::test]
async fn recurring_events_are_filtered_by_default() {
    let mut events = history();
    for event in &mut events {
        event.recurrence = vec!["RRULE:FREQ=WEEKLY".into()];
    }
    let provider = ScriptedProvider::new("ollama");
    let calendar = Arc::new(MockCalendarClient::new(events));
    let learner = PatternLearner::new(calendar.clone(), router(&provider));

    let err = learner
        .learn_patterns(&CallContext::new(), &LearnPatternsRequest::new("grant-1", 30))
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::InsufficientData(_)));
    assert!(provider.requests().is_empty());

    let provider = ScriptedProvider::new("ollama").reply("Batch recurring meetings on one day");
    let learner = PatternLearner::new(calendar, router(&provider));
    let patterns = learner
        .learn_patterns(&CallContext::new(), &LearnPatternsRequest::new("grant-1", 30).with_recurring(true))
        .await
        .expect("recurring included");
    assert_eq!(patterns.total_events_analyzed, 7);
}

#[tokio::test]
async fn rejects_non_positive_lookback_and_honours_cancellation() {
    let provider = ScriptedProvider::new("ollama");
    let learner = PatternLearner::new(Arc::new(MockCalendarClient::new(history())), router(&provider));

    let err = learner
        .learn_patterns(&CallContext::new(), &LearnPatternsRequest::new("grant-1", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, CadenceError::InvalidInput(_)));

    let ctx = CallContext::new();
    ctx.cancel();
    let err = learner.learn_patterns(&ctx, &LearnPatternsRequest::new("grant-1", 30)).await.unwrap_err();
    assert!(matches!(err, CadenceError::Cancelled(_)));
}
