//! Scheduling pattern learner
//!
//! Fetches calendar history, derives the four pattern families and asks
//! the router for a short set of recommendations. The statistical part is
//! deterministic; the LLM step is best-effort and never fails the call.

use std::sync::Arc;

use cadence_domain::constants::{
    HISTORY_EVENT_LIMIT, RECOMMENDATIONS_UNAVAILABLE, RECOMMENDATION_MAX_TOKENS,
    RECOMMENDATION_TEMPERATURE,
};
use cadence_domain::{
    AcceptancePattern, CadenceError, ChatMessage, ChatRequest, DurationPattern, Event, EventQuery,
    LearnPatternsRequest, ProductivityInsight, Result, SchedulingPatterns, TimezonePattern,
};
use chrono::{Duration, Utc};
use tracing::{debug, info, warn};

use super::pattern_analysis::{
    analysis_period, analyze_acceptance, analyze_durations, analyze_productivity,
    analyze_timezones, build_pattern_context, parse_recommendations,
};
use super::router::LlmRouter;
use crate::calendar_ports::{collect_events, CalendarClient};
use crate::context::CallContext;

const COACH_PROMPT: &str = "You are an expert productivity coach analyzing calendar patterns. \
                            Provide 3-5 actionable recommendations to improve scheduling and \
                            productivity.";

/// Learns scheduling patterns from a grant's calendar history
pub struct PatternLearner {
    calendar: Arc<dyn CalendarClient>,
    router: Arc<LlmRouter>,
}

impl PatternLearner {
    pub fn new(calendar: Arc<dyn CalendarClient>, router: Arc<LlmRouter>) -> Self {
        Self { calendar, router }
    }

    /// Analyze `[now - lookback_days, now]` and return fresh patterns.
    ///
    /// Fails with `InsufficientData` when no events survive fetching and
    /// filtering.
    pub async fn learn_patterns(
        &self,
        ctx: &CallContext,
        request: &LearnPatternsRequest,
    ) -> Result<SchedulingPatterns> {
        if request.lookback_days <= 0 {
            return Err(CadenceError::InvalidInput(format!(
                "lookback_days must be positive, got {}",
                request.lookback_days
            )));
        }

        let events = self.fetch_history(ctx, request).await?;
        if events.is_empty() {
            return Err(CadenceError::InsufficientData(
                "no events found in the specified period".to_string(),
            ));
        }

        let acceptance = analyze_acceptance(&events);
        let durations = analyze_durations(&events);
        let timezones = analyze_timezones(&events);
        let productivity = analyze_productivity(&events);

        let recommendations = match self
            .synthesize(ctx, events.len(), &acceptance, &durations, &timezones, &productivity)
            .await
        {
            Ok(recommendations) => recommendations,
            Err(err @ CadenceError::Cancelled(_)) => return Err(err),
            Err(err) => {
                warn!(error = %err, "Recommendation synthesis failed, using placeholder");
                vec![RECOMMENDATIONS_UNAVAILABLE.to_string()]
            }
        };

        info!(
            grant_id = %request.grant_id,
            events = events.len(),
            acceptance = acceptance.len(),
            durations = durations.len(),
            "Learned scheduling patterns"
        );

        Ok(SchedulingPatterns {
            user_id: request.grant_id.clone(),
            analysis_period: analysis_period(&events),
            acceptance_patterns: acceptance,
            duration_patterns: durations,
            timezone_patterns: timezones,
            productivity_insights: productivity,
            recommendations,
            total_events_analyzed: events.len(),
            generated_at: Utc::now(),
        })
    }

    async fn fetch_history(
        &self,
        ctx: &CallContext,
        request: &LearnPatternsRequest,
    ) -> Result<Vec<Event>> {
        let now = Utc::now();
        let query = EventQuery {
            start: (now - Duration::days(request.lookback_days)).timestamp(),
            end: now.timestamp(),
            limit: Some(HISTORY_EVENT_LIMIT),
        };

        let mut events = collect_events(self.calendar.as_ref(), ctx, &request.grant_id, &query).await?;
        if !request.include_recurring {
            let before = events.len();
            events.retain(|event| !event.is_recurring());
            debug!(dropped = before - events.len(), "Filtered recurring events");
        }
        Ok(events)
    }

    async fn synthesize(
        &self,
        ctx: &CallContext,
        total_events: usize,
        acceptance: &[AcceptancePattern],
        durations: &[DurationPattern],
        timezones: &[TimezonePattern],
        productivity: &[ProductivityInsight],
    ) -> Result<Vec<String>> {
        let context =
            build_pattern_context(total_events, acceptance, durations, timezones, productivity);
        let request = ChatRequest::new(vec![
            ChatMessage::system(COACH_PROMPT),
            ChatMessage::user(format!(
                "Based on the following calendar analysis, provide specific recommendations:\n\n{context}"
            )),
        ])
        .with_temperature(RECOMMENDATION_TEMPERATURE)
        .with_max_tokens(RECOMMENDATION_MAX_TOKENS);

        let response = self.router.chat(ctx, &request).await?;
        Ok(parse_recommendations(&response.content))
    }

    /// Persist patterns. Storage does not exist yet; this only logs.
    pub fn save_patterns(&self, patterns: &SchedulingPatterns) -> Result<()> {
        debug!(user_id = %patterns.user_id, "Pattern storage not available, skipping save");
        Ok(())
    }

    /// Load previously saved patterns. Always `NotFound` until storage
    /// exists.
    pub fn load_patterns(&self, user_id: &str) -> Result<SchedulingPatterns> {
        debug!(user_id = %user_id, "Pattern storage not available");
        Err(CadenceError::NotFound("pattern storage not yet implemented".to_string()))
    }

    /// Pretty-printed JSON for export
    pub fn export_patterns(&self, patterns: &SchedulingPatterns) -> Result<String> {
        Ok(serde_json::to_string_pretty(patterns)?)
    }
}
