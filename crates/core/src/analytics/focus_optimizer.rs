//! Focus-time optimizer
//!
//! Picks weekly focus blocks from meeting history, materializes them as
//! busy calendar events and suggests shorter meeting lengths. Adaptive
//! rescheduling lives in [`super::adaptive`].

use std::sync::Arc;

use cadence_domain::constants::FOCUS_ANALYSIS_DAYS;
use cadence_domain::{
    CadenceError, CreateEventRequest, DurationOptimization, DurationStats, EventWhen,
    FocusProtectionRule, FocusTimeAnalysis, FocusTimeBlock, FocusTimeSettings, MeetingPattern,
    MeetingPriority, ProtectedBlock, Result, TimeBlock, TimeRange,
};
use chrono::{Duration, Utc};
use tracing::{debug, info};

use super::history::MeetingPatternAnalyzer;
use crate::calendar_ports::CalendarClient;
use crate::context::CallContext;
use crate::utils::time::{
    clock_ranges_overlap, clock_span_minutes, next_occurrence, resolve_timezone,
    weekday_from_name,
};

/// Block length when a clock range cannot be parsed
const DEFAULT_BLOCK_MINUTES: i64 = 120;
const FOCUS_EVENT_TITLE: &str = "Focus Time";
const DECLINE_MESSAGE: &str =
    "This time is blocked for focus work. Alternative times are available.";

/// Protects focus time on a grant's calendar
pub struct FocusOptimizer {
    pub(super) calendar: Arc<dyn CalendarClient>,
    pub(super) history: MeetingPatternAnalyzer,
}

impl FocusOptimizer {
    pub fn new(calendar: Arc<dyn CalendarClient>) -> Self {
        let history = MeetingPatternAnalyzer::new(Arc::clone(&calendar));
        Self { calendar, history }
    }

    /// Score focus blocks within `hours` instead of 9-17.
    #[must_use]
    pub fn with_working_hours(mut self, hours: TimeRange) -> Self {
        self.history = self.history.with_working_hours(hours);
        self
    }

    /// Analyze 90 days of history and recommend focus blocks.
    ///
    /// Without history the result carries zero confidence and a single
    /// insight instead of failing.
    pub async fn analyze_focus_time_patterns(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        settings: &FocusTimeSettings,
    ) -> Result<FocusTimeAnalysis> {
        let analysis = self.history.analyze_history(ctx, grant_id, FOCUS_ANALYSIS_DAYS).await?;

        let Some(patterns) = analysis.patterns else {
            debug!(grant_id = %grant_id, "No history for focus analysis");
            return Ok(FocusTimeAnalysis {
                user_email: grant_id.to_string(),
                analyzed_period: analysis.period,
                generated_at: Utc::now(),
                peak_productivity: Vec::new(),
                deep_work_sessions: DurationStats::default(),
                most_productive_day: String::new(),
                least_productive_day: String::new(),
                recommended_blocks: Vec::new(),
                current_protection: 0.0,
                target_protection: settings.target_hours_per_week,
                insights: vec!["Not enough calendar history to analyze patterns".to_string()],
                confidence: 0.0,
            });
        };

        let recommended_blocks = recommend_blocks(&patterns, settings);
        let insights = focus_insights(&patterns, &recommended_blocks, settings);

        info!(
            grant_id = %grant_id,
            blocks = recommended_blocks.len(),
            "Generated focus time recommendations"
        );

        Ok(FocusTimeAnalysis {
            user_email: grant_id.to_string(),
            analyzed_period: analysis.period,
            generated_at: Utc::now(),
            peak_productivity: peak_productivity_blocks(&patterns),
            deep_work_sessions: deep_work_stats(&patterns),
            most_productive_day: most_productive_day(&patterns),
            least_productive_day: least_productive_day(&patterns),
            recommended_blocks,
            // Existing focus events are not read back from the calendar yet.
            current_protection: 0.0,
            target_protection: settings.target_hours_per_week,
            insights,
            confidence: focus_confidence(&patterns),
        })
    }

    /// Create one busy "Focus Time" event per block on the grant's first
    /// calendar, at the block's next occurrence in that calendar's zone.
    pub async fn create_protected_blocks(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        blocks: &[FocusTimeBlock],
        settings: &FocusTimeSettings,
    ) -> Result<Vec<ProtectedBlock>> {
        let calendars = self.calendar.get_calendars(ctx, grant_id).await?;
        let calendar = calendars
            .first()
            .ok_or_else(|| CadenceError::NotFound("no calendars found".to_string()))?;

        let zone = resolve_timezone(calendar.timezone.as_deref().unwrap_or_default());
        let mut protected = Vec::with_capacity(blocks.len());

        for block in blocks {
            let now = Utc::now().with_timezone(&zone);
            let start = next_occurrence(&now, &block.day_of_week, &block.start_time).ok_or_else(|| {
                CadenceError::InvalidInput(format!(
                    "invalid focus block {} {}",
                    block.day_of_week, block.start_time
                ))
            })?;
            // `duration` is already clamped to the configured maximum.
            let minutes = if block.duration > 0 {
                block.duration
            } else {
                block_minutes(&block.start_time, &block.end_time)
            };
            let end = start + Duration::minutes(minutes);

            let request = CreateEventRequest {
                title: FOCUS_EVENT_TITLE.to_string(),
                description: Some(block.reason.clone()),
                when: EventWhen::new(start.timestamp(), end.timestamp(), zone.name()),
                participants: Vec::new(),
                busy: true,
                recurrence: Vec::new(),
            };
            let event = self.calendar.create_event(ctx, grant_id, &calendar.id, &request).await?;

            let now = Utc::now();
            protected.push(ProtectedBlock {
                id: format!("focus_{}", now.timestamp_nanos_opt().unwrap_or_default()),
                calendar_event_id: event.id,
                start_time: start,
                end_time: end,
                created_at: now,
                updated_at: now,
                recurrence_pattern: "weekly".to_string(),
                priority: MeetingPriority::High,
                reason: block.reason.clone(),
                protection_rules: FocusProtectionRule {
                    decline_message: DECLINE_MESSAGE.to_string(),
                    alternative_times: Vec::new(),
                    auto_decline: settings.auto_decline,
                    suggest_alternatives: true,
                    allow_critical_meeting: settings.allow_urgent_override,
                    require_approval: settings.require_approval,
                },
                duration: block.duration,
                is_recurring: true,
                allow_override: settings.allow_urgent_override,
            });
        }

        info!(grant_id = %grant_id, calendar_id = %calendar.id, blocks = protected.len(), "Created focus blocks");
        Ok(protected)
    }

    /// Compare one event's length with the historical average and suggest
    /// a shorter slot.
    pub async fn optimize_meeting_duration(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<DurationOptimization> {
        let event = self.calendar.get_event(ctx, grant_id, calendar_id, event_id).await?;
        let analysis = self.history.analyze_history(ctx, grant_id, FOCUS_ANALYSIS_DAYS).await?;
        let patterns = analysis.patterns.ok_or_else(|| {
            CadenceError::InsufficientData(
                "not enough historical data for duration optimization".to_string(),
            )
        })?;

        let current = event.when.duration_minutes();
        let history = patterns.duration.overall;
        let recommended = recommended_duration(current, history.average_actual);
        let savings = (current - recommended).max(0);

        Ok(DurationOptimization {
            event_id: event_id.to_string(),
            current_duration: current,
            recommended_duration: recommended,
            historical_data: history,
            time_savings: savings,
            confidence: duration_confidence(&history),
            reason: format!("Historical data shows meetings average {} minutes", history.average_actual),
            recommendation: format!(
                "Reduce from {current} to {recommended} minutes to save {savings} minutes"
            ),
        })
    }
}

fn block_minutes(start: &str, end: &str) -> i64 {
    clock_span_minutes(start, end).unwrap_or(DEFAULT_BLOCK_MINUTES)
}

/// Mean and spread of focus-block lengths; fixed defaults when there are
/// no blocks.
pub(crate) fn deep_work_stats(patterns: &MeetingPattern) -> DurationStats {
    let lengths: Vec<i64> = patterns
        .productivity
        .focus_blocks
        .iter()
        .map(|b| block_minutes(&b.start_time, &b.end_time))
        .collect();

    if lengths.is_empty() {
        return DurationStats {
            average_scheduled: 120,
            average_actual: 150,
            variance: 30.0,
            overrun_rate: 0.0,
        };
    }

    let average = lengths.iter().sum::<i64>() / lengths.len() as i64;
    let spread = (lengths.iter().map(|&l| ((l - average) as f64).powi(2)).sum::<f64>()
        / lengths.len() as f64)
        .sqrt();

    DurationStats { average_scheduled: average, average_actual: average, variance: spread, overrun_rate: 0.0 }
}

/// Top three peak-focus blocks by score, or a fixed mid-week default.
pub(crate) fn peak_productivity_blocks(patterns: &MeetingPattern) -> Vec<TimeBlock> {
    if patterns.productivity.peak_focus.is_empty() {
        let block = |day: &str, start: &str, end: &str, score: f64| TimeBlock {
            day_of_week: day.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            score,
        };
        return vec![
            block("Tuesday", "10:00", "12:00", 90.0),
            block("Thursday", "10:00", "12:00", 90.0),
            block("Wednesday", "09:00", "11:00", 85.0),
        ];
    }

    let mut blocks = patterns.productivity.peak_focus.clone();
    blocks.sort_by(|a, b| b.score.total_cmp(&a.score));
    blocks.truncate(3);
    blocks
}

/// `(day, density)` in calendar order, Monday first.
fn densities_in_week_order(patterns: &MeetingPattern) -> Vec<(&str, f64)> {
    let mut days: Vec<(&str, f64)> =
        patterns.productivity.meeting_density.iter().map(|(d, v)| (d.as_str(), *v)).collect();
    days.sort_by_key(|(day, _)| weekday_from_name(day).map_or(7, |w| w.num_days_from_monday()));
    days
}

/// Weekday with the fewest meetings; Wednesday when unknown.
pub(crate) fn most_productive_day(patterns: &MeetingPattern) -> String {
    let mut best: Option<(&str, f64)> = None;
    for (day, density) in densities_in_week_order(patterns) {
        if best.map_or(true, |(_, d)| density < d) {
            best = Some((day, density));
        }
    }
    best.map_or("Wednesday", |(day, _)| day).to_string()
}

/// Weekday with the most meetings; Monday when unknown.
pub(crate) fn least_productive_day(patterns: &MeetingPattern) -> String {
    let mut worst: Option<(&str, f64)> = None;
    for (day, density) in densities_in_week_order(patterns) {
        if density > worst.map_or(0.0, |(_, d)| d) {
            worst = Some((day, density));
        }
    }
    worst.map_or("Monday", |(day, _)| day).to_string()
}

fn is_protectable(block: &TimeBlock, settings: &FocusTimeSettings) -> bool {
    if !settings.protected_days.is_empty()
        && !settings.protected_days.iter().any(|d| d.eq_ignore_ascii_case(&block.day_of_week))
    {
        return false;
    }

    !settings.excluded_time_ranges.iter().any(|excluded| {
        clock_ranges_overlap(&block.start_time, &block.end_time, &excluded.start_time, &excluded.end_time)
    })
}

/// Eligible peak-focus blocks, best first, until the weekly target is met.
///
/// Blocks on unprotected days, overlapping an excluded range, or shorter
/// than the minimum are dropped; longer ones are clamped to the maximum.
pub(crate) fn recommend_blocks(patterns: &MeetingPattern, settings: &FocusTimeSettings) -> Vec<FocusTimeBlock> {
    let mut candidates: Vec<FocusTimeBlock> = patterns
        .productivity
        .peak_focus
        .iter()
        .filter(|block| is_protectable(block, settings))
        .filter_map(|block| {
            let mut duration = block_minutes(&block.start_time, &block.end_time);
            if duration < settings.min_block_duration {
                return None;
            }
            if settings.max_block_duration > 0 {
                duration = duration.min(settings.max_block_duration);
            }

            Some(FocusTimeBlock {
                day_of_week: block.day_of_week.clone(),
                start_time: block.start_time.clone(),
                end_time: block.end_time.clone(),
                duration,
                score: block.score,
                reason: format!("Peak productivity time ({:.0}% score)", block.score),
                conflicts: 0,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let target_minutes = (settings.target_hours_per_week * 60.0) as i64;
    let mut total = 0;
    let mut selected = Vec::new();
    for block in candidates {
        if total >= target_minutes {
            break;
        }
        total += block.duration;
        selected.push(block);
    }
    selected
}

fn focus_insights(
    patterns: &MeetingPattern,
    blocks: &[FocusTimeBlock],
    settings: &FocusTimeSettings,
) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(top) = patterns.productivity.peak_focus.first() {
        insights.push(format!(
            "Your peak productivity is {} at {}-{} ({:.0}% focus score)",
            top.day_of_week, top.start_time, top.end_time, top.score
        ));
    }

    let dense_days: Vec<&str> = densities_in_week_order(patterns)
        .into_iter()
        .filter(|(_, density)| *density > 5.0)
        .map(|(day, _)| day)
        .collect();
    if !dense_days.is_empty() {
        insights.push(format!(
            "High meeting density on {} - consider protecting more focus time on these days",
            dense_days.join(", ")
        ));
    }

    let hours: f64 = blocks.iter().map(|b| b.duration as f64 / 60.0).sum();
    if hours > 0.0 {
        insights.push(format!(
            "AI recommends {hours:.1} hours/week of protected focus time across {} blocks",
            blocks.len()
        ));
    }
    if hours < settings.target_hours_per_week {
        insights.push(format!(
            "Need {:.1} more hours/week to reach your target of {:.1} hours",
            settings.target_hours_per_week - hours,
            settings.target_hours_per_week
        ));
    }

    insights
}

/// 50 base, +20 with peak-focus data, +15 with density data, +15 with more
/// than ten known participants.
pub(crate) fn focus_confidence(patterns: &MeetingPattern) -> f64 {
    let mut confidence: f64 = 50.0;
    if !patterns.productivity.peak_focus.is_empty() {
        confidence += 20.0;
    }
    if !patterns.productivity.meeting_density.is_empty() {
        confidence += 15.0;
    }
    if patterns.participants.len() > 10 {
        confidence += 15.0;
    }
    confidence.min(100.0)
}

/// 60-minute meetings shrink to 45 when history averages under 50;
/// 30-minute ones to 25 under 25. Anything else takes the average.
pub(crate) const fn recommended_duration(current: i64, average_actual: i64) -> i64 {
    if current == 60 && average_actual < 50 {
        45
    } else if current == 30 && average_actual < 25 {
        25
    } else {
        average_actual
    }
}

/// Tighter history gives higher confidence.
pub(crate) fn duration_confidence(stats: &DurationStats) -> f64 {
    match stats.variance {
        v if v < 10.0 => 90.0,
        v if v < 20.0 => 75.0,
        v if v < 30.0 => 60.0,
        _ => 50.0,
    }
}
