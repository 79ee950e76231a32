//! Meeting history analysis
//!
//! Turns a window of calendar events into per-weekday and per-hour
//! statistics ([`MeetingPattern`]), rule-based recommendations and short
//! insight lines. The focus optimizer builds on this output.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use cadence_domain::constants::{
    DENSITY_WEEKS, HISTORY_EVENT_LIMIT, WORKDAY_END_HOUR, WORKDAY_START_HOUR,
};
use cadence_domain::{
    AcceptancePatterns, DateRange, DurationPatterns, DurationStats, Event, EventQuery,
    MeetingAnalysis, MeetingPattern, ParticipantPattern, ProductivityPatterns, Recommendation,
    Result, TimeBlock, TimeRange, TimezonePatterns,
};
use chrono::{Duration, Timelike, Utc};
use tracing::{debug, info};

use crate::calendar_ports::{collect_events, CalendarClient};
use crate::context::CallContext;
use crate::utils::time::{hour_label, parse_clock, start_slot, weekday_from_name, WORK_WEEK};

const CROSS_TIMEZONE_HOURS: [&str; 3] = ["14:00", "15:00", "16:00"];

/// Learns meeting statistics from a grant's calendar history
pub struct MeetingPatternAnalyzer {
    calendar: Arc<dyn CalendarClient>,
    working_hours: Option<TimeRange>,
}

impl MeetingPatternAnalyzer {
    pub fn new(calendar: Arc<dyn CalendarClient>) -> Self {
        Self { calendar, working_hours: None }
    }

    /// Restrict focus-block scoring to `hours` ("HH:MM" bounds).
    #[must_use]
    pub fn with_working_hours(mut self, hours: TimeRange) -> Self {
        self.working_hours = Some(hours);
        self
    }

    /// Whole hours used for focus-block scoring
    pub fn working_hour_range(&self) -> (u32, u32) {
        working_hour_range(self.working_hours.as_ref())
    }

    /// Analyze the last `days` days of meetings.
    pub async fn analyze_history(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        days: i64,
    ) -> Result<MeetingAnalysis> {
        let end = Utc::now();
        let start = end - Duration::days(days);
        let period = DateRange { start, end };

        let query = EventQuery {
            start: start.timestamp(),
            end: end.timestamp(),
            limit: Some(HISTORY_EVENT_LIMIT),
        };
        let events = collect_events(self.calendar.as_ref(), ctx, grant_id, &query).await?;

        if events.is_empty() {
            debug!(grant_id = %grant_id, days, "No meetings in analysis window");
            return Ok(MeetingAnalysis {
                period,
                total_meetings: 0,
                patterns: None,
                recommendations: Vec::new(),
                insights: vec!["No meetings found in the analyzed period.".to_string()],
            });
        }

        let (start_hour, end_hour) = self.working_hour_range();
        let patterns = MeetingPattern {
            user_email: String::new(),
            analyzed_period: period,
            last_updated: Utc::now(),
            acceptance: learn_acceptance(&events),
            duration: learn_durations(&events),
            timezone: learn_timezones(&events),
            productivity: learn_productivity(&events, start_hour, end_hour),
            participants: learn_participants(&events),
        };

        let recommendations = generate_recommendations(&patterns);
        let insights = generate_insights(&patterns, events.len(), days);

        info!(
            grant_id = %grant_id,
            meetings = events.len(),
            recommendations = recommendations.len(),
            "Analyzed meeting history"
        );

        Ok(MeetingAnalysis {
            period,
            total_meetings: events.len(),
            patterns: Some(patterns),
            recommendations,
            insights,
        })
    }
}

/// Whole-hour bounds of `hours`.
///
/// A start with minutes rounds up to the next hour; missing or unparseable
/// bounds keep the 9-17 default.
fn working_hour_range(hours: Option<&TimeRange>) -> (u32, u32) {
    let Some(hours) = hours else {
        return (WORKDAY_START_HOUR, WORKDAY_END_HOUR);
    };

    let start = parse_clock(&hours.start_time).map_or(WORKDAY_START_HOUR, |t| {
        if t.minute() > 0 {
            t.hour() + 1
        } else {
            t.hour()
        }
    });
    let end = parse_clock(&hours.end_time).map_or(WORKDAY_END_HOUR, |t| t.hour());
    (start, end)
}

#[derive(Default)]
struct RateCounter {
    accepted: usize,
    total: usize,
}

impl RateCounter {
    fn record(&mut self, accepted: bool) {
        self.total += 1;
        if accepted {
            self.accepted += 1;
        }
    }

    fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.accepted as f64 / self.total as f64
        }
    }
}

fn rates(counters: BTreeMap<String, RateCounter>) -> BTreeMap<String, f64> {
    counters.into_iter().map(|(key, counter)| (key, counter.rate())).collect()
}

fn learn_acceptance(events: &[Event]) -> AcceptancePatterns {
    let mut by_day: BTreeMap<String, RateCounter> = BTreeMap::new();
    let mut by_hour: BTreeMap<String, RateCounter> = BTreeMap::new();
    let mut by_day_hour: BTreeMap<String, RateCounter> = BTreeMap::new();
    let mut overall = RateCounter::default();

    for event in events {
        let accepted = event.is_confirmed();
        overall.record(accepted);

        let Some((day, hour)) = start_slot(event) else { continue };
        let hour = hour_label(hour);
        by_day_hour.entry(format!("{day}-{hour}")).or_default().record(accepted);
        by_day.entry(day.to_string()).or_default().record(accepted);
        by_hour.entry(hour).or_default().record(accepted);
    }

    AcceptancePatterns {
        by_day_of_week: rates(by_day),
        by_time_of_day: rates(by_hour),
        by_day_and_time: rates(by_day_hour),
        overall: overall.rate(),
    }
}

/// Scheduled and actual minutes per meeting. Actual equals scheduled until
/// real end-of-meeting data exists.
#[derive(Default)]
struct DurationAccumulator {
    scheduled: Vec<i64>,
    actual: Vec<i64>,
}

impl DurationAccumulator {
    fn add(&mut self, scheduled: i64, actual: i64) {
        self.scheduled.push(scheduled);
        self.actual.push(actual);
    }

    fn stats(&self) -> DurationStats {
        let count = self.scheduled.len();
        if count == 0 {
            return DurationStats::default();
        }

        let n = count as i64;
        let average_scheduled = self.scheduled.iter().sum::<i64>() / n;
        let average_actual = self.actual.iter().sum::<i64>() / n;

        let mean = self.scheduled.iter().sum::<i64>() as f64 / count as f64;
        let spread = (self
            .scheduled
            .iter()
            .map(|&d| (d as f64 - mean).powi(2))
            .sum::<f64>()
            / count as f64)
            .sqrt();

        let overruns = self.scheduled.iter().zip(&self.actual).filter(|(s, a)| a > s).count();

        DurationStats {
            average_scheduled,
            average_actual,
            variance: spread,
            overrun_rate: overruns as f64 / count as f64,
        }
    }
}

fn learn_durations(events: &[Event]) -> DurationPatterns {
    let mut overall = DurationAccumulator::default();
    let mut by_participant: BTreeMap<String, DurationAccumulator> = BTreeMap::new();

    for event in events {
        let minutes = event.when.duration_minutes();
        overall.add(minutes, minutes);

        for participant in event.participants.iter().filter(|p| !p.email.is_empty()) {
            by_participant.entry(participant.email.clone()).or_default().add(minutes, minutes);
        }
    }

    DurationPatterns {
        by_participant: by_participant.iter().map(|(email, acc)| (email.clone(), acc.stats())).collect(),
        by_type: BTreeMap::new(),
        overall: overall.stats(),
    }
}

fn learn_timezones(events: &[Event]) -> TimezonePatterns {
    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    for event in events {
        let zone = event.when.start_timezone.trim();
        let zone = if zone.is_empty() { "UTC" } else { zone };
        *distribution.entry(zone.to_string()).or_default() += 1;
    }

    TimezonePatterns {
        preferred_times: BTreeMap::new(),
        distribution,
        cross_tz_times: CROSS_TIMEZONE_HOURS.iter().map(ToString::to_string).collect(),
    }
}

/// Focus score of one weekday hour: 100 at zero meetings, 50 at the average
/// density, clamped to 0-100.
fn focus_score(density: usize, average_density: f64) -> f64 {
    if average_density <= 0.0 {
        return 100.0;
    }
    (100.0 - density as f64 / average_density * 50.0).clamp(0.0, 100.0)
}

fn learn_productivity(events: &[Event], start_hour: u32, end_hour: u32) -> ProductivityPatterns {
    let mut by_day_hour: HashMap<(&'static str, u32), usize> = HashMap::new();
    let mut by_day: BTreeMap<String, usize> = BTreeMap::new();

    for (day, hour) in events.iter().filter_map(start_slot) {
        *by_day_hour.entry((day, hour)).or_default() += 1;
        *by_day.entry(day.to_string()).or_default() += 1;
    }

    let average_density = if by_day_hour.is_empty() {
        0.0
    } else {
        by_day_hour.values().sum::<usize>() as f64 / by_day_hour.len() as f64
    };

    let mut peak_focus = Vec::new();
    for day in WORK_WEEK {
        for hour in start_hour..end_hour {
            let density = by_day_hour.get(&(day, hour)).copied().unwrap_or(0);
            let score = focus_score(density, average_density);
            if score >= 50.0 {
                peak_focus.push(TimeBlock {
                    day_of_week: day.to_string(),
                    start_time: hour_label(hour),
                    end_time: hour_label(hour + 2),
                    score,
                });
            }
        }
    }

    // Best block per weekday; the earliest hour wins ties.
    let mut focus_blocks: Vec<TimeBlock> = Vec::new();
    for block in &peak_focus {
        match focus_blocks.iter_mut().find(|b| b.day_of_week == block.day_of_week) {
            Some(best) if block.score > best.score => *best = block.clone(),
            Some(_) => {}
            None => focus_blocks.push(block.clone()),
        }
    }

    ProductivityPatterns {
        peak_focus,
        low_energy: Vec::new(),
        meeting_density: by_day
            .into_iter()
            .map(|(day, count)| (day, count as f64 / DENSITY_WEEKS))
            .collect(),
        focus_blocks,
    }
}

#[derive(Default)]
struct ParticipantAccumulator {
    meetings: usize,
    accepted: usize,
    days: BTreeMap<&'static str, usize>,
    hours: BTreeMap<String, usize>,
    total_minutes: i64,
    timezone: String,
}

impl ParticipantAccumulator {
    fn pattern(self, email: String) -> ParticipantPattern {
        let (acceptance_rate, average_duration) = if self.meetings == 0 {
            (0.0, 0)
        } else {
            (
                self.accepted as f64 / self.meetings as f64,
                self.total_minutes / self.meetings as i64,
            )
        };

        ParticipantPattern {
            email,
            meeting_count: self.meetings,
            acceptance_rate,
            preferred_days: top_two(self.days.into_iter().map(|(d, c)| (d.to_string(), c))),
            preferred_times: top_two(self.hours.into_iter()),
            average_duration,
            timezone: self.timezone,
        }
    }
}

/// Two most frequent keys; ties keep the input order.
fn top_two(counts: impl Iterator<Item = (String, usize)>) -> Vec<String> {
    let mut counts: Vec<(String, usize)> = counts.collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(2).map(|(key, _)| key).collect()
}

fn learn_participants(events: &[Event]) -> BTreeMap<String, ParticipantPattern> {
    let mut accumulators: BTreeMap<String, ParticipantAccumulator> = BTreeMap::new();

    for event in events {
        let slot = start_slot(event);
        for participant in event.participants.iter().filter(|p| !p.email.is_empty()) {
            let acc = accumulators.entry(participant.email.clone()).or_default();
            acc.meetings += 1;
            if event.is_confirmed() {
                acc.accepted += 1;
            }
            if let Some((day, hour)) = slot {
                *acc.days.entry(day).or_default() += 1;
                *acc.hours.entry(hour_label(hour)).or_default() += 1;
            }
            acc.total_minutes += event.when.duration_minutes();
            if !event.when.start_timezone.is_empty() {
                acc.timezone.clone_from(&event.when.start_timezone);
            }
        }
    }

    accumulators.into_iter().map(|(email, acc)| (email.clone(), acc.pattern(email))).collect()
}

/// Weekday rates in calendar order, Monday first.
fn day_rates_in_week_order(rates: &BTreeMap<String, f64>) -> Vec<(&str, f64)> {
    let mut ordered: Vec<(&str, f64)> = rates.iter().map(|(d, r)| (d.as_str(), *r)).collect();
    ordered.sort_by_key(|(day, _)| weekday_from_name(day).map_or(7, |w| w.num_days_from_monday()));
    ordered
}

fn generate_recommendations(patterns: &MeetingPattern) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for block in patterns.productivity.focus_blocks.iter().filter(|b| b.score >= 70.0) {
        recommendations.push(Recommendation {
            kind: "focus_time".to_string(),
            priority: if block.score >= 85.0 { "high" } else { "medium" }.to_string(),
            title: format!(
                "Block {} {}-{} for focus time",
                block.day_of_week, block.start_time, block.end_time
            ),
            description: format!(
                "Historical data shows you have few meetings during this time (score: {:.0}/100), making it ideal for deep work.",
                block.score
            ),
            confidence: block.score,
            action: "Create recurring focus time block".to_string(),
            impact: "Increase productivity by 20-30%".to_string(),
        });
    }

    for (day, rate) in day_rates_in_week_order(&patterns.acceptance.by_day_of_week) {
        if rate < 0.5 {
            recommendations.push(Recommendation {
                kind: "decline_pattern".to_string(),
                priority: "medium".to_string(),
                title: format!("Consider avoiding {day} meetings"),
                description: format!(
                    "You accept only {:.0}% of meetings on {day}s. Consider blocking this time or being more selective.",
                    rate * 100.0
                ),
                confidence: (1.0 - rate) * 100.0,
                action: format!("Auto-suggest alternatives to {day} meetings"),
                impact: "Reduce low-productivity meetings".to_string(),
            });
        }
    }

    for (participant, stats) in &patterns.duration.by_participant {
        if stats.average_actual <= 0 || stats.average_scheduled <= 0 {
            continue;
        }
        let overrun = stats.average_actual - stats.average_scheduled;
        if overrun > 5 {
            recommendations.push(Recommendation {
                kind: "duration_adjustment".to_string(),
                priority: "low".to_string(),
                title: format!("Adjust meeting length with {participant}"),
                description: format!(
                    "Meetings with {participant} typically run {overrun} minutes over. Consider scheduling {} minutes instead of {}.",
                    stats.average_actual, stats.average_scheduled
                ),
                confidence: 70.0,
                action: format!("Suggest {}-minute meetings with {participant}", stats.average_actual),
                impact: "Better time estimates and reduced overruns".to_string(),
            });
        }
    }

    recommendations
}

fn generate_insights(patterns: &MeetingPattern, total_meetings: usize, days: i64) -> Vec<String> {
    let mut insights = Vec::new();

    let mut best: Option<(&str, f64)> = None;
    for (day, rate) in day_rates_in_week_order(&patterns.acceptance.by_day_of_week) {
        if rate > best.map_or(0.0, |(_, r)| r) {
            best = Some((day, rate));
        }
    }
    if let Some((day, rate)) = best {
        insights.push(format!("You accept {:.0}% of meetings on {day}s (your best day)", rate * 100.0));
    }

    if let Some(block) = patterns.productivity.focus_blocks.first() {
        insights.push(format!(
            "Peak focus time: {} {}-{} (fewest meetings)",
            block.day_of_week, block.start_time, block.end_time
        ));
    }

    let mut busiest: Option<(&String, usize)> = None;
    for (zone, &count) in &patterns.timezone.distribution {
        if busiest.map_or(true, |(_, c)| count > c) {
            busiest = Some((zone, count));
        }
    }
    if let Some((zone, count)) = busiest {
        insights.push(format!("Most meetings in {zone} timezone ({count} meetings)"));
    }

    insights.push(format!("Analyzed {total_meetings} meetings over {days} days"));
    insights
}
