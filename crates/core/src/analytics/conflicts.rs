//! Scheduling-conflict detection
//!
//! Hard conflicts overlap the proposed event and block it. Soft conflicts
//! only make the slot worse: no buffer to a neighbouring meeting, a learned
//! focus block, or an already crowded day. When a slot is blocked or has
//! more than two soft conflicts, nearby alternatives are scored with
//! [`MeetingScorer`].

use std::collections::HashSet;
use std::sync::Arc;

use cadence_domain::{
    CadenceError, Conflict, ConflictAnalysis, ConflictSeverity, ConflictType, Event, EventQuery,
    MeetingPattern, RescheduleOption, Result, TimeBlock,
};
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use super::scorer::{best_day, label_hour, MeetingScorer};
use crate::calendar_ports::{collect_events, CalendarClient};
use crate::context::CallContext;
use crate::utils::time::{local_end, local_start, weekday_from_name, weekday_name};

/// Neighbouring meetings this close are fetched for soft checks.
const SEARCH_MARGIN_HOURS: i64 = 2;
/// Alternatives reach up to a week past the proposal.
const ALTERNATIVE_LOOKAHEAD_DAYS: i64 = 8;
const MIN_BUFFER_MINUTES: i64 = 15;
const OVERLOAD_MEETINGS: usize = 6;
/// More soft conflicts than this make the slot not worth keeping.
const SOFT_CONFLICT_LIMIT: usize = 2;

const MAX_ALTERNATIVES: usize = 3;
const MIN_ALTERNATIVE_SCORE: i32 = 50;
/// Alternative score when there is no history to score against
const BASE_ALTERNATIVE_SCORE: i32 = 70;
const SOFT_CONFLICT_PENALTY: i32 = 10;
const DEFAULT_BEST_HOUR: u32 = 14;

/// Detects conflicts for proposed events on a grant's calendars
pub struct ConflictResolver {
    calendar: Arc<dyn CalendarClient>,
}

impl ConflictResolver {
    pub fn new(calendar: Arc<dyn CalendarClient>) -> Self {
        Self { calendar }
    }

    /// Check `proposed` against the grant's calendars.
    ///
    /// Cancelled events and the proposal itself (same id) are ignored.
    /// `patterns` enables focus-time checks and history-based scoring of
    /// alternatives.
    pub async fn detect_conflicts(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        proposed: &Event,
        patterns: Option<&MeetingPattern>,
    ) -> Result<ConflictAnalysis> {
        let (Some(start), Some(end)) = (local_start(proposed), local_end(proposed)) else {
            return Err(CadenceError::InvalidInput(format!(
                "event {} has an unrepresentable time range",
                proposed.id
            )));
        };
        if end <= start {
            return Err(CadenceError::InvalidInput(format!(
                "event {} must end after it starts",
                proposed.id
            )));
        }

        let margin = Duration::hours(SEARCH_MARGIN_HOURS);
        let (day_start, day_end) = local_day_bounds(&start);
        let query = EventQuery {
            start: (start - margin).timestamp().min(day_start),
            end: (end + margin).timestamp().max(day_end),
            limit: None,
        };
        let mut existing = self.fetch_others(ctx, grant_id, proposed, &query).await?;

        let hard_conflicts = hard_conflicts(&start, &end, &existing);
        let soft_conflicts = soft_conflicts(&start, &end, &existing, patterns);

        let alternative_times = if !hard_conflicts.is_empty() || soft_conflicts.len() > SOFT_CONFLICT_LIMIT {
            let query = EventQuery {
                start: start.timestamp(),
                end: (end + Duration::days(ALTERNATIVE_LOOKAHEAD_DAYS)).timestamp(),
                limit: None,
            };
            let later = self.fetch_others(ctx, grant_id, proposed, &query).await?;
            merge_events(&mut existing, later);
            suggest_alternatives(proposed, &start, &end, &existing, patterns)
        } else {
            Vec::new()
        };

        let recommendations = recommendations(&hard_conflicts, &soft_conflicts);
        let ai_recommendation = ai_recommendation(&hard_conflicts, &soft_conflicts, &alternative_times);

        info!(
            grant_id = %grant_id,
            hard = hard_conflicts.len(),
            soft = soft_conflicts.len(),
            alternatives = alternative_times.len(),
            "Analyzed scheduling conflicts"
        );

        Ok(ConflictAnalysis {
            proposed_event: proposed.clone(),
            total_conflicts: hard_conflicts.len() + soft_conflicts.len(),
            can_proceed: hard_conflicts.is_empty(),
            hard_conflicts,
            soft_conflicts,
            recommendations,
            alternative_times,
            ai_recommendation,
        })
    }

    async fn fetch_others(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        proposed: &Event,
        query: &EventQuery,
    ) -> Result<Vec<Event>> {
        let mut events = collect_events(self.calendar.as_ref(), ctx, grant_id, query).await?;
        events.retain(|event| {
            event.status != "cancelled" && (proposed.id.is_empty() || event.id != proposed.id)
        });
        debug!(grant_id = %grant_id, events = events.len(), "Fetched events for conflict check");
        Ok(events)
    }
}

/// Append `later` events not already present (by calendar and id).
fn merge_events(existing: &mut Vec<Event>, later: Vec<Event>) {
    let mut seen: HashSet<(String, String)> =
        existing.iter().map(|e| (e.calendar_id.clone(), e.id.clone())).collect();
    for event in later {
        if seen.insert((event.calendar_id.clone(), event.id.clone())) {
            existing.push(event);
        }
    }
}

fn local_midnight(zone: &Tz, date: NaiveDate) -> Option<i64> {
    zone.from_local_datetime(&date.and_hms_opt(0, 0, 0)?).earliest().map(|t| t.timestamp())
}

/// Unix bounds of the local calendar day containing `at`.
fn local_day_bounds(at: &DateTime<Tz>) -> (i64, i64) {
    let zone = at.timezone();
    let date = at.date_naive();
    let start = local_midnight(&zone, date).unwrap_or_else(|| at.timestamp());
    let end = local_midnight(&zone, date + Duration::days(1)).unwrap_or(start + 24 * 3600);
    (start, end)
}

fn hard_conflicts(start: &DateTime<Tz>, end: &DateTime<Tz>, existing: &[Event]) -> Vec<Conflict> {
    let (start, end) = (start.timestamp(), end.timestamp());
    existing
        .iter()
        .filter(|e| start < e.when.end_time && end > e.when.start_time)
        .map(|e| Conflict {
            id: format!("hard_{}", e.id),
            kind: ConflictType::Hard,
            severity: if e.status == "tentative" {
                ConflictSeverity::High
            } else {
                ConflictSeverity::Critical
            },
            conflicting_event: Some(e.clone()),
            description: format!("Overlaps with '{}'", e.title),
            impact: "Cannot attend both meetings simultaneously".to_string(),
            suggestion: "Reschedule one of the meetings".to_string(),
            can_auto_resolve: false,
        })
        .collect()
}

fn soft_conflicts(
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    existing: &[Event],
    patterns: Option<&MeetingPattern>,
) -> Vec<Conflict> {
    let (start_ts, end_ts) = (start.timestamp(), end.timestamp());
    let mut conflicts = Vec::new();

    for event in existing {
        if event.when.end_time == start_ts || event.when.start_time == end_ts {
            conflicts.push(Conflict {
                id: format!("soft_b2b_{}", event.id),
                kind: ConflictType::SoftBackToBack,
                severity: ConflictSeverity::Medium,
                conflicting_event: Some(event.clone()),
                description: format!("Back-to-back with '{}'", event.title),
                impact: "No buffer time for breaks or overruns".to_string(),
                suggestion: format!("Add {MIN_BUFFER_MINUTES}-minute buffer between meetings"),
                can_auto_resolve: true,
            });
        }

        let gap = event.when.start_time - end_ts;
        if gap > 0 && gap < MIN_BUFFER_MINUTES * 60 {
            conflicts.push(Conflict {
                id: format!("soft_close_{}", event.id),
                kind: ConflictType::SoftBackToBack,
                severity: ConflictSeverity::Low,
                conflicting_event: Some(event.clone()),
                description: format!("Only {} min gap before '{}'", gap / 60, event.title),
                impact: "Minimal buffer time".to_string(),
                suggestion: "Consider adding more buffer time".to_string(),
                can_auto_resolve: true,
            });
        }
    }

    if let Some(patterns) = patterns {
        for block in patterns.productivity.focus_blocks.iter().filter(|b| in_focus_block(start, b)) {
            conflicts.push(Conflict {
                id: format!("soft_focus_{}_{}", block.day_of_week, block.start_time),
                kind: ConflictType::SoftFocusTime,
                severity: ConflictSeverity::High,
                conflicting_event: None,
                description: format!(
                    "Interrupts focus time ({} {}-{})",
                    block.day_of_week, block.start_time, block.end_time
                ),
                impact: "Reduces productivity during peak focus hours".to_string(),
                suggestion: "Schedule outside of focus time blocks".to_string(),
                can_auto_resolve: true,
            });
        }
    }

    let (day_start, day_end) = local_day_bounds(start);
    let meetings_that_day =
        existing.iter().filter(|e| (day_start..day_end).contains(&e.when.start_time)).count();
    if meetings_that_day >= OVERLOAD_MEETINGS {
        conflicts.push(Conflict {
            id: format!("soft_overload_{}", start.format("%Y-%m-%d")),
            kind: ConflictType::SoftOverload,
            severity: ConflictSeverity::Medium,
            conflicting_event: None,
            description: format!("Already have {meetings_that_day} meetings this day"),
            impact: "Meeting fatigue and reduced productivity".to_string(),
            suggestion: "Consider spreading meetings across more days".to_string(),
            can_auto_resolve: true,
        });
    }

    conflicts
}

/// Start falls on the block's weekday within its whole-hour range.
fn in_focus_block(start: &DateTime<Tz>, block: &TimeBlock) -> bool {
    if !block.day_of_week.eq_ignore_ascii_case(weekday_name(start.weekday())) {
        return false;
    }
    match (label_hour(&block.start_time), label_hour(&block.end_time)) {
        (Some(from), Some(to)) => (from..to).contains(&start.hour()),
        _ => false,
    }
}

fn recommendations(hard: &[Conflict], soft: &[Conflict]) -> Vec<String> {
    let mut lines = Vec::new();

    if !hard.is_empty() {
        lines.push("Hard conflicts detected - must reschedule".to_string());
        lines.extend(hard.iter().map(|c| format!("  • {}", c.suggestion)));
    }

    if soft.len() > SOFT_CONFLICT_LIMIT {
        lines.push("Multiple soft conflicts detected:".to_string());
        let count = |kind: ConflictType| soft.iter().filter(|c| c.kind == kind).count();
        if count(ConflictType::SoftFocusTime) > 0 {
            lines.push("  • Consider protecting your focus time".to_string());
        }
        if count(ConflictType::SoftBackToBack) > 1 {
            lines.push("  • Add buffer time between meetings".to_string());
        }
    }

    if hard.is_empty() && soft.is_empty() {
        lines.push("No conflicts detected - good time for this meeting".to_string());
    }

    lines
}

fn ai_recommendation(hard: &[Conflict], soft: &[Conflict], alternatives: &[RescheduleOption]) -> String {
    let best = alternatives.first().map(|option| option.score);

    if !hard.is_empty() {
        return match best {
            Some(score) => format!(
                "Cannot proceed due to {} hard conflict(s). Recommend rescheduling to alternative time slot (Score: {score}/100)",
                hard.len()
            ),
            None => format!(
                "Cannot proceed due to {} hard conflict(s). Manual rescheduling required",
                hard.len()
            ),
        };
    }

    if soft.len() > SOFT_CONFLICT_LIMIT {
        return match best {
            Some(score) => format!(
                "Proceeding not recommended due to {} soft conflicts. Consider alternative time (Score: {score}/100)",
                soft.len()
            ),
            None => format!("Proceeding possible but not ideal ({} soft conflicts)", soft.len()),
        };
    }

    if soft.is_empty() {
        "Excellent time - no conflicts detected".to_string()
    } else {
        format!("Can proceed with {} minor soft conflict(s)", soft.len())
    }
}

/// Later hours the same day, the same time tomorrow, and the best learned
/// slot; at most three, best first.
fn suggest_alternatives(
    proposed: &Event,
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    existing: &[Event],
    patterns: Option<&MeetingPattern>,
) -> Vec<RescheduleOption> {
    let length = *end - *start;
    let participants: Vec<String> = proposed.participants.iter().map(|p| p.email.clone()).collect();

    let mut candidates: Vec<DateTime<Tz>> = (1..=4).map(|hours| *start + Duration::hours(hours)).collect();
    candidates.extend(start.checked_add_days(Days::new(1)));
    candidates.extend(patterns.and_then(|p| best_time_from_patterns(p, start)));

    let mut seen = HashSet::new();
    let mut options: Vec<RescheduleOption> = candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.timestamp()))
        .filter_map(|candidate| {
            evaluate_alternative(candidate, length, start, existing, patterns, &participants)
        })
        .filter(|option| option.score > MIN_ALTERNATIVE_SCORE)
        .collect();

    options.sort_by(|a, b| b.score.cmp(&a.score));
    options.truncate(MAX_ALTERNATIVES);
    options
}

/// Next best-accepted weekday (never today) at the best-accepted hour.
fn best_time_from_patterns(patterns: &MeetingPattern, around: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let target = weekday_from_name(best_day(patterns)?)?;

    let mut best_hour: Option<(u32, f64)> = None;
    for (label, &rate) in &patterns.acceptance.by_time_of_day {
        let Some(hour) = label_hour(label) else { continue };
        if rate > best_hour.map_or(0.0, |(_, r)| r) {
            best_hour = Some((hour, rate));
        }
    }
    let hour = best_hour.map_or(DEFAULT_BEST_HOUR, |(hour, _)| hour);

    let mut days = i64::from(target.num_days_from_sunday()) - i64::from(around.weekday().num_days_from_sunday());
    if days <= 0 {
        days += 7;
    }

    let date = around.date_naive() + Duration::days(days);
    around.timezone().from_local_datetime(&date.and_hms_opt(hour, 0, 0)?).earliest()
}

/// Score one candidate; `None` when it still overlaps another meeting.
fn evaluate_alternative(
    candidate: DateTime<Tz>,
    length: Duration,
    original: &DateTime<Tz>,
    existing: &[Event],
    patterns: Option<&MeetingPattern>,
    participants: &[String],
) -> Option<RescheduleOption> {
    let end = candidate + length;
    if !hard_conflicts(&candidate, &end, existing).is_empty() {
        return None;
    }
    let soft = soft_conflicts(&candidate, &end, existing, patterns);

    let base = patterns.map_or(BASE_ALTERNATIVE_SCORE, |p| {
        MeetingScorer::new(Some(p)).score_meeting_time(candidate, participants).score
    });
    let penalty = SOFT_CONFLICT_PENALTY.saturating_mul(i32::try_from(soft.len()).unwrap_or(i32::MAX));
    let score = base.saturating_sub(penalty).max(0);

    let mut pros = Vec::new();
    let mut cons = Vec::new();
    if soft.is_empty() {
        pros.push("No conflicts detected".to_string());
    } else {
        cons.push(format!("{} soft conflict(s)", soft.len()));
    }

    let day = weekday_name(candidate.weekday());
    if let Some(&rate) = patterns.and_then(|p| p.acceptance.by_day_of_week.get(day)) {
        if rate > 0.8 {
            pros.push(format!("High acceptance rate on {day}s ({:.0}%)", rate * 100.0));
        }
    }

    let days_later = (candidate - *original).num_days();
    if days_later > 0 {
        cons.push(format!("{days_later} day delay"));
    }

    Some(RescheduleOption {
        proposed_time: candidate.with_timezone(&Utc),
        end_time: end.with_timezone(&Utc),
        score,
        confidence: f64::from(score),
        pros,
        cons,
        conflicts: soft,
        participant_match: 1.0,
        ai_insight: option_insight(score, days_later).to_string(),
    })
}

const fn option_insight(score: i32, days_later: i64) -> &'static str {
    if score >= 90 {
        "Excellent alternative with minimal disruption"
    } else if score >= 75 {
        if days_later == 0 {
            "Same day alternative - minimal delay"
        } else {
            "Good alternative with acceptable trade-offs"
        }
    } else if score >= 60 {
        "Acceptable but consider other options"
    } else {
        "Suboptimal - many conflicts remain"
    }
}

#[cfg(test)]
mod tests {
    use cadence_domain::EventWhen;

    use super::*;

    // 2026-03-02 is a Monday
    fn at(hour: u32, minute: u32) -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn existing(id: &str, start: DateTime<Tz>, minutes: i64) -> Event {
        let start = start.timestamp();
        Event {
            id: id.to_string(),
            title: id.to_string(),
            status: "confirmed".to_string(),
            when: EventWhen::new(start, start + minutes * 60, "UTC"),
            ..Event::default()
        }
    }

    fn soft(kind: ConflictType) -> Conflict {
        Conflict {
            id: String::new(),
            kind,
            severity: ConflictSeverity::Medium,
            conflicting_event: None,
            description: String::new(),
            impact: String::new(),
            suggestion: String::new(),
            can_auto_resolve: true,
        }
    }

    #[test]
    fn touching_meetings_are_soft_not_hard() {
        let events = vec![existing("before", at(9, 0), 60), existing("after", at(11, 10), 30)];

        assert!(hard_conflicts(&at(10, 0), &at(11, 0), &events).is_empty());

        let ids: Vec<_> =
            soft_conflicts(&at(10, 0), &at(11, 0), &events, None).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["soft_b2b_before", "soft_close_after"]);
    }

    #[test]
    fn tentative_overlap_is_high_severity() {
        let mut tentative = existing("draft", at(10, 30), 60);
        tentative.status = "tentative".to_string();

        let conflicts = hard_conflicts(&at(10, 0), &at(11, 0), &[tentative]);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].severity, ConflictSeverity::High);
        assert_eq!(conflicts[0].description, "Overlaps with 'draft'");
    }

    #[test]
    fn focus_block_hours_are_half_open() {
        let block = TimeBlock {
            day_of_week: "Monday".to_string(),
            start_time: "09:00".to_string(),
            end_time: "11:00".to_string(),
            score: 90.0,
        };

        assert!(in_focus_block(&at(9, 0), &block));
        assert!(in_focus_block(&at(10, 45), &block));
        assert!(!in_focus_block(&at(11, 0), &block));
        assert!(!in_focus_block(&(at(9, 0) + Duration::days(1)), &block));
    }

    #[test]
    fn summary_lines_follow_conflict_mix() {
        let mixed = vec![
            soft(ConflictType::SoftFocusTime),
            soft(ConflictType::SoftBackToBack),
            soft(ConflictType::SoftOverload),
        ];
        assert_eq!(
            recommendations(&[], &mixed),
            vec!["Multiple soft conflicts detected:", "  • Consider protecting your focus time"]
        );
        assert_eq!(
            ai_recommendation(&[], &mixed, &[]),
            "Proceeding possible but not ideal (3 soft conflicts)"
        );

        let one = vec![soft(ConflictType::SoftOverload)];
        assert!(recommendations(&[], &one).is_empty());
        assert_eq!(ai_recommendation(&[], &one, &[]), "Can proceed with 1 minor soft conflict(s)");

        assert_eq!(recommendations(&[], &[]), vec!["No conflicts detected - good time for this meeting"]);
        assert_eq!(ai_recommendation(&[], &[], &[]), "Excellent time - no conflicts detected");
    }

    #[test]
    fn insight_depends_on_score_and_delay() {
        assert_eq!(option_insight(95, 3), "Excellent alternative with minimal disruption");
        assert_eq!(option_insight(80, 0), "Same day alternative - minimal delay");
        assert_eq!(option_insight(80, 1), "Good alternative with acceptable trade-offs");
        assert_eq!(option_insight(40, 0), "Suboptimal - many conflicts remain");
    }
}
