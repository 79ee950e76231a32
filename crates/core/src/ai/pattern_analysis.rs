//! Pattern families derived from calendar history
//!
//! Every function here is pure over an immutable event slice: no I/O, no
//! shared state, safe to run in any order or in parallel.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use cadence_domain::constants::{CONFIDENCE_SATURATION_SAMPLES, MIN_PATTERN_SAMPLES, NO_RECOMMENDATIONS};
use cadence_domain::{
    AcceptancePattern, AnalysisPeriod, DurationPattern, Event, ProductivityInsight, TimezonePattern,
};
use chrono::DateTime;

use crate::utils::time::{start_slot, weekday_from_name};

/// Two-hour daytime band of an hour, or "Outside hours"
pub const fn time_band(hour: u32) -> &'static str {
    match hour {
        9..=10 => "9-11 AM",
        11..=12 => "11 AM-1 PM",
        13..=14 => "1-3 PM",
        15..=16 => "3-5 PM",
        _ => "Outside hours",
    }
}

/// Sample-size confidence, saturating at 1.0
pub fn sample_confidence(samples: usize) -> f64 {
    (samples as f64 / CONFIDENCE_SATURATION_SAMPLES).min(1.0)
}

const MEETING_TYPES: [(&str, &[&str]); 6] = [
    ("1-on-1", &["1:1", "1-on-1", "one-on-one"]),
    ("Standup", &["standup", "daily", "scrum"]),
    ("Review", &["review", "retrospective", "retro"]),
    ("Planning", &["planning", "plan"]),
    ("Interview", &["interview", "candidate"]),
    ("Client call", &["client", "customer"]),
];

/// Coarse meeting type from title keywords; first matching family wins.
pub fn infer_meeting_type(title: &str) -> &'static str {
    let title = title.to_lowercase();
    MEETING_TYPES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| title.contains(k)))
        .map_or("General meeting", |(kind, _)| kind)
}

/// Span from the earliest start to the latest end among `events`.
pub fn analysis_period(events: &[Event]) -> AnalysisPeriod {
    let Some(first) = events.first() else {
        return AnalysisPeriod::default();
    };

    let earliest = events.iter().map(|e| e.when.start_time).min().unwrap_or(first.when.start_time);
    let latest = events.iter().map(|e| e.when.end_time).max().unwrap_or(first.when.end_time);

    let start_date = DateTime::from_timestamp(earliest, 0).unwrap_or_default();
    let end_date = DateTime::from_timestamp(latest, 0).unwrap_or_default();

    AnalysisPeriod { start_date, end_date, days: (end_date - start_date).num_days() }
}

/// Acceptance rate per "{weekday} {band}" slot, highest rate first.
///
/// Confirmed or busy events count as accepted. Slots with fewer than three
/// samples are dropped.
pub fn analyze_acceptance(events: &[Event]) -> Vec<AcceptancePattern> {
    let mut slots: BTreeMap<String, (usize, usize)> = BTreeMap::new();

    for event in events {
        let Some((day, hour)) = start_slot(event) else { continue };
        let entry = slots.entry(format!("{day} {}", time_band(hour))).or_default();
        entry.1 += 1;
        if event.is_confirmed() || event.busy {
            entry.0 += 1;
        }
    }

    let mut patterns: Vec<AcceptancePattern> = slots
        .into_iter()
        .filter(|(_, (_, total))| *total >= MIN_PATTERN_SAMPLES)
        .map(|(time_slot, (accepted, total))| {
            let accept_rate = accepted as f64 / total as f64;
            let description = if accept_rate > 0.8 {
                "You prefer meetings during this time"
            } else if accept_rate < 0.4 {
                "You tend to avoid meetings during this time"
            } else {
                "Moderate acceptance rate"
            };

            AcceptancePattern {
                time_slot,
                accept_rate,
                event_count: total,
                description: description.to_string(),
                confidence: sample_confidence(total),
            }
        })
        .collect();

    patterns.sort_by(|a, b| b.accept_rate.partial_cmp(&a.accept_rate).unwrap_or(Ordering::Equal));
    patterns
}

/// Average scheduled length per inferred meeting type.
///
/// Actual length mirrors scheduled length since nothing upstream records
/// when a meeting really ended.
pub fn analyze_durations(events: &[Event]) -> Vec<DurationPattern> {
    let mut groups: BTreeMap<&'static str, Vec<i64>> = BTreeMap::new();
    for event in events {
        groups.entry(infer_meeting_type(&event.title)).or_default().push(event.when.duration_minutes());
    }

    groups
        .into_iter()
        .filter(|(_, minutes)| minutes.len() >= MIN_PATTERN_SAMPLES)
        .map(|(meeting_type, minutes)| {
            let count = minutes.len();
            let scheduled = minutes.iter().sum::<i64>() / count as i64;
            let actual = scheduled;

            DurationPattern {
                meeting_type: meeting_type.to_string(),
                scheduled_duration: scheduled,
                actual_duration: actual,
                variance: (actual - scheduled).max(0),
                event_count: count,
                description: format!("Average {scheduled}-minute {meeting_type} meetings"),
            }
        })
        .collect()
}

/// Share of events per start zone, most common first. Blank zones count as
/// UTC.
pub fn analyze_timezones(events: &[Event]) -> Vec<TimezonePattern> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for event in events {
        let zone = event.when.start_timezone.trim();
        *counts.entry(if zone.is_empty() { "UTC" } else { zone }).or_default() += 1;
    }

    let total = events.len().max(1) as f64;
    let mut patterns: Vec<TimezonePattern> = counts
        .into_iter()
        .map(|(zone, count)| {
            let percentage = count as f64 / total;
            let whole_percent = (percentage * 100.0) as i64;
            TimezonePattern {
                timezone: zone.to_string(),
                event_count: count,
                percentage,
                preferred_time: "Varies".to_string(),
                description: format!("{whole_percent}% of meetings in this timezone"),
            }
        })
        .collect();

    patterns.sort_by(|a, b| b.event_count.cmp(&a.event_count));
    patterns
}

/// Busiest and quietest weekday.
///
/// Ties go to whichever weekday comes first in calendar order; callers
/// should not depend on that.
pub fn analyze_productivity(events: &[Event]) -> Vec<ProductivityInsight> {
    let mut per_day: BTreeMap<u32, (&'static str, usize)> = BTreeMap::new();
    for event in events {
        let Some((day, _)) = start_slot(event) else { continue };
        let key = weekday_from_name(day).map_or(7, |w| w.num_days_from_monday());
        per_day.entry(key).or_insert((day, 0)).1 += 1;
    }

    let mut busiest: Option<(&str, usize)> = None;
    let mut quietest: Option<(&str, usize)> = None;
    for &(day, count) in per_day.values() {
        if busiest.map_or(true, |(_, max)| count > max) {
            busiest = Some((day, count));
        }
        if quietest.map_or(true, |(_, min)| count < min) {
            quietest = Some((day, count));
        }
    }

    let based_on = vec!["Meeting count by day".to_string()];
    let mut insights = Vec::with_capacity(2);
    if let Some((day, count)) = busiest {
        insights.push(ProductivityInsight {
            insight_type: "high_meeting_density".to_string(),
            time_slot: day.to_string(),
            score: 30,
            description: format!("{day} has the most meetings ({count}) - may impact focus time"),
            based_on: based_on.clone(),
        });
    }
    if let Some((day, count)) = quietest {
        insights.push(ProductivityInsight {
            insight_type: "low_meeting_density".to_string(),
            time_slot: day.to_string(),
            score: 90,
            description: format!("{day} has the fewest meetings ({count}) - good for deep work"),
            based_on,
        });
    }
    insights
}

/// Bounded digest of the pattern families sent to the model.
pub fn build_pattern_context(
    total_events: usize,
    acceptance: &[AcceptancePattern],
    durations: &[DurationPattern],
    timezones: &[TimezonePattern],
    productivity: &[ProductivityInsight],
) -> String {
    let mut out = format!("Calendar Analysis ({total_events} events analyzed):\n\n");

    if !acceptance.is_empty() {
        out.push_str("Meeting Acceptance Patterns:\n");
        for p in acceptance.iter().take(5) {
            let _ = writeln!(
                out,
                "- {}: {:.0}% acceptance ({} events) - {}",
                p.time_slot,
                p.accept_rate * 100.0,
                p.event_count,
                p.description
            );
        }
        out.push('\n');
    }

    if !durations.is_empty() {
        out.push_str("Meeting Duration Patterns:\n");
        for p in durations {
            let _ = writeln!(
                out,
                "- {}: avg {} minutes ({} events)",
                p.meeting_type, p.scheduled_duration, p.event_count
            );
        }
        out.push('\n');
    }

    if !timezones.is_empty() {
        out.push_str("Timezone Patterns:\n");
        for p in timezones.iter().take(3) {
            let _ = writeln!(
                out,
                "- {}: {:.0}% of meetings ({} events)",
                p.timezone,
                p.percentage * 100.0,
                p.event_count
            );
        }
        out.push('\n');
    }

    if !productivity.is_empty() {
        out.push_str("Productivity Insights:\n");
        for p in productivity {
            let _ = writeln!(out, "- {}", p.description);
        }
        out.push('\n');
    }

    out
}

/// Split a model reply into recommendation lines.
///
/// Lines of ten characters or fewer are noise; a leading "N." list marker
/// is stripped.
pub fn parse_recommendations(content: &str) -> Vec<String> {
    let recommendations: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > 10)
        .map(|line| strip_list_marker(line).to_string())
        .collect();

    if recommendations.is_empty() {
        vec![NO_RECOMMENDATIONS.to_string()]
    } else {
        recommendations
    }
}

fn strip_list_marker(line: &str) -> &str {
    let bytes = line.as_bytes();
    if bytes.len() > 2 && (b'1'..=b'9').contains(&bytes[0]) && bytes[1] == b'.' {
        line[2..].trim()
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use cadence_domain::EventWhen;

    use super::*;

    // Monday 2024-01-08 10:00 UTC
    const MONDAY_10AM: i64 = 1_704_708_000;
    const DAY: i64 = 86_400;

    fn event(title: &str, start: i64, minutes: i64, status: &str) -> Event {
        Event {
            id: format!("{title}-{start}"),
            title: title.to_string(),
            when: EventWhen::new(start, start + minutes * 60, "UTC"),
            status: status.to_string(),
            ..Event::default()
        }
    }

    #[test]
    fn confidence_saturates() {
        assert!((sample_confidence(5) - 0.25).abs() < f64::EPSILON);
        assert!((sample_confidence(10) - 0.5).abs() < f64::EPSILON);
        assert!((sample_confidence(20) - 1.0).abs() < f64::EPSILON);
        assert!((sample_confidence(40) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bands_cover_the_workday() {
        assert_eq!(time_band(8), "Outside hours");
        assert_eq!(time_band(9), "9-11 AM");
        assert_eq!(time_band(12), "11 AM-1 PM");
        assert_eq!(time_band(14), "1-3 PM");
        assert_eq!(time_band(16), "3-5 PM");
        assert_eq!(time_band(17), "Outside hours");
    }

    #[test]
    fn acceptance_drops_small_buckets() {
        let mut events: Vec<Event> =
            (0..3).map(|w| event("Sync", MONDAY_10AM + w * 7 * DAY, 30, "confirmed")).collect();
        events.push(event("Lonely", MONDAY_10AM + DAY, 30, "confirmed"));
        events.push(event("Lonely", MONDAY_10AM + DAY + 7 * DAY, 30, "confirmed"));

        let patterns = analyze_acceptance(&events);

        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].time_slot, "Monday 9-11 AM");
        assert_eq!(patterns[0].event_count, 3);
        assert!((patterns[0].confidence - 0.15).abs() < 1e-9);
    }

    #[test]
    fn busy_counts_as_accepted() {
        let mut events: Vec<Event> =
            (0..4).map(|w| event("Sync", MONDAY_10AM + w * 7 * DAY, 30, "tentative")).collect();
        events[0].busy = true;

        let patterns = analyze_acceptance(&events);
        assert!((patterns[0].accept_rate - 0.25).abs() < f64::EPSILON);
        assert_eq!(patterns[0].description, "You tend to avoid meetings during this time");
    }

    #[test]
    fn meeting_types_from_titles() {
        assert_eq!(infer_meeting_type("Alex / Sam 1:1"), "1-on-1");
        assert_eq!(infer_meeting_type("Daily sync"), "Standup");
        assert_eq!(infer_meeting_type("Sprint Retro"), "Review");
        assert_eq!(infer_meeting_type("Q3 Planning"), "Planning");
        assert_eq!(infer_meeting_type("Candidate loop"), "Interview");
        assert_eq!(infer_meeting_type("Customer onboarding"), "Client call");
        assert_eq!(infer_meeting_type("Lunch"), "General meeting");
    }

    #[test]
    fn durations_require_three_samples() {
        let events = vec![
            event("Interview: backend", MONDAY_10AM, 45, "confirmed"),
            event("Interview: frontend", MONDAY_10AM + DAY, 60, "confirmed"),
            event("Interview: design", MONDAY_10AM + 2 * DAY, 60, "confirmed"),
            event("Q3 Planning", MONDAY_10AM, 60, "confirmed"),
        ];

        let patterns = analyze_durations(&events);

        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].meeting_type, "Interview");
        assert_eq!(patterns[0].scheduled_duration, 55);
        assert_eq!(patterns[0].actual_duration, 55);
        assert_eq!(patterns[0].variance, 0);
        assert_eq!(patterns[0].description, "Average 55-minute Interview meetings");
    }

    #[test]
    fn timezones_default_to_utc_and_sort_by_count() {
        let mut events = vec![event("a", MONDAY_10AM, 30, ""), event("b", MONDAY_10AM, 30, "")];
        events[0].when.start_timezone = String::new();
        events[1].when.start_timezone = "Europe/Paris".into();
        let mut third = event("c", MONDAY_10AM, 30, "");
        third.when.start_timezone = "Europe/Paris".into();
        events.push(third);

        let patterns = analyze_timezones(&events);

        assert_eq!(patterns[0].timezone, "Europe/Paris");
        assert_eq!(patterns[0].event_count, 2);
        assert_eq!(patterns[0].description, "66% of meetings in this timezone");
        assert_eq!(patterns[1].timezone, "UTC");
    }

    #[test]
    fn productivity_flags_busiest_and_quietest_days() {
        let events = vec![
            event("a", MONDAY_10AM, 30, ""),
            event("b", MONDAY_10AM + 3600, 30, ""),
            event("c", MONDAY_10AM + 7200, 30, ""),
            event("d", MONDAY_10AM + 2 * DAY, 30, ""),
        ];

        let insights = analyze_productivity(&events);

        assert_eq!(insights[0].insight_type, "high_meeting_density");
        assert_eq!(insights[0].time_slot, "Monday");
        assert_eq!(insights[0].score, 30);
        assert_eq!(insights[1].time_slot, "Wednesday");
        assert_eq!(insights[1].description, "Wednesday has the fewest meetings (1) - good for deep work");
    }

    #[test]
    fn productivity_ties_follow_week_order() {
        let sunday = MONDAY_10AM - DAY;
        let tuesday = MONDAY_10AM + DAY;
        let events = vec![
            event("s1", sunday, 30, ""),
            event("s2", sunday + 3600, 30, ""),
            event("t1", tuesday, 30, ""),
            event("t2", tuesday + 3600, 30, ""),
            event("w", MONDAY_10AM + 2 * DAY, 30, ""),
        ];

        let insights = analyze_productivity(&events);

        // Sunday sorts after Saturday, so Tuesday wins the tie
        assert_eq!(insights[0].time_slot, "Tuesday");
        assert_eq!(insights[1].time_slot, "Wednesday");
    }

    #[test]
    fn period_spans_events() {
        let events = vec![event("a", MONDAY_10AM, 30, ""), event("b", MONDAY_10AM + 3 * DAY, 60, "")];
        let period = analysis_period(&events);

        assert_eq!(period.start_date.timestamp(), MONDAY_10AM);
        assert_eq!(period.end_date.timestamp(), MONDAY_10AM + 3 * DAY + 3600);
        assert_eq!(period.days, 3);
        assert_eq!(analysis_period(&[]).days, 0);
    }

    #[test]
    fn context_limits_sections() {
        let acceptance: Vec<AcceptancePattern> = (0..7)
            .map(|i| AcceptancePattern {
                time_slot: format!("Slot {i}"),
                accept_rate: 0.5,
                event_count: 4,
                description: "Moderate acceptance rate".into(),
                confidence: 0.2,
            })
            .collect();

        let context = build_pattern_context(28, &acceptance, &[], &[], &[]);

        assert!(context.starts_with("Calendar Analysis (28 events analyzed):\n\n"));
        assert!(context.contains("- Slot 0: 50% acceptance (4 events) - Moderate acceptance rate\n"));
        assert!(context.contains("Slot 4"));
        assert!(!context.contains("Slot 5"));
        assert!(!context.contains("Meeting Duration Patterns"));
    }

    #[test]
    fn recommendations_strip_numbering_and_noise() {
        let reply = "Here are ideas:\n\n1. Block Tuesday mornings for deep work\n2. Keep standups under 15 minutes\nOK\n  - Decline optional Friday syncs  ";
        let recs = parse_recommendations(reply);

        assert_eq!(
            recs,
            vec![
                "Here are ideas:",
                "Block Tuesday mornings for deep work",
                "Keep standups under 15 minutes",
                "- Decline optional Friday syncs",
            ]
        );
        assert_eq!(parse_recommendations("ok\n\n"), vec![NO_RECOMMENDATIONS]);
    }
}
