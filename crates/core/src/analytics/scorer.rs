//! Meeting-time scoring
//!
//! Rates a proposed start time against learned [`MeetingPattern`]s. Five
//! weighted factors (day acceptance, hour acceptance, productivity,
//! participant preferences and timezone fairness) are summed and scaled to
//! 0-100. Weekday and hour are read in the proposal's own zone.

use cadence_domain::{MeetingPattern, MeetingScore, ScoreFactor};
use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::utils::time::{hour_label, parse_clock, weekday_from_name, weekday_name};

const DAY_WEIGHT: i32 = 25;
const TIME_WEIGHT: i32 = 25;
const PRODUCTIVITY_WEIGHT: i32 = 20;
const PARTICIPANT_WEIGHT: i32 = 15;
const TIMEZONE_WEIGHT: i32 = 15;

/// Impact of an average (50%) acceptance rate, rounded up
const AVERAGE_RATE_IMPACT: i32 = 13;
const NEUTRAL_PRODUCTIVITY: i32 = 10;
const NEUTRAL_PARTICIPANTS: i32 = 8;

/// Scores below this come with alternative times.
const GOOD_SCORE: i32 = 70;
/// Alternatives only move to working hours.
const ALTERNATIVE_HOURS: std::ops::RangeInclusive<u32> = 9..=17;

/// Scores meeting times against learned patterns
#[derive(Debug, Clone, Copy, Default)]
pub struct MeetingScorer<'a> {
    patterns: Option<&'a MeetingPattern>,
}

impl<'a> MeetingScorer<'a> {
    pub const fn new(patterns: Option<&'a MeetingPattern>) -> Self {
        Self { patterns }
    }

    /// Score `proposed` for a meeting with `participants` (emails).
    ///
    /// Without patterns the score is a neutral 50 with zero confidence.
    pub fn score_meeting_time(&self, proposed: DateTime<Tz>, participants: &[String]) -> MeetingScore {
        let Some(patterns) = self.patterns else {
            return MeetingScore {
                score: 50,
                confidence: 0.0,
                success_rate: 0.0,
                factors: Vec::new(),
                recommendation: "No historical data available for scoring".to_string(),
                alternative_times: Vec::new(),
            };
        };

        let day = weekday_name(proposed.weekday());
        let hour = hour_label(proposed.hour());
        let mut factors = Vec::new();
        let mut total = 0;
        let mut max = 0;

        if let Some(&rate) = patterns.acceptance.by_day_of_week.get(day) {
            let impact = weighted(rate, DAY_WEIGHT);
            total += impact;
            max += DAY_WEIGHT;
            factors.push(ScoreFactor {
                name: "Day Preference".to_string(),
                impact: impact - AVERAGE_RATE_IMPACT,
                description: format!("{:.0}% acceptance rate on {day}s", rate * 100.0),
            });
        }

        if let Some(&rate) = patterns.acceptance.by_time_of_day.get(&hour) {
            let impact = weighted(rate, TIME_WEIGHT);
            total += impact;
            max += TIME_WEIGHT;
            factors.push(ScoreFactor {
                name: "Time Preference".to_string(),
                impact: impact - AVERAGE_RATE_IMPACT,
                description: format!("{:.0}% acceptance rate at {hour}", rate * 100.0),
            });
        }

        let productivity = productivity_score(patterns, day, proposed.hour());
        total += productivity;
        max += PRODUCTIVITY_WEIGHT;
        factors.push(ScoreFactor {
            name: "Productivity".to_string(),
            impact: productivity - NEUTRAL_PRODUCTIVITY,
            description: productivity_description(patterns, day),
        });

        let participant = participant_score(patterns, participants, day, &hour);
        total += participant;
        max += PARTICIPANT_WEIGHT;
        if participant > 0 {
            factors.push(ScoreFactor {
                name: "Participant Match".to_string(),
                impact: participant - NEUTRAL_PARTICIPANTS,
                description: "Based on historical meetings with these participants".to_string(),
            });
        }

        total += TIMEZONE_WEIGHT;
        max += TIMEZONE_WEIGHT;
        factors.push(ScoreFactor {
            name: "Timezone".to_string(),
            impact: 0,
            description: "Time works well for all timezones".to_string(),
        });

        let score = total * 100 / max;
        let alternative_times = if score < GOOD_SCORE {
            suggest_alternative(patterns, &proposed).into_iter().collect()
        } else {
            Vec::new()
        };

        MeetingScore {
            score,
            confidence: confidence(patterns),
            success_rate: patterns
                .acceptance
                .by_day_of_week
                .get(day)
                .copied()
                .unwrap_or(patterns.acceptance.overall),
            recommendation: recommendation(score, &factors),
            factors,
            alternative_times,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn weighted(rate: f64, weight: i32) -> i32 {
    (rate.clamp(0.0, 1.0) * f64::from(weight)) as i32
}

/// Hour of an "HH:MM" label
pub(super) fn label_hour(label: &str) -> Option<u32> {
    parse_clock(label).map(|time| time.hour())
}

/// Weekday with the highest acceptance rate, Monday first on ties.
pub(super) fn best_day(patterns: &MeetingPattern) -> Option<&str> {
    let mut best: Option<(&str, f64)> = None;
    let mut days: Vec<(&str, f64)> =
        patterns.acceptance.by_day_of_week.iter().map(|(d, r)| (d.as_str(), *r)).collect();
    days.sort_by_key(|(day, _)| weekday_from_name(day).map_or(7, |w| w.num_days_from_monday()));
    for (day, rate) in days {
        if rate > best.map_or(0.0, |(_, r)| r) {
            best = Some((day, rate));
        }
    }
    best.map(|(day, _)| day)
}

/// Peak-focus hour scales the block score to 0-20; otherwise lighter
/// meeting days score higher.
#[allow(clippy::cast_possible_truncation)]
fn productivity_score(patterns: &MeetingPattern, day: &str, hour: u32) -> i32 {
    let productivity = &patterns.productivity;
    if let Some(block) = productivity
        .peak_focus
        .iter()
        .find(|b| b.day_of_week == day && label_hour(&b.start_time) == Some(hour))
    {
        return (block.score / 5.0) as i32;
    }

    match productivity.meeting_density.get(day) {
        Some(&density) if density < 2.0 => 18,
        Some(&density) if density < 4.0 => 12,
        Some(_) => 6,
        None => NEUTRAL_PRODUCTIVITY,
    }
}

fn productivity_description(patterns: &MeetingPattern, day: &str) -> String {
    let productivity = &patterns.productivity;
    if productivity.peak_focus.iter().any(|b| b.day_of_week == day) {
        return "Peak focus time - fewer meetings scheduled".to_string();
    }
    match productivity.meeting_density.get(day) {
        Some(density) => format!("Average {density:.1} meetings on {day}s"),
        None => "Standard productivity time".to_string(),
    }
}

/// Average of 8 (preferred day) + 7 (preferred hour) over participants with
/// history; neutral when nobody is known.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn participant_score(patterns: &MeetingPattern, participants: &[String], day: &str, hour: &str) -> i32 {
    let known: Vec<_> = participants.iter().filter_map(|email| patterns.participants.get(email)).collect();
    if known.is_empty() {
        return NEUTRAL_PARTICIPANTS;
    }

    let total: i32 = known
        .iter()
        .map(|p| {
            let day_match = if p.preferred_days.iter().any(|d| d == day) { 8 } else { 0 };
            let hour_match = if p.preferred_times.iter().any(|t| t == hour) { 7 } else { 0 };
            day_match + hour_match
        })
        .sum();
    total / known.len() as i32
}

/// Share of pattern families with data, 0-100
#[allow(clippy::cast_precision_loss)]
fn confidence(patterns: &MeetingPattern) -> f64 {
    let available = [
        !patterns.acceptance.by_day_of_week.is_empty(),
        !patterns.acceptance.by_time_of_day.is_empty(),
        !patterns.productivity.peak_focus.is_empty(),
        !patterns.participants.is_empty(),
        !patterns.duration.by_participant.is_empty(),
    ];
    let hits = available.iter().filter(|present| **present).count();
    hits as f64 / available.len() as f64 * 100.0
}

fn recommendation(score: i32, factors: &[ScoreFactor]) -> String {
    if score >= 85 {
        return "Excellent time - highly recommended based on historical patterns".to_string();
    }
    if score >= GOOD_SCORE {
        return "Good time - aligns well with your preferences".to_string();
    }
    if score >= 50 {
        return "Acceptable time - consider alternatives if available".to_string();
    }

    match factors.iter().filter(|f| f.impact < 0).min_by_key(|f| f.impact) {
        Some(worst) => {
            format!("Not recommended - {} is suboptimal. Consider alternative times.", worst.name)
        }
        None => "Not recommended - consider alternative times".to_string(),
    }
}

/// Next best-accepted weekday at the best-accepted working hour, strictly
/// after the proposal's date.
fn suggest_alternative(patterns: &MeetingPattern, proposed: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let target = weekday_from_name(best_day(patterns)?)?;

    let mut best_hour: Option<(u32, f64)> = None;
    for (label, &rate) in &patterns.acceptance.by_time_of_day {
        let Some(hour) = label_hour(label) else { continue };
        if ALTERNATIVE_HOURS.contains(&hour) && rate > best_hour.map_or(0.0, |(_, r)| r) {
            best_hour = Some((hour, rate));
        }
    }
    let (hour, _) = best_hour?;

    let today = i64::from(proposed.weekday().num_days_from_sunday());
    let mut days_until = (i64::from(target.num_days_from_sunday()) - today + 7) % 7;
    if days_until == 0 {
        days_until = 7;
    }

    let date = proposed.date_naive() + Duration::days(days_until);
    proposed
        .timezone()
        .from_local_datetime(&date.and_hms_opt(hour, 0, 0)?)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cadence_domain::{
        AcceptancePatterns, DateRange, DurationPatterns, ParticipantPattern, ProductivityPatterns,
        TimeBlock, TimezonePatterns,
    };

    use super::*;

    fn rates(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    fn patterns(by_day: &[(&str, f64)], by_time: &[(&str, f64)]) -> MeetingPattern {
        let now = Utc::now();
        MeetingPattern {
            user_email: String::new(),
            analyzed_period: DateRange { start: now, end: now },
            last_updated: now,
            acceptance: AcceptancePatterns {
                by_day_of_week: rates(by_day),
                by_time_of_day: rates(by_time),
                by_day_and_time: BTreeMap::new(),
                overall: 0.6,
            },
            duration: DurationPatterns::default(),
            timezone: TimezonePatterns::default(),
            productivity: ProductivityPatterns::default(),
            participants: BTreeMap::new(),
        }
    }

    // 2026-03-02 is a Monday
    fn utc(day: u32, hour: u32) -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn no_history_is_neutral() {
        let score = MeetingScorer::new(None).score_meeting_time(utc(2, 10), &[]);

        assert_eq!(score.score, 50);
        assert!(score.confidence.abs() < f64::EPSILON);
        assert!(score.factors.is_empty());
        assert_eq!(score.recommendation, "No historical data available for scoring");
    }

    #[test]
    fn well_accepted_light_day_scores_high() {
        let mut history = patterns(&[("Monday", 1.0)], &[("10:00", 1.0)]);
        history.productivity.meeting_density = rates(&[("Monday", 1.0)]);

        let score = MeetingScorer::new(Some(&history)).score_meeting_time(utc(2, 10), &[]);

        // 25 + 25 + 18 + 8 + 15
        assert_eq!(score.score, 91);
        assert!((score.confidence - 40.0).abs() < 1e-9);
        assert!((score.success_rate - 1.0).abs() < 1e-9);
        assert!(score.alternative_times.is_empty());
        assert!(score.recommendation.starts_with("Excellent time"));

        let impacts: Vec<_> = score.factors.iter().map(|f| (f.name.as_str(), f.impact)).collect();
        assert_eq!(
            impacts,
            vec![
                ("Day Preference", 12),
                ("Time Preference", 12),
                ("Productivity", 8),
                ("Participant Match", 0),
                ("Timezone", 0),
            ]
        );
        assert_eq!(score.factors[0].description, "100% acceptance rate on Mondays");
        assert_eq!(score.factors[2].description, "Average 1.0 meetings on Mondays");
    }

    #[test]
    fn poor_slot_names_worst_factor_and_suggests_best_day() {
        let mut history =
            patterns(&[("Friday", 0.2), ("Tuesday", 0.9)], &[("16:00", 0.2), ("10:00", 0.9), ("07:00", 1.0)]);
        history.productivity.meeting_density = rates(&[("Friday", 5.0)]);
        history.participants.insert(
            "ana@x.io".to_string(),
            ParticipantPattern {
                email: "ana@x.io".to_string(),
                preferred_days: vec!["Tuesday".to_string()],
                preferred_times: vec!["10:00".to_string()],
                ..ParticipantPattern::default()
            },
        );

        // Friday 16:00
        let score =
            MeetingScorer::new(Some(&history)).score_meeting_time(utc(6, 16), &["ana@x.io".to_string()]);

        // 5 + 5 + 6 + 0 + 15
        assert_eq!(score.score, 31);
        assert!(score.factors.iter().all(|f| f.name != "Participant Match"));
        assert_eq!(
            score.recommendation,
            "Not recommended - Day Preference is suboptimal. Consider alternative times."
        );
        // Tuesday at 10:00; 07:00 is outside working hours
        assert_eq!(
            score.alternative_times,
            vec![Utc.with_ymd_and_hms(2026, 3, 10, 10, 0, 0).unwrap()]
        );
    }

    #[test]
    fn peak_focus_hour_and_local_weekday() {
        let mut history = patterns(&[("Monday", 0.5)], &[]);
        history.productivity.peak_focus = vec![TimeBlock {
            day_of_week: "Monday".to_string(),
            start_time: "21:00".to_string(),
            end_time: "22:00".to_string(),
            score: 90.0,
        }];

        // Tuesday 02:00 UTC is Monday 21:00 in New York
        let proposed = utc(3, 2).with_timezone(&"America/New_York".parse::<Tz>().unwrap());
        let score = MeetingScorer::new(Some(&history)).score_meeting_time(proposed, &[]);

        let productivity = score.factors.iter().find(|f| f.name == "Productivity").unwrap();
        assert_eq!(productivity.impact, 8);
        assert_eq!(productivity.description, "Peak focus time - fewer meetings scheduled");
        assert_eq!(score.factors[0].description, "50% acceptance rate on Mondays");
        // 12 + 18 + 8 + 15 out of 75
        assert_eq!(score.score, 70);
    }
}
