//! Calendar time helpers
//!
//! Weekday and hour bucketing always happens in the event's own IANA start
//! zone when it names a valid zone, and in UTC otherwise.
//!
//! # Examples
//!
//! ```
//! use cadence_core::utils::time::{clock_minutes, weekday_from_name, weekday_name};
//!
//! assert_eq!(clock_minutes("09:30"), Some(570));
//! assert_eq!(weekday_name(weekday_from_name("Tuesday").unwrap()), "Tuesday");
//! ```

use cadence_domain::Event;
use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Monday through Friday, in calendar order
pub const WORK_WEEK: [&str; 5] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// English weekday name, capitalised
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Inverse of [`weekday_name`]; ignores case and surrounding whitespace.
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// IANA zone by name; blank or unknown names resolve to UTC.
pub fn resolve_timezone(name: &str) -> Tz {
    name.trim().parse::<Tz>().unwrap_or(Tz::UTC)
}

/// Event start as wall-clock time in its own zone
pub fn local_start(event: &Event) -> Option<DateTime<Tz>> {
    let zone = resolve_timezone(&event.when.start_timezone);
    event.when.start().map(|start| start.with_timezone(&zone))
}

/// Event end as wall-clock time in its start zone
pub fn local_end(event: &Event) -> Option<DateTime<Tz>> {
    let zone = resolve_timezone(&event.when.start_timezone);
    event.when.end().map(|end| end.with_timezone(&zone))
}

/// `(weekday name, hour)` of the event start in its own zone
pub fn start_slot(event: &Event) -> Option<(&'static str, u32)> {
    local_start(event).map(|start| (weekday_name(start.weekday()), start.hour()))
}

/// Parse "HH:MM" into a time of day.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Minutes since midnight for "HH:MM"
pub fn clock_minutes(value: &str) -> Option<i64> {
    parse_clock(value).map(|t| i64::from(t.hour()) * 60 + i64::from(t.minute()))
}

/// Length of `start`..`end` in minutes, both "HH:MM".
pub fn clock_span_minutes(start: &str, end: &str) -> Option<i64> {
    Some(clock_minutes(end)? - clock_minutes(start)?)
}

/// Half-open clock ranges overlap (`s1 < e2 && s2 < e1`). Unparseable
/// bounds never overlap.
pub fn clock_ranges_overlap(start1: &str, end1: &str, start2: &str, end2: &str) -> bool {
    match (clock_minutes(start1), clock_minutes(end1), clock_minutes(start2), clock_minutes(end2)) {
        (Some(s1), Some(e1), Some(s2), Some(e2)) => s1 < e2 && s2 < e1,
        _ => false,
    }
}

/// "HH:00" label for an hour of day
pub fn hour_label(hour: u32) -> String {
    format!("{hour:02}:00")
}

/// Next instant at which `day` + `clock` occurs, seen from `now`.
///
/// A slot later today is kept; a slot that already passed today moves
/// exactly one week ahead. Returns `None` for an unknown day, a malformed
/// clock, or a wall time skipped by a DST transition.
pub fn next_occurrence<Z: TimeZone>(now: &DateTime<Z>, day: &str, clock: &str) -> Option<DateTime<Utc>> {
    let target_day = weekday_from_name(day)?;
    let target_time = parse_clock(clock)?;

    let today = i64::from(now.weekday().num_days_from_sunday());
    let target = i64::from(target_day.num_days_from_sunday());
    let mut days_until = (target - today + 7) % 7;
    if days_until == 0 && now.time() > target_time {
        days_until = 7;
    }

    let date = now.date_naive() + Duration::days(days_until);
    now.timezone()
        .from_local_datetime(&date.and_time(target_time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
