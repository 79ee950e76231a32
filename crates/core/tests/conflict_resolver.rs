mod support;

use std::collections::BTreeMap;
use std::sync::Arc;

use cadence_core::{CallContext, ConflictResolver};
use cadence_domain::{
    AcceptancePatterns, CadenceError, ConflictSeverity, DateRange, DurationPatterns, Event,
    EventQuery, EventWhen, MeetingPattern, ProductivityPatterns, TimeBlock, TimezonePatterns,
};
use chrono::{TimeZone, Timelike, Utc};
use support::calendar::{event, MockCalendarClient};

// Monday 2026-03-02 00:00 UTC
const MONDAY: i64 = 1_772_409_600;
const HOUR: i64 = 3600;
const DAY: i64 = 24 * HOUR;

fn tuesday_focus_history() -> MeetingPattern {
    let now = Utc::now();
    MeetingPattern {
        user_email: String::new(),
        analyzed_period: DateRange { start: now, end: now },
        last_updated: now,
        acceptance: AcceptancePatterns {
            by_day_of_week: BTreeMap::from([("Tuesday".to_string(), 1.0)]),
            ..AcceptancePatterns::default()
        },
        duration: DurationPatterns::default(),
        timezone: TimezonePatterns::default(),
        productivity: ProductivityPatterns {
            focus_blocks: vec![TimeBlock {
                day_of_week: "Tuesday".to_string(),
                start_time: "14:00".to_string(),
                end_time: "16:00".to_string(),
                score: 90.0,
            }],
            ..ProductivityPatterns::default()
        },
        participants: BTreeMap::new(),
    }
}

#[tokio::test]
async fn clear_slot_ignores_cancelled_events_and_itself() {
    let proposed = event("proposed", "Planning", MONDAY + 10 * HOUR, 60, "UTC");
    let mut cancelled = event("old", "Old sync", MONDAY + 10 * HOUR, 60, "UTC");
    cancelled.status = "cancelled".to_string();
    let calendar = MockCalendarClient::new(vec![cancelled, proposed.clone()]);
    let resolver = ConflictResolver::new(Arc::new(calendar.clone()));

    let analysis = resolver
        .detect_conflicts(&CallContext::new(), "grant-1", &proposed, None)
        .await
        .expect("analysis");

    assert!(analysis.can_proceed);
    assert_eq!(analysis.total_conflicts, 0);
    assert!(analysis.alternative_times.is_empty());
    assert_eq!(analysis.recommendations, vec!["No conflicts detected - good time for this meeting"]);
    assert_eq!(analysis.ai_recommendation, "Excellent time - no conflicts detected");

    // Whole local day, which already covers the two-hour margins
    assert_eq!(calendar.queries(), vec![EventQuery { start: MONDAY, end: MONDAY + DAY, limit: None }]);
}

#[tokio::test]
async fn overlap_blocks_and_offers_later_slots() {
    let mut draft = event("draft", "Draft review", MONDAY + 9 * HOUR + 30 * 60, 60, "UTC");
    draft.status = "tentative".to_string();
    let standup = event("standup", "Standup", MONDAY + 10 * HOUR + 30 * 60, 30, "UTC");
    let calendar = MockCalendarClient::new(vec![draft, standup]);
    let resolver = ConflictResolver::new(Arc::new(calendar.clone()));
    let proposed = event("proposed", "Planning", MONDAY + 10 * HOUR, 60, "UTC");

    let analysis = resolver
        .detect_conflicts(&CallContext::new(), "grant-1", &proposed, None)
        .await
        .expect("analysis");

    assert!(!analysis.can_proceed);
    let hard: Vec<_> =
        analysis.hard_conflicts.iter().map(|c| (c.id.as_str(), c.severity)).collect();
    assert_eq!(
        hard,
        vec![("hard_draft", ConflictSeverity::High), ("hard_standup", ConflictSeverity::Critical)]
    );
    assert!(analysis.soft_conflicts.is_empty());
    assert_eq!(
        analysis.recommendations,
        vec![
            "Hard conflicts detected - must reschedule",
            "  • Reschedule one of the meetings",
            "  • Reschedule one of the meetings",
        ]
    );

    // 11:00 is back-to-back with the standup and drops behind the clean slots
    let hours: Vec<_> = analysis.alternative_times.iter().map(|o| o.proposed_time.hour()).collect();
    assert_eq!(hours, vec![12, 13, 14]);
    for option in &analysis.alternative_times {
        assert_eq!(option.score, 70);
        assert_eq!(option.end_time - option.proposed_time, chrono::Duration::hours(1));
        assert_eq!(option.pros, vec!["No conflicts detected"]);
        assert_eq!(option.ai_insight, "Acceptable but consider other options");
    }
    assert_eq!(
        analysis.ai_recommendation,
        "Cannot proceed due to 2 hard conflict(s). Recommend rescheduling to alternative time slot (Score: 70/100)"
    );

    // Second lookup covers the alternative candidates
    assert_eq!(calendar.queries().len(), 2);
}

#[tokio::test]
async fn crowded_focus_slot_recommends_moving() {
    let tuesday = MONDAY + DAY;
    let calendar = MockCalendarClient::new(vec![
        event("prep", "Prep", tuesday + 13 * HOUR, 60, "UTC"),
        event("retro", "Retro", tuesday + 15 * HOUR + 10 * 60, 30, "UTC"),
    ]);
    let resolver = ConflictResolver::new(Arc::new(calendar));
    let proposed = event("proposed", "Planning", tuesday + 14 * HOUR, 60, "UTC");
    let history = tuesday_focus_history();

    let analysis = resolver
        .detect_conflicts(&CallContext::new(), "grant-1", &proposed, Some(&history))
        .await
        .expect("analysis");

    assert!(analysis.can_proceed);
    let ids: Vec<_> = analysis.soft_conflicts.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["soft_b2b_prep", "soft_close_retro", "soft_focus_Tuesday_14:00"]);
    assert_eq!(analysis.soft_conflicts[1].description, "Only 10 min gap before 'Retro'");
    assert_eq!(
        analysis.recommendations,
        vec![
            "Multiple soft conflicts detected:",
            "  • Consider protecting your focus time",
            "  • Add buffer time between meetings",
        ]
    );

    // 15:00 overlaps the retro; 16:00 onwards is clear and outside the block
    let first = &analysis.alternative_times[0];
    assert_eq!(first.proposed_time, Utc.with_ymd_and_hms(2026, 3, 3, 16, 0, 0).unwrap());
    assert_eq!(first.score, 77);
    assert_eq!(first.pros, vec!["No conflicts detected", "High acceptance rate on Tuesdays (100%)"]);
    assert_eq!(first.ai_insight, "Same day alternative - minimal delay");
    assert_eq!(analysis.alternative_times.len(), 3);
    assert_eq!(
        analysis.ai_recommendation,
        "Proceeding not recommended due to 3 soft conflicts. Consider alternative time (Score: 77/100)"
    );
}

#[tokio::test]
async fn busy_day_is_a_soft_overload() {
    let wednesday = MONDAY + 2 * DAY;
    let morning: Vec<Event> = (0..6)
        .map(|i| event(&format!("m{i}"), "Sync", wednesday + (8 + i) * HOUR, 30, "UTC"))
        .collect();
    let resolver = ConflictResolver::new(Arc::new(MockCalendarClient::new(morning)));
    let proposed = event("proposed", "Planning", wednesday + 16 * HOUR, 30, "UTC");

    let analysis = resolver
        .detect_conflicts(&CallContext::new(), "grant-1", &proposed, None)
        .await
        .expect("analysis");

    assert_eq!(analysis.soft_conflicts.len(), 1);
    assert_eq!(analysis.soft_conflicts[0].id, "soft_overload_2026-03-04");
    assert_eq!(analysis.soft_conflicts[0].description, "Already have 6 meetings this day");
    assert!(analysis.recommendations.is_empty());
    assert!(analysis.alternative_times.is_empty());
    assert_eq!(analysis.ai_recommendation, "Can proceed with 1 minor soft conflict(s)");
}

#[tokio::test]
async fn inverted_range_is_rejected_before_fetching() {
    let calendar = MockCalendarClient::new(Vec::new());
    let resolver = ConflictResolver::new(Arc::new(calendar.clone()));
    let proposed = Event {
        id: "bad".to_string(),
        when: EventWhen::new(MONDAY + HOUR, MONDAY, "UTC"),
        ..Event::default()
    };

    let err = resolver
        .detect_conflicts(&CallContext::new(), "grant-1", &proposed, None)
        .await
        .unwrap_err();

    assert!(matches!(err, CadenceError::InvalidInput(_)));
    assert!(calendar.queries().is_empty());
}
