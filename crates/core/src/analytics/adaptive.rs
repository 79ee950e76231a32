//! Adaptive rescheduling proposals
//!
//! Reacts to a trigger by looking at the next two weeks and proposing
//! changes. Proposals always wait for the user's approval.

use std::collections::HashSet;

use cadence_domain::constants::{ADAPTIVE_LOOKAHEAD_DAYS, FOCUS_ANALYSIS_DAYS};
use cadence_domain::{
    AdaptiveChangeType, AdaptiveImpact, AdaptiveScheduleChange, AdaptiveTrigger, ApprovalStatus,
    Event, EventQuery, FocusTimeBlock, FocusTimeSettings, ModificationAction, Result,
    ScheduleModification,
};
use chrono::{Datelike, Duration, Utc};
use tracing::info;

use super::focus_optimizer::{recommend_blocks, FocusOptimizer};
use crate::calendar_ports::collect_events;
use crate::context::CallContext;
use crate::utils::time::{clock_ranges_overlap, local_end, local_start, weekday_name};

/// Hours of focus time a proposal is expected to recover
const FOCUS_HOURS_GAINED: f64 = 2.0;

impl FocusOptimizer {
    /// Propose schedule changes in response to `trigger`.
    ///
    /// The result is always pending approval and never applied.
    pub async fn adapt_schedule(
        &self,
        ctx: &CallContext,
        grant_id: &str,
        trigger: AdaptiveTrigger,
    ) -> Result<AdaptiveScheduleChange> {
        let now = Utc::now();
        let query = EventQuery {
            start: now.timestamp(),
            end: (now + Duration::days(ADAPTIVE_LOOKAHEAD_DAYS)).timestamp(),
            limit: None,
        };
        let upcoming = collect_events(self.calendar.as_ref(), ctx, grant_id, &query).await?;

        let focus_blocks = if trigger == AdaptiveTrigger::FocusTimeAtRisk {
            let analysis = self.history.analyze_history(ctx, grant_id, FOCUS_ANALYSIS_DAYS).await?;
            analysis
                .patterns
                .map(|patterns| recommend_blocks(&patterns, &FocusTimeSettings::default()))
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        let changes = propose_modifications(trigger, &upcoming, &focus_blocks);
        let impact = estimate_impact(&changes, &upcoming);

        let change = AdaptiveScheduleChange {
            id: format!("adapt_{}", now.timestamp_nanos_opt().unwrap_or_default()),
            timestamp: now,
            trigger,
            change_type: change_type(&changes),
            affected_events: changes
                .iter()
                .filter(|c| !c.event_id.is_empty())
                .map(|c| c.event_id.clone())
                .collect(),
            reason: change_reason(trigger, &changes, &impact),
            confidence: change_confidence(&changes),
            changes,
            impact,
            user_approval: ApprovalStatus::Pending,
            auto_applied: false,
        };

        info!(
            grant_id = %grant_id,
            trigger = %trigger,
            changes = change.changes.len(),
            "Proposed adaptive schedule change"
        );
        Ok(change)
    }
}

fn reschedule(event: &Event, description: &str) -> ScheduleModification {
    ScheduleModification {
        old_start_time: event.when.start(),
        old_duration: event.when.duration_minutes(),
        ..ScheduleModification::new(event.id.clone(), ModificationAction::Reschedule, description)
    }
}

/// Event overlaps `block` on the same weekday, in the event's own zone
fn conflicts_with(event: &Event, block: &FocusTimeBlock) -> bool {
    let (Some(start), Some(end)) = (local_start(event), local_end(event)) else {
        return false;
    };
    weekday_name(start.weekday()).eq_ignore_ascii_case(&block.day_of_week)
        && clock_ranges_overlap(
            &start.format("%H:%M").to_string(),
            &end.format("%H:%M").to_string(),
            &block.start_time,
            &block.end_time,
        )
}

/// Changes for one trigger. Triggers without a rule yield nothing.
pub(crate) fn propose_modifications(
    trigger: AdaptiveTrigger,
    upcoming: &[Event],
    focus_blocks: &[FocusTimeBlock],
) -> Vec<ScheduleModification> {
    match trigger {
        AdaptiveTrigger::MeetingOverload => upcoming
            .iter()
            .filter(|event| event.participants.len() <= 2)
            .map(|event| reschedule(event, "Move low-priority meeting to reduce meeting overload"))
            .collect(),
        AdaptiveTrigger::FocusTimeAtRisk => upcoming
            .iter()
            .filter(|event| !event.read_only)
            .filter(|event| focus_blocks.iter().any(|block| conflicts_with(event, block)))
            .map(|event| reschedule(event, "Move meeting to protect focus time"))
            .collect(),
        AdaptiveTrigger::DeadlineChange => vec![ScheduleModification::new(
            "",
            ModificationAction::Protect,
            "Add additional focus blocks due to deadline pressure",
        )],
        AdaptiveTrigger::PriorityShift
        | AdaptiveTrigger::ConflictDetected
        | AdaptiveTrigger::PatternDetected => Vec::new(),
    }
}

pub(crate) fn estimate_impact(changes: &[ScheduleModification], upcoming: &[Event]) -> AdaptiveImpact {
    let count = |action| changes.iter().filter(|c| c.action == action).count() as u32;

    let duration_saved = changes
        .iter()
        .filter(|c| c.action == ModificationAction::Shorten)
        .map(|c| c.old_duration - c.new_duration)
        .sum();

    let affected: HashSet<&str> = changes.iter().map(|c| c.event_id.as_str()).collect();
    let participants: HashSet<&str> = upcoming
        .iter()
        .filter(|event| affected.contains(event.id.as_str()))
        .flat_map(|event| event.participants.iter().map(|p| p.email.as_str()))
        .collect();

    AdaptiveImpact {
        focus_time_gained: FOCUS_HOURS_GAINED,
        meetings_rescheduled: count(ModificationAction::Reschedule),
        meetings_declined: count(ModificationAction::Decline),
        duration_saved,
        participants_affected: participants.len() as u32,
        predicted_benefit: "Improved focus time availability".to_string(),
        ..AdaptiveImpact::default()
    }
}

/// Classified by the first change; protecting a block when there is none
pub(crate) fn change_type(changes: &[ScheduleModification]) -> AdaptiveChangeType {
    match changes.first().map(|c| c.action) {
        Some(ModificationAction::Reschedule) => AdaptiveChangeType::RescheduleMeeting,
        Some(ModificationAction::Shorten) => AdaptiveChangeType::ShortenMeeting,
        Some(ModificationAction::Decline) => AdaptiveChangeType::DeclineMeeting,
        Some(ModificationAction::Protect) | None => AdaptiveChangeType::ProtectBlock,
    }
}

fn change_reason(
    trigger: AdaptiveTrigger,
    changes: &[ScheduleModification],
    impact: &AdaptiveImpact,
) -> String {
    match trigger {
        AdaptiveTrigger::MeetingOverload => format!(
            "Meeting load increased: reducing by rescheduling {} meetings",
            changes.len()
        ),
        AdaptiveTrigger::FocusTimeAtRisk => format!(
            "Focus time at risk: protecting {:.1} additional hours",
            impact.focus_time_gained
        ),
        AdaptiveTrigger::DeadlineChange => {
            "Urgent deadline detected: increasing focus time priority".to_string()
        }
        _ => "Schedule optimization recommended".to_string(),
    }
}

/// 50 with nothing to propose, otherwise 60 plus 3 per change, capped at 95.
pub(crate) fn change_confidence(changes: &[ScheduleModification]) -> f64 {
    if changes.is_empty() {
        return 50.0;
    }
    (60.0 + 3.0 * changes.len().min(10) as f64).min(95.0)
}

#[cfg(test)]
mod tests {
    use cadence_domain::{EventWhen, Participant};
    use chrono::TimeZone;

    use super::*;

    fn event(id: &str, start: chrono::DateTime<Utc>, minutes: i64, people: usize) -> Event {
        Event {
            id: id.into(),
            when: EventWhen::new(start.timestamp(), start.timestamp() + minutes * 60, "UTC"),
            participants: (0..people).map(|i| Participant::new(format!("p{i}@x.io"))).collect(),
            ..Event::default()
        }
    }

    fn block(day: &str, start: &str, end: &str) -> FocusTimeBlock {
        FocusTimeBlock {
            day_of_week: day.into(),
            start_time: start.into(),
            end_time: end.into(),
            duration: 120,
            score: 90.0,
            reason: String::new(),
            conflicts: 0,
        }
    }

    #[test]
    fn overload_targets_small_meetings() {
        // 2026-03-03 is a Tuesday
        let at = Utc.with_ymd_and_hms(2026, 3, 3, 10, 0, 0).unwrap();
        let upcoming = vec![event("one-on-one", at, 30, 2), event("all-hands", at, 60, 12)];

        let changes = propose_modifications(AdaptiveTrigger::MeetingOverload, &upcoming, &[]);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].event_id, "one-on-one");
        assert_eq!(changes[0].old_duration, 30);
        assert_eq!(change_type(&changes), AdaptiveChangeType::RescheduleMeeting);

        let impact = estimate_impact(&changes, &upcoming);
        assert_eq!(impact.meetings_rescheduled, 1);
        assert_eq!(impact.participants_affected, 2);
        assert!((change_confidence(&changes) - 63.0).abs() < f64::EPSILON);
    }

    #[test]
    fn focus_conflicts_skip_read_only() {
        let tuesday = Utc.with_ymd_and_hms(2026, 3, 3, 10, 30, 0).unwrap();
        let wednesday = Utc.with_ymd_and_hms(2026, 3, 4, 10, 30, 0).unwrap();
        let mut locked = event("locked", tuesday, 30, 3);
        locked.read_only = true;
        let upcoming = vec![event("clash", tuesday, 30, 3), locked, event("other-day", wednesday, 30, 3)];

        let changes = propose_modifications(
            AdaptiveTrigger::FocusTimeAtRisk,
            &upcoming,
            &[block("Tuesday", "10:00", "12:00")],
        );

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].event_id, "clash");
        assert_eq!(changes[0].description, "Move meeting to protect focus time");
    }

    #[test]
    fn deadline_protects_without_event() {
        let changes = propose_modifications(AdaptiveTrigger::DeadlineChange, &[], &[]);

        assert_eq!(changes.len(), 1);
        assert!(changes[0].event_id.is_empty());
        assert_eq!(change_type(&changes), AdaptiveChangeType::ProtectBlock);
        assert_eq!(
            change_reason(AdaptiveTrigger::DeadlineChange, &changes, &AdaptiveImpact::default()),
            "Urgent deadline detected: increasing focus time priority"
        );
    }

    #[test]
    fn unhandled_trigger_is_empty_proposal() {
        let changes = propose_modifications(AdaptiveTrigger::PatternDetected, &[], &[]);

        assert!(changes.is_empty());
        assert_eq!(change_type(&changes), AdaptiveChangeType::ProtectBlock);
        assert!((change_confidence(&changes) - 50.0).abs() < f64::EPSILON);

        let many = vec![ScheduleModification::new("e", ModificationAction::Reschedule, ""); 20];
        assert!((change_confidence(&many) - 90.0).abs() < f64::EPSILON);
    }
}
