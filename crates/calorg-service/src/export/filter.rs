//! The rejection filter.

use calorg_core::config::RejectionPredicate;

use super::normalize::NormalizedEvent;

/// A test that excludes events from the export.
pub trait Rejection {
    /// Returns `true` if `event` must be dropped.
    #[must_use]
    fn rejects(&self, event: &NormalizedEvent<'_>) -> bool;
}

impl Rejection for RejectionPredicate {
    fn rejects(&self, event: &NormalizedEvent<'_>) -> bool {
        match self {
            Self::StatusNot(status) => event.status() != Some(status.as_str()),
            Self::IsAllDay => event.is_all_day(),
            Self::TitleEquals(title) => event.title() == title,
        }
    }
}

/// ## Summary
/// Keeps the events no predicate rejects, preserving order.
#[must_use]
pub fn apply_rejections<'a, R: Rejection>(
    events: Vec<NormalizedEvent<'a>>,
    predicates: &[R],
) -> Vec<NormalizedEvent<'a>> {
    let before = events.len();
    let kept: Vec<NormalizedEvent<'a>> = events
        .into_iter()
        .filter(|event| {
            let rejected = predicates.iter().any(|predicate| predicate.rejects(event));
            if rejected {
                tracing::trace!(uid = event.uid(), title = event.title(), "Rejected event");
            }
            !rejected
        })
        .collect();

    tracing::debug!(
        kept = kept.len(),
        rejected = before - kept.len(),
        "Applied rejection filter"
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::definition::EventDefinition;
    use crate::export::fixtures::{self, ZONE};
    use crate::export::occurrence::{OccurrenceExpander, Window};
    use chrono::{TimeZone, Utc};

    fn defaults() -> Vec<RejectionPredicate> {
        vec![
            RejectionPredicate::StatusNot("CONFIRMED".to_string()),
            RejectionPredicate::IsAllDay,
            RejectionPredicate::TitleEquals("[GTD Blocker]".to_string()),
        ]
    }

    fn definition(title: &str, status: Option<&str>, all_day: bool) -> EventDefinition {
        let mut lines = vec![format!("UID:{title}"), format!("SUMMARY:{title}")];
        lines.extend(status.map(|status| format!("STATUS:{status}")));
        lines.push(
            if all_day {
                "DTSTART;VALUE=DATE:20260112"
            } else {
                "DTSTART:20260112T090000Z"
            }
            .to_string(),
        );
        let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
        fixtures::definition(&lines)
    }

    fn surviving(definitions: &[EventDefinition]) -> Vec<&str> {
        let now = Utc.with_ymd_and_hms(2026, 1, 12, 0, 0, 0).unwrap();
        let events = OccurrenceExpander::new(Window::around(now, 7, 10))
            .expand_all(definitions)
            .unwrap()
            .iter()
            .map(|occurrence| NormalizedEvent::new(occurrence, ZONE))
            .collect();
        apply_rejections(events, &defaults())
            .iter()
            .map(NormalizedEvent::title)
            .collect()
    }

    #[test]
    fn confirmed_timed_event_survives() {
        let definitions = vec![definition("Standup", Some("CONFIRMED"), false)];
        assert_eq!(surviving(&definitions), vec!["Standup"]);
    }

    #[test]
    fn all_day_events_are_rejected() {
        let definitions = vec![definition("Holiday", Some("CONFIRMED"), true)];
        assert!(surviving(&definitions).is_empty());
    }

    #[test]
    fn unconfirmed_events_are_rejected() {
        let definitions = vec![
            definition("Maybe", Some("TENTATIVE"), false),
            definition("Unknown", None, false),
            definition("Lowercase", Some("confirmed"), false),
        ];
        assert!(surviving(&definitions).is_empty());
    }

    #[test]
    fn blocker_title_is_rejected() {
        let definitions = vec![
            definition("[GTD Blocker]", Some("CONFIRMED"), false),
            definition("[GTD Blocker] review", Some("CONFIRMED"), false),
        ];
        assert_eq!(surviving(&definitions), vec!["[GTD Blocker] review"]);
    }

    #[test]
    fn empty_predicate_list_keeps_everything() {
        let definitions = vec![definition("Holiday", None, true)];
        let now = Utc.with_ymd_and_hms(2026, 1, 12, 0, 0, 0).unwrap();
        let events: Vec<NormalizedEvent<'_>> = OccurrenceExpander::new(Window::around(now, 7, 10))
            .expand_all(&definitions)
            .unwrap()
            .iter()
            .map(|occurrence| NormalizedEvent::new(occurrence, ZONE))
            .collect();
        assert_eq!(apply_rejections::<RejectionPredicate>(events, &[]).len(), 1);
    }
}
