//! Removal of duplicate occurrences.

use std::collections::HashSet;

use super::normalize::NormalizedEvent;

/// ## Summary
/// Keeps the first event for every uniqueness key, preserving order.
#[must_use]
pub fn dedup_by_key(mut events: Vec<NormalizedEvent<'_>>) -> Vec<NormalizedEvent<'_>> {
    let before = events.len();
    let mut seen = HashSet::new();
    events.retain(|event| seen.insert(event.uniqueness_key().to_string()));

    tracing::debug!(
        kept = events.len(),
        dropped = before - events.len(),
        "Deduplicated events"
    );
    events
}
