//! Expansion of event definitions into concrete occurrences.

use std::collections::HashSet;

use chrono::{TimeDelta, Utc};
use chrono_tz::Tz;
use rrule::Tz as RRuleTz;

use super::definition::{EventDefinition, Recurrence};
use crate::error::{ServiceError, ServiceResult};

/// Upper bound on instances generated per series.
const EXPANSION_LIMIT: u16 = u16::MAX;

/// Closed time window `[min, max]` occurrences must start in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    min: chrono::DateTime<Utc>,
    max: chrono::DateTime<Utc>,
}

impl Window {
    #[must_use]
    pub fn new(min: chrono::DateTime<Utc>, max: chrono::DateTime<Utc>) -> Self {
        Self { min, max }
    }

    /// Returns the window from `past_days` before `now` to `future_days` after it.
    #[must_use]
    pub fn around(now: chrono::DateTime<Utc>, past_days: u32, future_days: u32) -> Self {
        Self {
            min: now - TimeDelta::days(i64::from(past_days)),
            max: now + TimeDelta::days(i64::from(future_days)),
        }
    }

    #[must_use]
    pub fn min(&self) -> chrono::DateTime<Utc> {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> chrono::DateTime<Utc> {
        self.max
    }

    /// Returns whether `instant` lies inside the window, bounds included.
    #[must_use]
    pub fn contains<Z: chrono::TimeZone>(&self, instant: &chrono::DateTime<Z>) -> bool {
        let instant = instant.with_timezone(&Utc);
        self.min <= instant && instant <= self.max
    }
}

/// One concrete instance of an event.
#[derive(Debug, Clone)]
pub struct Occurrence<'a> {
    definition: &'a EventDefinition,
    start: chrono::DateTime<Tz>,
    end: chrono::DateTime<Tz>,
}

impl<'a> Occurrence<'a> {
    fn at(definition: &'a EventDefinition, start: chrono::DateTime<Tz>) -> Self {
        Self {
            definition,
            start,
            end: start + definition.duration(),
        }
    }

    #[must_use]
    pub fn definition(&self) -> &'a EventDefinition {
        self.definition
    }

    /// Returns the start instant in the event's own zone.
    #[must_use]
    pub fn start(&self) -> chrono::DateTime<Tz> {
        self.start
    }

    /// Returns the end instant in the event's own zone.
    #[must_use]
    pub fn end(&self) -> chrono::DateTime<Tz> {
        self.end
    }
}

/// Expands event definitions inside a time window.
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceExpander {
    window: Window,
}

impl OccurrenceExpander {
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self { window }
    }

    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    /// ## Summary
    /// Expands every definition, in input order.
    ///
    /// An event carrying RECURRENCE-ID replaces the series instance with the
    /// same UID and start; the series does not emit that instance itself.
    ///
    /// ## Errors
    ///
    /// Returns `ServiceError::RecurrenceError` if a recurrence rule is rejected.
    #[tracing::instrument(skip_all, fields(definitions = definitions.len()))]
    pub fn expand_all<'a>(
        &self,
        definitions: &'a [EventDefinition],
    ) -> ServiceResult<Vec<Occurrence<'a>>> {
        let overridden: HashSet<(&str, chrono::DateTime<Utc>)> = definitions
            .iter()
            .filter_map(|def| {
                def.recurrence_id()
                    .map(|id| (def.uid(), id.with_timezone(&Utc)))
            })
            .collect();

        let mut occurrences = Vec::new();
        for definition in definitions {
            let expanded = self.expand(definition)?;
            occurrences.extend(expanded.into_iter().filter(|occurrence| {
                definition.recurrence_id().is_some()
                    || !overridden.contains(&(
                        definition.uid(),
                        occurrence.start().with_timezone(&Utc),
                    ))
            }));
        }

        tracing::debug!(occurrences = occurrences.len(), "Expanded occurrences");
        Ok(occurrences)
    }

    /// ## Summary
    /// Returns the occurrences of one definition whose start lies in the window.
    ///
    /// Series are expanded in the event's own zone so the wall-clock time
    /// holds across DST changes. Events without a series take DTSTART and
    /// their RDATEs, less their EXDATEs. Instances are returned in time order.
    ///
    /// ## Errors
    ///
    /// Returns `ServiceError::RecurrenceError` if the recurrence rule is rejected.
    pub fn expand<'a>(&self, definition: &'a EventDefinition) -> ServiceResult<Vec<Occurrence<'a>>> {
        // Overrides stand alone even when they repeat the series RRULE
        let starts = match definition
            .recurrence()
            .filter(|_| definition.recurrence_id().is_none())
        {
            Some(recurrence) => self.series_starts(definition, recurrence)?,
            None => self.explicit_starts(definition),
        };

        Ok(starts
            .into_iter()
            .map(|start| Occurrence::at(definition, start))
            .collect())
    }

    fn series_starts(
        &self,
        definition: &EventDefinition,
        recurrence: &Recurrence,
    ) -> ServiceResult<Vec<chrono::DateTime<Tz>>> {
        let zone = definition.zone();
        let rrule_tz = RRuleTz::Tz(zone);
        tracing::trace!(uid = definition.uid(), rrule = %recurrence.rule(), "Expanding RRULE");

        let mut rrule_set = recurrence
            .rule()
            .clone()
            .build(definition.start().with_timezone(&rrule_tz))
            .map_err(|source| ServiceError::RecurrenceError {
                uid: definition.uid().to_string(),
                source,
            })?;

        if !definition.exdates().is_empty() {
            rrule_set = rrule_set.set_exdates(
                definition
                    .exdates()
                    .iter()
                    .map(|dt| dt.with_timezone(&rrule_tz))
                    .collect(),
            );
        }
        if !definition.rdates().is_empty() {
            rrule_set = rrule_set.set_rdates(
                definition
                    .rdates()
                    .iter()
                    .map(|dt| dt.with_timezone(&rrule_tz))
                    .collect(),
            );
        }

        let inclusive_start = self.window.min() - TimeDelta::seconds(1);
        let inclusive_end = self.window.max() + TimeDelta::seconds(1);
        let result = rrule_set
            .after(inclusive_start.with_timezone(&rrule_tz))
            .before(inclusive_end.with_timezone(&rrule_tz))
            .all(EXPANSION_LIMIT);

        if result.limited {
            tracing::warn!(
                uid = definition.uid(),
                limit = EXPANSION_LIMIT,
                "Recurrence expansion hit the instance limit"
            );
        }

        Ok(self.in_window(result.dates.into_iter().map(|start| start.with_timezone(&zone))))
    }

    /// DTSTART and every RDATE, minus the EXDATEs.
    fn explicit_starts(&self, definition: &EventDefinition) -> Vec<chrono::DateTime<Tz>> {
        let excluded: HashSet<chrono::DateTime<Utc>> = definition
            .exdates()
            .iter()
            .map(|exdate| exdate.with_timezone(&Utc))
            .collect();
        let zone = definition.zone();

        self.in_window(
            std::iter::once(definition.start())
                .chain(definition.rdates().iter().copied())
                .filter(|start| !excluded.contains(&start.with_timezone(&Utc)))
                .map(|start| start.with_timezone(&zone)),
        )
    }

    /// Keeps the starts inside the window, sorted and without repeats.
    fn in_window(
        &self,
        starts: impl Iterator<Item = chrono::DateTime<Tz>>,
    ) -> Vec<chrono::DateTime<Tz>> {
        let mut starts: Vec<_> = starts.filter(|start| self.window.contains(start)).collect();
        starts.sort();
        starts.dedup();
        starts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::{definition, definitions};
    use chrono::{Datelike, TimeZone, Timelike};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 25, 12, 0, 0).unwrap()
    }

    fn expander() -> OccurrenceExpander {
        OccurrenceExpander::new(Window::around(now(), 7, 10))
    }

    fn days(definition: &EventDefinition) -> Vec<u32> {
        expander()
            .expand(definition)
            .unwrap()
            .iter()
            .map(|o| o.start().day())
            .collect()
    }

    #[test]
    fn window_is_closed() {
        let window = Window::around(now(), 7, 10);
        assert!(window.contains(&(now() - TimeDelta::days(7))));
        assert!(window.contains(&(now() + TimeDelta::days(10))));
        assert!(!window.contains(&(now() - TimeDelta::days(7) - TimeDelta::seconds(1))));
        assert!(!window.contains(&(now() + TimeDelta::days(10) + TimeDelta::seconds(1))));
    }

    #[test]
    fn single_event_outside_window_yields_nothing() {
        let before = definition(&["UID:a", "DTSTART:20260301T090000Z"]);
        let after = definition(&["UID:b", "DTSTART:20260420T090000Z"]);
        assert!(expander().expand(&before).unwrap().is_empty());
        assert!(expander().expand(&after).unwrap().is_empty());
    }

    #[test]
    fn single_event_inside_window() {
        let def = definition(&["UID:a", "DTSTART:20260326T090000Z"]);
        let occurrences = expander().expand(&def).unwrap();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].start(), def.start());
        assert_eq!(occurrences[0].end(), def.start());
    }

    #[test]
    fn rdates_add_to_a_single_event() {
        let def = definition(&[
            "UID:r",
            "DTSTART:20260326T090000Z",
            "RDATE:20260328T090000Z,20260326T090000Z",
            "RDATE:20260501T090000Z",
        ]);
        assert_eq!(days(&def), vec![26, 28]);
    }

    #[test]
    fn exdate_can_remove_a_single_event() {
        let def = definition(&[
            "UID:x",
            "DTSTART;TZID=Europe/Berlin:20260326T100000",
            "EXDATE:20260326T090000Z",
        ]);
        assert!(expander().expand(&def).unwrap().is_empty());

        let def = definition(&[
            "UID:y",
            "DTSTART:20260326T090000Z",
            "RDATE:20260327T090000Z",
            "EXDATE:20260326T090000Z",
        ]);
        assert_eq!(days(&def), vec![27]);
    }

    #[test]
    fn recurring_starts_stay_in_window() {
        let def = definition(&[
            "UID:a",
            "DTSTART:20250101T003000Z",
            "RRULE:FREQ=HOURLY;INTERVAL=6",
        ]);
        let window = expander().window();
        let occurrences = expander().expand(&def).unwrap();
        assert!(!occurrences.is_empty());
        assert!(occurrences.iter().all(|o| window.contains(&o.start())));
    }

    #[test]
    fn daily_series_keeps_wall_clock_across_dst() {
        let def = definition(&[
            "UID:a",
            "DTSTART;TZID=Europe/Berlin:20260301T090000",
            "RRULE:FREQ=DAILY",
        ]);
        let occurrences = expander().expand(&def).unwrap();

        // 2026-03-18T12:00Z .. 2026-04-04T12:00Z: days 19th through 4th
        assert_eq!(occurrences.len(), 17);
        assert!(occurrences.iter().all(|o| o.start().hour() == 9));
        assert_eq!(occurrences[0].start().to_rfc3339(), "2026-03-19T09:00:00+01:00");
        assert_eq!(
            occurrences.last().unwrap().start().to_rfc3339(),
            "2026-04-04T09:00:00+02:00"
        );
    }

    #[test]
    fn count_and_until_bound_the_series() {
        let counted = definition(&[
            "UID:a",
            "DTSTART:20260320T090000Z",
            "RRULE:FREQ=DAILY;COUNT=3",
        ]);
        assert_eq!(days(&counted), vec![20, 21, 22]);

        let until = definition(&[
            "UID:b",
            "DTSTART:20260320T090000Z",
            "RRULE:FREQ=DAILY;UNTIL=20260322",
        ]);
        assert_eq!(days(&until), vec![20, 21, 22]);
    }

    #[test]
    fn exdate_and_rdate_adjust_the_series() {
        let def = definition(&[
            "UID:series",
            "DTSTART:20260320T090000Z",
            "RRULE:FREQ=DAILY;COUNT=3",
            "EXDATE:20260321T090000Z",
            "RDATE:20260330T150000Z",
        ]);
        assert_eq!(days(&def), vec![20, 22, 30]);
    }

    #[test_log::test]
    fn override_replaces_series_instance() {
        let definitions = definitions(&[
            &[
                "UID:series",
                "SUMMARY:Standup",
                "DTSTART:20260320T090000Z",
                "RRULE:FREQ=DAILY;COUNT=3",
            ],
            &[
                "UID:series",
                "SUMMARY:Moved standup",
                "RECURRENCE-ID:20260321T090000Z",
                "DTSTART:20260321T140000Z",
            ],
        ]);

        let occurrences = expander().expand_all(&definitions).unwrap();
        let summary: Vec<(String, u32)> = occurrences
            .iter()
            .map(|o| (o.definition().title().to_string(), o.start().hour()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Standup".to_string(), 9),
                ("Standup".to_string(), 9),
                ("Moved standup".to_string(), 14),
            ]
        );
    }
}
