//! Normalized events: occurrences with their presentation fields.

use chrono::Utc;
use chrono_tz::Tz;

use super::definition::{EventDefinition, Recurrence, StartValue};
use super::occurrence::Occurrence;

/// Format of each end of the duration string.
const TIMESTAMP_FORMAT: &str = "<%Y-%m-%d %a %H:%M>";
/// Joins the start and end timestamps.
const DURATION_SEPARATOR: &str = "--";

/// An occurrence together with its definition and derived fields.
///
/// Derived fields are computed once at construction.
#[derive(Debug, Clone)]
pub struct NormalizedEvent<'a> {
    definition: &'a EventDefinition,
    start: chrono::DateTime<Tz>,
    end: chrono::DateTime<Tz>,
    formatted_duration: String,
    uniqueness_key: String,
}

impl<'a> NormalizedEvent<'a> {
    /// Wraps `occurrence`, formatting its times in `export_tz`.
    #[must_use]
    pub fn new(occurrence: &Occurrence<'a>, export_tz: Tz) -> Self {
        let definition = occurrence.definition();
        let formatted_duration =
            format_duration(occurrence.start(), occurrence.end(), export_tz);
        let uniqueness_key = format!("{formatted_duration}::{}", definition.title());

        Self {
            definition,
            start: occurrence.start(),
            end: occurrence.end(),
            formatted_duration,
            uniqueness_key,
        }
    }

    #[must_use]
    pub fn definition(&self) -> &'a EventDefinition {
        self.definition
    }

    #[must_use]
    pub fn uid(&self) -> &'a str {
        self.definition.uid()
    }

    #[must_use]
    pub fn title(&self) -> &'a str {
        self.definition.title()
    }

    #[must_use]
    pub fn location(&self) -> &'a str {
        self.definition.location()
    }

    #[must_use]
    pub fn status(&self) -> Option<&'a str> {
        self.definition.status()
    }

    #[must_use]
    pub fn recurrence(&self) -> Option<&'a Recurrence> {
        self.definition.recurrence()
    }

    #[must_use]
    pub fn last_modified(&self) -> Option<chrono::DateTime<Utc>> {
        self.definition.last_modified()
    }

    /// Returns DTSTART of the definition as written.
    #[must_use]
    pub fn start_value(&self) -> &'a StartValue {
        self.definition.start_value()
    }

    /// Returns the occurrence start in the event's own zone.
    #[must_use]
    pub fn start(&self) -> chrono::DateTime<Tz> {
        self.start
    }

    /// Returns the occurrence end in the event's own zone.
    #[must_use]
    pub fn end(&self) -> chrono::DateTime<Tz> {
        self.end
    }

    /// Returns whether the definition's DTSTART is a plain DATE.
    #[must_use]
    pub fn is_all_day(&self) -> bool {
        self.definition.is_all_day()
    }

    /// Start and end in the export zone, e.g. `<2026-01-12 Mon 09:00>--<2026-01-12 Mon 09:30>`.
    #[must_use]
    pub fn formatted_duration(&self) -> &str {
        &self.formatted_duration
    }

    /// Formatted duration and title joined by `::`.
    #[must_use]
    pub fn uniqueness_key(&self) -> &str {
        &self.uniqueness_key
    }
}

fn format_duration(
    start: chrono::DateTime<Tz>,
    end: chrono::DateTime<Tz>,
    export_tz: Tz,
) -> String {
    format!(
        "{}{DURATION_SEPARATOR}{}",
        start.with_timezone(&export_tz).format(TIMESTAMP_FORMAT),
        end.with_timezone(&export_tz).format(TIMESTAMP_FORMAT),
    )
}
