//! Rendering of the org document.

use std::borrow::Cow;
use std::fmt;

use chrono::SecondsFormat;
use chrono_tz::Tz;

use super::normalize::NormalizedEvent;

/// Format of the raw instants in the property drawer.
const RAW_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Fixed metadata at the top of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    pub title: String,
    pub category: String,
    pub setupfile: String,
    pub exported_at: chrono::DateTime<Tz>,
}

/// The header plus the surviving events, in order.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    header: DocumentHeader,
    events: Vec<NormalizedEvent<'a>>,
}

impl<'a> Document<'a> {
    #[must_use]
    pub fn new(header: DocumentHeader, events: Vec<NormalizedEvent<'a>>) -> Self {
        Self { header, events }
    }

    #[must_use]
    pub fn header(&self) -> &DocumentHeader {
        &self.header
    }

    #[must_use]
    pub fn events(&self) -> &[NormalizedEvent<'a>] {
        &self.events
    }
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = &self.header;
        writeln!(f, "# -*- buffer-read-only: t -*-")?;
        writeln!(f, "#+TITLE: {}", header.title)?;
        writeln!(f, "#+CATEGORY: {}", header.category)?;
        writeln!(f, "#+SETUPFILE: {}", header.setupfile)?;
        writeln!(
            f,
            "#+ICAL_EXPORT_DATE: {}",
            header
                .exported_at
                .to_rfc3339_opts(SecondsFormat::Secs, false)
        )?;
        writeln!(f)?;

        for event in &self.events {
            write_event(f, event)?;
        }
        Ok(())
    }
}

fn write_event(f: &mut fmt::Formatter<'_>, event: &NormalizedEvent<'_>) -> fmt::Result {
    let title = single_line(event.title());
    let location = single_line(event.location());
    let dtstamp = event.last_modified().map_or_else(String::new, |stamp| {
        stamp.format(RAW_TIMESTAMP_FORMAT).to_string()
    });

    writeln!(f, "* {title}")?;
    writeln!(f, ":PROPERTIES:")?;
    writeln!(f, ":ICAL_UID: {}", single_line(event.uid()))?;
    writeln!(f, ":ICAL_LOCATION: {location}")?;
    writeln!(f, ":ICAL_START: {}", event.start().format(RAW_TIMESTAMP_FORMAT))?;
    writeln!(f, ":ICAL_END: {}", event.end().format(RAW_TIMESTAMP_FORMAT))?;
    writeln!(f, ":ICAL_DTSTAMP: {dtstamp}")?;
    writeln!(f, ":END:")?;
    writeln!(f, "{}", event.formatted_duration())?;
    writeln!(f, "Location: {location}")?;
    writeln!(f)
}

/// Flattens line breaks so a value cannot break the outline structure.
fn single_line(value: &str) -> Cow<'_, str> {
    if value.contains(['\r', '\n']) {
        Cow::Owned(
            value
                .replace("\r\n", " ")
                .replace(['\r', '\n'], " "),
        )
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::definition::EventDefinition;
    use crate::export::fixtures::{self, ZONE};
    use crate::export::occurrence::{OccurrenceExpander, Window};
    use chrono::{TimeZone, Utc};

    fn header() -> DocumentHeader {
        DocumentHeader {
            title: "Outlook Calendar Export".to_string(),
            category: "Cal".to_string(),
            setupfile: "~/org/_config.org".to_string(),
            exported_at: ZONE
                .with_ymd_and_hms(2026, 1, 12, 8, 0, 0)
                .unwrap(),
        }
    }

    /// `location` is written escaped, as it would appear in the feed.
    fn definition(location: &str) -> EventDefinition {
        let location = format!("LOCATION:{location}");
        fixtures::definition(&[
            "UID:evt-1@example.com",
            "SUMMARY:Planning",
            &location,
            "DTSTART;TZID=Europe/Berlin:20260112T090000",
            "DTEND;TZID=Europe/Berlin:20260112T100000",
            "DTSTAMP:20260102T030405Z",
        ])
    }

    fn render(definitions: &[EventDefinition]) -> String {
        let now = Utc.with_ymd_and_hms(2026, 1, 12, 0, 0, 0).unwrap();
        let events = OccurrenceExpander::new(Window::around(now, 7, 10))
            .expand_all(definitions)
            .unwrap()
            .iter()
            .map(|occurrence| NormalizedEvent::new(occurrence, ZONE))
            .collect();
        Document::new(header(), events).to_string()
    }

    #[test]
    fn renders_header_only_for_empty_document() {
        assert_eq!(
            render(&[]),
            "# -*- buffer-read-only: t -*-\n\
             #+TITLE: Outlook Calendar Export\n\
             #+CATEGORY: Cal\n\
             #+SETUPFILE: ~/org/_config.org\n\
             #+ICAL_EXPORT_DATE: 2026-01-12T08:00:00+01:00\n\
             \n"
        );
    }

    #[test]
    fn renders_event_block() {
        let rendered = render(&[definition("Room 4")]);
        let body = rendered.split_once("\n\n").unwrap().1;

        assert_eq!(
            body,
            "* Planning\n\
             :PROPERTIES:\n\
             :ICAL_UID: evt-1@example.com\n\
             :ICAL_LOCATION: Room 4\n\
             :ICAL_START: 2026-01-12 09:00:00 +0100\n\
             :ICAL_END: 2026-01-12 10:00:00 +0100\n\
             :ICAL_DTSTAMP: 2026-01-02 03:04:05 +0000\n\
             :END:\n\
             <2026-01-12 Mon 09:00>--<2026-01-12 Mon 10:00>\n\
             Location: Room 4\n\
             \n"
        );
    }

    #[test]
    fn property_block_round_trips() {
        let definitions = [definition("Building A\\, Floor 2")];
        let rendered = render(&definitions);

        let property = |key: &str| -> String {
            let prefix = format!(":{key}: ");
            rendered
                .lines()
                .find_map(|line| line.strip_prefix(prefix.as_str()))
                .unwrap()
                .to_string()
        };
        let parse_raw = |raw: &str| chrono::DateTime::parse_from_str(raw, RAW_TIMESTAMP_FORMAT).unwrap();

        let def = &definitions[0];
        assert_eq!(property("ICAL_UID"), def.uid());
        assert_eq!(property("ICAL_LOCATION"), def.location());
        assert_eq!(parse_raw(&property("ICAL_START")), def.start());
        assert_eq!(parse_raw(&property("ICAL_END")), def.start() + def.duration());
        assert_eq!(
            parse_raw(&property("ICAL_DTSTAMP")),
            def.last_modified().unwrap()
        );
    }

    #[test]
    fn multiline_values_are_flattened() {
        let rendered = render(&[definition("Room 4\\nSecond floor")]);
        assert!(rendered.contains(":ICAL_LOCATION: Room 4 Second floor\n"));
        assert!(rendered.contains("Location: Room 4 Second floor\n"));
    }
}
