//! Feed snippets shared by the export stage tests.

use chrono_tz::Tz;

use calorg_rfc::rfc::ical::expand::TimeZoneResolver;
use calorg_rfc::rfc::ical::parse::parse;

use super::definition::EventDefinition;
use crate::error::ServiceResult;

/// Zone floating and date-only values are read in.
pub(crate) const ZONE: Tz = Tz::Europe__Berlin;

/// Wraps each event's content lines in VEVENT and the lot in VCALENDAR.
pub(crate) fn feed(events: &[&[&str]]) -> String {
    let mut ics = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//calorg//tests//EN\r\n");
    for lines in events {
        ics.push_str("BEGIN:VEVENT\r\n");
        for line in *lines {
            ics.push_str(line);
            ics.push_str("\r\n");
        }
        ics.push_str("END:VEVENT\r\n");
    }
    ics.push_str("END:VCALENDAR\r\n");
    ics
}

pub(crate) fn try_definitions(events: &[&[&str]]) -> ServiceResult<Vec<EventDefinition>> {
    let calendar = parse(&feed(events)).unwrap();
    let mut resolver = TimeZoneResolver::new(ZONE);
    calendar
        .events()
        .map(|component| EventDefinition::from_component(component, &mut resolver))
        .collect()
}

pub(crate) fn definitions(events: &[&[&str]]) -> Vec<EventDefinition> {
    try_definitions(events).unwrap()
}

pub(crate) fn definition(lines: &[&str]) -> EventDefinition {
    definitions(&[lines]).remove(0)
}
