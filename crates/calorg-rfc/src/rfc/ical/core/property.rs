//! Properties and their parameters.

use super::Value;

/// A property parameter such as `TZID=Europe/Berlin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Uppercase parameter name.
    pub name: String,
    /// Values with quotes removed and caret escapes decoded.
    pub values: Vec<String>,
}

impl Param {
    /// Returns the first value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// One property of a component.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Uppercase property name.
    pub name: String,
    pub params: Vec<Param>,
    pub value: Value,
    /// The value as written, before unescaping.
    pub raw_value: String,
}

/// Names the parser and the exporter look for.
pub mod names {
    pub const BEGIN: &str = "BEGIN";
    pub const END: &str = "END";

    pub const VCALENDAR: &str = "VCALENDAR";
    pub const VEVENT: &str = "VEVENT";

    pub const TZID: &str = "TZID";
    pub const VALUE: &str = "VALUE";

    pub const UID: &str = "UID";
    pub const SUMMARY: &str = "SUMMARY";
    pub const LOCATION: &str = "LOCATION";
    pub const STATUS: &str = "STATUS";

    pub const DTSTART: &str = "DTSTART";
    pub const DTEND: &str = "DTEND";
    pub const DURATION: &str = "DURATION";

    pub const RRULE: &str = "RRULE";
    pub const EXRULE: &str = "EXRULE";
    pub const EXDATE: &str = "EXDATE";
    pub const RDATE: &str = "RDATE";
    pub const RECURRENCE_ID: &str = "RECURRENCE-ID";

    pub const DTSTAMP: &str = "DTSTAMP";
    pub const LAST_MODIFIED: &str = "LAST-MODIFIED";
}
