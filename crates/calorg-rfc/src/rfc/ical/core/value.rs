//! Typed property values.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

/// A DATE-TIME value together with how its zone was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateTime {
    /// Written with a trailing `Z`.
    Utc(NaiveDateTime),
    /// Wall-clock time in the zone a TZID parameter names.
    Zoned { local: NaiveDateTime, tzid: String },
    /// No zone at all; the reader decides where it lands.
    Floating(NaiveDateTime),
}

impl DateTime {
    /// Returns the date and time as written, whatever the zone.
    #[must_use]
    pub fn local(&self) -> NaiveDateTime {
        match self {
            Self::Utc(local) | Self::Floating(local) | Self::Zoned { local, .. } => *local,
        }
    }
}

/// A property value, typed as far as the exporter reads it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Unescaped TEXT.
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime),
    /// Comma-separated DATE values.
    Dates(Vec<NaiveDate>),
    /// Comma-separated DATE-TIME values.
    DateTimes(Vec<DateTime>),
    Duration(TimeDelta),
    /// Left uninterpreted (recurrence rules, periods); see `Property::raw_value`.
    Raw,
}

impl Value {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns DATE values; a single DATE reads as a list of one.
    #[must_use]
    pub fn as_dates(&self) -> Option<&[NaiveDate]> {
        match self {
            Self::Date(date) => Some(std::slice::from_ref(date)),
            Self::Dates(dates) => Some(dates),
            _ => None,
        }
    }

    /// Returns DATE-TIME values; a single DATE-TIME reads as a list of one.
    #[must_use]
    pub fn as_datetimes(&self) -> Option<&[DateTime]> {
        match self {
            Self::DateTime(dt) => Some(std::slice::from_ref(dt)),
            Self::DateTimes(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            Self::Duration(duration) => Some(*duration),
            _ => None,
        }
    }
}
