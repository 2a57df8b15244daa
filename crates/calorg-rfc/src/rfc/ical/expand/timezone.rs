//! Placing feed times on the timeline.
//!
//! TZIDs are mapped to `chrono_tz` zones through ICU4X, which knows both
//! Windows zone names and IANA aliases.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;

use crate::rfc::ical::core::DateTime;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// The wall-clock time falls in a gap, and so does the hour after it.
    #[error("Non-existent time (DST gap): {0}")]
    NonExistentTime(String),
}

/// Maps TZIDs to zones, remembering every answer.
///
/// Floating times and TZIDs that map to nothing land in the fallback zone.
#[derive(Debug)]
pub struct TimeZoneResolver {
    fallback: Tz,
    /// `None` marks a TZID that is already known to be unresolvable.
    known: HashMap<String, Option<Tz>>,
}

impl TimeZoneResolver {
    #[must_use]
    pub fn new(fallback: Tz) -> Self {
        Self {
            fallback,
            known: HashMap::new(),
        }
    }

    #[must_use]
    pub fn fallback(&self) -> Tz {
        self.fallback
    }

    /// ## Summary
    /// Looks up the zone a TZID names, after [`normalize_tzid`].
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` when no zone matches.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        let zone = *self
            .known
            .entry(tzid.to_string())
            .or_insert_with(|| normalize_tzid(tzid).parse::<Tz>().ok());
        zone.ok_or_else(|| ConversionError::UnknownTimezone(tzid.to_string()))
    }

    /// Like [`Self::resolve`], but answers the fallback zone for unknown
    /// TZIDs. Each unknown TZID is logged once.
    pub fn resolve_or_fallback(&mut self, tzid: &str) -> Tz {
        let seen = self.known.contains_key(tzid);
        self.resolve(tzid).unwrap_or_else(|err| {
            if !seen {
                tracing::warn!(%err, fallback = %self.fallback, "Using fallback timezone");
            }
            self.fallback
        })
    }

    /// Returns the zone a DATE-TIME is written in.
    pub fn zone_of(&mut self, dt: &DateTime) -> Tz {
        match dt {
            DateTime::Utc(_) => Tz::UTC,
            DateTime::Floating(_) => self.fallback,
            DateTime::Zoned { tzid, .. } => self.resolve_or_fallback(tzid),
        }
    }

    /// ## Summary
    /// Places a DATE-TIME in the zone it is written in.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::NonExistentTime` when the wall-clock time
    /// does not exist there; see [`localize_naive`].
    pub fn localize(&mut self, dt: &DateTime) -> Result<chrono::DateTime<Tz>, ConversionError> {
        let zone = self.zone_of(dt);
        localize_naive(dt.local(), zone)
    }
}

/// ## Summary
/// Places a DATE at local midnight in `zone`.
///
/// ## Errors
///
/// Returns `ConversionError::NonExistentTime` when midnight is skipped and
/// 01:00 is too.
pub fn localize_date(date: NaiveDate, zone: Tz) -> Result<chrono::DateTime<Tz>, ConversionError> {
    localize_naive(date.and_time(NaiveTime::MIN), zone)
}

/// ## Summary
/// Reads a wall-clock time in `zone`.
///
/// In a fold the earlier instant wins. In a gap the time moves one hour
/// forward.
///
/// ## Errors
///
/// Returns `ConversionError::NonExistentTime` if the moved time is in a gap too.
pub fn localize_naive(
    local: NaiveDateTime,
    zone: Tz,
) -> Result<chrono::DateTime<Tz>, ConversionError> {
    zone.from_local_datetime(&local)
        .earliest()
        .or_else(|| zone.from_local_datetime(&(local + TimeDelta::hours(1))).earliest())
        .ok_or_else(|| ConversionError::NonExistentTime(format!("{local} in {zone}")))
}

/// ## Summary
/// Rewrites a TZID into the IANA name `chrono_tz` knows.
///
/// Vendor prefixes such as `/mozilla.org/20070129_1/` are dropped, Windows
/// names become their IANA zone and IANA aliases become the canonical name.
/// Names ICU4X does not know come back trimmed but otherwise unchanged.
#[must_use]
pub fn normalize_tzid(tzid: &str) -> String {
    let name = ["/mozilla.org/", "/softwarestudio.org/"]
        .iter()
        .find_map(|prefix| tzid.strip_prefix(*prefix))
        .map_or(tzid, |rest| match rest.split_once('/') {
            Some((version, zone)) if version.starts_with(|c: char| c.is_ascii_digit()) => zone,
            _ => rest,
        })
        .trim();

    let iana = IanaParserExtended::new();
    let windows_zone = WindowsParser::new()
        .parse(name, None)
        .and_then(|zone| iana.iter().find(|entry| entry.time_zone == zone));
    if let Some(entry) = windows_zone {
        return entry.canonical.to_string();
    }

    let parsed = iana.parse(name);
    if parsed.time_zone == icu::time::TimeZone::UNKNOWN {
        name.to_string()
    } else {
        parsed.canonical.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Timelike, Utc};

    use super::*;

    fn resolver() -> TimeZoneResolver {
        TimeZoneResolver::new(Tz::Europe__Berlin)
    }

    fn wall_clock(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn berlin(local: NaiveDateTime) -> DateTime {
        DateTime::Zoned {
            local,
            tzid: "Europe/Berlin".to_string(),
        }
    }

    #[test]
    fn windows_names_map_to_iana() {
        assert_eq!(normalize_tzid("Eastern Standard Time"), "America/New_York");
        assert_eq!(normalize_tzid("GMT Standard Time"), "Europe/London");
        assert_eq!(normalize_tzid("W. Europe Standard Time"), "Europe/Berlin");
    }

    #[test]
    fn vendor_prefixes_are_dropped() {
        assert_eq!(normalize_tzid("/mozilla.org/America/New_York"), "America/New_York");
        assert_eq!(
            normalize_tzid("/softwarestudio.org/20070129_1/Europe/Berlin"),
            "Europe/Berlin"
        );
    }

    #[test]
    fn aliases_become_canonical() {
        assert_eq!(normalize_tzid("Europe/Kiev"), "Europe/Kyiv");
        assert_eq!(normalize_tzid("US/Eastern"), "America/New_York");
        assert_eq!(normalize_tzid(" Customized Time Zone "), "Customized Time Zone");
    }

    #[test]
    fn lookups_are_remembered() {
        let mut resolver = resolver();
        assert_eq!(resolver.resolve("Asia/Tokyo").unwrap(), Tz::Asia__Tokyo);
        assert_eq!(resolver.known.get("Asia/Tokyo"), Some(&Some(Tz::Asia__Tokyo)));

        assert!(resolver.resolve("Nowhere/Special").is_err());
        assert_eq!(resolver.known.get("Nowhere/Special"), Some(&None));
    }

    #[test_log::test]
    fn unknown_tzid_uses_fallback() {
        let mut resolver = resolver();
        assert_eq!(resolver.resolve_or_fallback("Customized Time Zone"), Tz::Europe__Berlin);
        assert_eq!(resolver.resolve_or_fallback("Customized Time Zone"), Tz::Europe__Berlin);
    }

    #[test]
    fn localizes_each_form() {
        let mut resolver = resolver();
        let local = wall_clock(1, 15, 10, 0);

        let utc = resolver.localize(&DateTime::Utc(local)).unwrap();
        assert_eq!(utc.timezone(), Tz::UTC);
        assert_eq!(utc.hour(), 10);

        let floating = resolver.localize(&DateTime::Floating(local)).unwrap();
        assert_eq!(floating.timezone(), Tz::Europe__Berlin);
        assert_eq!(floating.with_timezone(&Utc).hour(), 9);

        let zoned = resolver
            .localize(&DateTime::Zoned {
                local: wall_clock(7, 15, 10, 0),
                tzid: "Eastern Standard Time".to_string(),
            })
            .unwrap();
        assert_eq!(zoned.with_timezone(&Utc).hour(), 14);
    }

    #[test]
    fn gap_moves_forward() {
        let dt = resolver().localize(&berlin(wall_clock(3, 29, 2, 30))).unwrap();
        assert_eq!((dt.hour(), dt.minute()), (3, 30));
    }

    #[test]
    fn fold_takes_earlier_instant() {
        let dt = resolver().localize(&berlin(wall_clock(10, 25, 2, 30))).unwrap();
        assert_eq!(dt.with_timezone(&Utc).hour(), 0);
    }

    #[test]
    fn date_lands_at_midnight() {
        let dt = localize_date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), Tz::Europe__Berlin)
            .unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-10-19T00:00:00+02:00");
    }
}
