//! DATE, DATE-TIME, DURATION and TEXT values (RFC 5545 §3.3).
//!
//! These work on the value text alone; the parser adds the position.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::error::ParseErrorKind;
use crate::rfc::ical::core::DateTime;

/// Reads a fixed-width run of ASCII digits.
fn number(s: &str, kind: ParseErrorKind) -> Result<u32, ParseErrorKind> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(kind);
    }
    s.parse().or(Err(kind))
}

/// ## Summary
/// Reads a `YYYYMMDD` date.
///
/// ## Errors
/// Returns `InvalidDate` unless the text is exactly eight digits naming a
/// real calendar day.
pub fn parse_date(s: &str) -> Result<NaiveDate, ParseErrorKind> {
    const KIND: ParseErrorKind = ParseErrorKind::InvalidDate;
    if s.len() != 8 || !s.is_ascii() {
        return Err(KIND);
    }

    let year = number(&s[..4], KIND)?;
    let year = i32::try_from(year).or(Err(KIND))?;
    let month = number(&s[4..6], KIND)?;
    let day = number(&s[6..], KIND)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or(KIND)
}

/// Reads `HHMMSS`. A leap second reads as the last second of the minute.
fn parse_time(s: &str) -> Result<NaiveTime, ParseErrorKind> {
    const KIND: ParseErrorKind = ParseErrorKind::InvalidDateTime;
    if s.len() != 6 || !s.is_ascii() {
        return Err(KIND);
    }

    let hour = number(&s[..2], KIND)?;
    let minute = number(&s[2..4], KIND)?;
    let second = match number(&s[4..], KIND)? {
        60 => 59,
        second => second,
    };
    NaiveTime::from_hms_opt(hour, minute, second).ok_or(KIND)
}

/// ## Summary
/// Reads `YYYYMMDDTHHMMSS[Z]`.
///
/// A trailing `Z` makes the value UTC even when a TZID is given. Otherwise a
/// TZID makes it zoned and its absence makes it floating.
///
/// ## Errors
/// Returns `InvalidDateTime` for anything else.
pub fn parse_datetime(s: &str, tzid: Option<&str>) -> Result<DateTime, ParseErrorKind> {
    const KIND: ParseErrorKind = ParseErrorKind::InvalidDateTime;

    let (text, utc) = s.strip_suffix('Z').map_or((s, false), |text| (text, true));
    let (date, time) = text.split_once('T').ok_or(KIND)?;
    let local = NaiveDateTime::new(parse_date(date).or(Err(KIND))?, parse_time(time)?);

    Ok(match (utc, tzid) {
        (true, _) => DateTime::Utc(local),
        (false, Some(tzid)) => DateTime::Zoned {
            local,
            tzid: tzid.to_string(),
        },
        (false, None) => DateTime::Floating(local),
    })
}

/// ## Summary
/// Reads a DURATION such as `PT1H30M`, `-P1D` or `P2W`.
///
/// ## Errors
/// Returns `InvalidDuration` when the text has no units, units out of
/// order, a number without a unit, or a value too large to represent.
pub(crate) fn parse_duration(s: &str) -> Result<TimeDelta, ParseErrorKind> {
    const KIND: ParseErrorKind = ParseErrorKind::InvalidDuration;

    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let rest = rest.strip_prefix('P').ok_or(KIND)?;
    let (date_part, time_part) = match rest.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (rest, None),
    };

    let mut seconds: i64 = 0;
    let mut units = 0;
    for (part, scale) in [
        (date_part, &[('W', 604_800), ('D', 86_400)][..]),
        (time_part.unwrap_or_default(), &[('H', 3_600), ('M', 60), ('S', 1)][..]),
    ] {
        let mut allowed = scale.iter();
        let mut digits = String::new();
        for c in part.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            let (_, factor) = allowed.find(|(unit, _)| *unit == c).ok_or(KIND)?;
            let amount: i64 = digits.parse().or(Err(KIND))?;
            seconds = amount
                .checked_mul(*factor)
                .and_then(|amount| seconds.checked_add(amount))
                .ok_or(KIND)?;
            digits.clear();
            units += 1;
        }
        if !digits.is_empty() {
            return Err(KIND);
        }
    }

    if units == 0 || time_part.is_some_and(str::is_empty) {
        return Err(KIND);
    }
    TimeDelta::try_seconds(if negative { -seconds } else { seconds }).ok_or(KIND)
}

/// Undoes TEXT escaping: `\n`, `\N`, `\,`, `\;` and `\\`.
///
/// A backslash before any other character is kept as written.
pub(crate) fn unescape_text(s: &str) -> String {
    let mut text = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        match chars.peek() {
            Some('n' | 'N') => text.push('\n'),
            Some(&escaped) if matches!(escaped, ',' | ';' | '\\') => text.push(escaped),
            _ => {
                text.push('\\');
                continue;
            }
        }
        chars.next();
    }

    text
}
