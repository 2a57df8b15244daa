//! Event definitions: VEVENTs placed on the timeline.

use chrono::{NaiveDate, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use rrule::{RRule, Unvalidated};

use calorg_rfc::error::RfcError;
use calorg_rfc::rfc::ical::core::{Component, DateTime as IcalDateTime, Property, Value, names};
use calorg_rfc::rfc::ical::expand::{TimeZoneResolver, localize_date, localize_naive};
use calorg_rfc::rfc::ical::parse::{ParseErrorKind, parse_date, parse_datetime};

use crate::error::{ServiceError, ServiceResult};

/// The DTSTART value as written in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartValue {
    /// Date without a time: an all-day event.
    Date(NaiveDate),
    DateTime(IcalDateTime),
}

/// An RRULE whose UNTIL, if any, is already in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    rule: RRule<Unvalidated>,
}

impl Recurrence {
    #[must_use]
    pub fn rule(&self) -> &RRule<Unvalidated> {
        &self.rule
    }

    #[must_use]
    pub fn until(&self) -> Option<chrono::DateTime<Utc>> {
        self.rule.get_until().map(|until| until.with_timezone(&Utc))
    }

    /// Reads RRULE text, rewriting UNTIL into UTC first.
    ///
    /// A floating UNTIL is read in `zone`. A DATE UNTIL covers that whole
    /// day in `zone`.
    fn parse(text: &str, zone: Tz, uid: &str) -> ServiceResult<Self> {
        let mut parts = Vec::new();
        let mut until = None;
        for part in text.split(';').filter(|part| !part.trim().is_empty()) {
            match part.split_once('=') {
                Some((key, value)) if key.trim().eq_ignore_ascii_case("UNTIL") => {
                    until = Some(until_utc(value.trim(), zone, uid)?);
                }
                _ => parts.push(part),
            }
        }

        let mut rule_text = parts.join(";");
        if let Some(until) = until {
            rule_text.push_str(&until.format(";UNTIL=%Y%m%dT%H%M%SZ").to_string());
        }

        let rule = rule_text
            .parse::<RRule<Unvalidated>>()
            .map_err(|source| ServiceError::RecurrenceError {
                uid: uid.to_string(),
                source,
            })?;
        Ok(Self { rule })
    }
}

fn until_utc(value: &str, zone: Tz, uid: &str) -> ServiceResult<chrono::DateTime<Utc>> {
    let invalid =
        |kind: ParseErrorKind| ServiceError::invalid_event(uid, format!("RRULE UNTIL {value}: {kind}"));

    if value.contains('T') {
        return Ok(match parse_datetime(value, None).map_err(invalid)? {
            IcalDateTime::Utc(until) => until.and_utc(),
            floating => localize_naive(floating.local(), zone)
                .map_err(RfcError::from)?
                .with_timezone(&Utc),
        });
    }

    let day = parse_date(value).map_err(invalid)?;
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    Ok(at_time(day, end_of_day, zone)?.with_timezone(&Utc))
}

/// One VEVENT as authored, with its times resolved.
///
/// Immutable once built; occurrences borrow it.
#[derive(Debug, Clone)]
pub struct EventDefinition {
    uid: String,
    title: String,
    location: String,
    status: Option<String>,
    start_value: StartValue,
    start: chrono::DateTime<Tz>,
    duration: TimeDelta,
    recurrence: Option<Recurrence>,
    exdates: Vec<chrono::DateTime<Tz>>,
    rdates: Vec<chrono::DateTime<Tz>>,
    recurrence_id: Option<chrono::DateTime<Tz>>,
    last_modified: Option<chrono::DateTime<Utc>>,
}

impl EventDefinition {
    /// ## Summary
    /// Builds a definition from a VEVENT component.
    ///
    /// Date-only values are placed at local midnight of the resolver's
    /// fallback zone. The length of each occurrence comes from DTEND, else
    /// DURATION, else zero (one day for date-only starts).
    ///
    /// ## Errors
    ///
    /// Returns `ServiceError::InvalidEvent` if DTSTART is missing or not a
    /// date or date-time, `ServiceError::RecurrenceError` if the RRULE cannot
    /// be read, and `ServiceError::RfcError` if a time cannot be placed in
    /// its zone.
    pub fn from_component(
        component: &Component,
        resolver: &mut TimeZoneResolver,
    ) -> ServiceResult<Self> {
        let uid = component.text(names::UID).unwrap_or_default().to_string();

        let Some(dtstart) = component.property(names::DTSTART) else {
            return Err(ServiceError::invalid_event(&uid, "missing DTSTART"));
        };
        let start_value = match &dtstart.value {
            Value::Date(date) => StartValue::Date(*date),
            Value::DateTime(dt) => StartValue::DateTime(dt.clone()),
            _ => {
                return Err(ServiceError::invalid_event(
                    &uid,
                    format!("DTSTART is not a date or date-time: {}", dtstart.raw_value),
                ));
            }
        };
        let start = match &start_value {
            StartValue::Date(date) => {
                localize_date(*date, resolver.fallback()).map_err(RfcError::from)?
            }
            StartValue::DateTime(dt) => resolver.localize(dt).map_err(RfcError::from)?,
        };
        let zone = start.timezone();

        let duration = occurrence_length(component, &start_value, start, &uid, resolver)?;

        let recurrence = component
            .property(names::RRULE)
            .map(|rrule| Recurrence::parse(&rrule.raw_value, zone, &uid))
            .transpose()?;

        let exdates = date_list(component, names::EXDATE, start, resolver)?;
        let rdates = date_list(component, names::RDATE, start, resolver)?;

        let recurrence_id = component
            .property(names::RECURRENCE_ID)
            .map(|prop| localize_property(prop, zone, resolver))
            .transpose()?
            .flatten();

        let last_modified = component
            .property(names::DTSTAMP)
            .or_else(|| component.property(names::LAST_MODIFIED))
            .map(|prop| localize_property(prop, zone, resolver))
            .transpose()?
            .flatten()
            .map(|dt| dt.with_timezone(&Utc));

        tracing::trace!(
            uid = %uid,
            start = %start,
            duration_seconds = duration.num_seconds(),
            recurring = recurrence.is_some(),
            "Built event definition"
        );

        Ok(Self {
            title: component.text(names::SUMMARY).unwrap_or_default().to_string(),
            location: component.text(names::LOCATION).unwrap_or_default().to_string(),
            status: component.text(names::STATUS).map(str::to_string),
            uid,
            start_value,
            start,
            duration,
            recurrence,
            exdates,
            rdates,
            recurrence_id,
            last_modified,
        })
    }

    /// Returns the UID, empty if the event has none.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Returns the SUMMARY, empty if the event has none.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the LOCATION, empty if the event has none.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Returns DTSTART as written.
    #[must_use]
    pub fn start_value(&self) -> &StartValue {
        &self.start_value
    }

    /// Returns whether DTSTART is a plain DATE.
    #[must_use]
    pub fn is_all_day(&self) -> bool {
        matches!(self.start_value, StartValue::Date(_))
    }

    /// Returns DTSTART in the event's own zone.
    #[must_use]
    pub fn start(&self) -> chrono::DateTime<Tz> {
        self.start
    }

    /// Returns the zone the event is expressed in.
    #[must_use]
    pub fn zone(&self) -> Tz {
        self.start.timezone()
    }

    /// Returns the length applied to every occurrence.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.duration
    }

    #[must_use]
    pub fn recurrence(&self) -> Option<&Recurrence> {
        self.recurrence.as_ref()
    }

    #[must_use]
    pub fn exdates(&self) -> &[chrono::DateTime<Tz>] {
        &self.exdates
    }

    #[must_use]
    pub fn rdates(&self) -> &[chrono::DateTime<Tz>] {
        &self.rdates
    }

    /// Returns RECURRENCE-ID when this event overrides one instance of a series.
    #[must_use]
    pub fn recurrence_id(&self) -> Option<chrono::DateTime<Tz>> {
        self.recurrence_id
    }

    /// Returns DTSTAMP, or LAST-MODIFIED when DTSTAMP is absent.
    #[must_use]
    pub fn last_modified(&self) -> Option<chrono::DateTime<Utc>> {
        self.last_modified
    }
}

/// DTEND - DTSTART, else DURATION, else zero (one day for a DATE start).
fn occurrence_length(
    component: &Component,
    start_value: &StartValue,
    start: chrono::DateTime<Tz>,
    uid: &str,
    resolver: &mut TimeZoneResolver,
) -> ServiceResult<TimeDelta> {
    if let Some(dtend) = component.property(names::DTEND) {
        let end = localize_property(dtend, start.timezone(), resolver)?.ok_or_else(|| {
            ServiceError::invalid_event(
                uid,
                format!("DTEND is not a date or date-time: {}", dtend.raw_value),
            )
        })?;
        return Ok(end.signed_duration_since(start));
    }

    match component.property(names::DURATION) {
        Some(prop) => prop.value.as_duration().ok_or_else(|| {
            ServiceError::invalid_event(uid, format!("DURATION is invalid: {}", prop.raw_value))
        }),
        None if matches!(start_value, StartValue::Date(_)) => Ok(TimeDelta::days(1)),
        None => Ok(TimeDelta::zero()),
    }
}

/// Places a DATE or DATE-TIME property on the timeline.
///
/// DATE values land at local midnight in `zone`. Other value types yield `None`.
fn localize_property(
    prop: &Property,
    zone: Tz,
    resolver: &mut TimeZoneResolver,
) -> ServiceResult<Option<chrono::DateTime<Tz>>> {
    let localized = match &prop.value {
        Value::DateTime(dt) => resolver.localize(dt),
        Value::Date(date) => localize_date(*date, zone),
        _ => return Ok(None),
    };
    Ok(Some(localized.map_err(RfcError::from)?))
}

/// Collects EXDATE or RDATE values across every property instance.
///
/// DATE entries take the wall-clock time of `start`. PERIOD entries are skipped.
fn date_list(
    component: &Component,
    name: &str,
    start: chrono::DateTime<Tz>,
    resolver: &mut TimeZoneResolver,
) -> ServiceResult<Vec<chrono::DateTime<Tz>>> {
    let zone = start.timezone();
    let time_of_day = start.naive_local().time();
    let mut instants = Vec::new();

    for prop in component.properties_named(name) {
        if let Some(list) = prop.value.as_datetimes() {
            for dt in list {
                instants.push(resolver.localize(dt).map_err(RfcError::from)?);
            }
        } else if let Some(list) = prop.value.as_dates() {
            for day in list {
                instants.push(at_time(*day, time_of_day, zone)?);
            }
        } else {
            tracing::trace!(property = name, raw = %prop.raw_value, "Skipping unsupported date list");
        }
    }

    Ok(instants)
}

fn at_time(day: NaiveDate, time: NaiveTime, zone: Tz) -> ServiceResult<chrono::DateTime<Tz>> {
    Ok(localize_naive(day.and_time(time), zone).map_err(RfcError::from)?)
}
