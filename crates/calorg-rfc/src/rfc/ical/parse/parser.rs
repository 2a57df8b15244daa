//! Builds the component tree from content lines.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{ContentLine, split, unfold};
use super::values::{parse_date, parse_datetime, parse_duration, unescape_text};
use crate::rfc::ical::core::{Calendar, Component, Property, Value, names};

/// Properties holding DATE or DATE-TIME values when no VALUE parameter says otherwise.
const TEMPORAL: [&str; 7] = [
    names::DTSTART,
    names::DTEND,
    names::RECURRENCE_ID,
    names::EXDATE,
    names::RDATE,
    names::DTSTAMP,
    names::LAST_MODIFIED,
];

/// ## Summary
/// Parses a feed into its component tree.
///
/// The feed must open with `BEGIN:VCALENDAR`. Anything after the matching
/// `END:VCALENDAR` is ignored with a warning.
///
/// ## Errors
///
/// Returns the first malformed line, unbalanced block, or property value
/// that cannot be read as its type.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<Calendar> {
    let mut lines = unfold(input)
        .into_iter()
        .map(|(number, text)| split(&text, number));

    let Some(begin) = lines.next().transpose()? else {
        tracing::warn!("Empty calendar feed");
        return Err(ParseError::at(ParseErrorKind::MissingBegin, 1, 1));
    };
    if begin.name != names::BEGIN || !begin.value.trim().eq_ignore_ascii_case(names::VCALENDAR) {
        return Err(ParseError::at(ParseErrorKind::MissingBegin, begin.line, 1));
    }

    let calendar = Calendar::new(read_component(&mut lines, &begin)?);

    if lines.next().is_some() {
        tracing::warn!("Ignoring content after END:VCALENDAR");
    }
    tracing::debug!(events = calendar.events().count(), "Parsed calendar feed");

    Ok(calendar)
}

/// Reads properties and nested blocks up to the `END` matching `begin`.
fn read_component(
    lines: &mut impl Iterator<Item = ParseResult<ContentLine>>,
    begin: &ContentLine,
) -> ParseResult<Component> {
    let mut component = Component::new(begin.value.trim());
    let mut last_line = begin.line;

    while let Some(line) = lines.next() {
        let line = line?;
        last_line = line.line;

        match line.name.as_str() {
            names::BEGIN => {
                let child = read_component(lines, &line)?;
                component.push_child(child);
            }
            names::END if line.value.trim().eq_ignore_ascii_case(component.name()) => {
                return Ok(component);
            }
            names::END => {
                return Err(
                    ParseError::at(ParseErrorKind::MismatchedComponent, line.line, 1).with_context(
                        format!(
                            "expected END:{}, got END:{}",
                            component.name(),
                            line.value.trim().to_ascii_uppercase()
                        ),
                    ),
                );
            }
            _ => component.push_property(typed_property(line)?),
        }
    }

    Err(ParseError::at(ParseErrorKind::MissingEnd, last_line, 1)
        .with_context(format!("missing END:{}", component.name())))
}

fn typed_property(line: ContentLine) -> ParseResult<Property> {
    let value = typed_value(&line).map_err(|kind| {
        ParseError::at(kind, line.line, line.name.len() + 1)
            .with_context(format!("in property {}", line.name))
    })?;

    Ok(Property {
        name: line.name,
        params: line.params,
        value,
        raw_value: line.value,
    })
}

/// Types a value by its VALUE parameter, or by the property name without one.
///
/// Recurrence rules and periods stay [`Value::Raw`].
fn typed_value(line: &ContentLine) -> Result<Value, ParseErrorKind> {
    let raw = line.value.as_str();
    let declared = line.param(names::VALUE).map(str::to_ascii_uppercase);

    match (declared.as_deref(), line.name.as_str()) {
        (Some("DATE"), _) => dates(raw),
        (Some("DATE-TIME"), _) => datetimes(raw, line.param(names::TZID)),
        (Some("DURATION"), _) | (None, names::DURATION) => {
            parse_duration(raw.trim()).map(Value::Duration)
        }
        (Some("TEXT"), _) => Ok(Value::Text(unescape_text(raw))),
        (Some(_), _) | (None, names::RRULE | names::EXRULE) => Ok(Value::Raw),
        (None, names::RDATE) if raw.contains('/') => Ok(Value::Raw),
        (None, name) if TEMPORAL.contains(&name) => {
            // Some producers leave out VALUE=DATE on all-day events
            if raw.contains('T') {
                datetimes(raw, line.param(names::TZID))
            } else {
                dates(raw)
            }
        }
        (None, _) => Ok(Value::Text(unescape_text(raw))),
    }
}

fn dates(raw: &str) -> Result<Value, ParseErrorKind> {
    let dates = raw
        .split(',')
        .map(|date| parse_date(date.trim()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match <[_; 1]>::try_from(dates) {
        Ok([date]) => Value::Date(date),
        Err(dates) => Value::Dates(dates),
    })
}

fn datetimes(raw: &str, tzid: Option<&str>) -> Result<Value, ParseErrorKind> {
    let datetimes = raw
        .split(',')
        .map(|dt| parse_datetime(dt.trim(), tzid))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(match <[_; 1]>::try_from(datetimes) {
        Ok([dt]) => Value::DateTime(dt),
        Err(datetimes) => Value::DateTimes(datetimes),
    })
}
