//! Unfolding and content-line splitting (RFC 5545 §3.1).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::Param;

/// A content line split into name, parameters and raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentLine {
    /// Physical line the logical line starts on (1-based).
    pub line: usize,
    /// Uppercase name.
    pub name: String,
    pub params: Vec<Param>,
    pub value: String,
}

impl ContentLine {
    /// Returns the first value of the parameter called `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|param| param.name.eq_ignore_ascii_case(name))
            .and_then(Param::value)
    }
}

/// Joins folded lines, pairing each logical line with its starting line number.
///
/// CRLF and LF are both accepted and blank lines are skipped. A line that
/// starts with a space or tab continues the previous one without that first
/// character. Some exporters wrap long values without the leading
/// whitespace, so a line with no colon is joined as well. A leading byte
/// order mark is ignored.
pub(crate) fn unfold(input: &str) -> Vec<(usize, String)> {
    let input = input.trim_start_matches('\u{feff}');
    let mut logical: Vec<(usize, String)> = Vec::new();

    for (index, physical) in input.split('\n').enumerate() {
        let physical = physical.strip_suffix('\r').unwrap_or(physical);
        if physical.is_empty() {
            continue;
        }

        let folded = physical
            .strip_prefix([' ', '\t'])
            .or_else(|| (!physical.contains(':')).then_some(physical));

        match (folded, logical.last_mut()) {
            (Some(rest), Some((_, previous))) => previous.push_str(rest),
            (rest, _) => logical.push((index + 1, rest.unwrap_or(physical).to_string())),
        }
    }

    logical
}

/// Splits `NAME *(";" PARAM) ":" VALUE`.
pub(crate) fn split(text: &str, line: usize) -> ParseResult<ContentLine> {
    let missing_colon = || ParseError::at(ParseErrorKind::MissingColon, line, text.len().max(1));

    let name_end = text.find([';', ':']).ok_or_else(missing_colon)?;
    let name = &text[..name_end];
    if name.is_empty() {
        return Err(ParseError::at(ParseErrorKind::MissingPropertyName, line, 1));
    }
    if let Some((index, _)) = name.char_indices().find(|&(_, c)| !is_name_char(c)) {
        return Err(ParseError::at(
            ParseErrorKind::InvalidPropertyName,
            line,
            index + 1,
        ));
    }

    let mut params = Vec::new();
    let mut offset = name_end;
    while text[offset..].starts_with(';') {
        offset += 1;
        let (param, consumed) = split_param(&text[offset..], line, offset)?;
        params.push(param);
        offset += consumed;
    }

    let value = text[offset..].strip_prefix(':').ok_or_else(missing_colon)?;
    Ok(ContentLine {
        line,
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

/// Reads one `NAME=value *("," value)` parameter starting at byte `offset`
/// of the line. Returns it with the number of bytes read, stopping before
/// the `;` or `:` that ends it.
fn split_param(text: &str, line: usize, offset: usize) -> ParseResult<(Param, usize)> {
    let invalid = |at: usize| ParseError::at(ParseErrorKind::InvalidParameter, line, offset + at + 1);

    let name_end = text.find('=').ok_or_else(|| invalid(0))?;
    let name = &text[..name_end];
    if name.is_empty() || !name.chars().all(is_name_char) {
        return Err(invalid(0));
    }

    let mut values = Vec::new();
    let mut position = name_end + 1;
    loop {
        let (value, consumed) = param_value(&text[position..], line, offset + position)?;
        values.push(value);
        position += consumed;

        match text[position..].chars().next() {
            Some(',') => position += 1,
            Some(';' | ':') => {
                let param = Param {
                    name: name.to_ascii_uppercase(),
                    values,
                };
                return Ok((param, position));
            }
            Some(other) => {
                return Err(invalid(position).with_context(format!("unexpected character '{other}'")));
            }
            None => {
                return Err(ParseError::at(
                    ParseErrorKind::MissingColon,
                    line,
                    offset + position,
                ));
            }
        }
    }
}

/// Reads a bare or quoted parameter value, returning it with the bytes read.
fn param_value(text: &str, line: usize, offset: usize) -> ParseResult<(String, usize)> {
    let Some(quoted) = text.strip_prefix('"') else {
        let end = text.find([',', ';', ':']).unwrap_or(text.len());
        return Ok((text[..end].to_string(), end));
    };

    let close = quoted
        .find('"')
        .ok_or_else(|| ParseError::at(ParseErrorKind::UnclosedQuote, line, offset + 1))?;
    Ok((decode_carets(&quoted[..close]), close + 2))
}

/// Decodes RFC 6868 escapes: `^^`, `^n` and `^'`.
fn decode_carets(value: &str) -> String {
    let mut decoded = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        let escaped = match (c, chars.peek()) {
            ('^', Some('^')) => '^',
            ('^', Some('n')) => '\n',
            ('^', Some('\'')) => '"',
            _ => {
                decoded.push(c);
                continue;
            }
        };
        chars.next();
        decoded.push(escaped);
    }

    decoded
}
