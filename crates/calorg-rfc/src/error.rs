use thiserror::Error;

use crate::rfc::ical::expand::ConversionError;
use crate::rfc::ical::parse::ParseError;

/// iCalendar parsing and timezone conversion errors
#[derive(Error, Debug)]
pub enum RfcError {
    #[error(transparent)]
    ParseError(#[from] ParseError),

    #[error(transparent)]
    ConversionError(#[from] ConversionError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
