//! iCalendar (RFC 5545) support for calendar exports.

pub mod error;
pub mod rfc;
