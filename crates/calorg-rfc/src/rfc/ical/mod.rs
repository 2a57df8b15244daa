//! iCalendar parsing and timezone handling.
//!
//! Covers the subset of RFC 5545 that calendar feeds emit for events:
//! content lines, components, the value types VEVENT properties use and
//! TZID resolution. Recurrence rules are kept as written.

pub mod core;
pub mod expand;
pub mod parse;
pub mod repair;
