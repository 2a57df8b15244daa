//! Reading feeds into the calendar model.
//!
//! Lines are unfolded and split first, then assembled into blocks with
//! their property values typed on the way.

mod error;
mod lexer;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parser::parse;
pub use values::{parse_date, parse_datetime};
