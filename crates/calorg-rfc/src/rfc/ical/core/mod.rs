//! Parsed calendar model.
//!
//! A component keeps its properties in feed order. Each property carries its
//! value typed as far as the exporter reads it, next to the text as written.

mod component;
mod property;
mod value;

pub use component::{Calendar, Component};
pub use property::{Param, Property, names};
pub use value::{DateTime, Value};
