//! The export stages between the parsed calendar and the rendered document.
//!
//! - Definition: one VEVENT with its times resolved
//! - Occurrence: expansion inside the export window
//! - Normalize: presentation fields and the uniqueness key
//! - Dedup and filter: duplicate removal and rejection predicates
//! - Render: the org document

pub mod dedup;
pub mod definition;
pub mod filter;
pub mod normalize;
pub mod occurrence;
pub mod render;

#[cfg(test)]
pub(crate) mod fixtures;

pub use dedup::dedup_by_key;
pub use definition::{EventDefinition, Recurrence, StartValue};
pub use filter::{Rejection, apply_rejections};
pub use normalize::NormalizedEvent;
pub use occurrence::{Occurrence, OccurrenceExpander, Window};
pub use render::{Document, DocumentHeader};
