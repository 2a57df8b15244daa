//! Calendar feed export: fetch, expand, filter and render events as an org document.

pub mod error;
pub mod export;
pub mod fetch;
pub mod pipeline;
pub mod writer;
