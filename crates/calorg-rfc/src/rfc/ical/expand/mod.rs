//! Timezone resolution used when placing event times on the timeline.

mod timezone;

pub use timezone::{
    ConversionError, TimeZoneResolver, localize_date, localize_naive, normalize_tzid,
};
