use std::borrow::Cow;

/// Venue identifier (e.g., "kraken") - mostly static
pub type VenueId = Cow<'static, str>;

/// Unix timestamp in whole seconds, UTC
pub type Timestamp = i64;
