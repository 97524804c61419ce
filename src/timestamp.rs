//! RFC3339 timestamp parsing for decoded result columns.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::{Error, Result};

const WITH_FRACTION: &str = "%Y-%m-%d %H:%M:%S%.f";
const WHOLE_SECONDS: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a UTC timestamp as InfluxDB writes it, e.g. `2023-01-01T00:00:03.5Z`.
///
/// Only the `Z` offset is accepted. Fractional seconds are read to nanosecond
/// resolution when present.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let normalized = input.strip_suffix('Z').unwrap_or(input).replacen('T', " ", 1);
    let format = if normalized.contains('.') {
        WITH_FRACTION
    } else {
        WHOLE_SECONDS
    };
    NaiveDateTime::parse_from_str(&normalized, format)
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::Parse {
            message: format!("Invalid RFC3339 timestamp '{}': {}", input, e),
        })
}
