//! Shared numeric and time helpers for reshaping upstream payloads.
//!
//! - `round_to_int`: half-away-from-zero rounding used for every integer
//!   field in the API output (temperatures, humidity, wind speed).
//! - `mean`: arithmetic mean of a non-empty slice.
//! - `to_iso_millis` / `day_key`: the two string renderings of a UTC instant.
//!
//! Non-finite inputs round to 0 with a warning.

use chrono::{DateTime, SecondsFormat, Utc};

/// Round an f64 to the nearest integer, half away from zero.
pub(crate) fn round_to_int(v: f64) -> i64 {
    if !v.is_finite() {
        tracing::warn!("round_to_int received non-finite value {}, defaulting to 0", v);
        return 0;
    }
    v.round() as i64
}

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// ISO 8601 / RFC 3339 UTC timestamp with millisecond precision,
/// e.g. `2026-10-18T06:12:00.000Z`.
pub(crate) fn to_iso_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Calendar-day key for a UTC instant, e.g. `Sun Oct 18 2026`.
pub(crate) fn day_key(dt: DateTime<Utc>) -> String {
    dt.format("%a %b %d %Y").to_string()
}
