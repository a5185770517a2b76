//! Timestamp and duration rendering shared by every card schema.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;

const SECOND: u64 = 1;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;
const MONTH: u64 = 30 * DAY;
const YEAR: u64 = 12 * MONTH;
const LONG_TIME: u64 = 37 * YEAR;

/// How an interval inside one magnitude bucket is phrased.
enum Phrase {
    Fixed(&'static str),
    Counted { per: u64, unit: &'static str },
}

/// Buckets ordered by exclusive upper bound, in seconds.
const MAGNITUDES: &[(u64, Phrase)] = &[
    (SECOND, Phrase::Fixed("now")),
    (2 * SECOND, Phrase::Fixed("1 second")),
    (MINUTE, Phrase::Counted { per: SECOND, unit: "seconds" }),
    (2 * MINUTE, Phrase::Fixed("1 minute")),
    (HOUR, Phrase::Counted { per: MINUTE, unit: "minutes" }),
    (2 * HOUR, Phrase::Fixed("1 hour")),
    (DAY, Phrase::Counted { per: HOUR, unit: "hours" }),
    (2 * DAY, Phrase::Fixed("1 day")),
    (WEEK, Phrase::Counted { per: DAY, unit: "days" }),
    (2 * WEEK, Phrase::Fixed("1 week")),
    (MONTH, Phrase::Counted { per: WEEK, unit: "weeks" }),
    (2 * MONTH, Phrase::Fixed("1 month")),
    (YEAR, Phrase::Counted { per: MONTH, unit: "months" }),
    (18 * MONTH, Phrase::Fixed("1 year")),
    (2 * YEAR, Phrase::Fixed("2 years")),
    (LONG_TIME, Phrase::Counted { per: YEAR, unit: "years" }),
    (u64::MAX, Phrase::Fixed("a long while")),
];

/// Interpret a Unix timestamp field. Zero or negative means "not set".
pub fn unix_timestamp(
    field: &'static str,
    secs: i64,
) -> Result<Option<DateTime<Utc>>, ValidationError> {
    if secs <= 0 {
        return Ok(None);
    }
    DateTime::from_timestamp(secs, 0)
        .map(Some)
        .ok_or(ValidationError::Timestamp { field, value: secs })
}

/// Absolute timestamp, e.g. `2023-11-14 22:13:20 +0000 UTC`.
#[must_use]
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S +0000 UTC").to_string()
}

/// Short natural-language approximation of the interval between two instants,
/// e.g. `3 hours`. Order of the arguments does not matter.
#[must_use]
pub fn duration_between(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    humanize_secs((*end - *start).num_seconds().unsigned_abs())
}

fn humanize_secs(secs: u64) -> String {
    let index = MAGNITUDES
        .iter()
        .position(|(below, _)| *below > secs)
        .unwrap_or(MAGNITUDES.len() - 1);

    match &MAGNITUDES[index].1 {
        Phrase::Fixed(text) => (*text).to_string(),
        Phrase::Counted { per, unit } => format!("{} {unit}", secs / per),
    }
}
