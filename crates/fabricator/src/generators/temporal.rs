//! Temporal value generators.
//!
//! Generated timestamps stay inside a bounded plausible window rather than
//! the full representable range, so persisted values never overflow a
//! database product's narrower datetime types.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;

/// Window start: 1970-01-01T00:00:00Z.
const WINDOW_START_SECS: i64 = 0;

/// Window end: 2038-01-19T03:14:07Z.
const WINDOW_END_SECS: i64 = 2_147_483_647;

/// Generate a random timestamp between two instants (inclusive).
pub fn datetime_between<R: Rng + ?Sized>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DateTime<Utc> {
    let start_ts = start.timestamp();
    let end_ts = end.timestamp();

    if start_ts >= end_ts {
        return start;
    }
    let secs = rng.gen_range(start_ts..=end_ts);
    DateTime::from_timestamp(secs, 0).unwrap_or(start)
}

/// Generate a random timestamp within the bounded plausible window.
pub fn datetime_in_window<R: Rng + ?Sized>(rng: &mut R) -> DateTime<Utc> {
    let start = DateTime::from_timestamp(WINDOW_START_SECS, 0).unwrap_or(DateTime::UNIX_EPOCH);
    let end = DateTime::from_timestamp(WINDOW_END_SECS, 0).unwrap_or(DateTime::UNIX_EPOCH);
    datetime_between(rng, start, end)
}

/// Generate a random date within the bounded plausible window.
pub fn date_in_window<R: Rng + ?Sized>(rng: &mut R) -> NaiveDate {
    datetime_in_window(rng).date_naive()
}
