//! File time conversion

use chrono::{DateTime, Utc};

/// 100 ns ticks per second
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Seconds between 1601-01-01 and 1970-01-01
pub const EPOCH_DIFFERENCE_SECS: i64 = 11_644_473_600;

/// Convert 100 ns ticks since 1601-01-01 UTC to a calendar timestamp
///
/// Returns `None` when the value falls outside the representable range.
#[must_use]
pub fn to_utc(ticks: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(ticks / TICKS_PER_SECOND).ok()? - EPOCH_DIFFERENCE_SECS;
    let nanos = u32::try_from((ticks % TICKS_PER_SECOND) * 100).ok()?;
    DateTime::from_timestamp(secs, nanos)
}
