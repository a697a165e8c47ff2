//! Windows FILETIME to Unix time conversion.
//!
//! A FILETIME is a count of 100-nanosecond ticks since 1601-01-01 UTC.
//! Program start times in `.ndx` records are stored this way, usually in
//! the broadcaster's local time, so callers pass a whole-hour correction
//! that is added after conversion.

use crate::error::{JtvError, Result};

/// FILETIME ticks per second.
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// FILETIME value of 1970-01-01T00:00:00Z.
pub const UNIX_EPOCH_TICKS: u64 = 0x019D_B1DE_D53E_8000;

const HOUR_SECS: i64 = 3600;

/// Convert FILETIME ticks to Unix epoch seconds, shifted by `tz_correction_hours`.
///
/// Sub-second precision is truncated. Ticks earlier than the Unix epoch are
/// rejected with [`JtvError::InvalidTimestamp`].
pub fn filetime_to_unix(ticks: u64, tz_correction_hours: i32) -> Result<i64> {
    let since_epoch = ticks
        .checked_sub(UNIX_EPOCH_TICKS)
        .ok_or(JtvError::InvalidTimestamp(ticks))?;
    let secs = (since_epoch / TICKS_PER_SECOND) as i64;
    Ok(secs + tz_correction_hours as i64 * HOUR_SECS)
}

/// Inverse of [`filetime_to_unix`] with no correction applied.
///
/// Returns `None` for times before the Unix epoch or past the FILETIME range.
pub fn unix_to_filetime(secs: i64) -> Option<u64> {
    let secs = u64::try_from(secs).ok()?;
    secs.checked_mul(TICKS_PER_SECOND)?
        .checked_add(UNIX_EPOCH_TICKS)
}
