//! Calendar date/time conversions using O(1) algorithms
//!
//! Implements Howard Hinnant's civil_from_days and days_from_civil algorithms.
//! Reference: http://howardhinnant.github.io/date_algorithms.html
//!
//! - O(1) time complexity (no year iteration)
//! - Correct handling of leap years
//! - Valid for all dates in the proleptic Gregorian calendar, before or
//!   after 1970
//! - Day of week computed from the day count (1970-01-01 was a Thursday)

use clock_hal::{DateTime, DayOfWeek, RtcError};

use super::epoch::Timestamp;

pub(crate) const SECONDS_PER_DAY: i64 = 86_400;

/// Monday-based index of 1970-01-01 (Thursday)
const EPOCH_DAY_OF_WEEK: i64 = 3;

/// Convert a timestamp to broken-down civil time, no offset applied
///
/// # Errors
///
/// `RtcError::InvalidDateTime` if the year does not fit the RTC's `u16`.
pub fn to_datetime(timestamp: Timestamp) -> Result<DateTime, RtcError> {
    let secs = timestamp.unix_secs();
    let days_since_epoch = secs.div_euclid(SECONDS_PER_DAY);
    let secs_today = secs.rem_euclid(SECONDS_PER_DAY);

    let hour = (secs_today / 3600) as u8;
    let minute = ((secs_today % 3600) / 60) as u8;
    let second = (secs_today % 60) as u8;

    let (year, month, day) = civil_from_days(days_since_epoch);
    let year = u16::try_from(year).map_err(|_| RtcError::InvalidDateTime)?;

    DateTime::new(
        year,
        month,
        day,
        day_of_week(days_since_epoch),
        hour,
        minute,
        second,
    )
}

/// Convert broken-down civil time back to a timestamp
///
/// The stored day of week is ignored; the date fields are authoritative.
pub fn to_timestamp(datetime: &DateTime) -> Timestamp {
    let days = days_from_civil(datetime.year(), datetime.month(), datetime.day());
    Timestamp::from_unix(
        days * SECONDS_PER_DAY
            + i64::from(datetime.hour()) * 3600
            + i64::from(datetime.minute()) * 60
            + i64::from(datetime.second()),
    )
}

/// Weekday of a day count relative to 1970-01-01
pub(crate) fn day_of_week(days_since_epoch: i64) -> DayOfWeek {
    DayOfWeek::from_index((days_since_epoch + EPOCH_DAY_OF_WEEK).rem_euclid(7) as u8)
}

/// Convert days since Unix epoch to civil date (year, month, day)
///
/// Howard Hinnant's civil_from_days algorithm.
fn civil_from_days(days_since_epoch: i64) -> (i64, u8, u8) {
    // Shift epoch from 1970-01-01 to 0000-03-01 (March 1, year 0)
    // This makes the year start on March 1, placing leap day at end of year
    let z = days_since_epoch + 719_468;

    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u32; // day of era [0, 146096]

    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let y = i64::from(yoe) + era * 400;

    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // 0 = March, 11 = February

    let d = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u8;

    // January and February belong to the next civil year
    let year = if m <= 2 { y + 1 } else { y };

    (year, m, d)
}

/// Convert civil date (year, month, day) to days since Unix epoch
///
/// Howard Hinnant's days_from_civil algorithm.
pub(crate) fn days_from_civil(year: u16, month: u8, day: u8) -> i64 {
    let y = i64::from(year);
    let m = i64::from(month);
    let d = i64::from(day);

    // March = month 0, February = month 11
    let (y, m) = if m <= 2 { (y - 1, m + 9) } else { (y, m - 3) };

    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400; // [0, 399]
    let doy = (153 * m + 2) / 5 + d - 1; // [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]

    era * 146_097 + doe - 719_468
}
