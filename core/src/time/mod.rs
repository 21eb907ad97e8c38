//! Time keeping: NTP wire epoch, civil calendar, summer-time rule
//!
//! ## Representation
//! - `Timestamp` is whole seconds since 1970-01-01 00:00:00 UTC, always UTC
//! - `clock_hal::DateTime` is the broken-down form the RTC holds
//! - Only the sync controller turns a UTC `Timestamp` into local civil time
//!
//! ## Custom Date/Time Conversions
//!
//! Calendar math uses Howard Hinnant's O(1) `days_from_civil` and
//! `civil_from_days`, no external date crate. The day of week is computed
//! for every conversion since the display shows it.

pub mod calendar;
pub mod dst;
pub mod epoch;

pub use calendar::{to_datetime, to_timestamp};
pub use dst::{DstRule, DstState};
pub use epoch::{from_wire, read_wire, to_wire, Timestamp, NTP_UNIX_OFFSET};
