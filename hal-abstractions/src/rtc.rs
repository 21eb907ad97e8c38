//! Real-time clock register set and access trait
//!
//! The RTC holds broken-down civil time, the same shape the STM32 calendar
//! registers use. It is the single shared mutable resource of the appliance.

/// Day of week, Monday-based (Monday = 0 .. Sunday = 6)
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOfWeek {
    Monday = 0,
    Tuesday = 1,
    Wednesday = 2,
    Thursday = 3,
    Friday = 4,
    Saturday = 5,
    Sunday = 6,
}

impl DayOfWeek {
    /// Map a Monday-based index (taken modulo 7) to a weekday
    pub const fn from_index(index: u8) -> Self {
        match index % 7 {
            0 => Self::Monday,
            1 => Self::Tuesday,
            2 => Self::Wednesday,
            3 => Self::Thursday,
            4 => Self::Friday,
            5 => Self::Saturday,
            _ => Self::Sunday,
        }
    }

    /// Monday-based index, 0-6
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Three-letter English abbreviation
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        }
    }
}

/// Broken-down civil date and time as held by the RTC
///
/// Fields are range-checked on construction, so any `DateTime` in hand is a
/// real calendar instant. No time zone is attached.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    year: u16,
    month: u8,
    day: u8,
    day_of_week: DayOfWeek,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTime {
    /// Build a validated date/time
    ///
    /// # Errors
    ///
    /// Returns `RtcError::InvalidDateTime` if any field is out of range
    /// (including Feb 29 in a non-leap year).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        day_of_week: DayOfWeek,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, RtcError> {
        if !(1..=12).contains(&month)
            || day == 0
            || day > days_in_month(year, month)
            || hour > 23
            || minute > 59
            || second > 59
        {
            return Err(RtcError::InvalidDateTime);
        }
        Ok(Self {
            year,
            month,
            day,
            day_of_week,
            hour,
            minute,
            second,
        })
    }

    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Month, 1-12
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Day of month, 1-31
    pub const fn day(&self) -> u8 {
        self.day
    }

    pub const fn day_of_week(&self) -> DayOfWeek {
        self.day_of_week
    }

    pub const fn hour(&self) -> u8 {
        self.hour
    }

    pub const fn minute(&self) -> u8 {
        self.minute
    }

    pub const fn second(&self) -> u8 {
        self.second
    }
}

/// Check if year is a leap year (Gregorian calendar)
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`; 0 for an invalid month
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// RTC operation errors
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtcError {
    /// RTC not initialized
    NotInitialized,
    /// RTC hardware error
    HardwareError,
    /// Date/time fields out of range
    InvalidDateTime,
}

impl core::fmt::Display for RtcError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "RTC not initialized"),
            Self::HardwareError => write!(f, "RTC hardware error"),
            Self::InvalidDateTime => write!(f, "Invalid date/time"),
        }
    }
}

impl core::error::Error for RtcError {}

/// Calendar clock with second resolution
///
/// `set_datetime` must be atomic from the caller's point of view: a
/// concurrent `now` never observes a half-written register set.
pub trait Rtc {
    /// Read the current date/time
    fn now(&mut self) -> Result<DateTime, RtcError>;

    /// Overwrite the current date/time
    fn set_datetime(&mut self, datetime: DateTime) -> Result<(), RtcError>;
}

impl<T: Rtc + ?Sized> Rtc for &mut T {
    fn now(&mut self) -> Result<DateTime, RtcError> {
        T::now(self)
    }

    fn set_datetime(&mut self, datetime: DateTime) -> Result<(), RtcError> {
        T::set_datetime(self, datetime)
    }
}
