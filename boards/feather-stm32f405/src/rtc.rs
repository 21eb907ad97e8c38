//! STM32 internal RTC (LSE-clocked) behind the `clock_hal::Rtc` trait

use clock_hal::{DateTime, DayOfWeek, Rtc, RtcError};
use defmt::{error, Debug2Format};
use embassy_stm32::rtc;

pub struct StmRtc {
    rtc: rtc::Rtc,
}

impl StmRtc {
    pub fn new(rtc: rtc::Rtc) -> Self {
        Self { rtc }
    }
}

fn to_register_day(day: DayOfWeek) -> rtc::DayOfWeek {
    match day {
        DayOfWeek::Monday => rtc::DayOfWeek::Monday,
        DayOfWeek::Tuesday => rtc::DayOfWeek::Tuesday,
        DayOfWeek::Wednesday => rtc::DayOfWeek::Wednesday,
        DayOfWeek::Thursday => rtc::DayOfWeek::Thursday,
        DayOfWeek::Friday => rtc::DayOfWeek::Friday,
        DayOfWeek::Saturday => rtc::DayOfWeek::Saturday,
        DayOfWeek::Sunday => rtc::DayOfWeek::Sunday,
    }
}

fn from_register_day(day: rtc::DayOfWeek) -> DayOfWeek {
    match day {
        rtc::DayOfWeek::Monday => DayOfWeek::Monday,
        rtc::DayOfWeek::Tuesday => DayOfWeek::Tuesday,
        rtc::DayOfWeek::Wednesday => DayOfWeek::Wednesday,
        rtc::DayOfWeek::Thursday => DayOfWeek::Thursday,
        rtc::DayOfWeek::Friday => DayOfWeek::Friday,
        rtc::DayOfWeek::Saturday => DayOfWeek::Saturday,
        rtc::DayOfWeek::Sunday => DayOfWeek::Sunday,
    }
}

impl Rtc for StmRtc {
    fn now(&mut self) -> Result<DateTime, RtcError> {
        let now = self.rtc.now().map_err(|e| match e {
            rtc::RtcError::NotRunning => RtcError::NotInitialized,
            e => {
                error!("RTC read failed: {}", Debug2Format(&e));
                RtcError::HardwareError
            }
        })?;
        DateTime::new(
            now.year(),
            now.month(),
            now.day(),
            from_register_day(now.day_of_week()),
            now.hour(),
            now.minute(),
            now.second(),
        )
    }

    fn set_datetime(&mut self, datetime: DateTime) -> Result<(), RtcError> {
        let registers = rtc::DateTime::from(
            datetime.year(),
            datetime.month(),
            datetime.day(),
            to_register_day(datetime.day_of_week()),
            datetime.hour(),
            datetime.minute(),
            datetime.second(),
            0, // microsecond
        )
        .map_err(|_| RtcError::InvalidDateTime)?;

        self.rtc.set_datetime(registers).map_err(|e| {
            error!("RTC write failed: {}", Debug2Format(&e));
            RtcError::HardwareError
        })
    }
}
