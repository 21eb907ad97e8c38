//! Summer-time rule: last Sunday in March to last Sunday in October
//!
//! Transitions are taken at 02:00 UTC on the transition Sunday and the
//! summer interval is half-open: `start <= t < end`.

use clock_hal::rtc::{days_in_month, DayOfWeek, RtcError};

use super::calendar::{day_of_week, days_from_civil, SECONDS_PER_DAY};
use super::epoch::Timestamp;

/// Whether the summer offset applies
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DstState {
    #[default]
    Standard,
    Summer,
}

impl DstState {
    /// Offset from UTC in seconds
    pub const fn offset_secs(self) -> i64 {
        match self {
            Self::Standard => 0,
            Self::Summer => DstRule::SUMMER_OFFSET_SECS,
        }
    }

    /// Three-letter zone label shown on the display
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "GMT",
            Self::Summer => "BST",
        }
    }
}

/// UK rule: summer time from the last Sunday in March to the last Sunday
/// in October, one hour ahead of UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct DstRule;

impl DstRule {
    pub const SUMMER_OFFSET_SECS: i64 = 60 * 60;

    /// Hour (UTC) at which both transitions take effect
    pub const TRANSITION_HOUR: i64 = 2;

    const START_MONTH: u8 = 3;
    const END_MONTH: u8 = 10;

    /// Summer-time start and end instants for `year`
    pub fn transitions(&self, year: u16) -> (Timestamp, Timestamp) {
        (
            last_sunday(year, Self::START_MONTH),
            last_sunday(year, Self::END_MONTH),
        )
    }

    /// Evaluate the rule for a UTC `instant` falling in `year`
    pub fn effective_offset(&self, instant: Timestamp, year: u16) -> DstState {
        let (start, end) = self.transitions(year);
        if start <= instant && instant < end {
            DstState::Summer
        } else {
            DstState::Standard
        }
    }

    /// Evaluate the rule using the instant's own UTC year
    ///
    /// # Errors
    ///
    /// `RtcError::InvalidDateTime` if the instant's year does not fit `u16`.
    pub fn state_at(&self, instant: Timestamp) -> Result<DstState, RtcError> {
        let year = super::calendar::to_datetime(instant)?.year();
        Ok(self.effective_offset(instant, year))
    }
}

/// Last Sunday of `month` at the transition hour
///
/// Starts from the last day of the month and steps back
/// `(day_of_week + 1) mod 7` days (Monday-based weekday).
fn last_sunday(year: u16, month: u8) -> Timestamp {
    let last_day = days_from_civil(year, month, days_in_month(year, month));
    let back = (i64::from(day_of_week(last_day).index()) + 1) % 7;
    debug_assert_eq!(day_of_week(last_day - back), DayOfWeek::Sunday);
    Timestamp::from_unix(
        (last_day - back) * SECONDS_PER_DAY + DstRule::TRANSITION_HOUR * 3600,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::to_datetime;

    #[test]
    fn test_2024_transitions() {
        let (start, end) = DstRule.transitions(2024);

        let start_dt = to_datetime(start).unwrap();
        assert_eq!((start_dt.month(), start_dt.day(), start_dt.hour()), (3, 31, 2));
        assert_eq!(start.unix_secs(), 1_711_850_400);

        let end_dt = to_datetime(end).unwrap();
        assert_eq!((end_dt.month(), end_dt.day(), end_dt.hour()), (10, 27, 2));
    }

    #[test]
    fn test_transitions_fall_on_sundays() {
        for year in 1970..=2100 {
            let (start, end) = DstRule.transitions(year);
            assert!(start < end, "start after end in {year}");
            for ts in [start, end] {
                let dt = to_datetime(ts).unwrap();
                assert_eq!(dt.day_of_week(), DayOfWeek::Sunday, "{year}");
                assert_eq!(dt.year(), year);
                assert!(dt.day() >= 25, "not the last Sunday in {year}");
            }
        }
    }

    #[test]
    fn test_half_open_interval() {
        let rule = DstRule;
        let (start, end) = rule.transitions(2024);
        assert_eq!(rule.effective_offset(start.add_secs(-1), 2024), DstState::Standard);
        assert_eq!(rule.effective_offset(start, 2024), DstState::Summer);
        assert_eq!(rule.effective_offset(start.add_secs(1), 2024), DstState::Summer);
        assert_eq!(rule.effective_offset(end.add_secs(-1), 2024), DstState::Summer);
        assert_eq!(rule.effective_offset(end, 2024), DstState::Standard);
    }

    #[test]
    fn test_state_at_midsummer_and_midwinter() {
        // 2025-07-01 12:00 UTC and 2025-01-15 12:00 UTC
        assert_eq!(DstRule.state_at(Timestamp::from_unix(1_751_371_200)), Ok(DstState::Summer));
        assert_eq!(DstRule.state_at(Timestamp::from_unix(1_736_942_400)), Ok(DstState::Standard));
    }

    #[test]
    fn test_labels() {
        assert_eq!(DstState::Standard.label(), "GMT");
        assert_eq!(DstState::Summer.label(), "BST");
        assert_eq!(DstState::Summer.offset_secs(), 3600);
    }
}
