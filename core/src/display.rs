//! LCD refresh loop
//!
//! Polls the RTC at a fixed cadence and keeps a 16x2 character display
//! current with as little bus traffic as possible:
//!
//! ```text
//!  col 0123456789012345
//! row 0  12:34:56   GMT
//! row 1 Mon 15 Jan 2024
//! ```
//!
//! A full redraw happens on the first tick and whenever seconds == 0;
//! every other tick rewrites only the two seconds digits at column 7.
//! The daily resync is triggered from here, so a sync cycle blocks the
//! display for at most the sync deadline.

use core::fmt::Write;

use clock_hal::{CharacterDisplay, DateTime, DisplayError, NetworkLink, Rtc, UdpStack};
use embedded_hal_async::delay::DelayNs;
use heapless::String;

use crate::config::ClockConfig;
use crate::sync::ClockSyncController;
use crate::time::DstState;

/// Characters per display row
pub const LCD_NUM_COLS: usize = 16;

/// Column of the seconds digits on row 0
const SECONDS_COL: u8 = 7;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Text of one display row
pub type Line = String<LCD_NUM_COLS>;

/// What one tick drew
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    /// Both rows rewritten
    Full,
    /// Only the seconds field rewritten
    SecondsOnly,
    /// RTC unreadable; screen left as it was
    Skipped,
}

/// Row 0: ` HH:MM:SS   TZ_`
pub fn time_line(now: &DateTime, dst: DstState) -> Result<Line, core::fmt::Error> {
    let mut line = Line::new();
    write!(
        line,
        " {:02}:{:02}:{:02}   {}",
        now.hour(),
        now.minute(),
        now.second(),
        dst.label()
    )?;
    Ok(line)
}

/// Row 1: `Ddd DD Mmm YYYY `
pub fn date_line(now: &DateTime) -> Result<Line, core::fmt::Error> {
    let month = MONTHS
        .get(usize::from(now.month()).wrapping_sub(1))
        .copied()
        .unwrap_or("-");
    let mut line = Line::new();
    write!(
        line,
        "{} {:02} {:>3} {:04} ",
        now.day_of_week().abbreviation(),
        now.day(),
        month,
        now.year()
    )?;
    Ok(line)
}

/// Foreground loop owning the RTC, the display and the sync controller
pub struct DisplayRefreshLoop<R, P, D, L, U> {
    rtc: R,
    display: P,
    delay: D,
    sync: ClockSyncController<L, U>,
    poll_interval_ms: u32,
    splash_ms: u32,
    needs_full_redraw: bool,
}

impl<R, P, D, L, U> DisplayRefreshLoop<R, P, D, L, U>
where
    R: Rtc,
    P: CharacterDisplay,
    D: DelayNs,
    L: NetworkLink,
    U: UdpStack,
{
    pub fn new(
        rtc: R,
        display: P,
        delay: D,
        sync: ClockSyncController<L, U>,
        config: &ClockConfig,
    ) -> Self {
        Self {
            rtc,
            display,
            delay,
            sync,
            poll_interval_ms: config.poll_interval_ms,
            splash_ms: config.splash_ms,
            needs_full_redraw: true,
        }
    }

    pub fn sync(&self) -> &ClockSyncController<L, U> {
        &self.sync
    }

    pub fn display(&self) -> &P {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut P {
        &mut self.display
    }

    pub fn rtc_mut(&mut self) -> &mut R {
        &mut self.rtc
    }

    /// Run forever: startup, then one tick per poll interval
    pub async fn run(&mut self) -> ! {
        self.start().await;
        info!("Entering display refresh loop ({} ms)", self.poll_interval_ms);
        loop {
            self.tick().await;
            self.delay.delay_ms(self.poll_interval_ms).await;
        }
    }

    /// One-time display setup, splash screen and startup synchronization
    pub async fn start(&mut self) {
        info!("NTP clock starting");
        let setup = self
            .display
            .hide_cursor()
            .and_then(|()| self.display.backlight_on())
            .and_then(|()| self.display.clear());
        log_display(setup);

        log_display(self.show(0, 0, "===NTP Clock==="));
        self.delay.delay_ms(self.splash_ms).await;
        log_display(self.display.clear());
        log_display(self.show(0, 0, "Get NTP Time..."));

        if let Err(e) = self.sync.startup(&mut self.rtc, &mut self.delay).await {
            warn!("Startup sync failed, showing RTC time: {}", e);
        }

        log_display(self.display.clear());
        self.needs_full_redraw = true;
    }

    /// Poll the RTC once, redraw, and run the daily resync if it is due
    pub async fn tick(&mut self) -> Redraw {
        let now = match self.rtc.now() {
            Ok(now) => now,
            Err(e) => {
                warn!("RTC read failed: {}", e);
                return Redraw::Skipped;
            }
        };

        let redraw = if self.needs_full_redraw || now.second() == 0 {
            log_display(self.draw_full(&now));
            self.needs_full_redraw = false;
            Redraw::Full
        } else {
            log_display(self.draw_seconds(&now));
            Redraw::SecondsOnly
        };

        if let Some(Err(e)) = self
            .sync
            .resync_if_due(&now, &mut self.rtc, &mut self.delay)
            .await
        {
            warn!("Daily resync failed, keeping RTC time: {}", e);
        }

        redraw
    }

    fn draw_full(&mut self, now: &DateTime) -> Result<(), DisplayError> {
        let time = time_line(now, self.sync.dst_state()).map_err(|_| DisplayError::OutOfBounds)?;
        let date = date_line(now).map_err(|_| DisplayError::OutOfBounds)?;
        self.show(0, 0, &time)?;
        self.show(0, 1, &date)
    }

    fn draw_seconds(&mut self, now: &DateTime) -> Result<(), DisplayError> {
        let mut seconds: String<2> = String::new();
        write!(seconds, "{:02}", now.second()).map_err(|_| DisplayError::OutOfBounds)?;
        self.show(SECONDS_COL, 0, &seconds)
    }

    fn show(&mut self, col: u8, row: u8, text: &str) -> Result<(), DisplayError> {
        self.display.move_to(col, row)?;
        self.display.write_text(text)
    }
}

/// Display errors are not fatal; the next full redraw repairs the screen
fn log_display(result: Result<(), DisplayError>) {
    if let Err(e) = result {
        warn!("Display write failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SntpConfig;
    use crate::testing::{
        datetime, server_reply, FakeDisplay, FakeLink, FakeRtc, FakeStack, NoDelay, Op, Reply,
    };
    use crate::time::{to_wire, Timestamp};
    use clock_hal::DayOfWeek;
    use embassy_futures::block_on;

    type TestLoop = DisplayRefreshLoop<FakeRtc, FakeDisplay, NoDelay, FakeLink, FakeStack>;

    fn clock(rtc: FakeRtc, stack: FakeStack) -> TestLoop {
        let config = ClockConfig {
            sntp: SntpConfig {
                servers: &["a.ntp"],
                ..SntpConfig::default()
            },
            ..ClockConfig::default()
        };
        let sync = ClockSyncController::new(FakeLink::default(), stack, &config);
        DisplayRefreshLoop::new(rtc, FakeDisplay::default(), NoDelay::default(), sync, &config)
    }

    fn write(text: &str) -> Op {
        Op::Write(text.into())
    }

    #[test]
    fn test_lines() {
        let now = DateTime::new(2024, 1, 5, DayOfWeek::Friday, 9, 7, 3).unwrap();
        assert_eq!(time_line(&now, DstState::Standard).unwrap(), " 09:07:03   GMT");
        assert_eq!(time_line(&now, DstState::Summer).unwrap(), " 09:07:03   BST");
        assert_eq!(date_line(&now).unwrap(), "Fri 05 Jan 2024 ");
        assert_eq!(date_line(&now).unwrap().len(), LCD_NUM_COLS);
    }

    #[test]
    fn test_full_redraw_on_first_tick_and_minute() {
        let reads = [
            datetime(2024, 1, 1, 10, 0, 58),
            datetime(2024, 1, 1, 10, 0, 58),
            datetime(2024, 1, 1, 10, 0, 59),
            datetime(2024, 1, 1, 10, 1, 0),
            datetime(2024, 1, 1, 10, 1, 0),
            datetime(2024, 1, 1, 10, 1, 1),
        ];
        let mut clock = clock(FakeRtc::scripted(reads), FakeStack::default());

        let drawn: Vec<Redraw> = (0..reads.len()).map(|_| block_on(clock.tick())).collect();

        assert_eq!(
            drawn,
            [
                Redraw::Full,
                Redraw::SecondsOnly,
                Redraw::SecondsOnly,
                Redraw::Full,
                Redraw::Full,
                Redraw::SecondsOnly,
            ]
        );
    }

    #[test]
    fn test_seconds_only_redraw_writes_two_digits() {
        let reads = [datetime(2024, 1, 1, 10, 0, 8), datetime(2024, 1, 1, 10, 0, 9)];
        let mut clock = clock(FakeRtc::scripted(reads), FakeStack::default());

        block_on(clock.tick());
        assert_eq!(
            clock.display_mut().take(),
            [
                Op::MoveTo(0, 0),
                write(" 10:00:08   GMT"),
                Op::MoveTo(0, 1),
                write("Mon 01 Jan 2024 "),
            ]
        );

        block_on(clock.tick());
        assert_eq!(clock.display_mut().take(), [Op::MoveTo(7, 0), write("09")]);
    }

    #[test]
    fn test_unreadable_rtc_skips_tick() {
        let mut clock = clock(FakeRtc::default(), FakeStack::default());
        assert_eq!(block_on(clock.tick()), Redraw::Skipped);
        assert!(clock.display().ops.is_empty());
    }

    #[test]
    fn test_resync_triggered_once_in_window() {
        let reads = (0..10).map(|s| datetime(2024, 1, 2, 3, 0, s));
        let mut clock = clock(FakeRtc::scripted(reads), FakeStack::default());

        for _ in 0..10 {
            block_on(clock.tick());
        }

        assert_eq!(clock.sync().schedule().last_day(), Some(2));
        assert_eq!(clock.sync().link().connects, 1);
        assert_eq!(clock.sync().link().disconnects, 1);
    }

    #[test]
    fn test_startup_sequence() {
        // 2024-01-15 12:34:56 UTC
        let wire = to_wire(Timestamp::from_unix(1_705_322_096));
        let stack = FakeStack::default().with_host("a.ntp", Reply::Packet(server_reply(wire)));
        let mut clock = clock(FakeRtc::default(), stack);

        block_on(clock.start());

        assert_eq!(
            clock.display_mut().take(),
            [
                Op::HideCursor,
                Op::BacklightOn,
                Op::Clear,
                Op::MoveTo(0, 0),
                write("===NTP Clock==="),
                Op::Clear,
                Op::MoveTo(0, 0),
                write("Get NTP Time..."),
                Op::Clear,
            ]
        );
        assert_eq!(clock.delay.elapsed_ms(), 2_000);
        assert_eq!(clock.rtc.writes.len(), 1);
        assert_eq!(block_on(clock.tick()), Redraw::Full);
    }
}
