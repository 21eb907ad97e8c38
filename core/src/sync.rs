//! Clock synchronization controller
//!
//! One cycle walks `Idle -> Connecting -> Querying -> Computing -> Writing
//! -> Idle`. A failure in any state passes through `Failed` back to `Idle`
//! without touching the RTC, and the network link is torn down on every
//! exit path.
//!
//! ## Deadline
//! The cycle is raced against a single overall deadline, so a wedged link or
//! socket can delay the display for at most `sync_deadline_ms`.
//!
//! ## Schedule
//! After the startup sync the clock resyncs once per day at `resync_hour`
//! (local time as read back from the RTC). `ResyncSchedule` remembers the
//! day-of-month of the last attempt so repeated polls within that hour do
//! not retrigger, and a failed attempt waits for the next day's window.

use clock_hal::{DateTime, NetworkLink, Rtc, UdpStack};
use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;

use crate::config::ClockConfig;
use crate::error::SyncError;
use crate::sntp::SntpClient;
use crate::time::{from_wire, to_datetime, DstRule, DstState, Timestamp};

/// Position in the synchronization state machine
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Connecting,
    Querying,
    Computing,
    Writing,
    Failed,
}

/// Once-a-day resync trigger keyed on day-of-month change
#[derive(Debug, Clone)]
pub struct ResyncSchedule {
    hour: u8,
    last_day: Option<u8>,
}

impl ResyncSchedule {
    pub const fn new(hour: u8) -> Self {
        Self {
            hour,
            last_day: None,
        }
    }

    /// True inside the resync hour of a day not yet attempted
    pub fn is_due(&self, now: &DateTime) -> bool {
        now.hour() == self.hour && self.last_day != Some(now.day())
    }

    /// Remember `now`'s day as attempted
    pub fn record(&mut self, now: &DateTime) {
        self.last_day = Some(now.day());
    }

    pub fn last_day(&self) -> Option<u8> {
        self.last_day
    }
}

/// Local civil time for a UTC instant under `rule`
///
/// The rule is evaluated for the instant's UTC year; in summer the fixed
/// offset is added before the civil date (and its weekday) is derived.
pub fn localize(rule: &DstRule, utc: Timestamp) -> Result<(DateTime, DstState), SyncError> {
    let dst = rule.state_at(utc)?;
    let local = to_datetime(utc.add_secs(dst.offset_secs()))?;
    Ok((local, dst))
}

/// Orchestrates link bring-up, SNTP query, DST evaluation and RTC write
pub struct ClockSyncController<L, U> {
    link: L,
    stack: U,
    sntp: SntpClient,
    rule: DstRule,
    ssid: &'static str,
    passphrase: &'static str,
    deadline_ms: u32,
    schedule: ResyncSchedule,
    state: SyncState,
    dst: DstState,
    last_synced: Option<Timestamp>,
}

impl<L: NetworkLink, U: UdpStack> ClockSyncController<L, U> {
    pub fn new(link: L, stack: U, config: &ClockConfig) -> Self {
        Self {
            link,
            stack,
            sntp: SntpClient::new(config.sntp.clone()),
            rule: DstRule,
            ssid: config.ssid,
            passphrase: config.passphrase,
            deadline_ms: config.sync_deadline_ms,
            schedule: ResyncSchedule::new(config.resync_hour),
            state: SyncState::Idle,
            dst: DstState::Standard,
            last_synced: None,
        }
    }

    /// Current state machine position (`Idle` between cycles)
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Summer-time state computed by the last successful sync
    pub fn dst_state(&self) -> DstState {
        self.dst
    }

    /// UTC instant written by the last successful sync
    pub fn last_synced(&self) -> Option<Timestamp> {
        self.last_synced
    }

    pub fn schedule(&self) -> &ResyncSchedule {
        &self.schedule
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Run one full synchronization cycle under the overall deadline
    ///
    /// Returns the local date/time written to the RTC. On any error the RTC
    /// keeps its previous value. The link is disconnected before returning
    /// either way.
    pub async fn synchronize<R: Rtc, D: DelayNs>(
        &mut self,
        rtc: &mut R,
        delay: &mut D,
    ) -> Result<DateTime, SyncError> {
        info!("Starting clock synchronization");
        let deadline_ms = self.deadline_ms;
        let outcome = match select(self.cycle(rtc), delay.delay_ms(deadline_ms)).await {
            Either::First(result) => result,
            Either::Second(()) => {
                warn!("Synchronization overran {} ms deadline", deadline_ms);
                Err(SyncError::DeadlineExceeded)
            }
        };

        self.link.disconnect().await;

        match outcome {
            Ok(local) => {
                info!(
                    "Clock synchronized: {}-{}-{} {}:{}:{} {}",
                    local.year(),
                    local.month(),
                    local.day(),
                    local.hour(),
                    local.minute(),
                    local.second(),
                    self.dst.label()
                );
            }
            Err(e) => {
                self.transition(SyncState::Failed);
                warn!("Clock synchronization failed: {}", e);
            }
        }
        self.transition(SyncState::Idle);
        outcome
    }

    /// Startup sync; records the day it ran on so the daily window does not
    /// fire again the same day
    pub async fn startup<R: Rtc, D: DelayNs>(
        &mut self,
        rtc: &mut R,
        delay: &mut D,
    ) -> Result<DateTime, SyncError> {
        let outcome = self.synchronize(rtc, delay).await;
        match rtc.now() {
            Ok(now) => self.schedule.record(&now),
            Err(e) => warn!("RTC unreadable after startup sync: {}", e),
        }
        outcome
    }

    /// Run the daily resync if `now` falls in an unattempted window
    ///
    /// Returns `None` when no sync was due.
    pub async fn resync_if_due<R: Rtc, D: DelayNs>(
        &mut self,
        now: &DateTime,
        rtc: &mut R,
        delay: &mut D,
    ) -> Option<Result<DateTime, SyncError>> {
        if !self.schedule.is_due(now) {
            return None;
        }
        info!("Daily resync window reached (day {})", now.day());
        self.schedule.record(now);
        Some(self.synchronize(rtc, delay).await)
    }

    async fn cycle<R: Rtc>(&mut self, rtc: &mut R) -> Result<DateTime, SyncError> {
        self.transition(SyncState::Connecting);
        self.link
            .connect(self.ssid, self.passphrase)
            .await
            .map_err(|e| {
                warn!("Network connect failed: {}", e);
                SyncError::NetworkUnavailable
            })?;

        self.transition(SyncState::Querying);
        let wire_secs = self.sntp.query(&mut self.stack).await?;

        self.transition(SyncState::Computing);
        let utc = from_wire(wire_secs);
        let (local, dst) = localize(&self.rule, utc)?;
        debug!("UTC {} -> {}", utc.unix_secs(), dst.label());

        self.transition(SyncState::Writing);
        rtc.set_datetime(local)?;
        self.dst = dst;
        self.last_synced = Some(utc);
        Ok(local)
    }

    fn transition(&mut self, next: SyncState) {
        trace!("Sync state {} -> {}", self.state, next);
        self.state = next;
    }
}
