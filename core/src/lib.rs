//! Platform-agnostic core logic for the NTP clock appliance
//!
//! This crate contains the clock's business logic. It has NO hardware
//! dependencies: every collaborator (network link, UDP, RTC, LCD, delays)
//! comes in through the traits of `clock-hal` and `embedded-hal-async`.
//!
//! - **`time`**: NTP wire epoch codec, calendar math, summer-time rule
//! - **`sntp`**: one-pass SNTP query over a rotating server list
//! - **`sync`**: sync state machine, overall deadline, daily resync schedule
//! - **`display`**: LCD refresh loop with seconds-only partial redraw
//! - **`config`**: `ClockConfig` / `SntpConfig` with defaults

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod config;
pub mod display;
pub mod error;
pub mod sntp;
pub mod sync;
pub mod time;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ClockConfig, SntpConfig};
pub use display::{DisplayRefreshLoop, Redraw};
pub use error::SyncError;
pub use sntp::SntpClient;
pub use sync::{ClockSyncController, ResyncSchedule, SyncState};
pub use time::{DstRule, DstState, Timestamp};
