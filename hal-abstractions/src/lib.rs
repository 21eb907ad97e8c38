//! Hardware abstraction traits for the NTP clock appliance
//!
//! This crate defines traits that abstract over hardware differences
//! between boards. BSPs implement these traits; `clock-core` consumes them.
//!
//! - **`rtc`**: calendar register set (`DateTime`) and the `Rtc` trait
//! - **`network`**: link bring-up (`NetworkLink`) and one-shot UDP (`UdpStack`)
//! - **`display`**: character LCD (`CharacterDisplay`)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
pub mod network;
pub mod rtc;

pub use display::{CharacterDisplay, DisplayError};
pub use network::{NetworkError, NetworkLink, UdpStack};
pub use rtc::{DateTime, DayOfWeek, Rtc, RtcError};
