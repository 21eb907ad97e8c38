//! Synchronization error taxonomy
//!
//! None of these are fatal: every failure leaves the RTC at its last value
//! and hands control back to the display loop.

use clock_hal::RtcError;

/// Outcome of a failed synchronization attempt
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncError {
    /// Network association failed or timed out
    NetworkUnavailable,
    /// No configured time server answered within its timeout
    TimeServerUnreachable,
    /// A server answered with a short or implausible packet
    MalformedResponse,
    /// The whole cycle overran its deadline
    DeadlineExceeded,
    /// RTC read/write or date conversion failed
    Rtc(RtcError),
}

impl From<RtcError> for SyncError {
    fn from(e: RtcError) -> Self {
        SyncError::Rtc(e)
    }
}

impl core::fmt::Display for SyncError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NetworkUnavailable => write!(f, "Network unavailable"),
            Self::TimeServerUnreachable => write!(f, "Time server unreachable"),
            Self::MalformedResponse => write!(f, "Malformed time server response"),
            Self::DeadlineExceeded => write!(f, "Synchronization deadline exceeded"),
            Self::Rtc(e) => write!(f, "RTC failure: {}", e),
        }
    }
}

impl core::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Rtc(e) => Some(e),
            _ => None,
        }
    }
}
