//! NTP wire epoch <-> Unix epoch codec

/// NTP epoch offset (1900-01-01 to 1970-01-01 in seconds)
pub const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

/// Length of one NTP era (2^32 seconds)
const NTP_ERA_SECS: i64 = 1 << 32;

/// Wire values below this are read as era 1 (from 2036-02-07 06:28:16 UTC)
const ERA_PIVOT: u32 = 0x8000_0000;

/// Whole seconds since 1970-01-01 00:00:00 UTC
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    unix_secs: i64,
}

impl Timestamp {
    pub const fn from_unix(unix_secs: i64) -> Self {
        Self { unix_secs }
    }

    pub const fn unix_secs(self) -> i64 {
        self.unix_secs
    }

    /// Shift by a signed number of seconds
    #[must_use]
    pub const fn add_secs(self, secs: i64) -> Self {
        Self::from_unix(self.unix_secs + secs)
    }
}

/// Convert an NTP transmit-timestamp seconds field to a `Timestamp`
///
/// Values with the top bit clear belong to era 1, so the 32-bit field
/// covers 1968-01-20 through 2104-02-26.
pub const fn from_wire(wire_secs: u32) -> Timestamp {
    let mut ntp_secs = wire_secs as i64;
    if wire_secs < ERA_PIVOT {
        ntp_secs += NTP_ERA_SECS;
    }
    Timestamp::from_unix(ntp_secs - NTP_UNIX_OFFSET)
}

/// Convert a `Timestamp` to the 32-bit NTP seconds field (modulo one era)
pub const fn to_wire(timestamp: Timestamp) -> u32 {
    (timestamp.unix_secs + NTP_UNIX_OFFSET).rem_euclid(NTP_ERA_SECS) as u32
}

/// Read a network-order (big-endian) `u32` at `offset`
///
/// Returns `None` if `bytes` is too short.
pub fn read_wire(bytes: &[u8], offset: usize) -> Option<u32> {
    let field = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes([field[0], field[1], field[2], field[3]]))
}
