//! Clock configuration structures

/// SNTP client configuration
#[derive(Debug, Clone)]
pub struct SntpConfig {
    /// NTP servers to try (in order, rotated on failure)
    pub servers: &'static [&'static str],
    /// Server port (UDP 123)
    pub port: u16,
    /// Per-request reply timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum accepted stratum level (1-15)
    ///
    /// Stratum 0 is a kiss-o'-death reply, 16 means unsynchronized.
    pub max_stratum: u8,
}

impl Default for SntpConfig {
    fn default() -> Self {
        Self {
            servers: &[
                "uk.pool.ntp.org",
                "ntp2d.mcc.ac.uk",
                "ntp2c.mcc.ac.uk",
                "ntp.cis.strath.ac.uk",
            ],
            port: 123,
            timeout_ms: 10_000,
            max_stratum: 15,
        }
    }
}

/// Appliance configuration
#[derive(Debug, Clone)]
pub struct ClockConfig {
    /// Network name handed to the link on connect
    pub ssid: &'static str,
    /// Network passphrase handed to the link on connect
    pub passphrase: &'static str,
    pub sntp: SntpConfig,
    /// Upper bound for one whole connect/query/write cycle
    pub sync_deadline_ms: u32,
    /// RTC polling cadence of the display loop
    pub poll_interval_ms: u32,
    /// Local hour at which the daily resync runs
    pub resync_hour: u8,
    /// How long the startup banner stays up
    pub splash_ms: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            ssid: "",
            passphrase: "",
            sntp: SntpConfig::default(),
            sync_deadline_ms: 30_000,
            poll_interval_ms: 200,
            resync_hour: 3,
            splash_ms: 2_000,
        }
    }
}
