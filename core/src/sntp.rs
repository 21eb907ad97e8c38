//! SNTP client
//!
//! Sends the minimal 48-byte client request (LI=0, VN=3, Mode=3) and reads
//! only the transmit-timestamp seconds out of the reply. Servers are tried
//! in one bounded pass starting at a rotating cursor, so an unreachable host
//! neither wedges the client nor starves the hosts listed after it.

use core::net::SocketAddr;

use clock_hal::{NetworkError, UdpStack};

use crate::config::SntpConfig;
use crate::error::SyncError;
use crate::time::read_wire;

/// Size of an NTP packet without extension fields
pub const NTP_PACKET_LEN: usize = 48;

/// First byte of a client request: LI=0, VN=3, Mode=3 (client)
const CLIENT_REQUEST: u8 = 0x1B;

/// Offset of the transmit timestamp seconds field
const TRANSMIT_SECS_OFFSET: usize = 40;

const MODE_SERVER: u8 = 4;
const MODE_BROADCAST: u8 = 5;

/// Failure of one request to one server
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SntpError {
    /// Host name did not resolve
    Dns,
    /// Send/receive failed or timed out
    Network(NetworkError),
    /// Reply too short
    Truncated,
    /// Reply is not from a server (wrong mode)
    InvalidMode,
    /// Stratum 0 (kiss-o'-death) or above the configured maximum
    InvalidStratum,
    /// Transmit timestamp is zero
    MissingTimestamp,
}

impl SntpError {
    /// The server answered, but with an unusable packet
    pub const fn is_malformed(self) -> bool {
        !matches!(self, Self::Dns | Self::Network(_))
    }
}

/// Build the 48-byte client request
pub const fn request_packet() -> [u8; NTP_PACKET_LEN] {
    let mut packet = [0u8; NTP_PACKET_LEN];
    packet[0] = CLIENT_REQUEST;
    packet
}

/// SNTP client for time synchronization
pub struct SntpClient {
    config: SntpConfig,
    /// Index of the server the next pass starts at
    cursor: usize,
}

impl SntpClient {
    pub fn new(config: SntpConfig) -> Self {
        Self { config, cursor: 0 }
    }

    pub fn config(&self) -> &SntpConfig {
        &self.config
    }

    /// Server the next query will try first
    pub fn preferred_server(&self) -> Option<&'static str> {
        self.config.servers.get(self.cursor).copied()
    }

    /// Query the server list once and return the raw wire seconds
    ///
    /// Each server is tried at most once: at most N resolutions and N
    /// exchanges for N servers. On success the answering server becomes the
    /// first one tried next time; after a failed pass the cursor moves on by
    /// one. The cursor already points past a server while it is being
    /// tried, so a pass cancelled mid-request still rotates.
    ///
    /// # Errors
    ///
    /// `MalformedResponse` if any server answered with an unusable packet,
    /// otherwise `TimeServerUnreachable`.
    pub async fn query<U: UdpStack>(&mut self, stack: &mut U) -> Result<u32, SyncError> {
        let servers = self.config.servers;
        if servers.is_empty() {
            warn!("No NTP servers configured");
            return Err(SyncError::TimeServerUnreachable);
        }

        let start = self.cursor % servers.len();
        let mut malformed = false;
        for i in 0..servers.len() {
            let index = (start + i) % servers.len();
            let server = servers[index];
            self.cursor = (index + 1) % servers.len();
            info!("Querying NTP server {} ({}/{})", server, i + 1, servers.len());
            match self.sntp_request(stack, server).await {
                Ok(wire_secs) => {
                    info!("NTP server {} answered: {}", server, wire_secs);
                    self.cursor = index;
                    return Ok(wire_secs);
                }
                Err(e) => {
                    warn!("NTP request to {} failed: {}", server, e);
                    malformed |= e.is_malformed();
                }
            }
        }

        self.cursor = (start + 1) % servers.len();
        error!("All NTP servers failed");
        if malformed {
            Err(SyncError::MalformedResponse)
        } else {
            Err(SyncError::TimeServerUnreachable)
        }
    }

    /// Send one request to `server` and validate the reply
    async fn sntp_request<U: UdpStack>(
        &self,
        stack: &mut U,
        server: &str,
    ) -> Result<u32, SntpError> {
        let ip = stack.resolve(server).await.map_err(|_| SntpError::Dns)?;
        let remote = SocketAddr::new(ip, self.config.port);

        let request = request_packet();
        let mut response = [0u8; NTP_PACKET_LEN];
        let len = stack
            .exchange(remote, &request, &mut response, self.config.timeout_ms)
            .await
            .map_err(SntpError::Network)?;
        debug!("Received {} bytes from {}", len, server);

        self.parse_response(&response[..len.min(NTP_PACKET_LEN)])
    }

    /// Sanity-check a reply and extract the transmit seconds field
    pub fn parse_response(&self, response: &[u8]) -> Result<u32, SntpError> {
        if response.len() < NTP_PACKET_LEN {
            return Err(SntpError::Truncated);
        }

        let mode = response[0] & 0x07;
        if mode != MODE_SERVER && mode != MODE_BROADCAST {
            return Err(SntpError::InvalidMode);
        }

        let stratum = response[1];
        if stratum == 0 || stratum > self.config.max_stratum {
            warn!("Invalid stratum {} (max {})", stratum, self.config.max_stratum);
            return Err(SntpError::InvalidStratum);
        }

        match read_wire(response, TRANSMIT_SECS_OFFSET) {
            Some(0) | None => Err(SntpError::MissingTimestamp),
            Some(secs) => Ok(secs),
        }
    }
}

impl Default for SntpClient {
    fn default() -> Self {
        Self::new(SntpConfig::default())
    }
}
