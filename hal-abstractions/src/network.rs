//! Network collaborator traits
//!
//! The link (Wi-Fi association, Ethernet DHCP, ...) and the datagram stack
//! are separate so the sync controller can own the link lifecycle while the
//! SNTP client only sees UDP.

use core::future::Future;
use core::net::{IpAddr, SocketAddr};

/// Network operation errors
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// Link association or address configuration failed
    LinkDown,
    /// DNS resolution failed
    DnsError,
    /// Socket bind/send/receive error
    SocketError,
    /// Request timeout
    Timeout,
}

impl core::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::LinkDown => write!(f, "Network link down"),
            Self::DnsError => write!(f, "DNS resolution failed"),
            Self::SocketError => write!(f, "Socket error"),
            Self::Timeout => write!(f, "Request timeout"),
        }
    }
}

impl core::error::Error for NetworkError {}

/// Network association (bring-up / tear-down)
///
/// No retries happen at this boundary; callers own retry policy.
pub trait NetworkLink {
    /// Associate with the network and wait until it carries traffic
    fn connect(
        &mut self,
        ssid: &str,
        passphrase: &str,
    ) -> impl Future<Output = Result<(), NetworkError>>;

    /// Drop the association; idempotent
    fn disconnect(&mut self) -> impl Future<Output = ()>;
}

/// Minimal UDP stack: name resolution and one request/response exchange
pub trait UdpStack {
    /// Resolve `host` to its first address
    fn resolve(&mut self, host: &str) -> impl Future<Output = Result<IpAddr, NetworkError>>;

    /// Send `request` to `remote` and wait for a single reply
    ///
    /// Opens exactly one socket for the exchange and closes it before
    /// returning. The wait for the reply is bounded by `timeout_ms`.
    /// Returns the number of bytes written into `response`.
    fn exchange(
        &mut self,
        remote: SocketAddr,
        request: &[u8],
        response: &mut [u8],
        timeout_ms: u64,
    ) -> impl Future<Output = Result<usize, NetworkError>>;
}
