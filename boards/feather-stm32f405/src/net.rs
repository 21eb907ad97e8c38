//! embassy-net implementations of the clock's network traits
//!
//! The W5500 is wired Ethernet: "connecting" means waiting for the link and
//! a DHCP lease, and there are no credentials to present.

use core::net::{IpAddr, SocketAddr};

use clock_hal::{NetworkError, NetworkLink, UdpStack};
use defmt::{debug, info, warn, Debug2Format};
use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{with_timeout, Duration};

/// Link bring-up over the shared embassy-net stack
pub struct EthLink {
    stack: Stack<'static>,
    timeout: Duration,
}

impl EthLink {
    pub fn new(stack: Stack<'static>, timeout_ms: u64) -> Self {
        Self {
            stack,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    fn log_config(&self) {
        if let Some(config) = self.stack.config_v4() {
            let ip = config.address.address();
            let octets = ip.octets();
            info!("IP: {}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3]);

            if let Some(gateway) = config.gateway {
                let gw_octets = gateway.octets();
                info!(
                    "Gateway: {}.{}.{}.{}",
                    gw_octets[0], gw_octets[1], gw_octets[2], gw_octets[3]
                );
            }
        }
    }
}

impl NetworkLink for EthLink {
    async fn connect(&mut self, ssid: &str, _passphrase: &str) -> Result<(), NetworkError> {
        if !ssid.is_empty() {
            debug!("Wired link, ignoring network name {}", ssid);
        }

        info!("Waiting for link and DHCP...");
        with_timeout(self.timeout, self.stack.wait_config_up())
            .await
            .map_err(|_| {
                warn!("No DHCP lease within {} ms", self.timeout.as_millis());
                NetworkError::LinkDown
            })?;

        info!("Network is UP!");
        self.log_config();
        Ok(())
    }

    async fn disconnect(&mut self) {
        // The lease is kept; the W5500 has no radio to power down
        debug!("Network link released");
    }
}

/// One-shot DNS and UDP exchanges over embassy-net
pub struct EmbassyUdp {
    stack: Stack<'static>,
}

impl EmbassyUdp {
    pub fn new(stack: Stack<'static>) -> Self {
        Self { stack }
    }
}

impl UdpStack for EmbassyUdp {
    async fn resolve(&mut self, host: &str) -> Result<IpAddr, NetworkError> {
        let addresses = self
            .stack
            .dns_query(host, DnsQueryType::A)
            .await
            .map_err(|e| {
                warn!("DNS lookup of {} failed: {}", host, e);
                NetworkError::DnsError
            })?;
        let address = addresses.first().copied().ok_or(NetworkError::DnsError)?;
        info!("Resolved {} to {}", host, address);
        Ok(address.into())
    }

    async fn exchange(
        &mut self,
        remote: SocketAddr,
        request: &[u8],
        response: &mut [u8],
        timeout_ms: u64,
    ) -> Result<usize, NetworkError> {
        let endpoint = IpEndpoint::new(remote.ip().into(), remote.port());

        let mut rx_meta = [PacketMetadata::EMPTY; 2];
        let mut rx_buffer = [0u8; 128];
        let mut tx_meta = [PacketMetadata::EMPTY; 2];
        let mut tx_buffer = [0u8; 128];
        let mut socket = UdpSocket::new(
            self.stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(0).map_err(|e| {
            warn!("UDP bind failed: {}", e);
            NetworkError::SocketError
        })?;

        socket.send_to(request, endpoint).await.map_err(|e| {
            warn!("UDP send failed: {}", e);
            NetworkError::SocketError
        })?;
        debug!("Sent {} bytes to {}", request.len(), Debug2Format(&endpoint));

        let timeout = Duration::from_millis(timeout_ms);
        let (len, meta) = with_timeout(timeout, socket.recv_from(response))
            .await
            .map_err(|_| NetworkError::Timeout)?
            .map_err(|e| {
                warn!("UDP receive failed: {}", e);
                NetworkError::SocketError
            })?;

        if meta.endpoint.addr != endpoint.addr {
            warn!("Reply from unexpected peer {}", Debug2Format(&meta.endpoint));
            return Err(NetworkError::SocketError);
        }
        Ok(len)
    }
}
