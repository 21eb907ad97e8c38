//! Scripted collaborators for unit tests

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clock_hal::{
    CharacterDisplay, DateTime, DayOfWeek, DisplayError, NetworkError, NetworkLink, Rtc, RtcError,
    UdpStack,
};
use embedded_hal_async::delay::DelayNs;

/// A well-formed server reply (stratum 2, mode 4) carrying `wire_secs`
pub(crate) fn server_reply(wire_secs: u32) -> [u8; 48] {
    let mut packet = [0u8; 48];
    packet[0] = 0x24; // LI=0, VN=4, Mode=4
    packet[1] = 2;
    packet[40..44].copy_from_slice(&wire_secs.to_be_bytes());
    packet
}

pub(crate) fn datetime(
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
) -> DateTime {
    DateTime::new(year, month, day, DayOfWeek::Monday, hour, minute, second).unwrap()
}

pub(crate) enum Reply {
    Packet([u8; 48]),
    Raw(Vec<u8>),
    Timeout,
    /// Never answers; only a deadline gets the caller out
    Hang,
}

/// UDP stack with per-host scripted replies; unknown hosts fail DNS
#[derive(Default)]
pub(crate) struct FakeStack {
    hosts: Vec<(String, Reply)>,
    pub resolutions: usize,
    pub exchanges: usize,
    pub resolved_hosts: Vec<String>,
    pub last_request: Vec<u8>,
    pub last_remote: Option<SocketAddr>,
}

impl FakeStack {
    pub fn with_host(mut self, host: &str, reply: Reply) -> Self {
        self.hosts.push((host.to_string(), reply));
        self
    }

    fn address(index: usize) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, index as u8 + 1))
    }
}

impl UdpStack for FakeStack {
    async fn resolve(&mut self, host: &str) -> Result<IpAddr, NetworkError> {
        self.resolutions += 1;
        self.resolved_hosts.push(host.to_string());
        self.hosts
            .iter()
            .position(|(name, _)| name == host)
            .map(Self::address)
            .ok_or(NetworkError::DnsError)
    }

    async fn exchange(
        &mut self,
        remote: SocketAddr,
        request: &[u8],
        response: &mut [u8],
        _timeout_ms: u64,
    ) -> Result<usize, NetworkError> {
        self.exchanges += 1;
        self.last_request = request.to_vec();
        self.last_remote = Some(remote);
        let index = (0..self.hosts.len())
            .find(|&i| Self::address(i) == remote.ip())
            .ok_or(NetworkError::SocketError)?;
        let bytes: &[u8] = match &self.hosts[index].1 {
            Reply::Packet(packet) => packet,
            Reply::Raw(raw) => raw,
            Reply::Timeout => return Err(NetworkError::Timeout),
            Reply::Hang => core::future::pending().await,
        };
        let len = bytes.len().min(response.len());
        response[..len].copy_from_slice(&bytes[..len]);
        Ok(len)
    }
}

#[derive(Default)]
pub(crate) struct FakeLink {
    pub refuse: bool,
    pub connects: usize,
    pub disconnects: usize,
    pub credentials: Option<(String, String)>,
}

impl NetworkLink for FakeLink {
    async fn connect(&mut self, ssid: &str, passphrase: &str) -> Result<(), NetworkError> {
        self.connects += 1;
        self.credentials = Some((ssid.to_string(), passphrase.to_string()));
        if self.refuse {
            Err(NetworkError::LinkDown)
        } else {
            Ok(())
        }
    }

    async fn disconnect(&mut self) {
        self.disconnects += 1;
    }
}

/// RTC that replays scripted reads, then keeps returning the last value
#[derive(Default)]
pub(crate) struct FakeRtc {
    pub script: VecDeque<DateTime>,
    pub current: Option<DateTime>,
    pub writes: Vec<DateTime>,
    pub fail_writes: bool,
}

impl FakeRtc {
    pub fn scripted(reads: impl IntoIterator<Item = DateTime>) -> Self {
        Self {
            script: reads.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl Rtc for FakeRtc {
    fn now(&mut self) -> Result<DateTime, RtcError> {
        if let Some(next) = self.script.pop_front() {
            self.current = Some(next);
        }
        self.current.ok_or(RtcError::NotInitialized)
    }

    fn set_datetime(&mut self, datetime: DateTime) -> Result<(), RtcError> {
        if self.fail_writes {
            return Err(RtcError::HardwareError);
        }
        self.writes.push(datetime);
        self.current = Some(datetime);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op {
    HideCursor,
    BacklightOn,
    Clear,
    MoveTo(u8, u8),
    Write(String),
}

#[derive(Default)]
pub(crate) struct FakeDisplay {
    pub ops: Vec<Op>,
}

impl FakeDisplay {
    pub fn take(&mut self) -> Vec<Op> {
        core::mem::take(&mut self.ops)
    }
}

impl CharacterDisplay for FakeDisplay {
    fn hide_cursor(&mut self) -> Result<(), DisplayError> {
        self.ops.push(Op::HideCursor);
        Ok(())
    }

    fn backlight_on(&mut self) -> Result<(), DisplayError> {
        self.ops.push(Op::BacklightOn);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        self.ops.push(Op::Clear);
        Ok(())
    }

    fn move_to(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        self.ops.push(Op::MoveTo(col, row));
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> Result<(), DisplayError> {
        self.ops.push(Op::Write(text.to_string()));
        Ok(())
    }
}

/// Delay that completes immediately and tallies the requested time
#[derive(Default)]
pub(crate) struct NoDelay {
    pub elapsed_ns: u64,
}

impl NoDelay {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for NoDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}
