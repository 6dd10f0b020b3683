use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use anyhow::{anyhow, Context, Result};
use tokio::net::{lookup_host, UdpSocket};

/// UDP port the controller listens on.
pub const DEVICE_PORT: u16 = 1234;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEVICE_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Resolves the host, preferring an IPv4 address.
    pub async fn resolve(&self) -> Result<SocketAddr> {
        let addrs = lookup_host((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("failed to resolve {self}"))?;
        pick_address(addrs).ok_or_else(|| anyhow!("{self} resolved to no addresses"))
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// The controller's network stack only listens on IPv4, so an AAAA record
/// listed first must not win over an A record.
fn pick_address(addrs: impl IntoIterator<Item = SocketAddr>) -> Option<SocketAddr> {
    let mut first = None;
    for addr in addrs {
        if addr.is_ipv4() {
            return Some(addr);
        }
        first.get_or_insert(addr);
    }
    first
}

/// Binds an ephemeral local socket in the same address family as `remote`.
pub async fn bind_for(remote: SocketAddr) -> Result<UdpSocket> {
    let local: SocketAddr = match remote {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    UdpSocket::bind(local)
        .await
        .with_context(|| format!("failed to bind local socket {local}"))
}
