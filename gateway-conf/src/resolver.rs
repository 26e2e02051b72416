//! Hostname resolution used for portal and platform servers

use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use tracing::debug;

/// Resolves a hostname to an IPv4 address, best effort
pub trait HostResolver: Send + Sync {
    /// `None` when the name does not resolve to any IPv4 address
    fn resolve_ipv4(&self, host: &str) -> Option<Ipv4Addr>;
}

/// Resolver backed by the system's name service
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn resolve_ipv4(&self, host: &str) -> Option<Ipv4Addr> {
        let addrs = match (host, 0).to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!("Resolving {} failed: {}", host, e);
                return None;
            }
        };

        addrs.map(|addr| addr.ip()).find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
    }
}

/// Resolver that never resolves anything, for offline checks
#[derive(Debug, Clone, Copy, Default)]
pub struct NoResolver;

impl HostResolver for NoResolver {
    fn resolve_ipv4(&self, _host: &str) -> Option<Ipv4Addr> {
        None
    }
}
