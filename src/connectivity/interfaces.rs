//! Local network interface enumeration.
//!
//! Produces a fresh, read-only snapshot of the host's interfaces on every call.
//! The prober only needs each interface's "up" flag and whether its addresses
//! are loopback, so that is all a snapshot carries.

use std::io;
use std::net::IpAddr;

/// An address assigned to an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceAddr {
    /// An IPv4 or IPv6 address.
    Ip(IpAddr),
    /// Any other address family (link-layer, packet, ...).
    Other,
}

impl InterfaceAddr {
    /// Returns true if this is an IP address outside the loopback range.
    pub fn is_non_loopback_ip(&self) -> bool {
        match self {
            InterfaceAddr::Ip(ip) => !ip.is_loopback(),
            InterfaceAddr::Other => false,
        }
    }
}

/// A network interface as seen at check time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSnapshot {
    /// Interface name, e.g. `eth0`.
    pub name: String,
    /// Whether the interface is administratively up.
    pub up: bool,
    /// Addresses assigned to the interface.
    pub addrs: Vec<InterfaceAddr>,
}

impl InterfaceSnapshot {
    /// Creates a snapshot with no addresses.
    pub fn new(name: impl Into<String>, up: bool) -> Self {
        Self {
            name: name.into(),
            up,
            addrs: Vec::new(),
        }
    }

    /// Adds an address.
    pub fn with_addr(mut self, addr: InterfaceAddr) -> Self {
        self.addrs.push(addr);
        self
    }

    /// Adds an IP address.
    pub fn with_ip(self, ip: impl Into<IpAddr>) -> Self {
        self.with_addr(InterfaceAddr::Ip(ip.into()))
    }

    /// Counts the IP addresses on this interface that are not loopback.
    pub fn non_loopback_count(&self) -> usize {
        self.addrs
            .iter()
            .filter(|addr| addr.is_non_loopback_ip())
            .count()
    }
}

/// Source of interface snapshots.
pub trait InterfaceSource: Send + Sync {
    /// Enumerates the host's interfaces.
    ///
    /// An error here is a local system fault, not a network condition.
    fn interfaces(&self) -> io::Result<Vec<InterfaceSnapshot>>;
}

/// Reads interfaces from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl SystemInterfaces {
    /// Creates a new system interface source.
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> io::Result<Vec<InterfaceSnapshot>> {
        use nix::ifaddrs::getifaddrs;
        use nix::net::if_::InterfaceFlags;
        use std::collections::BTreeMap;
        use std::net::{SocketAddrV4, SocketAddrV6};

        // getifaddrs yields one entry per (interface, address) pair.
        let mut by_name: BTreeMap<String, InterfaceSnapshot> = BTreeMap::new();
        for entry in getifaddrs().map_err(io::Error::from)? {
            let snapshot = by_name
                .entry(entry.interface_name.clone())
                .or_insert_with(|| {
                    InterfaceSnapshot::new(
                        entry.interface_name.clone(),
                        entry.flags.contains(InterfaceFlags::IFF_UP),
                    )
                });

            let Some(address) = entry.address else {
                continue;
            };
            let addr = if let Some(sin) = address.as_sockaddr_in() {
                InterfaceAddr::Ip(IpAddr::V4(*SocketAddrV4::from(*sin).ip()))
            } else if let Some(sin6) = address.as_sockaddr_in6() {
                InterfaceAddr::Ip(IpAddr::V6(*SocketAddrV6::from(*sin6).ip()))
            } else {
                InterfaceAddr::Other
            };
            snapshot.addrs.push(addr);
        }

        Ok(by_name.into_values().collect())
    }
}

#[cfg(not(unix))]
impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> io::Result<Vec<InterfaceSnapshot>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "interface enumeration is not supported on this platform",
        ))
    }
}

/// Interface counts used to decide the local part of a connectivity check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceSummary {
    /// Number of interfaces found.
    pub total: usize,
    /// Number of interfaces that are up.
    pub up: usize,
    /// Number of non-loopback IP addresses across up interfaces.
    pub non_loopback: usize,
}

impl InterfaceSummary {
    /// Summarizes a set of interface snapshots.
    pub fn of(interfaces: &[InterfaceSnapshot]) -> Self {
        let up: Vec<&InterfaceSnapshot> = interfaces.iter().filter(|iface| iface.up).collect();
        Self {
            total: interfaces.len(),
            up: up.len(),
            non_loopback: up.iter().map(|iface| iface.non_loopback_count()).sum(),
        }
    }
}
