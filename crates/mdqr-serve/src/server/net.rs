//! Listen-port negotiation and LAN address discovery.

use crate::error::BindError;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::TcpListener;

/// Consecutive ports tried before giving up.
pub const MAX_PORT_ATTEMPTS: u16 = 10;

/// Bind `host` on the first free port in `first_port..first_port + attempts`.
///
/// Only `AddrInUse` moves on to the next port; any other error stops the
/// search. Port `0` asks the OS for a free port and is tried once.
pub async fn bind_with_retry(
    host: IpAddr,
    first_port: u16,
    attempts: u16,
) -> Result<(TcpListener, u16), BindError> {
    let attempts = if first_port == 0 { 1 } else { attempts.max(1) };
    let mut last = first_port;

    for offset in 0..attempts {
        let Some(port) = first_port.checked_add(offset) else {
            break;
        };
        last = port;

        match TcpListener::bind(SocketAddr::new(host, port)).await {
            Ok(listener) => {
                let bound = listener
                    .local_addr()
                    .map_err(|source| BindError::Io { port, source })?
                    .port();
                return Ok((listener, bound));
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                tracing::debug!(port, "port in use, trying next");
                continue;
            }
            Err(source) => return Err(BindError::Io { port, source }),
        }
    }

    Err(BindError::PortsExhausted {
        first: first_port,
        last,
    })
}

/// One address of a network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddr {
    pub name: String,
    pub ip: IpAddr,
    pub is_loopback: bool,
}

/// Choose the address to advertise: an IPv4 address on a preferred interface
/// (in preference order), then any non-loopback IPv4, else `127.0.0.1`.
pub fn pick_lan_ip(interfaces: &[InterfaceAddr], preferred: &[String]) -> IpAddr {
    let usable = |iface: &&InterfaceAddr| iface.ip.is_ipv4() && !iface.is_loopback;

    preferred
        .iter()
        .find_map(|name| interfaces.iter().filter(usable).find(|iface| &iface.name == name))
        .or_else(|| interfaces.iter().find(usable))
        .map(|iface| iface.ip)
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// The LAN address of this machine, per [`pick_lan_ip`].
pub fn lan_ip(preferred: &[String]) -> IpAddr {
    let interfaces = match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            tracing::warn!(error = %e, "could not list network interfaces");
            Vec::new()
        }
    };

    let addrs: Vec<InterfaceAddr> = interfaces
        .into_iter()
        .map(|iface| InterfaceAddr {
            is_loopback: iface.is_loopback(),
            ip: iface.ip(),
            name: iface.name,
        })
        .collect();

    pick_lan_ip(&addrs, preferred)
}
