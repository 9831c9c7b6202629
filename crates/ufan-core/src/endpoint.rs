//! IPv4 endpoints and their compact ids.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

/// Error returned when an endpoint string is not `<ipv4>:<port>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid endpoint: '{input}' (expected <ipv4>:<port>)")]
pub struct EndpointError {
    pub input: String,
}

/// Parse `<ipv4>:<port>`.
///
/// The split happens at the last colon; the host must be a dotted quad and
/// the port a decimal number no larger than 65535.
pub fn parse_endpoint(s: &str) -> Result<SocketAddrV4, EndpointError> {
    let err = || EndpointError {
        input: s.to_string(),
    };

    let (ip, port) = s.rsplit_once(':').ok_or_else(err)?;
    if ip.is_empty() || port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }

    let ip: Ipv4Addr = ip.parse().map_err(|_| err())?;
    let port: u16 = port.parse().map_err(|_| err())?;
    Ok(SocketAddrV4::new(ip, port))
}

/// Compact id used in log lines: `(ip << 16) | port`.
#[must_use]
pub fn endpoint_id(addr: &SocketAddrV4) -> u64 {
    (u64::from(u32::from(*addr.ip())) << 16) | u64::from(addr.port())
}

/// Narrow a socket address to IPv4, as returned by a v4-bound socket.
#[must_use]
pub const fn as_v4(addr: SocketAddr) -> Option<SocketAddrV4> {
    match addr {
        SocketAddr::V4(v4) => Some(v4),
        SocketAddr::V6(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint() {
        let ep = parse_endpoint("127.0.0.1:42069").unwrap();
        assert_eq!(ep, SocketAddrV4::new(Ipv4Addr::LOCALHOST, 42069));
    }

    #[test]
    fn test_parse_endpoint_rejects_garbage() {
        for input in [
            "",
            "127.0.0.1",
            ":42069",
            "127.0.0.1:",
            "localhost:42069",
            "127.0.0.1:65536",
            "127.0.0.1:+80",
            "::1:80",
            "1.2.3:80",
        ] {
            assert!(parse_endpoint(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_endpoint_error_message() {
        let err = parse_endpoint("nope").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid endpoint: 'nope' (expected <ipv4>:<port>)"
        );
    }

    #[test]
    fn test_endpoint_id() {
        let ep = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 42069);
        assert_eq!(endpoint_id(&ep), (0x7F00_0001_u64 << 16) | 42069);
    }
}
