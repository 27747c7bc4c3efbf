//! Transport module - connections to the array's management endpoints.
//!
//! Provides:
//! - [`Transport`]: one request/response round trip at a time
//! - [`Channel`]: a single plain or TLS socket
//! - [`connect_first`] and [`MultiEndpointTransport`]: endpoint selection
//! - [`ClosedTransport`]: the sentinel left behind by `close`

mod channel;
mod selector;
mod tls;

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, XcliError};
use crate::protocol::Element;

pub use channel::Channel;
pub use selector::{connect_first, plain_connector, tls_connector, Connector, MultiEndpointTransport};
pub use tls::{TlsSettings, ValidateFn};

/// A request/response transport.
pub trait Transport: Send + fmt::Debug {
    /// Send a serialized request and return the parsed response root.
    fn send(&mut self, payload: &[u8]) -> Result<Element>;

    fn is_connected(&self) -> bool;

    /// Close the transport. Idempotent.
    fn close(&mut self);

    /// Tear down and re-establish the connection.
    fn reconnect(&mut self) -> Result<()>;

    /// Register more candidate endpoints.
    fn add_endpoints(&mut self, endpoints: Vec<Endpoint>) -> Result<()> {
        let _ = endpoints;
        Err(XcliError::Unsupported(
            "this transport has a fixed endpoint".to_string(),
        ))
    }
}

/// Stand-in for a transport that has been closed.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClosedTransport;

impl ClosedTransport {
    fn error() -> XcliError {
        XcliError::ClosedTransport {
            message: "transport is closed".to_string(),
            failures: Vec::new(),
        }
    }
}

impl Transport for ClosedTransport {
    fn send(&mut self, _payload: &[u8]) -> Result<Element> {
        Err(Self::error())
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn close(&mut self) {}

    fn reconnect(&mut self) -> Result<()> {
        Err(Self::error())
    }
}

/// A connection target: host plus optional port.
///
/// Without a port the connector's default applies (7777 plain, 7778 TLS).
///
/// ```
/// use xcli_client::transport::Endpoint;
///
/// let ep: Endpoint = "array-a.example.com:7778".parse().unwrap();
/// assert_eq!(ep.host, "array-a.example.com");
/// assert_eq!(ep.port, Some(7778));
/// assert_eq!(ep.to_string(), "array-a.example.com:7778");
///
/// let bare: Endpoint = "10.0.0.5".parse().unwrap();
/// assert_eq!(bare.port_or(7777), 7777);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: Option<u16>,
}

impl Endpoint {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
        }
    }

    pub fn with_port(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port: Some(port),
        }
    }

    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }
}

impl FromStr for Endpoint {
    type Err = XcliError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(XcliError::Config("empty endpoint".to_string()));
        }
        // [v6]:port
        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| XcliError::Config(format!("invalid endpoint '{}'", s)))?;
            return match tail.strip_prefix(':') {
                Some(port) => Ok(Self::with_port(host, parse_port(s, port)?)),
                None if tail.is_empty() => Ok(Self::new(host)),
                None => Err(XcliError::Config(format!("invalid endpoint '{}'", s))),
            };
        }
        match s.split_once(':') {
            // A bare IPv6 address has more than one colon.
            Some((host, port)) if !port.contains(':') => {
                Ok(Self::with_port(host, parse_port(s, port)?))
            }
            _ => Ok(Self::new(s)),
        }
    }
}

fn parse_port(endpoint: &str, port: &str) -> Result<u16> {
    port.parse()
        .map_err(|_| XcliError::Config(format!("invalid port in endpoint '{}'", endpoint)))
}

impl From<(&str, u16)> for Endpoint {
    fn from((host, port): (&str, u16)) -> Self {
        Self::with_port(host, port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) if self.host.contains(':') => write!(f, "[{}]:{}", self.host, port),
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => f.write_str(&self.host),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_only() {
        let ep: Endpoint = "array-a".parse().unwrap();
        assert_eq!(ep, Endpoint::new("array-a"));
    }

    #[test]
    fn test_parse_host_port() {
        let ep: Endpoint = "10.1.2.3:7777".parse().unwrap();
        assert_eq!(ep, Endpoint::with_port("10.1.2.3", 7777));
    }

    #[test]
    fn test_parse_ipv6() {
        let bare: Endpoint = "fe80::1".parse().unwrap();
        assert_eq!(bare, Endpoint::new("fe80::1"));
        let bracketed: Endpoint = "[fe80::1]:7778".parse().unwrap();
        assert_eq!(bracketed, Endpoint::with_port("fe80::1", 7778));
        assert_eq!(bracketed.to_string(), "[fe80::1]:7778");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<Endpoint>().is_err());
        assert!("host:notaport".parse::<Endpoint>().is_err());
        assert!("[fe80::1".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_closed_transport() {
        let mut closed = ClosedTransport;
        assert!(!closed.is_connected());
        assert!(matches!(
            closed.send(b"<command/>"),
            Err(XcliError::ClosedTransport { .. })
        ));
        assert!(closed.reconnect().is_err());
        assert!(matches!(
            closed.add_endpoints(vec![Endpoint::new("x")]),
            Err(XcliError::Unsupported(_))
        ));
        closed.close();
    }
}
