//! Endpoint selection.
//!
//! - [`connect_first`]: try candidates in order, first successful connect wins
//! - [`MultiEndpointTransport`]: FIFO queue of untried candidates; on a
//!   transport failure the active connection is dropped and the same request
//!   is resent over the next candidate
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use xcli_client::transport::{plain_connector, Endpoint, MultiEndpointTransport, Transport};
//!
//! let endpoints = vec![Endpoint::new("array-a"), Endpoint::new("array-b")];
//! let mut transport = MultiEndpointTransport::new(plain_connector(Duration::from_secs(5)), endpoints);
//! let root = transport.send(b"<command id=\"1\" type=\"version_get\" close_on_return=\"no\"/>")?;
//! # Ok::<(), xcli_client::XcliError>(())
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::{Channel, ClosedTransport, Endpoint, TlsSettings, Transport};
use crate::error::{EndpointFailure, Result, XcliError};
use crate::protocol::Element;

/// Opens a transport to one endpoint.
pub type Connector = Arc<dyn Fn(&Endpoint) -> Result<Box<dyn Transport>> + Send + Sync>;

/// Connector producing plain [`Channel`]s.
pub fn plain_connector(timeout: Duration) -> Connector {
    Arc::new(move |endpoint: &Endpoint| {
        Channel::connect(endpoint, timeout).map(|c| Box::new(c) as Box<dyn Transport>)
    })
}

/// Connector producing TLS [`Channel`]s.
pub fn tls_connector(timeout: Duration, settings: TlsSettings) -> Connector {
    Arc::new(move |endpoint: &Endpoint| {
        Channel::connect_tls(endpoint, timeout, &settings).map(|c| Box::new(c) as Box<dyn Transport>)
    })
}

/// Connect to the first reachable endpoint, in the order given.
///
/// # Errors
///
/// [`XcliError::Connection`] with one entry per failed candidate.
pub fn connect_first(connector: &Connector, endpoints: &[Endpoint]) -> Result<Box<dyn Transport>> {
    tracing::debug!("connecting to first reachable of {:?}", endpoints);
    let mut failures = Vec::new();
    for endpoint in endpoints {
        tracing::debug!("Attempting {}", endpoint);
        match connector(endpoint) {
            Ok(transport) => return Ok(transport),
            Err(err) => {
                tracing::debug!("Could not connect to {}: {}", endpoint, err);
                failures.push(EndpointFailure::new(endpoint.clone(), err));
            }
        }
    }
    Err(XcliError::Connection {
        message: "could not connect to any endpoint".to_string(),
        failures,
    })
}

/// Transport that fails over across a queue of endpoints.
///
/// The queue is consumed strictly left to right and never reordered. A
/// connection is established lazily, on the first send.
pub struct MultiEndpointTransport {
    /// `None` once closed.
    connector: Option<Connector>,
    available: VecDeque<Endpoint>,
    active: Box<dyn Transport>,
    current: Option<Endpoint>,
    /// Failures observed since construction.
    failures: Vec<EndpointFailure>,
}

impl MultiEndpointTransport {
    pub fn new(connector: Connector, endpoints: Vec<Endpoint>) -> Self {
        Self {
            connector: Some(connector),
            available: endpoints.into(),
            active: Box::new(ClosedTransport),
            current: None,
            failures: Vec::new(),
        }
    }

    /// Endpoint of the active connection.
    pub fn current(&self) -> Option<&Endpoint> {
        self.current.as_ref().filter(|_| self.active.is_connected())
    }

    /// Candidates not tried yet.
    pub fn pending(&self) -> impl Iterator<Item = &Endpoint> {
        self.available.iter()
    }

    pub fn failures(&self) -> &[EndpointFailure] {
        &self.failures
    }

    /// Connect to the next reachable candidate unless already connected.
    pub fn connect(&mut self) -> Result<()> {
        let Some(connector) = self.connector.clone() else {
            return Err(XcliError::ClosedTransport {
                message: "transport is closed".to_string(),
                failures: Vec::new(),
            });
        };
        loop {
            if self.active.is_connected() {
                return Ok(());
            }
            self.drop_active();
            let Some(endpoint) = self.available.pop_front() else {
                tracing::debug!("no more endpoints available");
                return Err(XcliError::ClosedTransport {
                    message: "ran out of endpoints to connect to".to_string(),
                    failures: std::mem::take(&mut self.failures),
                });
            };
            tracing::debug!("changing to endpoint {}", endpoint);
            match connector(&endpoint) {
                Ok(transport) => {
                    self.active = transport;
                    self.current = Some(endpoint);
                }
                Err(err) => {
                    tracing::debug!("could not connect to {}: {}", endpoint, err);
                    self.failures.push(EndpointFailure::new(endpoint, err));
                }
            }
        }
    }

    fn drop_active(&mut self) {
        self.active.close();
        self.active = Box::new(ClosedTransport);
    }
}

impl fmt::Debug for MultiEndpointTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiEndpointTransport")
            .field("closed", &self.connector.is_none())
            .field("current", &self.current)
            .field("available", &self.available)
            .finish()
    }
}

impl Transport for MultiEndpointTransport {
    fn send(&mut self, payload: &[u8]) -> Result<Element> {
        loop {
            self.connect()?;
            match self.active.send(payload) {
                Ok(root) => return Ok(root),
                Err(err) if err.is_transport() => {
                    let endpoint = self.current.take().unwrap_or_else(|| Endpoint::new("?"));
                    tracing::debug!("sending over {} failed: {}", endpoint, err);
                    self.failures.push(EndpointFailure::new(endpoint, err));
                    self.drop_active();
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.active.is_connected()
    }

    fn close(&mut self) {
        self.drop_active();
        self.current = None;
        self.connector = None;
    }

    fn reconnect(&mut self) -> Result<()> {
        if self.active.is_connected() {
            return self.active.reconnect();
        }
        self.connect()
    }

    fn add_endpoints(&mut self, endpoints: Vec<Endpoint>) -> Result<()> {
        tracing::debug!("adding endpoints {:?}", endpoints);
        self.available.extend(endpoints);
        Ok(())
    }
}
