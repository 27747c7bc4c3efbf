//! Client builder.
//!
//! The [`ClientBuilder`] provides a fluent API for choosing endpoints,
//! credentials and transport security, then connecting a session:
//! 1. Build a connector (plain or TLS)
//! 2. Connect to the first reachable endpoint (or set up failover)
//! 3. Log in and fetch the command catalog
//! 4. Optionally discover further management endpoints

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{Executor, XcliClient};
use crate::codec::Arguments;
use crate::error::{Result, XcliError};
use crate::protocol::wire_format::{DISCOVERY_COMMAND, MANAGEMENT_ROLE};
use crate::transport::{
    connect_first, plain_connector, tls_connector, Connector, Endpoint, MultiEndpointTransport,
    TlsSettings, Transport,
};

/// Default connect and socket I/O timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder for configuring and connecting an [`XcliClient`].
pub struct ClientBuilder {
    endpoints: Vec<Endpoint>,
    credentials: Option<(String, String)>,
    tls: bool,
    tls_settings: TlsSettings,
    timeout: Duration,
    populate: bool,
    multi_endpoint: bool,
    auto_discover: bool,
    connector: Option<Connector>,
    /// First invalid endpoint, reported by `connect`.
    error: Option<XcliError>,
}

impl ClientBuilder {
    /// Create a new client builder.
    pub fn new() -> Self {
        Self {
            endpoints: Vec::new(),
            credentials: None,
            tls: false,
            tls_settings: TlsSettings::default(),
            timeout: DEFAULT_TIMEOUT,
            populate: true,
            multi_endpoint: false,
            auto_discover: true,
            connector: None,
            error: None,
        }
    }

    /// Add an endpoint: `host`, `host:port` or `[v6]:port`.
    pub fn endpoint(mut self, endpoint: &str) -> Self {
        match endpoint.parse() {
            Ok(endpoint) => self.endpoints.push(endpoint),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    pub fn endpoints<I, S>(self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        endpoints
            .into_iter()
            .fold(self, |builder, endpoint| builder.endpoint(endpoint.as_ref()))
    }

    pub fn add_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Log in as `user`; required for catalog population and discovery.
    pub fn credentials(mut self, user: &str, password: &str) -> Self {
        self.credentials = Some((user.to_string(), password.to_string()));
        self
    }

    /// Connect over TLS. Default: false
    pub fn tls(mut self, enabled: bool) -> Self {
        self.tls = enabled;
        self
    }

    /// Verify the array's certificate against this PEM bundle. Implies TLS.
    pub fn ca_certs(mut self, path: impl Into<PathBuf>) -> Self {
        self.tls = true;
        self.tls_settings = self.tls_settings.ca_certs(path);
        self
    }

    /// Accept certificates this callback approves. Implies TLS.
    pub fn validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&[u8], &str) -> bool + Send + Sync + 'static,
    {
        self.tls = true;
        self.tls_settings = self.tls_settings.validate(validate);
        self
    }

    /// Connect and socket I/O timeout. Default: 5 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the command catalog after login. Default: true
    pub fn populate(mut self, enabled: bool) -> Self {
        self.populate = enabled;
        self
    }

    /// Fail over across the endpoints instead of using only the first
    /// reachable one. Default: false
    pub fn multi_endpoint(mut self, enabled: bool) -> Self {
        self.multi_endpoint = enabled;
        self
    }

    /// With multi-endpoint failover, add the array's management interfaces
    /// as further endpoints after login. Default: true
    pub fn auto_discover(mut self, enabled: bool) -> Self {
        self.auto_discover = enabled;
        self
    }

    /// Use a custom connector instead of a socket connector.
    pub fn connector(mut self, connector: Connector) -> Self {
        self.connector = Some(connector);
        self
    }

    fn build_connector(&self) -> Result<Connector> {
        if let Some(connector) = &self.connector {
            return Ok(connector.clone());
        }
        if self.tls {
            // Surface CA bundle problems before any connection attempt.
            self.tls_settings.client_config()?;
            Ok(tls_connector(self.timeout, self.tls_settings.clone()))
        } else {
            Ok(plain_connector(self.timeout))
        }
    }

    /// Connect and log in.
    pub fn connect(mut self) -> Result<Arc<XcliClient>> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if self.endpoints.is_empty() {
            return Err(XcliError::Config("no endpoints given".to_string()));
        }
        let connector = self.build_connector()?;

        if !self.multi_endpoint {
            let transport = connect_first(&connector, &self.endpoints)?;
            return self.login(transport);
        }

        let mut endpoints = self.endpoints.clone();
        loop {
            let mut transport = MultiEndpointTransport::new(connector.clone(), endpoints.clone());
            transport.connect()?;
            match self.login(Box::new(transport)) {
                Err(XcliError::Delivery(failure)) if endpoints.len() > 1 => {
                    tracing::debug!(
                        "delivery failed on {} ({}), retrying with remaining endpoints",
                        endpoints[0],
                        failure
                    );
                    endpoints.remove(0);
                }
                Err(err) => return Err(err),
                Ok(client) => {
                    if self.auto_discover && self.credentials.is_some() {
                        discover(&client)?;
                    }
                    return Ok(client);
                }
            }
        }
    }

    fn login(&self, transport: Box<dyn Transport>) -> Result<Arc<XcliClient>> {
        let client = match &self.credentials {
            Some((user, password)) => {
                XcliClient::with_credentials(transport, user, password, self.populate)?
            }
            None => XcliClient::new(transport),
        };
        Ok(Arc::new(client))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the array's management interfaces with the client's transport.
/// Returns how many were found.
fn discover(client: &XcliClient) -> Result<usize> {
    let response = client.execute(DISCOVERY_COMMAND, &Arguments::new())?;
    let found: Vec<Endpoint> = response
        .as_list()?
        .iter()
        .filter(|interface| {
            interface
                .field("type")
                .map_or(false, |role| role.eq_ignore_ascii_case(MANAGEMENT_ROLE))
        })
        .filter_map(|interface| interface.field("address"))
        .map(Endpoint::new)
        .collect();
    let count = found.len();
    tracing::debug!("discovered {} management endpoints", count);
    client.add_endpoints(found)?;
    Ok(count)
}

impl XcliClient {
    /// Start configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Connect over TLS to the first reachable endpoint.
    pub fn connect_ssl<I, S>(user: &str, password: &str, endpoints: I) -> Result<Arc<XcliClient>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ClientBuilder::new()
            .endpoints(endpoints)
            .credentials(user, password)
            .tls(true)
            .connect()
    }

    /// Connect over TLS with failover across `endpoints` and discovery of
    /// further management endpoints.
    pub fn connect_multiendpoint_ssl<I, S>(
        user: &str,
        password: &str,
        endpoints: I,
    ) -> Result<Arc<XcliClient>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ClientBuilder::new()
            .endpoints(endpoints)
            .credentials(user, password)
            .tls(true)
            .multi_endpoint(true)
            .connect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CommandRequest;
    use crate::protocol::Element;
    use crate::session::testing::{self, FakeArray};
    use parking_lot::Mutex;

    fn delivery_failure() -> Element {
        crate::protocol::parse(
            br#"<command id="0"><aserver status="TARGET_IS_NOT_CONNECTED"/></command>"#,
        )
        .unwrap()
    }

    /// Connector handing out a transport per endpoint, recording the order.
    fn connector_for(arrays: Vec<(&'static str, FakeArray)>, log: Arc<Mutex<Vec<String>>>) -> Connector {
        Arc::new(move |endpoint: &Endpoint| {
            log.lock().push(endpoint.host.clone());
            arrays
                .iter()
                .find(|(host, _)| *host == endpoint.host)
                .map(|(_, array)| array.transport())
                .ok_or_else(|| XcliError::Connection {
                    message: format!("refused by {}", endpoint),
                    failures: Vec::new(),
                })
        })
    }

    fn discovery_reply(request: &CommandRequest) -> crate::Result<Element> {
        match request.command.as_str() {
            "ipinterface_list" => Ok(testing::success(
                r#"<ip_interface><type value="Management"/><address value="10.0.0.2"/></ip_interface>
                   <ip_interface><type value="iSCSI"/><address value="10.0.1.9"/></ip_interface>
                   <ip_interface><type value="management"/><address value="10.0.0.3"/></ip_interface>"#,
            )),
            "help" => Ok(testing::success(testing::help_body())),
            _ => Ok(testing::success("")),
        }
    }

    #[test]
    fn test_defaults() {
        let builder = ClientBuilder::default();
        assert_eq!(builder.timeout, DEFAULT_TIMEOUT);
        assert!(builder.populate);
        assert!(builder.auto_discover);
        assert!(!builder.multi_endpoint);
        assert!(!builder.tls);
    }

    #[test]
    fn test_no_endpoints() {
        assert!(matches!(ClientBuilder::new().connect(), Err(XcliError::Config(_))));
    }

    #[test]
    fn test_invalid_endpoint_reported() {
        let err = ClientBuilder::new()
            .endpoint("host:bad")
            .endpoint("ok")
            .connect()
            .unwrap_err();
        assert!(matches!(err, XcliError::Config(_)));
    }

    #[test]
    fn test_ca_certs_implies_tls() {
        let builder = ClientBuilder::new().ca_certs("/tmp/ca.pem");
        assert!(builder.tls);
        assert!(builder.tls_settings.ca_certs.is_some());
    }

    #[test]
    fn test_connect_first_reachable() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let b = FakeArray::new();
        let client = ClientBuilder::new()
            .endpoints(["a", "b"])
            .credentials("admin", "secret")
            .connector(connector_for(vec![("b", b.clone())], log.clone()))
            .connect()
            .unwrap();
        assert_eq!(*log.lock(), vec!["a", "b"]);
        assert_eq!(b.commands(), vec!["help"]);
        assert_eq!(client.catalog().len(), 2);
    }

    #[test]
    fn test_no_populate_without_credentials() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = FakeArray::new();
        ClientBuilder::new()
            .endpoint("a")
            .connector(connector_for(vec![("a", a.clone())], log))
            .connect()
            .unwrap();
        assert!(a.commands().is_empty());
    }

    #[test]
    fn test_multi_endpoint_discovery() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = FakeArray::with_responder(discovery_reply);
        let client = ClientBuilder::new()
            .endpoint("a")
            .credentials("admin", "secret")
            .multi_endpoint(true)
            .connector(connector_for(vec![("a", a.clone())], log))
            .connect()
            .unwrap();
        assert_eq!(a.commands(), vec!["help", "ipinterface_list"]);
        assert!(client.is_connected());
    }

    #[test]
    fn test_multi_endpoint_skips_undelivered() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = FakeArray::with_responder(|_| Ok(delivery_failure()));
        let b = FakeArray::new();
        ClientBuilder::new()
            .endpoints(["a", "b"])
            .credentials("admin", "secret")
            .multi_endpoint(true)
            .auto_discover(false)
            .connector(connector_for(vec![("a", a.clone()), ("b", b.clone())], log.clone()))
            .connect()
            .unwrap();
        assert_eq!(a.commands(), vec!["help"]);
        assert_eq!(b.commands(), vec!["help"]);
        assert_eq!(*log.lock(), vec!["a", "b"]);
    }

    #[test]
    fn test_multi_endpoint_last_delivery_failure_propagates() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = FakeArray::with_responder(|_| Ok(delivery_failure()));
        let err = ClientBuilder::new()
            .endpoint("a")
            .credentials("admin", "secret")
            .multi_endpoint(true)
            .connector(connector_for(vec![("a", a)], log))
            .connect()
            .unwrap_err();
        assert!(matches!(err, XcliError::Delivery(_)));
    }
}
