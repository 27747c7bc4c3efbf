//! File-based configuration.
//!
//! A [`ClientConfig`] holds everything a [`ClientBuilder`] needs and can be
//! loaded from JSON. Every field is optional.
//!
//! ```
//! use xcli_client::config::ClientConfig;
//!
//! let config = ClientConfig::from_json(r#"{
//!     "endpoints": ["array-a.example.com", "10.0.0.5:7778"],
//!     "user": "admin",
//!     "password": "secret",
//!     "tls": true,
//!     "multi_endpoint": true
//! }"#).unwrap();
//! assert_eq!(config.timeout_secs, 5);
//! assert!(config.auto_discover);
//! let builder = config.into_builder();
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, XcliError};
use crate::pool::{Pool, DEFAULT_TTL};
use crate::session::ClientBuilder;

/// Connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// `host`, `host:port` or `[v6]:port`.
    pub endpoints: Vec<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub tls: bool,
    /// PEM bundle of trusted CAs; implies TLS.
    pub ca_certs: Option<PathBuf>,
    pub timeout_secs: u64,
    pub populate: bool,
    pub multi_endpoint: bool,
    pub auto_discover: bool,
    /// Reuse period for pooled sessions.
    pub pool_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            user: None,
            password: None,
            tls: false,
            ca_certs: None,
            timeout_secs: 5,
            populate: true,
            multi_endpoint: false,
            auto_discover: true,
            pool_ttl_secs: DEFAULT_TTL.as_secs(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| XcliError::Config(format!("invalid config: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            XcliError::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn pool_ttl(&self) -> Duration {
        Duration::from_secs(self.pool_ttl_secs)
    }

    /// Builder for a single session. Credentials apply only when both user
    /// and password are set.
    pub fn into_builder(self) -> ClientBuilder {
        let mut builder = self.transport_builder().endpoints(&self.endpoints);
        if let (Some(user), Some(password)) = (&self.user, &self.password) {
            builder = builder.credentials(user, password);
        }
        builder
            .populate(self.populate)
            .multi_endpoint(self.multi_endpoint)
            .auto_discover(self.auto_discover)
    }

    /// Pool using this configuration's transport settings and TTL. Endpoints
    /// and credentials are given per [`Pool::get`] call.
    pub fn into_pool(self) -> Pool {
        let ttl = self.pool_ttl();
        Pool::from_builder(move || self.transport_builder()).with_ttl(ttl)
    }

    fn transport_builder(&self) -> ClientBuilder {
        let mut builder = ClientBuilder::new().tls(self.tls).timeout(self.timeout());
        if let Some(path) = &self.ca_certs {
            builder = builder.ca_certs(path.clone());
        }
        builder
    }
}
