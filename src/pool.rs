//! Session pool.
//!
//! Caches one session per array, indexed under every endpoint alias it was
//! requested with, and hands out one [`UserClient`] per user over it.
//! Sessions older than the pool's TTL are replaced on the next [`Pool::get`];
//! a view handed out earlier keeps working on its old session until dropped.
//!
//! # Example
//!
//! ```no_run
//! use xcli_client::{Arguments, Executor, Pool};
//! use xcli_client::transport::Endpoint;
//!
//! # fn main() -> xcli_client::Result<()> {
//! let pool = Pool::tls();
//! let endpoints = [Endpoint::new("array-a.example.com"), Endpoint::new("10.0.0.5")];
//!
//! let admin = pool.get("admin", "secret", &endpoints)?;
//! admin.execute("vol_list", &Arguments::new())?;
//!
//! // Same session, different user.
//! let bob = pool.get("bob", "pw", &endpoints)?;
//! bob.execute("vol_list", &Arguments::new())?;
//!
//! pool.flush();
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{Result, XcliError};
use crate::session::{ClientBuilder, Executor, UserClient, XcliClient};
use crate::transport::Endpoint;

/// Default time a pooled session is reused.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Opens a session to an array reachable through any of the endpoints.
pub type SessionFactory = Arc<dyn Fn(&[Endpoint]) -> Result<Arc<XcliClient>> + Send + Sync>;

type UserViews = Arc<Mutex<HashMap<String, Arc<UserClient>>>>;

#[derive(Clone)]
struct PoolEntry {
    client: Arc<XcliClient>,
    created: Instant,
    /// Shared by every alias of the same session.
    users: UserViews,
}

impl PoolEntry {
    fn is_stale(&self, ttl: Duration) -> bool {
        self.created.elapsed() > ttl
    }
}

/// TTL-based cache of sessions keyed by endpoint, multiplexed per user.
pub struct Pool {
    factory: SessionFactory,
    ttl: Duration,
    entries: Mutex<HashMap<Endpoint, PoolEntry>>,
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("ttl", &self.ttl)
            .field("entries", &self.len())
            .finish()
    }
}

impl Pool {
    pub fn new(factory: SessionFactory) -> Self {
        Self {
            factory,
            ttl: DEFAULT_TTL,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Pool opening unauthenticated TLS sessions with default settings.
    pub fn tls() -> Self {
        Self::from_builder(|| ClientBuilder::new().tls(true))
    }

    /// Pool opening sessions configured by `make_builder`. Endpoints are
    /// supplied per call; credentials and catalog population are per user.
    pub fn from_builder<F>(make_builder: F) -> Self
    where
        F: Fn() -> ClientBuilder + Send + Sync + 'static,
    {
        Self::new(Arc::new(move |endpoints: &[Endpoint]| {
            endpoints
                .iter()
                .cloned()
                .fold(make_builder(), ClientBuilder::add_endpoint)
                .populate(false)
                .connect()
        }))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of indexed endpoint aliases.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// A view for `user` over a live pooled session to any of `endpoints`,
    /// opening a new session if none is usable.
    pub fn get(&self, user: &str, password: &str, endpoints: &[Endpoint]) -> Result<Arc<UserClient>> {
        if endpoints.is_empty() {
            return Err(XcliError::Config("no endpoints given".to_string()));
        }

        if let Some(entry) = self.lookup(endpoints) {
            return user_view(&entry, user, password);
        }

        tracing::debug!("opening pooled session to {:?}", endpoints);
        let entry = PoolEntry {
            client: (self.factory)(endpoints)?,
            created: Instant::now(),
            users: Arc::new(Mutex::new(HashMap::new())),
        };
        {
            let mut entries = self.entries.lock();
            for endpoint in endpoints {
                entries.insert(endpoint.clone(), entry.clone());
            }
        }
        user_view(&entry, user, password)
    }

    /// First usable entry among `endpoints`; drops unusable ones from the
    /// index on the way. Liveness is checked outside the index lock.
    fn lookup(&self, endpoints: &[Endpoint]) -> Option<PoolEntry> {
        let candidates: Vec<(Endpoint, PoolEntry)> = {
            let entries = self.entries.lock();
            endpoints
                .iter()
                .filter_map(|endpoint| entries.get(endpoint).map(|entry| (endpoint.clone(), entry.clone())))
                .collect()
        };

        let mut found = None;
        let mut disconnected = Vec::new();
        let mut stale = Vec::new();
        for (endpoint, entry) in candidates {
            if !entry.client.is_connected() {
                tracing::debug!("pooled session to {} is disconnected, evicting", endpoint);
                disconnected.push((endpoint, entry));
            } else if entry.is_stale(self.ttl) {
                tracing::debug!("pooled session to {} is stale, replacing", endpoint);
                stale.push((endpoint, entry));
            } else {
                found = Some(entry);
                break;
            }
        }

        if !disconnected.is_empty() || !stale.is_empty() {
            let mut entries = self.entries.lock();
            for (endpoint, entry) in disconnected.iter().chain(&stale) {
                // Another caller may have re-indexed the alias meanwhile.
                if entries
                    .get(endpoint)
                    .map_or(false, |current| Arc::ptr_eq(&current.client, &entry.client))
                {
                    entries.remove(endpoint);
                }
            }
        }
        for (_, entry) in disconnected {
            entry.client.close();
        }
        found
    }

    /// Evict and close every session older than the TTL. Returns the number
    /// of aliases removed.
    pub fn flush(&self) -> usize {
        let stale: Vec<PoolEntry> = {
            let mut entries = self.entries.lock();
            let keys: Vec<Endpoint> = entries
                .iter()
                .filter(|(_, entry)| entry.is_stale(self.ttl))
                .map(|(endpoint, _)| endpoint.clone())
                .collect();
            keys.iter().filter_map(|key| entries.remove(key)).collect()
        };
        for entry in &stale {
            entry.client.close();
        }
        if !stale.is_empty() {
            tracing::debug!("flushed {} stale pool entries", stale.len());
        }
        stale.len()
    }

    /// Close every pooled session.
    pub fn clear(&self) {
        let drained: Vec<PoolEntry> = self.entries.lock().drain().map(|(_, entry)| entry).collect();
        for entry in drained {
            entry.client.close();
        }
    }
}

/// The cached view for `user`, or a new one if absent, disconnected, or
/// created with a different password.
fn user_view(entry: &PoolEntry, user: &str, password: &str) -> Result<Arc<UserClient>> {
    if let Some(view) = entry.users.lock().get(user) {
        if view.is_connected() && view.password_matches(password) {
            return Ok(view.clone());
        }
    }
    let view = entry.client.user_client(user, password, true)?;
    entry.users.lock().insert(user.to_string(), view.clone());
    Ok(view)
}
