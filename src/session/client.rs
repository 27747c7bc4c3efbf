//! Session: the serialized command executor over one transport.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard, RwLock};

use super::{CommandCatalog, CommandInfo, Executor, OptionOverrides, OptionStack, RemoteClient, UserClient};
use crate::codec::{decode_response, Arguments, CommandRequest, Response};
use crate::error::{Result, XcliError};
use crate::protocol::wire_format::{COMPRESS_OUTPUT_OPTION, PASSWORD_OPTION, USER_OPTION};
use crate::status::ErrorRegistry;
use crate::transport::{ClosedTransport, Endpoint, Transport};

/// Mutable state guarded by the session lock.
struct SessionState {
    transport: Box<dyn Transport>,
    options: OptionStack,
    next_id: u64,
}

impl SessionState {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Option scope pushed for one command; popped on drop.
struct ScopeGuard<'a> {
    state: MutexGuard<'a, SessionState>,
    depth: usize,
}

impl<'a> ScopeGuard<'a> {
    fn push(mut state: MutexGuard<'a, SessionState>, overrides: &OptionOverrides) -> Self {
        let depth = state.options.depth();
        state.options.push(overrides);
        Self { state, depth }
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = SessionState;

    fn deref(&self) -> &SessionState {
        &self.state
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.state.options.truncate(self.depth);
    }
}

/// A connected XCLI session.
///
/// All commands run one at a time under the session lock: the option scope
/// is pushed, the request is sent and the reply decoded, and the scope is
/// popped, as one unit. Views created with [`XcliClient::user_client`] and
/// [`XcliClient::remote_client`] share this lock and transport.
pub struct XcliClient {
    state: Mutex<SessionState>,
    closed: AtomicBool,
    registry: &'static ErrorRegistry,
    catalog: RwLock<CommandCatalog>,
}

impl fmt::Debug for XcliClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("XcliClient")
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .field("commands", &self.catalog.read().len())
            .finish()
    }
}

impl XcliClient {
    /// Wrap a connected transport with the default options.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self::with_registry(transport, ErrorRegistry::global())
    }

    /// Like [`new`](Self::new) with a custom error registry.
    pub fn with_registry(transport: Box<dyn Transport>, registry: &'static ErrorRegistry) -> Self {
        Self {
            state: Mutex::new(SessionState {
                transport,
                options: OptionStack::with_defaults(),
                next_id: 1,
            }),
            closed: AtomicBool::new(false),
            registry,
            catalog: RwLock::new(CommandCatalog::new()),
        }
    }

    /// Session that logs in as `user`, optionally fetching the command
    /// catalog.
    pub fn with_credentials(
        transport: Box<dyn Transport>,
        user: &str,
        password: &str,
        populate: bool,
    ) -> Result<Self> {
        let client = Self::new(transport);
        client.set_options(
            OptionOverrides::new()
                .set(USER_OPTION, user)
                .set(PASSWORD_OPTION, password),
        );
        if populate {
            client.populate()?;
        }
        Ok(client)
    }

    /// Fetch the command catalog with `help`. Returns the number of commands.
    pub fn populate(&self) -> Result<usize> {
        let catalog = CommandCatalog::fetch(self)?;
        let count = catalog.len();
        *self.catalog.write() = catalog;
        Ok(count)
    }

    pub fn catalog(&self) -> CommandCatalog {
        self.catalog.read().clone()
    }

    pub fn command(&self, name: &str) -> Option<CommandInfo> {
        self.catalog.read().get(name).cloned()
    }

    /// Close the session. Later commands fail with
    /// [`XcliError::ClientClosed`]. Idempotent.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut state = self.state.lock();
        state.transport.close();
        state.transport = Box::new(ClosedTransport);
        tracing::debug!("Session closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Re-establish the transport's last connection.
    pub fn reconnect(&self) -> Result<()> {
        if self.is_closed() {
            return Err(XcliError::ClientClosed);
        }
        self.state.lock().transport.reconnect()
    }

    /// Register more endpoints with a multi-endpoint transport.
    pub fn add_endpoints(&self, endpoints: Vec<Endpoint>) -> Result<()> {
        if self.is_closed() {
            return Err(XcliError::ClientClosed);
        }
        self.state.lock().transport.add_endpoints(endpoints)
    }

    /// A view that runs every command as `user`.
    pub fn user_client(
        self: &Arc<Self>,
        user: &str,
        password: &str,
        populate: bool,
    ) -> Result<Arc<UserClient>> {
        UserClient::new(self.clone(), user, password, populate)
    }

    /// A view that routes every command to `target`, optionally as another
    /// user.
    pub fn remote_client(
        self: &Arc<Self>,
        target: &str,
        credentials: Option<(&str, &str)>,
    ) -> Result<Arc<RemoteClient>> {
        match credentials {
            Some((user, password)) => {
                let user_view = UserClient::new(self.clone(), user, password, false)?;
                RemoteClient::new(user_view, target, true)
            }
            None => RemoteClient::new(self.clone(), target, true),
        }
    }

    fn dispatch(
        &self,
        overrides: &OptionOverrides,
        remote_target: Option<&str>,
        command: &str,
        args: &Arguments,
    ) -> Result<Response> {
        let mut state = ScopeGuard::push(self.state.lock(), overrides);
        let request = CommandRequest {
            id: state.next_id(),
            command: command.to_string(),
            options: state.options.top().clone(),
            arguments: args.clone(),
            remote_target: remote_target.map(str::to_string),
        };
        tracing::debug!("SEND {}", request.masked());

        let encoding = request.options.get(COMPRESS_OUTPUT_OPTION).cloned();
        let root = state.transport.send(&request.to_bytes())?;
        decode_response(root, encoding.as_deref(), self.registry)
    }
}

impl Executor for XcliClient {
    fn execute_with(
        &self,
        overrides: OptionOverrides,
        remote_target: Option<&str>,
        command: &str,
        args: &Arguments,
    ) -> Result<Response> {
        if self.is_closed() {
            return Err(XcliError::ClientClosed);
        }
        match self.dispatch(&overrides, remote_target, command, args) {
            Ok(response) => Ok(response),
            Err(err) => {
                if err.is_command_failure() || err.is_credentials() {
                    tracing::warn!(
                        command = command,
                        code = err.code().unwrap_or_default(),
                        "Command failed: {}",
                        err
                    );
                } else {
                    tracing::error!(command = command, "Command error: {}", err);
                }
                Err(err)
            }
        }
    }

    /// A session busy with a command counts as connected.
    fn is_connected(&self) -> bool {
        !self.is_closed()
            && self
                .state
                .try_lock()
                .map_or(true, |state| state.transport.is_connected())
    }

    fn option(&self, name: &str) -> Option<String> {
        self.state.lock().options.get(name).map(str::to_string)
    }

    fn set_options(&self, overrides: OptionOverrides) {
        self.state.lock().options.set(&overrides);
    }
}

impl Drop for XcliClient {
    fn drop(&mut self) {
        self.close();
    }
}
