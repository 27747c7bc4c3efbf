//! Layered views over a session.
//!
//! A view owns only an option layer. Every command re-enters the wrapped
//! executor with that layer applied, so the transport, the session lock and
//! the request id counter stay shared with the session underneath.
//!
//! - [`UserClient`]: runs commands as a fixed user
//! - [`RemoteClient`]: routes commands to a fixed remote target

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::{CommandCatalog, CommandInfo, Executor, OptionOverrides};
use crate::codec::{Arguments, Response};
use crate::error::{Result, XcliError};
use crate::protocol::wire_format::{PASSWORD_OPTION, USER_OPTION};

/// State shared by both view kinds.
struct Layer {
    parent: RwLock<Option<Arc<dyn Executor>>>,
    overrides: Mutex<OptionOverrides>,
    catalog: RwLock<CommandCatalog>,
}

impl Layer {
    fn new(parent: Arc<dyn Executor>, overrides: OptionOverrides) -> Self {
        Self {
            parent: RwLock::new(Some(parent)),
            overrides: Mutex::new(overrides),
            catalog: RwLock::new(CommandCatalog::new()),
        }
    }

    fn parent(&self) -> Result<Arc<dyn Executor>> {
        self.parent.read().clone().ok_or(XcliError::ClientClosed)
    }

    fn execute_with(
        &self,
        overrides: OptionOverrides,
        remote_target: Option<&str>,
        command: &str,
        args: &Arguments,
    ) -> Result<Response> {
        let parent = self.parent()?;
        let mut merged = self.overrides.lock().clone();
        merged.merge(&overrides);
        parent.execute_with(merged, remote_target, command, args)
    }

    fn is_connected(&self) -> bool {
        self.parent
            .read()
            .as_ref()
            .map_or(false, |parent| parent.is_connected())
    }

    fn option(&self, name: &str) -> Option<String> {
        {
            let overrides = self.overrides.lock();
            if let Some(value) = overrides.lookup(name) {
                return value.map(str::to_string);
            }
        }
        self.parent.read().as_ref().and_then(|parent| parent.option(name))
    }

    fn set_options(&self, overrides: OptionOverrides) {
        self.overrides.lock().merge(&overrides);
    }

    fn close(&self) {
        self.parent.write().take();
    }

    fn is_closed(&self) -> bool {
        self.parent.read().is_none()
    }
}

/// A view that runs every command with its own `user`/`password` options.
pub struct UserClient {
    layer: Layer,
}

impl fmt::Debug for UserClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserClient")
            .field("user", &self.user())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl UserClient {
    /// Wrap `parent`. With `populate`, the command catalog is fetched as
    /// this user.
    pub fn new(
        parent: Arc<dyn Executor>,
        user: &str,
        password: &str,
        populate: bool,
    ) -> Result<Arc<Self>> {
        let overrides = OptionOverrides::new()
            .set(USER_OPTION, user)
            .set(PASSWORD_OPTION, password);
        let client = Arc::new(Self {
            layer: Layer::new(parent, overrides),
        });
        if populate {
            client.populate()?;
        }
        Ok(client)
    }

    pub fn user(&self) -> Option<String> {
        self.option(USER_OPTION)
    }

    pub fn password_matches(&self, password: &str) -> bool {
        self.option(PASSWORD_OPTION).as_deref() == Some(password)
    }

    pub fn populate(&self) -> Result<usize> {
        populate(&self.layer, self)
    }

    pub fn catalog(&self) -> CommandCatalog {
        self.layer.catalog.read().clone()
    }

    pub fn command(&self, name: &str) -> Option<CommandInfo> {
        self.layer.catalog.read().get(name).cloned()
    }

    /// Detach from the session. The session itself stays open; later
    /// commands through this view fail with [`XcliError::ClientClosed`].
    pub fn close(&self) {
        self.layer.close();
    }

    pub fn is_closed(&self) -> bool {
        self.layer.is_closed()
    }

    /// A view routing this user's commands to `target`.
    pub fn remote_client(self: &Arc<Self>, target: &str) -> Result<Arc<RemoteClient>> {
        RemoteClient::new(self.clone(), target, true)
    }
}

impl Executor for UserClient {
    fn execute_with(
        &self,
        overrides: OptionOverrides,
        remote_target: Option<&str>,
        command: &str,
        args: &Arguments,
    ) -> Result<Response> {
        self.layer.execute_with(overrides, remote_target, command, args)
    }

    fn is_connected(&self) -> bool {
        self.layer.is_connected()
    }

    fn remote_target(&self) -> Option<String> {
        self.layer.parent().ok().and_then(|parent| parent.remote_target())
    }

    fn option(&self, name: &str) -> Option<String> {
        self.layer.option(name)
    }

    fn set_options(&self, overrides: OptionOverrides) {
        self.layer.set_options(overrides);
    }
}

/// A view that sends every command to a remote target system.
///
/// Remote targets cannot be chained: wrapping another remote view, or
/// calling [`Executor::execute_remote`] on this one, fails with
/// [`XcliError::TargetChaining`].
pub struct RemoteClient {
    layer: Layer,
    target: String,
}

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient")
            .field("target", &self.target)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl RemoteClient {
    pub fn new(parent: Arc<dyn Executor>, target: &str, populate: bool) -> Result<Arc<Self>> {
        if parent.remote_target().is_some() {
            return Err(XcliError::TargetChaining);
        }
        let client = Arc::new(Self {
            layer: Layer::new(parent, OptionOverrides::new()),
            target: target.to_string(),
        });
        if populate {
            client.populate()?;
        }
        Ok(client)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn populate(&self) -> Result<usize> {
        populate(&self.layer, self)
    }

    pub fn catalog(&self) -> CommandCatalog {
        self.layer.catalog.read().clone()
    }

    pub fn command(&self, name: &str) -> Option<CommandInfo> {
        self.layer.catalog.read().get(name).cloned()
    }

    pub fn close(&self) {
        self.layer.close();
    }

    pub fn is_closed(&self) -> bool {
        self.layer.is_closed()
    }
}

impl Executor for RemoteClient {
    fn execute_with(
        &self,
        overrides: OptionOverrides,
        remote_target: Option<&str>,
        command: &str,
        args: &Arguments,
    ) -> Result<Response> {
        if remote_target.is_some() {
            return Err(XcliError::TargetChaining);
        }
        self.layer
            .execute_with(overrides, Some(&self.target), command, args)
    }

    fn is_connected(&self) -> bool {
        self.layer.is_connected()
    }

    fn remote_target(&self) -> Option<String> {
        Some(self.target.clone())
    }

    fn option(&self, name: &str) -> Option<String> {
        self.layer.option(name)
    }

    fn set_options(&self, overrides: OptionOverrides) {
        self.layer.set_options(overrides);
    }
}

fn populate(layer: &Layer, view: &dyn Executor) -> Result<usize> {
    let catalog = CommandCatalog::fetch(view)?;
    let count = catalog.len();
    *layer.catalog.write() = catalog;
    Ok(count)
}
