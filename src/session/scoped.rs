//! Scoped option blocks.

use parking_lot::Mutex;

use super::{Executor, OptionOverrides};
use crate::codec::{Arguments, Response};
use crate::error::Result;
use crate::protocol::wire_format::{PASSWORD_OPTION, USER_OPTION};

/// An executor with extra options applied to every command it runs.
///
/// Created by [`ExecutorExt::with_options`]; the options stop applying when
/// the block returns, whether or not a command inside it failed.
pub struct Scoped<'a, E: ?Sized> {
    parent: &'a E,
    overrides: Mutex<OptionOverrides>,
}

impl<'a, E: Executor + ?Sized> Scoped<'a, E> {
    pub fn new(parent: &'a E, overrides: OptionOverrides) -> Self {
        Self {
            parent,
            overrides: Mutex::new(overrides),
        }
    }
}

impl<E: Executor + ?Sized> Executor for Scoped<'_, E> {
    fn execute_with(
        &self,
        overrides: OptionOverrides,
        remote_target: Option<&str>,
        command: &str,
        args: &Arguments,
    ) -> Result<Response> {
        let mut merged = self.overrides.lock().clone();
        merged.merge(&overrides);
        self.parent.execute_with(merged, remote_target, command, args)
    }

    fn is_connected(&self) -> bool {
        self.parent.is_connected()
    }

    fn remote_target(&self) -> Option<String> {
        self.parent.remote_target()
    }

    fn option(&self, name: &str) -> Option<String> {
        let overrides = self.overrides.lock();
        match overrides.lookup(name) {
            Some(value) => value.map(str::to_string),
            None => self.parent.option(name),
        }
    }

    fn set_options(&self, overrides: OptionOverrides) {
        self.overrides.lock().merge(&overrides);
    }
}

/// Scoped-option helpers available on every [`Executor`].
///
/// ```no_run
/// use xcli_client::session::{ExecutorExt, OptionOverrides};
/// use xcli_client::{Arguments, ClientBuilder, Executor};
///
/// # fn main() -> xcli_client::Result<()> {
/// let client = ClientBuilder::new()
///     .endpoint("array-a.example.com")
///     .credentials("admin", "secret")
///     .connect()?;
///
/// let volumes = client.with_options(OptionOverrides::new().unset("compress_output"), |scoped| {
///     scoped.execute("vol_list", &Arguments::new())
/// })?;
/// println!("{} volumes", volumes.len()?);
/// # Ok(())
/// # }
/// ```
pub trait ExecutorExt: Executor {
    /// Run `f` with `overrides` layered over this executor's options.
    fn with_options<R>(
        &self,
        overrides: OptionOverrides,
        f: impl FnOnce(&Scoped<'_, Self>) -> R,
    ) -> R {
        f(&Scoped::new(self, overrides))
    }

    /// Run `f` with the given credentials.
    fn as_user<R>(&self, user: &str, password: &str, f: impl FnOnce(&Scoped<'_, Self>) -> R) -> R {
        let overrides = OptionOverrides::new()
            .set(USER_OPTION, user)
            .set(PASSWORD_OPTION, password);
        self.with_options(overrides, f)
    }
}

impl<E: Executor + ?Sized> ExecutorExt for E {}
