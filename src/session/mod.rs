//! Session module - command execution.
//!
//! Provides:
//! - [`Executor`]: the command entry point shared by sessions and views
//! - [`XcliClient`]: a session over one transport
//! - [`UserClient`] and [`RemoteClient`]: layered views over a session
//! - [`ExecutorExt`]: scoped option blocks
//! - [`ClientBuilder`]: connection setup
//!
//! # Example
//!
//! ```no_run
//! use xcli_client::{Arguments, ClientBuilder, Executor};
//!
//! # fn main() -> xcli_client::Result<()> {
//! let client = ClientBuilder::new()
//!     .endpoint("array-a.example.com")
//!     .credentials("admin", "secret")
//!     .tls(true)
//!     .connect()?;
//!
//! let response = client.execute("vol_list", &Arguments::new().with("pool", "p1"))?;
//! for volume in response.as_list()? {
//!     println!("{:?}", volume.field("name"));
//! }
//!
//! let bob = client.user_client("bob", "pw", false)?;
//! bob.execute("vol_create", &Arguments::new().with("vol", "v2").with("size", 17).with("pool", "p1"))?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod catalog;
mod client;
mod layered;
mod options;
mod scoped;

#[cfg(test)]
pub(crate) mod testing;

pub use builder::ClientBuilder;
pub use catalog::{CommandCatalog, CommandInfo};
pub use client::XcliClient;
pub use layered::{RemoteClient, UserClient};
pub use options::{normalize, OptionOverrides, OptionStack};
pub use scoped::{ExecutorExt, Scoped};

use crate::codec::{Arguments, Response};
use crate::error::Result;

/// Something that runs XCLI commands.
///
/// Implemented by the session and by every view over it; views add their
/// own option layer and pass the call down.
pub trait Executor: Send + Sync {
    /// Run `command` with `overrides` applied over this executor's options.
    fn execute_with(
        &self,
        overrides: OptionOverrides,
        remote_target: Option<&str>,
        command: &str,
        args: &Arguments,
    ) -> Result<Response>;

    fn is_connected(&self) -> bool;

    /// The remote target every command is routed to, if any.
    fn remote_target(&self) -> Option<String> {
        None
    }

    /// Current value of an option as this executor would send it.
    fn option(&self, name: &str) -> Option<String>;

    /// Change options for every later command. A `None` value removes the
    /// option.
    fn set_options(&self, overrides: OptionOverrides);

    fn execute(&self, command: &str, args: &Arguments) -> Result<Response> {
        self.execute_with(OptionOverrides::new(), None, command, args)
    }

    /// Run `command` on the remote system `target`.
    fn execute_remote(&self, target: &str, command: &str, args: &Arguments) -> Result<Response> {
        self.execute_with(OptionOverrides::new(), Some(target), command, args)
    }

    /// Run a command by name, whether or not it is in the catalog.
    fn invoke(&self, command: &str, args: &Arguments) -> Result<Response> {
        self.execute(command, args)
    }
}
