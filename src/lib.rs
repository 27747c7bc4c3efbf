//! # xcli-client
//!
//! Rust client for the XCLI management protocol of storage arrays.
//!
//! Commands are XML documents sent over a plain or TLS socket; replies are
//! unframed XML documents whose end is found by tracking element depth.
//!
//! ## Architecture
//!
//! - **Protocol**: XML element tree, frame detection, wire constants
//! - **Codec**: request building, response decoding, result values
//! - **Status**: classification of failed commands into error kinds
//! - **Transport**: sockets, TLS, endpoint selection and failover
//! - **Session**: serialized command execution, option scopes, views
//! - **Pool**: TTL-based cache of sessions shared between users
//!
//! ## Example
//!
//! ```no_run
//! use xcli_client::{Arguments, ClientBuilder, Executor};
//!
//! fn main() -> xcli_client::Result<()> {
//!     let client = ClientBuilder::new()
//!         .endpoints(["array-a.example.com", "array-b.example.com"])
//!         .credentials("admin", "secret")
//!         .tls(true)
//!         .multi_endpoint(true)
//!         .connect()?;
//!
//!     for volume in client.execute("vol_list", &Arguments::new())?.as_list()? {
//!         println!("{:?}", volume.field("name"));
//!     }
//!     client.close();
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod pool;
pub mod protocol;
pub mod session;
pub mod status;
pub mod transport;

pub use codec::{ArgValue, Arguments, Response, Value};
pub use config::ClientConfig;
pub use error::{Result, XcliError};
pub use pool::Pool;
pub use session::{ClientBuilder, Executor, ExecutorExt, OptionOverrides, RemoteClient, UserClient, XcliClient};
