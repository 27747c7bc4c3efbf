//! Codec module - request serialization and response decoding.
//!
//! - [`CommandRequest`] builds the `command` request element
//! - [`decode_response`] checks delivery and outcome status and produces a
//!   [`Response`] or a classified error
//! - [`Response`] exposes decoded result elements as [`Value`]s
//!
//! # Example
//!
//! ```
//! use xcli_client::codec::{Arguments, CommandRequest, OptionMap};
//!
//! let request = CommandRequest {
//!     id: 1,
//!     command: "vol_list".to_string(),
//!     options: OptionMap::new(),
//!     arguments: Arguments::new().with("pool", "p1"),
//!     remote_target: None,
//! };
//! let wire = String::from_utf8(request.to_bytes()).unwrap();
//! assert!(wire.contains(r#"<argument name="pool" value="p1"/>"#));
//! ```

mod decode;
mod request;
mod response;

pub use decode::decode_response;
pub use request::{ArgValue, Arguments, CommandRequest, OptionMap};
pub use response::{Response, Value, ID_FIELD};
