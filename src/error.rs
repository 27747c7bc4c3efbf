//! Error types for xcli-client.
//!
//! Every failure the runtime can raise is a variant of [`XcliError`]. The
//! variants group into the families callers usually branch on:
//!
//! - **Transport**: [`XcliError::Connection`], [`XcliError::ClosedTransport`],
//!   [`XcliError::DisconnectedWhileReceiving`], [`XcliError::Io`], [`XcliError::Tls`]
//! - **Protocol**: [`XcliError::Syntax`], [`XcliError::CorruptResponse`]
//! - **Command**: [`XcliError::Command`] and [`XcliError::Delivery`]
//! - **Credentials**: [`XcliError::Credentials`], never reported as a command failure

use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::status::{CommandFailure, DeliveryFailure};
use crate::transport::Endpoint;

/// Main error type for all xcli operations.
#[derive(Debug, Error)]
pub enum XcliError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS setup or handshake failure.
    #[error("TLS error: {0}")]
    Tls(String),

    /// No candidate endpoint accepted a connection.
    #[error("{message} {}", EndpointFailures(.failures))]
    Connection {
        message: String,
        failures: Vec<EndpointFailure>,
    },

    /// The transport is closed or has run out of endpoints to try.
    #[error("transport closed: {message} {}", EndpointFailures(.failures))]
    ClosedTransport {
        message: String,
        failures: Vec<EndpointFailure>,
    },

    /// The peer went away before the response document was complete.
    #[error("disconnected while receiving data")]
    DisconnectedWhileReceiving,

    /// Malformed XML.
    #[error("Malformed XML (line {}, XML {preview:?}): {message}", DisplayLine(.line))]
    Syntax {
        message: String,
        line: Option<u64>,
        preview: String,
    },

    /// A node the decoder expected is missing.
    #[error("Cannot parse XML (cannot find {path}):\n{xml}")]
    ElementNotFound { path: String, xml: String },

    /// The response could not be interpreted.
    #[error("corrupt response: {message}")]
    CorruptResponse {
        message: String,
        raw: Option<Bytes>,
        #[source]
        source: Option<Box<XcliError>>,
    },

    /// The command reached the array and failed.
    #[error("{0}")]
    Command(Box<CommandFailure>),

    /// The command was rejected because of the supplied credentials.
    #[error("{}\n\n{}", .0.status, .0.xml)]
    Credentials(Box<CommandFailure>),

    /// The request was never delivered to the command processor.
    #[error("{0}")]
    Delivery(Box<DeliveryFailure>),

    /// The client (or the view's underlying client) has been closed.
    #[error("client is closed")]
    ClientClosed,

    /// A remote-target view cannot route to yet another target.
    #[error("remote targets cannot be chained")]
    TargetChaining,

    /// The operation is not available on this transport or view.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias using XcliError.
pub type Result<T> = std::result::Result<T, XcliError>;

/// One failed attempt against one endpoint.
#[derive(Debug)]
pub struct EndpointFailure {
    pub endpoint: Endpoint,
    pub error: XcliError,
}

impl EndpointFailure {
    pub fn new(endpoint: Endpoint, error: XcliError) -> Self {
        Self { endpoint, error }
    }
}

impl fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.endpoint, self.error)
    }
}

struct EndpointFailures<'a>(&'a [EndpointFailure]);

impl fmt::Display for EndpointFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", failure)?;
        }
        f.write_str("]")
    }
}

struct DisplayLine<'a>(&'a Option<u64>);

impl fmt::Display for DisplayLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(line) => write!(f, "{}", line),
            None => f.write_str("None"),
        }
    }
}

impl XcliError {
    pub(crate) fn syntax(message: impl Into<String>, line: Option<u64>, original: &str) -> Self {
        XcliError::Syntax {
            message: message.into(),
            line,
            preview: brief(original, PREVIEW_LIMIT),
        }
    }

    pub(crate) fn corrupt(message: impl Into<String>) -> Self {
        XcliError::CorruptResponse {
            message: message.into(),
            raw: None,
            source: None,
        }
    }

    pub(crate) fn corrupt_from(message: impl Into<String>, source: XcliError) -> Self {
        XcliError::CorruptResponse {
            message: message.into(),
            raw: None,
            source: Some(Box::new(source)),
        }
    }

    /// Failures the multi-endpoint selector recovers from by rotating endpoints.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            XcliError::Io(_)
                | XcliError::Tls(_)
                | XcliError::Connection { .. }
                | XcliError::ClosedTransport { .. }
                | XcliError::DisconnectedWhileReceiving
        )
    }

    /// Command-level failures, including undelivered commands. Credentials
    /// failures are deliberately not part of this family.
    pub fn is_command_failure(&self) -> bool {
        matches!(self, XcliError::Command(_) | XcliError::Delivery(_))
    }

    pub fn is_credentials(&self) -> bool {
        matches!(self, XcliError::Credentials(_))
    }

    /// Status code reported by the array, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            XcliError::Command(failure) | XcliError::Credentials(failure) => failure.code.as_deref(),
            XcliError::Delivery(failure) => Some(&failure.status),
            _ => None,
        }
    }

    /// The command failure details, for both the command and credentials families.
    pub fn command_failure(&self) -> Option<&CommandFailure> {
        match self {
            XcliError::Command(failure) | XcliError::Credentials(failure) => Some(failure),
            _ => None,
        }
    }

    /// Endpoint failures aggregated by the selectors.
    pub fn endpoint_failures(&self) -> &[EndpointFailure] {
        match self {
            XcliError::Connection { failures, .. } | XcliError::ClosedTransport { failures, .. } => {
                failures
            }
            _ => &[],
        }
    }
}

/// Maximum characters of offending input kept in a syntax error.
pub const PREVIEW_LIMIT: usize = 15;

/// Truncates `text` after `limit` characters, closing any bracket or quote
/// pairs left open so the preview stays readable.
pub fn brief(text: &str, limit: usize) -> String {
    const DOTS: &str = "...";
    let mut pending: Vec<char> = Vec::new();
    for (i, (offset, c)) in text.char_indices().enumerate() {
        if i >= limit + pending.len() {
            let mut out = String::with_capacity(offset + DOTS.len() + pending.len());
            out.push_str(&text[..offset]);
            out.push_str(DOTS);
            out.extend(pending.iter().rev());
            return out;
        }
        if pending.last() == Some(&c) {
            pending.pop();
            continue;
        }
        let closer = match c {
            '(' => Some(')'),
            '{' => Some('}'),
            '[' => Some(']'),
            '"' => Some('"'),
            '\'' => Some('\''),
            '<' => Some('>'),
            _ => None,
        };
        if let Some(closer) = closer {
            pending.push(closer);
        }
    }
    text.to_string()
}
