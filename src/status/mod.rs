//! Status classification - maps array status codes to error kinds.
//!
//! A failed command carries three fields in its outcome node: a status
//! `code` (e.g. `VOLUME_BAD_NAME`), a severity `status` level (`1`-`5`) and a
//! human readable `status_str`. The [`ErrorRegistry`] resolves them into a
//! [`CommandFailure`] with the most specific [`ErrorKind`] known:
//!
//! 1. exact code match
//! 2. severity level fallback
//! 3. [`ErrorKind::UnknownReason`]
//!
//! Credentials codes resolve to the disjoint [`XcliError::Credentials`]
//! family.
//!
//! [`XcliError::Credentials`]: crate::XcliError::Credentials

mod codes;
mod registry;

use std::fmt;

use crate::codec::Response;
use crate::protocol::Element;

pub use registry::{ErrorRegistry, Resolution};

/// Severity level reported in the outcome node's `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Level `1`.
    Connection,
    /// Level `2`.
    Syntax,
    /// Level `3`.
    Runtime,
    /// Level `4`.
    PassiveManager,
    /// Level `5`.
    Internal,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Connection,
        Severity::Syntax,
        Severity::Runtime,
        Severity::PassiveManager,
        Severity::Internal,
    ];

    /// Wire representation of this level.
    pub fn level(&self) -> &'static str {
        match self {
            Severity::Connection => "1",
            Severity::Syntax => "2",
            Severity::Runtime => "3",
            Severity::PassiveManager => "4",
            Severity::Internal => "5",
        }
    }

    pub fn from_level(level: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.level() == level)
    }
}

/// Concrete kind of a command failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Neither the code nor the level is registered.
    UnknownReason,
    /// Resolved through the severity level only.
    Severity(Severity),
    /// Resolved through an exact code match.
    Specific {
        name: &'static str,
        severity: Severity,
    },
    /// A code of the credentials family, with the severity of its level
    /// when registered.
    Credentials { severity: Option<Severity> },
}

impl ErrorKind {
    pub fn severity(&self) -> Option<Severity> {
        match self {
            ErrorKind::UnknownReason => None,
            ErrorKind::Severity(severity) => Some(*severity),
            ErrorKind::Specific { severity, .. } => Some(*severity),
            ErrorKind::Credentials { severity } => *severity,
        }
    }

    /// Stable name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::UnknownReason => "CommandFailedUnknownReason",
            ErrorKind::Severity(Severity::Connection) => "CommandFailedConnection",
            ErrorKind::Severity(Severity::Syntax) => "CommandFailedSyntax",
            ErrorKind::Severity(Severity::Runtime) => "CommandFailedRuntime",
            ErrorKind::Severity(Severity::PassiveManager) => "CommandFailedPassiveManager",
            ErrorKind::Severity(Severity::Internal) => "CommandFailedInternal",
            ErrorKind::Specific { name, .. } => name,
            ErrorKind::Credentials { .. } => "CredentialsError",
        }
    }
}

/// A command that reached the array and failed.
#[derive(Debug)]
pub struct CommandFailure {
    pub kind: ErrorKind,
    /// Status code (`code/@value`), absent if the outcome node lacked one.
    pub code: Option<String>,
    /// Severity level (`status/@value`).
    pub level: Option<String>,
    /// Human readable status (`status_str/@value`).
    pub status: String,
    /// The raw outcome node.
    pub xml: Element,
    /// Whatever the command returned alongside the failure.
    pub return_value: Response,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status)
    }
}

/// Delivery statuses meaning the remote target could not be reached.
pub const REMOTE_TARGET_ERRORS: [&str; 4] = [
    "TARGET_IS_NOT_CONNECTED",
    "TARGET_DOES_NOT_EXIST",
    "SEND_TO_TARGET_FAILED",
    "GETTING_RESPONSE_FROM_TARGET_FAILED",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryKind {
    /// Any delivery status other than the remote-target ones.
    Generic,
    RemoteTargetUnreachable,
}

/// The outer delivery layer refused or failed to route the command.
#[derive(Debug)]
pub struct DeliveryFailure {
    pub kind: DeliveryKind,
    pub status: String,
    /// The raw response root.
    pub xml: Element,
}

impl DeliveryFailure {
    pub fn new(status: impl Into<String>, xml: Element) -> Self {
        let status = status.into();
        let kind = if REMOTE_TARGET_ERRORS.contains(&status.as_str()) {
            DeliveryKind::RemoteTargetUnreachable
        } else {
            DeliveryKind::Generic
        };
        Self { kind, status, xml }
    }
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_levels_roundtrip() {
        for severity in Severity::ALL {
            assert_eq!(Severity::from_level(severity.level()), Some(severity));
        }
        assert_eq!(Severity::from_level("9"), None);
    }

    #[test]
    fn test_delivery_remote_target_statuses() {
        for status in REMOTE_TARGET_ERRORS {
            let failure = DeliveryFailure::new(status, Element::new("command"));
            assert_eq!(failure.kind, DeliveryKind::RemoteTargetUnreachable);
        }
    }

    #[test]
    fn test_delivery_generic_status() {
        let failure = DeliveryFailure::new("AUTHENTICATION_FAILED", Element::new("command"));
        assert_eq!(failure.kind, DeliveryKind::Generic);
        assert_eq!(failure.to_string(), "AUTHENTICATION_FAILED");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::UnknownReason.name(), "CommandFailedUnknownReason");
        assert_eq!(
            ErrorKind::Severity(Severity::Syntax).name(),
            "CommandFailedSyntax"
        );
        let specific = ErrorKind::Specific {
            name: "VolumeBadName",
            severity: Severity::Runtime,
        };
        assert_eq!(specific.name(), "VolumeBadName");
        assert_eq!(specific.severity(), Some(Severity::Runtime));
    }
}
