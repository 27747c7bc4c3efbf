//! Error registry mapping status codes and severity levels to error kinds.
//!
//! The built-in registry is constructed once, on first use, from the static
//! tables in `codes.rs`. Custom registries can be assembled with
//! [`ErrorRegistry::new`] and the `register*` methods.
//!
//! # Example
//!
//! ```
//! use xcli_client::status::{ErrorKind, ErrorRegistry, Resolution, Severity};
//!
//! let registry = ErrorRegistry::global();
//! assert_eq!(
//!     registry.resolve(Some("NO_SUCH_CODE"), Some("3")),
//!     Resolution::Command(ErrorKind::Severity(Severity::Runtime))
//! );
//! ```

use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::codes::{CREDENTIALS_CODES, KNOWN_CODES};
use super::{CommandFailure, ErrorKind, Severity};
use crate::codec::Response;
use crate::error::XcliError;
use crate::protocol::{wire_format, Element};

static BUILTIN: Lazy<ErrorRegistry> = Lazy::new(ErrorRegistry::builtin);

/// Status reported when the outcome node lacks code, level or status string.
pub const UNKNOWN_REASON_STATUS: &str = "Unknown reason";

/// Outcome of resolving a code/level pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Command(ErrorKind),
    Credentials,
}

/// Registry of known status codes and severity levels.
#[derive(Debug, Clone, Default)]
pub struct ErrorRegistry {
    /// Exact code to resolution.
    codes: HashMap<String, Resolution>,
    /// Severity level to fallback kind.
    levels: HashMap<String, Severity>,
}

impl ErrorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in registry.
    pub fn global() -> &'static ErrorRegistry {
        &BUILTIN
    }

    fn builtin() -> Self {
        let mut registry = Self::new();
        for severity in Severity::ALL {
            registry.register_level(severity.level(), severity);
        }
        for &(code, name, severity) in KNOWN_CODES {
            registry.register(code, ErrorKind::Specific { name, severity });
        }
        for &code in CREDENTIALS_CODES {
            registry.register_credentials(code);
        }
        registry
    }

    /// Register a code-specific kind.
    pub fn register(&mut self, code: &str, kind: ErrorKind) {
        self.codes.insert(code.to_string(), Resolution::Command(kind));
    }

    /// Register a code belonging to the credentials family.
    pub fn register_credentials(&mut self, code: &str) {
        self.codes.insert(code.to_string(), Resolution::Credentials);
    }

    /// Register a severity level fallback.
    pub fn register_level(&mut self, level: &str, severity: Severity) {
        self.levels.insert(level.to_string(), severity);
    }

    /// Number of registered codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Resolve a code/level pair: exact code, then level, then unknown.
    pub fn resolve(&self, code: Option<&str>, level: Option<&str>) -> Resolution {
        if let Some(resolution) = code.and_then(|c| self.codes.get(c)) {
            return *resolution;
        }
        match level.and_then(|l| self.levels.get(l)) {
            Some(severity) => Resolution::Command(ErrorKind::Severity(*severity)),
            None => Resolution::Command(ErrorKind::UnknownReason),
        }
    }

    /// Build the error for a failed outcome node.
    ///
    /// `encoding` is the active `compress-output` option, used by the
    /// embedded [`Response`] to inflate any compressed return value.
    pub fn classify(&self, outcome: Element, encoding: Option<&str>) -> XcliError {
        let (code, level, status) = match outcome_fields(&outcome) {
            Ok((code, level, status)) => (
                Some(code.to_string()),
                Some(level.to_string()),
                status.to_string(),
            ),
            Err(_) => (None, None, UNKNOWN_REASON_STATUS.to_string()),
        };

        let resolution = self.resolve(code.as_deref(), level.as_deref());
        let kind = match resolution {
            Resolution::Command(kind) => kind,
            Resolution::Credentials => ErrorKind::Credentials {
                severity: level.as_deref().and_then(|l| self.levels.get(l)).copied(),
            },
        };
        let failure = Box::new(CommandFailure {
            kind,
            code,
            level,
            status,
            return_value: Response::new(outcome.clone(), encoding),
            xml: outcome,
        });
        match resolution {
            Resolution::Credentials => XcliError::Credentials(failure),
            Resolution::Command(_) => XcliError::Command(failure),
        }
    }
}

/// Reads `(code, level, status_str)`; all three or nothing.
fn outcome_fields(outcome: &Element) -> Result<(&str, &str, &str), XcliError> {
    Ok((
        outcome.find_attr(wire_format::CODE_PATH, wire_format::VALUE_ATTR)?,
        outcome.find_attr(wire_format::LEVEL_PATH, wire_format::VALUE_ATTR)?,
        outcome.find_attr(wire_format::STATUS_STR_PATH, wire_format::VALUE_ATTR)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(code: &str, level: &str, status: &str) -> Element {
        Element::new("command")
            .with_child(Element::new("code").with_attr("value", code))
            .with_child(Element::new("status").with_attr("value", level))
            .with_child(Element::new("status_str").with_attr("value", status))
    }

    #[test]
    fn test_exact_code_wins_over_level() {
        let registry = ErrorRegistry::global();
        let resolution = registry.resolve(Some("ILLEGAL_VALUE"), Some("3"));
        assert_eq!(
            resolution,
            Resolution::Command(ErrorKind::Specific {
                name: "IllegalValueForArgument",
                severity: Severity::Syntax,
            })
        );
    }

    #[test]
    fn test_level_fallback() {
        let registry = ErrorRegistry::global();
        assert_eq!(
            registry.resolve(Some("BRAND_NEW_CODE"), Some("4")),
            Resolution::Command(ErrorKind::Severity(Severity::PassiveManager))
        );
    }

    #[test]
    fn test_unknown_reason() {
        let registry = ErrorRegistry::global();
        assert_eq!(
            registry.resolve(Some("BRAND_NEW_CODE"), Some("42")),
            Resolution::Command(ErrorKind::UnknownReason)
        );
        assert_eq!(
            registry.resolve(None, None),
            Resolution::Command(ErrorKind::UnknownReason)
        );
    }

    #[test]
    fn test_credentials_family() {
        let registry = ErrorRegistry::global();
        assert_eq!(
            registry.resolve(Some("INCORRECT_PASSWORD"), Some("3")),
            Resolution::Credentials
        );
    }

    #[test]
    fn test_custom_registry() {
        let mut registry = ErrorRegistry::new();
        assert!(registry.is_empty());
        registry.register(
            "MY_CODE",
            ErrorKind::Specific {
                name: "Mine",
                severity: Severity::Internal,
            },
        );
        assert_eq!(registry.len(), 1);
        // No levels registered: anything else is unknown.
        assert_eq!(
            registry.resolve(Some("OTHER"), Some("3")),
            Resolution::Command(ErrorKind::UnknownReason)
        );
    }

    #[test]
    fn test_classify_command_failure() {
        let err = ErrorRegistry::global().classify(
            outcome("VOLUME_BAD_NAME", "3", "Volume name does not exist"),
            Some("base64"),
        );
        match &err {
            XcliError::Command(failure) => {
                assert_eq!(failure.code.as_deref(), Some("VOLUME_BAD_NAME"));
                assert_eq!(failure.level.as_deref(), Some("3"));
                assert_eq!(failure.kind.name(), "VolumeBadName");
            }
            other => panic!("expected command failure, got {:?}", other),
        }
        assert_eq!(err.to_string(), "Volume name does not exist");
        assert!(err.is_command_failure());
    }

    #[test]
    fn test_classify_unregistered_code_keeps_code() {
        let err = ErrorRegistry::global().classify(
            outcome("NEVER_SEEN_BEFORE", "77", "Something odd"),
            None,
        );
        let failure = err.command_failure().unwrap();
        assert_eq!(failure.kind, ErrorKind::UnknownReason);
        assert_eq!(failure.code.as_deref(), Some("NEVER_SEEN_BEFORE"));
    }

    #[test]
    fn test_classify_credentials_is_not_command_failure() {
        let err = ErrorRegistry::global().classify(
            outcome("USER_NAME_DOES_NOT_EXIST", "3", "User name does not exist"),
            None,
        );
        assert!(err.is_credentials());
        assert!(!err.is_command_failure());
        assert_eq!(err.code(), Some("USER_NAME_DOES_NOT_EXIST"));

        let failure = err.command_failure().unwrap();
        assert_eq!(
            failure.kind,
            ErrorKind::Credentials {
                severity: Some(Severity::Runtime)
            }
        );
        assert_eq!(failure.kind.name(), "CredentialsError");
        assert_eq!(failure.kind.severity(), Some(Severity::Runtime));
    }

    #[test]
    fn test_classify_credentials_unregistered_level() {
        let err = ErrorRegistry::global().classify(
            outcome("INCORRECT_PASSWORD", "42", "Incorrect password"),
            None,
        );
        let failure = err.command_failure().unwrap();
        assert_eq!(failure.kind, ErrorKind::Credentials { severity: None });
    }

    #[test]
    fn test_classify_missing_fields_is_unknown_reason() {
        let node = Element::new("command").with_child(Element::new("code").with_attr("value", "X"));
        let err = ErrorRegistry::global().classify(node, None);
        let failure = err.command_failure().unwrap();
        assert_eq!(failure.kind, ErrorKind::UnknownReason);
        assert_eq!(failure.code, None);
        assert_eq!(failure.status, UNKNOWN_REASON_STATUS);
    }
}
