//! Command request building.
//!
//! A [`CommandRequest`] serializes to a single `command` element with one
//! `option` child per active option and one `argument` child per argument.
//! Booleans render as `yes`/`no`, everything else through `Display`.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, XcliError};
use crate::protocol::wire_format::{
    ARGUMENT_TAG, CLOSE_ON_RETURN_ATTR, COMMAND_TAG, ID_ATTR, NAME_ATTR, NO, OPTION_TAG,
    PASSWORD_MASK, PASSWORD_OPTION, REMOTE_TARGET_ATTR, TYPE_ATTR, VALUE_ATTR, YES,
};
use crate::protocol::Element;

/// Active option snapshot, keyed by normalized option name.
pub type OptionMap = BTreeMap<String, String>;

/// A single argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Bool(bool),
    Text(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(true) => f.write_str(YES),
            ArgValue::Bool(false) => f.write_str(NO),
            ArgValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

impl From<&String> for ArgValue {
    fn from(value: &String) -> Self {
        ArgValue::Text(value.clone())
    }
}

macro_rules! arg_value_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ArgValue {
                fn from(value: $ty) -> Self {
                    ArgValue::Text(value.to_string())
                }
            }
        )*
    };
}

arg_value_from_display!(i8, i16, i32, i64, u8, u16, u32, u64, isize, usize, f32, f64);

/// Ordered command arguments.
///
/// ```
/// use xcli_client::Arguments;
///
/// let args = Arguments::new().with("vol", "v1").with("size", 17).with("force", true);
/// assert_eq!(args.get("force").map(|v| v.to_string()), Some("yes".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments {
    entries: Vec<(String, ArgValue)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Add an argument, replacing an earlier one with the same name in place.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Arguments::new();
        for (name, value) in iter {
            args.push(name, value);
        }
        args
    }
}

/// One outbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub id: u64,
    pub command: String,
    pub options: OptionMap,
    pub arguments: Arguments,
    pub remote_target: Option<String>,
}

impl CommandRequest {
    pub fn to_element(&self) -> Element {
        let mut root = Element::new(COMMAND_TAG)
            .with_attr(ID_ATTR, self.id.to_string())
            .with_attr(TYPE_ATTR, self.command.as_str())
            .with_attr(CLOSE_ON_RETURN_ATTR, NO);
        if let Some(target) = self.remote_target.as_deref().filter(|t| !t.is_empty()) {
            root.set_attr(REMOTE_TARGET_ATTR, target);
        }
        for (name, value) in &self.options {
            root.push(pair(OPTION_TAG, name, value));
        }
        for (name, value) in self.arguments.iter() {
            root.push(pair(ARGUMENT_TAG, name, &value.to_string()));
        }
        root
    }

    /// Bytes sent on the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_element().to_bytes()
    }

    /// Request text safe for logging: the password option value is masked.
    pub fn masked(&self) -> String {
        let mut root = self.to_element();
        for option in root.children.iter_mut().filter(|c| c.tag == OPTION_TAG) {
            if option.attr(NAME_ATTR) == Some(PASSWORD_OPTION) {
                option.set_attr(VALUE_ATTR, PASSWORD_MASK);
            }
        }
        root.to_string()
    }

    /// Rebuild a request from its serialized form.
    pub fn from_element(root: &Element) -> Result<Self> {
        if root.tag != COMMAND_TAG {
            return Err(XcliError::corrupt(format!(
                "expected <{}>, found <{}>",
                COMMAND_TAG, root.tag
            )));
        }
        let id = root
            .attr(ID_ATTR)
            .and_then(|id| id.parse::<u64>().ok())
            .ok_or_else(|| XcliError::corrupt("request id missing or not numeric"))?;
        let command = root
            .attr(TYPE_ATTR)
            .ok_or_else(|| XcliError::corrupt("request type missing"))?
            .to_string();

        let mut options = OptionMap::new();
        let mut arguments = Arguments::new();
        for child in &root.children {
            let name = child.attr(NAME_ATTR).unwrap_or_default().to_string();
            let value = child.attr(VALUE_ATTR).unwrap_or_default().to_string();
            match child.tag.as_str() {
                OPTION_TAG => {
                    options.insert(name, value);
                }
                ARGUMENT_TAG => arguments.push(name, value),
                _ => {}
            }
        }

        Ok(Self {
            id,
            command,
            options,
            arguments,
            remote_target: root.attr(REMOTE_TARGET_ATTR).map(str::to_string),
        })
    }
}

fn pair(tag: &str, name: &str, value: &str) -> Element {
    Element::new(tag)
        .with_attr(NAME_ATTR, name)
        .with_attr(VALUE_ATTR, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CommandRequest {
        let mut options = OptionMap::new();
        options.insert("user".to_string(), "admin".to_string());
        options.insert("password".to_string(), "secret".to_string());
        CommandRequest {
            id: 12,
            command: "vol_create".to_string(),
            options,
            arguments: Arguments::new()
                .with("vol", "v1")
                .with("size", 17)
                .with("thin", false),
            remote_target: None,
        }
    }

    #[test]
    fn test_build_attributes() {
        let root = request().to_element();
        assert_eq!(root.tag, "command");
        assert_eq!(root.attr("id"), Some("12"));
        assert_eq!(root.attr("type"), Some("vol_create"));
        assert_eq!(root.attr("close_on_return"), Some("no"));
        assert_eq!(root.attr("remote_target"), None);
    }

    #[test]
    fn test_build_children() {
        let root = request().to_element();
        let arguments: Vec<_> = root
            .children_named("argument")
            .map(|c| (c.attr("name").unwrap(), c.attr("value").unwrap()))
            .collect();
        assert_eq!(
            arguments,
            vec![("vol", "v1"), ("size", "17"), ("thin", "no")]
        );
        assert_eq!(root.children_named("option").count(), 2);
    }

    #[test]
    fn test_remote_target_attribute() {
        let mut req = request();
        req.remote_target = Some("mirror-b".to_string());
        assert_eq!(req.to_element().attr("remote_target"), Some("mirror-b"));

        req.remote_target = Some(String::new());
        assert_eq!(req.to_element().attr("remote_target"), None);
    }

    #[test]
    fn test_masked_hides_password_only_in_log_text() {
        let req = request();
        let log = req.masked();
        assert!(log.contains("XXX"));
        assert!(!log.contains("secret"));
        let wire = String::from_utf8(req.to_bytes()).unwrap();
        assert!(wire.contains("secret"));
        assert!(!wire.contains("XXX"));
    }

    #[test]
    fn test_reparse() {
        let req = request();
        let parsed = Element::parse(&req.to_bytes()).unwrap();
        let back = CommandRequest::from_element(&parsed).unwrap();
        assert_eq!(back.id, req.id);
        assert_eq!(back.options, req.options);
        assert_eq!(back.arguments.get("thin"), Some(&ArgValue::Text("no".into())));
        assert_eq!(back.to_element(), req.to_element());
    }

    #[test]
    fn test_push_replaces_in_place() {
        let mut args = Arguments::new().with("a", 1).with("b", 2);
        args.push("a", 3);
        let names: Vec<_> = args.iter().map(|(n, v)| format!("{}={}", n, v)).collect();
        assert_eq!(names, vec!["a=3", "b=2"]);
    }

    #[test]
    fn test_from_iterator() {
        let args: Arguments = vec![("pool", "p1"), ("vol", "v1")].into_iter().collect();
        assert_eq!(args.len(), 2);
        assert!(!args.is_empty());
    }
}
