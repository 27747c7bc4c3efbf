//! Response envelope.
//!
//! Wraps the outcome `command` node of a successful (or failed) reply. When
//! the array compressed its output, the node carries a `compressed_return`
//! child instead of `return`; it is decoded on first access and replaced
//! with a synthetic `return` element.
//!
//! # Example
//!
//! ```
//! use xcli_client::codec::{Response, Value};
//! use xcli_client::protocol::Element;
//!
//! let outcome = Element::parse(
//!     br#"<command><return><volume id="1"><name value="v1"/></volume></return></command>"#,
//! )
//! .unwrap();
//! let response = Response::new(outcome, None);
//!
//! let volumes = response.as_list().unwrap();
//! assert_eq!(volumes.len(), 1);
//! assert_eq!(volumes[0].field("name"), Some("v1"));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Read;

use base64::Engine;
use flate2::read::ZlibDecoder;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::{Result, XcliError};
use crate::protocol::wire_format::{COMPRESSED_RETURN_PATH, RETURN_PATH, VALUE_ATTR};
use crate::protocol::{self, Element};

/// Field holding a record's own `id` attribute.
///
/// Other XCLI clients expose the same value as `nextra_element_id`; scripts
/// reading that key should read this one instead.
pub const ID_FIELD: &str = "element_id";

/// Supported `compress-output` encodings.
const BASE64_ENCODING: &str = "base64";

/// Decoded form of a result element.
///
/// Leaves with a `value` attribute become [`Value::Scalar`]; everything else
/// becomes a [`Value::Record`] of child tag to decoded child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    Record(BTreeMap<String, Value>),
}

impl Value {
    pub fn from_element(element: &Element) -> Self {
        if let Some(value) = element.attr(VALUE_ATTR) {
            return Value::Scalar(value.to_string());
        }
        let mut record = BTreeMap::new();
        if let Some(id) = element.attr("id").filter(|id| !id.is_empty()) {
            record.insert(ID_FIELD.to_string(), Value::Scalar(id.to_string()));
        }
        for child in &element.children {
            record.insert(child.tag.clone(), Value::from_element(child));
        }
        Value::Record(record)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(value) => Some(value),
            Value::Record(_) => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Record(record) => record.get(key),
            Value::Scalar(_) => None,
        }
    }

    /// Scalar field of a record.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }
}

/// A decoded reply.
#[derive(Debug, Clone)]
pub struct Response {
    /// Outcome node as received.
    command: Element,
    /// Active `compress-output` option when the command ran.
    encoding: Option<String>,
    /// Outcome node with any compressed return inflated.
    inflated: OnceCell<Element>,
}

impl Response {
    pub fn new(command: Element, encoding: Option<&str>) -> Self {
        Self {
            command,
            encoding: encoding.map(str::to_string),
            inflated: OnceCell::new(),
        }
    }

    /// The outcome node, with any compressed return inflated.
    pub fn element(&self) -> Result<&Element> {
        self.inflated
            .get_or_try_init(|| inflate(&self.command, self.encoding.as_deref()))
    }

    /// The `return` node, if the command returned anything.
    pub fn return_element(&self) -> Result<Option<&Element>> {
        Ok(self.element()?.find(RETURN_PATH))
    }

    /// Distinct tags of the return node's children.
    pub fn contained_element_types(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .return_element()?
            .map(|ret| ret.children.iter().map(|c| c.tag.clone()).collect())
            .unwrap_or_default())
    }

    /// Decoded children of `return[/response_path]`, optionally filtered by tag.
    pub fn all(&self, element_type: Option<&str>, response_path: Option<&str>) -> Result<Vec<Value>> {
        let path = match response_path {
            Some(sub) => format!("{}/{}", RETURN_PATH, sub),
            None => RETURN_PATH.to_string(),
        };
        let Some(container) = self.element()?.find(&path) else {
            return Ok(Vec::new());
        };
        Ok(container
            .children
            .iter()
            .filter(|child| element_type.map_or(true, |t| child.tag == t))
            .map(Value::from_element)
            .collect())
    }

    /// Every decoded child of the return node.
    pub fn as_list(&self) -> Result<Vec<Value>> {
        self.all(None, None)
    }

    /// Single-element view.
    ///
    /// With exactly one child under `return`, that child's decoded form;
    /// otherwise the decoded `return` node itself. `None` if there is no
    /// return node.
    pub fn as_single_element(&self) -> Result<Option<Value>> {
        let Some(ret) = self.return_element()? else {
            return Ok(None);
        };
        match ret.children.as_slice() {
            [only] => Ok(Some(Value::from_element(only))),
            _ => Ok(Some(Value::from_element(ret))),
        }
    }

    /// Decoded children keyed by one of their scalar fields.
    pub fn as_dict(
        &self,
        key: &str,
        element_type: Option<&str>,
        response_path: Option<&str>,
    ) -> Result<BTreeMap<String, Value>> {
        let mut out = BTreeMap::new();
        for value in self.all(element_type, response_path)? {
            let Some(id) = value.field(key).map(str::to_string) else {
                return Err(XcliError::corrupt(format!("result element has no field '{}'", key)));
            };
            out.insert(id, value);
        }
        Ok(out)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.return_element()?.map_or(0, |ret| ret.children.len()))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, index: usize) -> Result<Option<Value>> {
        Ok(self
            .return_element()?
            .and_then(|ret| ret.children.get(index))
            .map(Value::from_element))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.element() {
            Ok(element) => write!(f, "{}", element),
            Err(_) => write!(f, "{}", self.command),
        }
    }
}

fn inflate(command: &Element, encoding: Option<&str>) -> Result<Element> {
    let mut command = command.clone();
    let Some(compressed) = command.take_child(COMPRESSED_RETURN_PATH) else {
        return Ok(command);
    };
    let text = compressed.attr(VALUE_ATTR).ok_or_else(|| {
        XcliError::corrupt(format!("{} has no {} attribute", COMPRESSED_RETURN_PATH, VALUE_ATTR))
    })?;

    let packed = match encoding {
        Some(BASE64_ENCODING) => base64::engine::general_purpose::STANDARD
            .decode(text.trim())
            .map_err(|e| XcliError::corrupt(format!("compressed return is not base64: {}", e)))?,
        Some(other) => {
            return Err(XcliError::corrupt(format!(
                "unsupported output encoding '{}'",
                other
            )))
        }
        None => return Err(XcliError::corrupt("compressed return without an output encoding")),
    };

    let mut raw = Vec::new();
    ZlibDecoder::new(packed.as_slice())
        .read_to_end(&mut raw)
        .map_err(|e| XcliError::corrupt(format!("cannot inflate compressed return: {}", e)))?;

    let mut wrapped = Vec::with_capacity(raw.len() + 17);
    wrapped.extend_from_slice(b"<return>");
    wrapped.extend_from_slice(&raw);
    wrapped.extend_from_slice(b"</return>");
    let ret = protocol::parse(&wrapped)
        .map_err(|e| XcliError::corrupt_from("inflated return is not well-formed", e))?;

    tracing::trace!(bytes = raw.len(), "inflated compressed return");
    command.push(ret);
    Ok(command)
}
