//! XML element tree.
//!
//! A deliberately small DOM: tag, ordered attributes, concatenated text and
//! children. Responses address nodes by `/`-separated tag paths relative to
//! an element, the first match in document order wins.
//!
//! # Example
//!
//! ```
//! use xcli_client::protocol::Element;
//!
//! let root = Element::new("command")
//!     .with_child(Element::new("aserver").with_attr("status", "DELIVERY_SUCCESSFUL"));
//!
//! assert_eq!(root.find_attr("aserver", "status").unwrap(), "DELIVERY_SUCCESSFUL");
//! assert!(root.find("administrator/command").is_none());
//! ```

use std::fmt;
use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{Result, XcliError};

/// One XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Character data directly inside this element.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing one of the same name.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Direct children with the given tag.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// Remove and return the first direct child with the given tag.
    pub fn take_child(&mut self, tag: &str) -> Option<Element> {
        let index = self.children.iter().position(|child| child.tag == tag)?;
        Some(self.children.remove(index))
    }

    /// First element matching a relative tag path.
    pub fn find(&self, path: &str) -> Option<&Element> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        find_in(self, &segments)
    }

    /// Like [`find`](Self::find), failing with [`XcliError::ElementNotFound`].
    pub fn require(&self, path: &str) -> Result<&Element> {
        self.find(path).ok_or_else(|| self.not_found(path))
    }

    /// Attribute of the element at `path`.
    pub fn find_attr(&self, path: &str, attr: &str) -> Result<&str> {
        self.require(path)?
            .attr(attr)
            .ok_or_else(|| self.not_found(&format!("{}/@{}", path, attr)))
    }

    fn not_found(&self, path: &str) -> XcliError {
        XcliError::ElementNotFound {
            path: path.to_string(),
            xml: self.to_string(),
        }
    }

    /// Parse a complete document.
    pub fn parse(xml: &[u8]) -> Result<Element> {
        super::frame_detector::parse(xml)
    }

    fn write_into<W: Write>(&self, writer: &mut Writer<W>) -> std::result::Result<(), String> {
        let mut start = BytesStart::new(self.tag.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }
        if self.text.is_empty() && self.children.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(|e| e.to_string());
        }
        writer
            .write_event(Event::Start(start))
            .map_err(|e| e.to_string())?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(|e| e.to_string())?;
        }
        for child in &self.children {
            child.write_into(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.tag.as_str())))
            .map_err(|e| e.to_string())
    }

    /// Serialize to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = Writer::new(Vec::new());
        // Writing into a Vec cannot fail.
        let _ = self.write_into(&mut writer);
        writer.into_inner()
    }
}

fn find_in<'a>(element: &'a Element, segments: &[&str]) -> Option<&'a Element> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(element);
    };
    element
        .children
        .iter()
        .filter(|child| child.tag == *first)
        .find_map(|child| find_in(child, rest))
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> Element {
        Element::new("command")
            .with_child(Element::new("aserver").with_attr("status", "DELIVERY_SUCCESSFUL"))
            .with_child(
                Element::new("administrator").with_child(
                    Element::new("command")
                        .with_attr("id", "0")
                        .with_child(Element::new("code").with_attr("value", "SUCCESS")),
                ),
            )
    }

    #[test]
    fn test_find_nested_path() {
        let root = response();
        let outcome = root.find("administrator/command").unwrap();
        assert_eq!(outcome.attr("id"), Some("0"));
        assert_eq!(outcome.find_attr("code", "value").unwrap(), "SUCCESS");
    }

    #[test]
    fn test_find_first_match_in_document_order() {
        let root = Element::new("r")
            .with_child(Element::new("a"))
            .with_child(Element::new("a").with_child(Element::new("b").with_attr("n", "2")));
        // The first <a> has no <b>; the search continues into the second.
        assert_eq!(root.find("a/b").unwrap().attr("n"), Some("2"));
    }

    #[test]
    fn test_find_with_borrowed_path() {
        let root = response();
        let found = {
            let path = format!("{}/{}", "administrator", "command");
            root.find(&path).map(|outcome| outcome.attr("id"))
        };
        assert_eq!(found, Some(Some("0")));
    }

    #[test]
    fn test_require_missing_path() {
        let root = response();
        let err = root.require("command/administrator/command").unwrap_err();
        match err {
            XcliError::ElementNotFound { path, xml } => {
                assert_eq!(path, "command/administrator/command");
                assert!(xml.starts_with("<command>"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_find_attr_missing_attribute() {
        let root = response();
        let err = root.find_attr("aserver", "missing").unwrap_err();
        assert!(err.to_string().contains("aserver/@missing"));
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut element = Element::new("x").with_attr("a", "1");
        element.set_attr("a", "2");
        assert_eq!(element.attributes.len(), 1);
        assert_eq!(element.attr("a"), Some("2"));
    }

    #[test]
    fn test_take_child() {
        let mut element = Element::new("x")
            .with_child(Element::new("a"))
            .with_child(Element::new("b"));
        assert_eq!(element.take_child("a").map(|c| c.tag), Some("a".to_string()));
        assert!(element.take_child("a").is_none());
        assert_eq!(element.children.len(), 1);
    }

    #[test]
    fn test_serialization_escapes_attributes() {
        let element = Element::new("option")
            .with_attr("name", "description")
            .with_attr("value", "a < b & \"c\"");
        let text = element.to_string();
        assert!(text.starts_with("<option name=\"description\""));
        assert!(text.contains("&lt;"));
        assert!(text.contains("&amp;"));
        assert!(text.ends_with("/>"));
    }

    #[test]
    fn test_serialize_then_parse() {
        let original = response().with_text("");
        let parsed = Element::parse(&original.to_bytes()).unwrap();
        assert_eq!(parsed, original);
    }
}
