//! Incremental response detector.
//!
//! Responses are not length-prefixed: a response is complete exactly when
//! the closing tag of its root element has arrived. The detector consumes
//! whatever chunks the socket yields, splits the buffered bytes into whole
//! markup units (tags, comments, processing instructions, CDATA sections,
//! text runs) and tracks the open-element stack. Incomplete units stay in
//! the buffer until the next feed.
//!
//! Any well-formedness violation fails immediately and poisons the detector.
//!
//! # Example
//!
//! ```
//! use xcli_client::protocol::FrameDetector;
//!
//! let mut detector = FrameDetector::new();
//! detector.feed(b"<command><code value=").unwrap();
//! assert!(!detector.is_closed());
//! detector.feed(b"\"SUCCESS\"/></command>").unwrap();
//! assert!(detector.is_closed());
//!
//! let root = detector.close().unwrap();
//! assert_eq!(root.find_attr("code", "value").unwrap(), "SUCCESS");
//! ```

use bytes::BytesMut;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::Element;
use crate::error::{Result, XcliError};

const COMMENT_OPEN: &[u8] = b"<!--";
const COMMENT_CLOSE: &[u8] = b"-->";
const CDATA_OPEN: &[u8] = b"<![CDATA[";
const CDATA_CLOSE: &[u8] = b"]]>";
const PI_OPEN: &[u8] = b"<?";
const PI_CLOSE: &[u8] = b"?>";

const INVALID_TOKEN: &str = "not well-formed (invalid token)";
const JUNK_AFTER_ROOT: &str = "junk after document element";

/// Resume point inside the unit at the head of the buffer.
#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    offset: usize,
    quote: Option<u8>,
    depth: usize,
}

/// Detects the end of a streamed XML document.
#[derive(Debug)]
pub struct FrameDetector {
    /// Bytes not yet consumed as whole units.
    buffer: BytesMut,
    cursor: Cursor,
    /// Line number at the head of `buffer`.
    line: u64,
    /// Currently open elements, innermost last.
    open: Vec<Element>,
    root: Option<Element>,
    failed: bool,
}

impl FrameDetector {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(16 * 1024),
            cursor: Cursor::default(),
            line: 1,
            open: Vec::new(),
            root: None,
            failed: false,
        }
    }

    /// Feed the next chunk.
    ///
    /// # Errors
    ///
    /// [`XcliError::Syntax`] on the first well-formedness violation, and on
    /// every feed after that.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<()> {
        if self.failed {
            return Err(XcliError::syntax(
                "parser already failed",
                Some(self.line),
                &String::from_utf8_lossy(chunk),
            ));
        }
        self.buffer.extend_from_slice(chunk);
        if let Err(message) = self.drain() {
            self.failed = true;
            return Err(XcliError::syntax(
                message,
                Some(self.line),
                &String::from_utf8_lossy(chunk),
            ));
        }
        Ok(())
    }

    /// True once the root element's closing tag has been consumed.
    pub fn is_closed(&self) -> bool {
        self.root.is_some()
    }

    /// Number of buffered bytes not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Finish the document and return the root element.
    pub fn finish(mut self) -> Result<Element> {
        let rest = String::from_utf8_lossy(&self.buffer).into_owned();
        if self.failed {
            return Err(XcliError::syntax("parser already failed", Some(self.line), &rest));
        }
        let trailing = !rest.trim().is_empty();
        match self.root.take() {
            Some(_) if trailing => Err(XcliError::syntax(JUNK_AFTER_ROOT, Some(self.line), &rest)),
            Some(root) => Ok(root),
            None if self.open.is_empty() && !trailing => {
                Err(XcliError::syntax("no element found", Some(self.line), &rest))
            }
            None => Err(XcliError::syntax("unclosed token", Some(self.line), &rest)),
        }
    }

    /// Finish the document, then re-validate it by parsing its serialized form.
    pub fn close(self) -> Result<Element> {
        let root = self.finish()?;
        parse(&root.to_bytes())
    }

    fn drain(&mut self) -> std::result::Result<(), String> {
        while let Some(len) = scan(&self.buffer, &mut self.cursor)? {
            let unit = self.buffer.split_to(len);
            self.cursor = Cursor::default();
            self.consume(&unit)?;
            self.line += unit.iter().filter(|&&b| b == b'\n').count() as u64;
        }
        Ok(())
    }

    fn consume(&mut self, unit: &[u8]) -> std::result::Result<(), String> {
        if unit.starts_with(PI_OPEN) || unit.starts_with(COMMENT_OPEN) {
            return Ok(());
        }
        if unit.starts_with(CDATA_OPEN) {
            let content = &unit[CDATA_OPEN.len()..unit.len() - CDATA_CLOSE.len()];
            let content = std::str::from_utf8(content).map_err(|_| INVALID_TOKEN.to_string())?;
            return self.append_text(content.to_string());
        }
        if unit.starts_with(b"<!") {
            if self.root.is_some() || !self.open.is_empty() {
                return Err("misplaced DOCTYPE".to_string());
            }
            return Ok(());
        }
        if unit.starts_with(b"</") {
            return self.end_element(unit);
        }
        if unit.starts_with(b"<") {
            return self.start_element(unit);
        }

        let text = std::str::from_utf8(unit).map_err(|_| INVALID_TOKEN.to_string())?;
        if self.open.is_empty() {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(self.outside_root().to_string());
        }
        let text = quick_xml::escape::unescape(text).map_err(|e| e.to_string())?;
        self.append_text(text.into_owned())
    }

    fn append_text(&mut self, text: String) -> std::result::Result<(), String> {
        match self.open.last_mut() {
            Some(element) => {
                element.text.push_str(&text);
                Ok(())
            }
            None => Err(self.outside_root().to_string()),
        }
    }

    fn outside_root(&self) -> &'static str {
        if self.root.is_some() {
            JUNK_AFTER_ROOT
        } else {
            "syntax error"
        }
    }

    fn start_element(&mut self, unit: &[u8]) -> std::result::Result<(), String> {
        if self.root.is_some() {
            return Err(JUNK_AFTER_ROOT.to_string());
        }
        let mut reader = Reader::from_reader(unit);
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                self.open.push(element_from(&start)?);
                Ok(())
            }
            Ok(Event::Empty(start)) => {
                let element = element_from(&start)?;
                self.attach(element);
                Ok(())
            }
            Ok(_) => Err(INVALID_TOKEN.to_string()),
            Err(e) => Err(e.to_string()),
        }
    }

    fn end_element(&mut self, unit: &[u8]) -> std::result::Result<(), String> {
        let name = std::str::from_utf8(&unit[2..unit.len() - 1])
            .map_err(|_| INVALID_TOKEN.to_string())?
            .trim();
        let Some(element) = self.open.pop() else {
            return Err(self.outside_root().to_string());
        };
        if element.tag != name {
            return Err("mismatched tag".to_string());
        }
        self.attach(element);
        Ok(())
    }

    fn attach(&mut self, element: Element) {
        match self.open.last_mut() {
            Some(parent) => parent.push(element),
            None => self.root = Some(element),
        }
    }
}

impl Default for FrameDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a complete document held in memory.
pub fn parse(xml: &[u8]) -> Result<Element> {
    let mut detector = FrameDetector::new();
    detector.feed(xml)?;
    detector.finish()
}

fn element_from(start: &BytesStart<'_>) -> std::result::Result<Element, String> {
    let tag = std::str::from_utf8(start.name().as_ref())
        .map_err(|_| INVALID_TOKEN.to_string())?
        .to_string();
    if tag.is_empty() {
        return Err(INVALID_TOKEN.to_string());
    }
    let mut element = Element::new(tag);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(|_| INVALID_TOKEN.to_string())?;
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        element.attributes.push((key.to_string(), value.into_owned()));
    }
    Ok(element)
}

/// Length of the whole unit at the head of `buf`, or `None` if it is incomplete.
fn scan(buf: &[u8], cursor: &mut Cursor) -> std::result::Result<Option<usize>, String> {
    if buf.is_empty() {
        return Ok(None);
    }
    if buf[0] != b'<' {
        let from = cursor.offset;
        return Ok(match buf[from..].iter().position(|&b| b == b'<') {
            Some(i) => Some(from + i),
            None => {
                cursor.offset = buf.len();
                None
            }
        });
    }
    if buf.starts_with(PI_OPEN) {
        return Ok(scan_until(buf, PI_OPEN.len(), PI_CLOSE, cursor));
    }
    if buf.starts_with(COMMENT_OPEN) {
        return Ok(scan_until(buf, COMMENT_OPEN.len(), COMMENT_CLOSE, cursor));
    }
    if buf.starts_with(CDATA_OPEN) {
        return Ok(scan_until(buf, CDATA_OPEN.len(), CDATA_CLOSE, cursor));
    }
    if COMMENT_OPEN.starts_with(buf) || CDATA_OPEN.starts_with(buf) {
        return Ok(None);
    }
    if buf.starts_with(b"<!") {
        return Ok(scan_declaration(buf, cursor));
    }
    scan_tag(buf, cursor)
}

fn scan_until(buf: &[u8], start: usize, terminator: &[u8], cursor: &mut Cursor) -> Option<usize> {
    let from = cursor.offset.max(start);
    let found = buf
        .get(from..)
        .and_then(|rest| rest.windows(terminator.len()).position(|w| w == terminator));
    match found {
        Some(i) => Some(from + i + terminator.len()),
        None => {
            cursor.offset = buf.len().saturating_sub(terminator.len() - 1).max(start);
            None
        }
    }
}

fn scan_tag(buf: &[u8], cursor: &mut Cursor) -> std::result::Result<Option<usize>, String> {
    let mut i = cursor.offset.max(1);
    while i < buf.len() {
        let b = buf[i];
        match cursor.quote {
            Some(q) if b == q => cursor.quote = None,
            Some(_) if b == b'<' => return Err(INVALID_TOKEN.to_string()),
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => cursor.quote = Some(b),
                b'>' => return Ok(Some(i + 1)),
                b'<' => return Err(INVALID_TOKEN.to_string()),
                _ => {}
            },
        }
        i += 1;
    }
    cursor.offset = i;
    Ok(None)
}

fn scan_declaration(buf: &[u8], cursor: &mut Cursor) -> Option<usize> {
    let mut i = cursor.offset.max(2);
    while i < buf.len() {
        let b = buf[i];
        match cursor.quote {
            Some(q) if b == q => cursor.quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => cursor.quote = Some(b),
                b'[' => cursor.depth += 1,
                b']' => cursor.depth = cursor.depth.saturating_sub(1),
                b'>' if cursor.depth == 0 => return Some(i + 1),
                _ => {}
            },
        }
        i += 1;
    }
    cursor.offset = i;
    None
}
