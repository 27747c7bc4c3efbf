//! Protocol module - wire format, element tree and response framing.
//!
//! This module implements the XML protocol spoken on the management port:
//! - Wire constants (tags, attributes, status values, default options)
//! - A small element tree with path lookup and serialization
//! - Frame detector that finds the end of a streamed response document

mod element;
mod frame_detector;
pub mod wire_format;

pub use element::Element;
pub use frame_detector::{parse, FrameDetector};
