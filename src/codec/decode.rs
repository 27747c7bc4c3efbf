//! Response decoding.
//!
//! Order of checks:
//! 1. delivery status (`aserver/@status`) must be `DELIVERY_SUCCESSFUL`
//! 2. the outcome node is located at one of two nesting depths
//! 3. the outcome `code/@value` must be `SUCCESS`, otherwise the registry
//!    classifies the failure
//!
//! A node missing anywhere on this path is reported as
//! [`XcliError::CorruptResponse`] with the lookup failure as its source.

use bytes::Bytes;

use super::Response;
use crate::error::{Result, XcliError};
use crate::protocol::wire_format::{
    CODE_PATH, DELIVERY_STATUS_ATTR, DELIVERY_STATUS_PATH, DELIVERY_SUCCESSFUL, OUTCOME_PATHS,
    SUCCESS, VALUE_ATTR,
};
use crate::protocol::Element;
use crate::status::{DeliveryFailure, ErrorRegistry};

/// Decode a response root into an envelope or a classified error.
///
/// `encoding` is the `compress-output` option active when the command ran.
pub fn decode_response(
    root: Element,
    encoding: Option<&str>,
    registry: &ErrorRegistry,
) -> Result<Response> {
    match decode_inner(&root, encoding, registry) {
        Err(err @ XcliError::ElementNotFound { .. }) => Err(XcliError::CorruptResponse {
            message: "response is missing an expected element".to_string(),
            raw: Some(Bytes::from(root.to_bytes())),
            source: Some(Box::new(err)),
        }),
        other => other,
    }
}

fn decode_inner(root: &Element, encoding: Option<&str>, registry: &ErrorRegistry) -> Result<Response> {
    let delivery = root.find_attr(DELIVERY_STATUS_PATH, DELIVERY_STATUS_ATTR)?;
    if delivery != DELIVERY_SUCCESSFUL {
        return Err(XcliError::Delivery(Box::new(DeliveryFailure::new(
            delivery,
            root.clone(),
        ))));
    }

    let outcome = locate_outcome(root)?;
    let code = outcome.find_attr(CODE_PATH, VALUE_ATTR)?;
    if code != SUCCESS {
        return Err(registry.classify(outcome.clone(), encoding));
    }
    Ok(Response::new(outcome.clone(), encoding))
}

/// Outcome node, shallowest accepted depth first.
fn locate_outcome(root: &Element) -> Result<&Element> {
    OUTCOME_PATHS
        .iter()
        .find_map(|path| root.find(path))
        .map_or_else(|| root.require(OUTCOME_PATHS[OUTCOME_PATHS.len() - 1]), Ok)
}
