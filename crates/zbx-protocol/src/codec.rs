//! Envelope codec
//!
//! Requests and responses travel as single JSON documents in HTTP bodies, so
//! the codec is a pair of functions rather than a streaming framer.

use crate::envelope::{Request, Response};
use crate::error::ProtocolError;

/// Serialize a request envelope into an HTTP body
pub fn encode_request(request: &Request) -> Result<Vec<u8>, ProtocolError> {
    serde_json::to_vec(request).map_err(ProtocolError::Encode)
}

/// Parse an HTTP body into a response envelope
pub fn decode_response(body: &[u8]) -> Result<Response, ProtocolError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::trace!(
            "Undecodable response body: {}",
            String::from_utf8_lossy(&body[..body.len().min(256)])
        );
        ProtocolError::Decode(e)
    })
}
