//! Protocol error types

use thiserror::Error;

/// Errors that can occur while encoding or decoding envelopes
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Request could not be serialized
    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// Response body is not a valid envelope
    #[error("Malformed response envelope: {0}")]
    Decode(#[source] serde_json::Error),
}
