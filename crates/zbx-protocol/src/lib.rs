//! zbx-protocol: Wire protocol for the Zabbix JSON-RPC API
//!
//! This crate defines the request/response envelopes exchanged with a Zabbix
//! frontend, the codec that turns them into bytes, endpoint normalization,
//! and the typed payload that API results are classified into.

pub mod codec;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod payload;

pub use codec::{decode_response, encode_request};
pub use endpoint::{normalize_api_url, API_PATH};
pub use envelope::{
    Request, Response, ServerError, TransportVariant, INTERNAL_ERROR, INVALID_PARAMS,
    INVALID_REQUEST, JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR, REQUEST_ID,
};
pub use error::ProtocolError;
pub use payload::{Payload, Record};
