//! JSON-RPC envelope types for the Zabbix API
//!
//! Zabbix speaks JSON-RPC 2.0 over HTTP POST, one request per exchange.
//! Two authentication conventions exist across server generations:
//!
//! - **Legacy** (up to 6.x): the session token travels inside the request
//!   body as an `auth` member.
//! - **Header** (7.0 and later): the body carries no `auth` member at all and
//!   the token is sent as `Authorization: Bearer <token>`.
//!
//! The envelope types here encode both conventions; picking between them is
//! the caller's job (see [`TransportVariant`]).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC protocol tag sent in every request
pub const JSONRPC_VERSION: &str = "2.0";

/// Request identifier used for every call.
///
/// Each HTTP exchange carries exactly one request, so the identifier is never
/// used to correlate anything and a constant is sufficient.
pub const REQUEST_ID: u64 = 1;

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Also returned by Zabbix for "Session terminated, re-login, please."
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Where the auth token is carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportVariant {
    /// Token inline in the request body (`auth` member)
    Legacy,
    /// Token in the `Authorization: Bearer` header, no `auth` member
    Header,
}

impl TransportVariant {
    /// Token to put in the `Authorization` header, if any
    pub fn bearer_token<'a>(&self, token: Option<&'a str>) -> Option<&'a str> {
        match self {
            TransportVariant::Legacy => None,
            TransportVariant::Header => token.filter(|t| !t.is_empty()),
        }
    }
}

impl fmt::Display for TransportVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportVariant::Legacy => write!(f, "legacy"),
            TransportVariant::Header => write!(f, "header"),
        }
    }
}

/// JSON-RPC request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64,
    /// Inline token; only ever present for the legacy variant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
}

impl Request {
    /// Create an unauthenticated request
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: REQUEST_ID,
            auth: None,
        }
    }

    /// Attach the token the way `variant` expects it in the body.
    ///
    /// Legacy requests always carry `auth`, as an empty string when there is
    /// no token yet. Header requests never carry it.
    pub fn with_auth(mut self, variant: TransportVariant, token: Option<&str>) -> Self {
        self.auth = match variant {
            TransportVariant::Legacy => Some(token.unwrap_or_default().to_string()),
            TransportVariant::Header => None,
        };
        self
    }
}

/// JSON-RPC response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(default)]
    pub result: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServerError>,
    #[serde(default)]
    pub id: Option<Value>,
}

impl Response {
    /// Successful response carrying `result`
    pub fn success(result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result,
            error: None,
            id: Some(Value::from(REQUEST_ID)),
        }
    }

    /// Failed response carrying `error`
    pub fn failure(error: ServerError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Value::Null,
            error: Some(error),
            id: Some(Value::from(REQUEST_ID)),
        }
    }

    /// Split into the result or the server-reported error
    pub fn into_result(self) -> Result<Value, ServerError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }
}

/// Error object reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    pub code: i64,
    pub message: String,
    /// Free-form detail, e.g. "Session terminated, re-login, please."
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ServerError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: i64, message: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data.into()),
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error {}: {}", self.code, self.message)?;
        match self.data.as_deref() {
            Some(data) if !data.is_empty() => write!(f, " ({})", data),
            _ => Ok(()),
        }
    }
}

impl std::error::Error for ServerError {}
