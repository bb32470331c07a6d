//! Core error types for zbxhub

use std::path::PathBuf;

use thiserror::Error;
use zbx_protocol::{ProtocolError, ServerError};

use crate::version::VersionInfo;

/// Failure of a single wire exchange
#[derive(Error, Debug)]
pub enum TransportError {
    /// Network, DNS or TLS failure
    #[error("HTTP request failed: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Non-success HTTP status without a decodable envelope
    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    /// Envelope could not be encoded or decoded
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Well-formed error reported by the server
    #[error("{0}")]
    Rpc(#[from] ServerError),
}

impl TransportError {
    /// Wrap any network-level error
    pub fn network(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Network(err.into())
    }

    /// Server-reported error code, if this is an RPC error
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            TransportError::Rpc(e) => Some(e.code),
            _ => None,
        }
    }
}

/// Version detection errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// Version string does not carry numeric major and minor segments
    #[error("Malformed version string: {0:?}")]
    Malformed(String),

    /// `apiinfo.version` returned something other than a string
    #[error("Version query returned {0}, expected a string")]
    UnexpectedShape(&'static str),

    /// Version query failed on the wire
    #[error("Version query failed: {0}")]
    Transport(#[from] TransportError),
}

/// Errors surfaced by a client session.
///
/// Every variant names the instance so callers can log failures without
/// extra context.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Wire-level failure of `method`
    #[error("[{instance}] {method}: {source}")]
    Call {
        instance: String,
        method: String,
        #[source]
        source: TransportError,
    },

    /// Result decoded but had the wrong shape
    #[error("[{instance}] {method}: unexpected response shape: expected {expected}, got {actual}")]
    Shape {
        instance: String,
        method: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Single-record lookup matched nothing
    #[error("[{instance}] {entity} not found: {key}")]
    NotFound {
        instance: String,
        entity: &'static str,
        key: String,
    },

    /// Method is not available on the detected server version
    #[error("[{instance}] {method} requires server version {required}, found {found}")]
    Unsupported {
        instance: String,
        method: String,
        required: String,
        found: VersionInfo,
    },

    /// Server version could not be determined
    #[error("[{instance}] version detection failed: {source}")]
    Version {
        instance: String,
        #[source]
        source: VersionError,
    },

    /// Fan-out task ended without producing a result
    #[error("[{instance}] {method}: task failed: {reason}")]
    Task {
        instance: String,
        method: String,
        reason: String,
    },
}

impl ClientError {
    /// Server-reported error code, if the failure was an RPC error
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            ClientError::Call { source, .. } => source.rpc_code(),
            _ => None,
        }
    }

    /// Name of the instance the error came from
    pub fn instance(&self) -> &str {
        match self {
            ClientError::Call { instance, .. }
            | ClientError::Shape { instance, .. }
            | ClientError::NotFound { instance, .. }
            | ClientError::Unsupported { instance, .. }
            | ClientError::Version { instance, .. }
            | ClientError::Task { instance, .. } => instance,
        }
    }
}

/// Registry errors
#[derive(Error, Debug)]
pub enum PoolError {
    /// The empty name is reserved for the default instance
    #[error("Instance name must not be empty")]
    EmptyName,

    /// Name already registered
    #[error("Instance already registered: {0}")]
    Duplicate(String),

    /// Name not registered
    #[error("Instance not found: {0}")]
    NotFound(String),

    /// Initial login of a new instance failed
    #[error("Failed to register instance {name}: {source}")]
    Registration {
        name: String,
        #[source]
        source: ClientError,
    },

    /// Descriptor could not be turned into a session
    #[error("Invalid instance {name}: {source}")]
    Config {
        name: String,
        #[source]
        source: ConfigError,
    },
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use zbx_protocol::INVALID_PARAMS;

    #[test]
    fn test_rpc_code_passthrough() {
        let err = ClientError::Call {
            instance: "prod".into(),
            method: "host.get".into(),
            source: TransportError::Rpc(ServerError::new(INVALID_PARAMS, "Invalid params.")),
        };
        assert_eq!(err.rpc_code(), Some(INVALID_PARAMS));
        assert_eq!(err.instance(), "prod");
        assert!(err.to_string().starts_with("[prod] host.get: API error -32602"));
    }

    #[test]
    fn test_non_rpc_errors_have_no_code() {
        let err = ClientError::Call {
            instance: "lab".into(),
            method: "host.get".into(),
            source: TransportError::Timeout,
        };
        assert_eq!(err.rpc_code(), None);

        let err = ClientError::Shape {
            instance: "lab".into(),
            method: "host.get".into(),
            expected: "array of records",
            actual: "string",
        };
        assert_eq!(err.rpc_code(), None);
        assert_eq!(
            err.to_string(),
            "[lab] host.get: unexpected response shape: expected array of records, got string"
        );
    }

    #[test]
    fn test_pool_error_display() {
        assert_eq!(
            PoolError::Duplicate("prod".into()).to_string(),
            "Instance already registered: prod"
        );
        assert_eq!(
            PoolError::NotFound("lab".into()).to_string(),
            "Instance not found: lab"
        );
        assert_eq!(
            PoolError::EmptyName.to_string(),
            "Instance name must not be empty"
        );
    }
}
