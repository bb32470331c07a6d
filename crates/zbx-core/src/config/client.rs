//! Client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;
use zbx_protocol::INVALID_PARAMS;

/// Settings shared by every session and the HTTP transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Timeout of each HTTP request
    #[serde(with = "duration_secs")]
    pub timeout: Duration,

    /// How long a detected server version is reused (0 = detect on every call)
    #[serde(with = "duration_secs")]
    pub version_cache_ttl: Duration,

    /// RPC error codes meaning "session expired, log in again".
    ///
    /// Only password sessions react to these; static tokens are never renewed.
    pub session_expired_codes: Vec<i64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            version_cache_ttl: Duration::from_secs(300),
            session_expired_codes: vec![INVALID_PARAMS],
        }
    }
}

impl ClientConfig {
    /// Whether `code` signals an expired session
    pub fn is_session_expired(&self, code: i64) -> bool {
        self.session_expired_codes.contains(&code)
    }
}
