//! Transport trait

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use zbx_protocol::TransportVariant;

/// One JSON-RPC exchange with an instance.
///
/// Implementations build the envelope for `variant`, perform the exchange
/// and return the raw `result`. They never retry and hold no per-instance
/// state, so one transport is shared by every session.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Invoke `method` on the instance at `base_url`.
    ///
    /// `auth` is the current token, `None` when unauthenticated.
    async fn invoke(
        &self,
        base_url: &str,
        method: &str,
        params: Value,
        auth: Option<&str>,
        variant: TransportVariant,
    ) -> Result<Value, TransportError>;
}
