//! HTTP transport over reqwest

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use zbx_core::config::ClientConfig;
use zbx_core::{RpcTransport, TransportError};
use zbx_protocol::{decode_response, encode_request, normalize_api_url, Request, TransportVariant};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("zbxhub/", env!("CARGO_PKG_VERSION"));

/// Stateless JSON-RPC over HTTP POST.
///
/// One instance is shared by every session; reqwest keeps the connections
/// alive per host.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport using the timeout from `config`
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(TransportError::network)?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::network(err)
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn invoke(
        &self,
        base_url: &str,
        method: &str,
        params: Value,
        auth: Option<&str>,
        variant: TransportVariant,
    ) -> Result<Value, TransportError> {
        let url = normalize_api_url(base_url);
        let request = Request::new(method, params).with_auth(variant, auth);
        let body = encode_request(&request)?;

        let mut builder = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = variant.bearer_token(auth) {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!("-> {} {} ({})", method, url, variant);
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        let envelope = match decode_response(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TransportError::HttpStatus {
                    status: status.as_u16(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        envelope.into_result().map_err(|e| {
            tracing::debug!("<- {} failed: {}", method, e);
            TransportError::Rpc(e)
        })
    }
}
