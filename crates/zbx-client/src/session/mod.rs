//! Per-instance authenticated session
//!
//! A [`ClientSession`] owns one instance's credentials and current token.
//! The token sits behind a `tokio::sync::Mutex` that is held only to read
//! it or to (re-)login; regular calls run outside the lock. The detected
//! server version is cached separately behind an `RwLock`.
//!
//! Lock order is always auth state first, version cache second.

mod ops;

pub use ops::ItemSpec;

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{Mutex, RwLock};

use zbx_core::config::ClientConfig;
use zbx_core::version::{self, adapt_params, login_params, resolve_method};
use zbx_core::{
    AuthType, Capabilities, ClientError, Credentials, Instance, RpcTransport, TransportError,
    VersionInfo,
};
use zbx_protocol::{Payload, Record, TransportVariant, METHOD_NOT_FOUND};

/// Method used to obtain a session token
pub const LOGIN_METHOD: &str = "user.login";
/// Method used to drop a session token
pub const LOGOUT_METHOD: &str = "user.logout";
/// Method used for token validation and health probes
pub const PROBE_METHOD: &str = "user.get";

/// Label reported when the server version could not be determined
pub const VERSION_DETECTION_FAILED: &str = "version_detection_failed";

/// Authentication state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

#[derive(Debug)]
struct AuthState {
    /// Current token; static tokens are set once at construction
    token: Option<String>,
    /// A static token passed the validation probe
    validated: bool,
}

#[derive(Debug, Clone)]
struct CachedVersion {
    version: VersionInfo,
    detected_at: Instant,
}

/// Snapshot of one instance for reporting
#[derive(Debug, Clone, Serialize)]
pub struct InstanceInfo {
    pub name: String,
    pub url: String,
    pub auth_type: AuthType,
    pub state: SessionState,
    /// Detected version, `None` when detection failed
    pub version: Option<VersionInfo>,
    pub capabilities: Capabilities,
}

impl InstanceInfo {
    /// Detected version string, or [`VERSION_DETECTION_FAILED`]
    pub fn version_label(&self) -> String {
        self.version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| VERSION_DETECTION_FAILED.to_string())
    }
}

/// Authenticated session against one Zabbix instance
pub struct ClientSession {
    instance: Instance,
    transport: Arc<dyn RpcTransport>,
    config: Arc<ClientConfig>,
    auth: Mutex<AuthState>,
    version: RwLock<Option<CachedVersion>>,
}

impl ClientSession {
    /// Create an unauthenticated session
    pub fn new(
        instance: Instance,
        transport: Arc<dyn RpcTransport>,
        config: Arc<ClientConfig>,
    ) -> Self {
        let token = match &instance.credentials {
            Credentials::Token(token) => Some(token.clone()),
            Credentials::Password { .. } => None,
        };

        Self {
            instance,
            transport,
            config,
            auth: Mutex::new(AuthState {
                token,
                validated: false,
            }),
            version: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.instance.name
    }

    pub fn url(&self) -> &str {
        &self.instance.url
    }

    pub fn auth_type(&self) -> AuthType {
        self.instance.auth_type()
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Current authentication state
    pub async fn state(&self) -> SessionState {
        let auth = self.auth.lock().await;
        let authenticated = match self.instance.credentials {
            Credentials::Password { .. } => auth.token.is_some(),
            Credentials::Token(_) => auth.validated,
        };
        if authenticated {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Current token, if any
    pub async fn token(&self) -> Option<String> {
        self.auth.lock().await.token.clone()
    }

    /// Authenticate.
    ///
    /// Password sessions obtain a fresh token via `user.login`. Static-token
    /// sessions only validate their token with an authenticated probe and
    /// never replace it.
    pub async fn login(&self) -> Result<(), ClientError> {
        let mut auth = self.auth.lock().await;
        match &self.instance.credentials {
            Credentials::Password { username, password } => {
                self.login_locked(&mut auth, username, password).await?;
            }
            Credentials::Token(token) => {
                self.invalidate_version().await;
                self.dispatch(PROBE_METHOD, probe_params(), Some(token.as_str()))
                    .await?;
                auth.validated = true;
                tracing::info!("[{}] API token validated", self.name());
            }
        }
        Ok(())
    }

    /// Drop the session.
    ///
    /// Password sessions call `user.logout` and clear the token even when
    /// the call fails. Static-token sessions are left untouched.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if self.auth_type() == AuthType::Token {
            return Ok(());
        }

        let mut auth = self.auth.lock().await;
        let Some(token) = auth.token.take() else {
            return Ok(());
        };
        self.dispatch(LOGOUT_METHOD, json!([]), Some(token.as_str()))
            .await?;
        tracing::info!("[{}] Logged out", self.name());
        Ok(())
    }

    /// Call `method` with `params`, adapting them to the server version.
    ///
    /// Password sessions log in first when needed. An error whose code is in
    /// the configured session-expired set triggers one re-login and one
    /// retry; a second failure is returned as is.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let token = self.current_token().await?;

        match self.dispatch(method, params.clone(), token.as_deref()).await {
            Err(err) if self.is_session_expired(&err) => {
                tracing::info!(
                    "[{}] Session expired during {}, logging in again",
                    self.name(),
                    method
                );
                let fresh = self.renew_token(token.as_deref()).await?;
                self.dispatch(method, params, Some(fresh.as_str())).await
            }
            other => other,
        }
    }

    /// Like [`call`](Self::call), but rejected when the server is older than `major.minor`
    pub async fn call_with_min_version(
        &self,
        method: &str,
        params: Value,
        min: (u32, u32),
    ) -> Result<Value, ClientError> {
        let version = self.detect_version().await?;
        if !version.at_least(min.0, min.1) {
            return Err(ClientError::Unsupported {
                instance: self.name().to_string(),
                method: method.to_string(),
                required: format!("{}.{}", min.0, min.1),
                found: version,
            });
        }
        self.call(method, params).await
    }

    /// Call `primary`, falling back to `fallback` when the server reports
    /// the method does not exist
    pub async fn call_with_fallback(
        &self,
        primary: &str,
        fallback: &str,
        params: Value,
    ) -> Result<Value, ClientError> {
        match self.call(primary, params.clone()).await {
            Err(err) if err.rpc_code() == Some(METHOD_NOT_FOUND) => {
                tracing::debug!("[{}] {} not found, trying {}", self.name(), primary, fallback);
                self.call(fallback, params).await
            }
            other => other,
        }
    }

    /// Call `method` after mapping it onto what the server provides.
    ///
    /// When the version is unknown the method is sent unchanged.
    pub async fn call_versioned(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        let Some(version) = self.version().await else {
            return self.call(method, params).await;
        };

        let resolved =
            resolve_method(method, &params, &version).map_err(|e| ClientError::Unsupported {
                instance: self.name().to_string(),
                method: e.method,
                required: format!("{}.{}", e.since.0, e.since.1),
                found: version.clone(),
            })?;
        self.call(&resolved.method, resolved.params).await
    }

    /// Detected server version, `None` when detection fails
    pub async fn version(&self) -> Option<VersionInfo> {
        match self.detect_version().await {
            Ok(version) => Some(version),
            Err(err) => {
                tracing::warn!("[{}] {}; using legacy wire format", self.name(), err);
                None
            }
        }
    }

    /// Detected server version, served from the cache while fresh
    pub async fn detect_version(&self) -> Result<VersionInfo, ClientError> {
        let ttl = self.config.version_cache_ttl;
        if let Some(cached) = self.version.read().await.as_ref() {
            if cached.detected_at.elapsed() < ttl {
                return Ok(cached.version.clone());
            }
        }

        let detected = version::detect(self.transport.as_ref(), &self.instance.url)
            .await
            .map_err(|source| ClientError::Version {
                instance: self.name().to_string(),
                source,
            })?;

        if !ttl.is_zero() {
            *self.version.write().await = Some(CachedVersion {
                version: detected.clone(),
                detected_at: Instant::now(),
            });
        }
        Ok(detected)
    }

    /// Lightweight authenticated probe
    pub async fn health_check(&self) -> bool {
        match self.call(PROBE_METHOD, probe_params()).await {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!("[{}] Health probe failed: {}", self.name(), err);
                false
            }
        }
    }

    /// URL, auth type, version and capabilities of this instance
    pub async fn instance_info(&self) -> InstanceInfo {
        let version = self.version().await;
        let capabilities = version
            .as_ref()
            .map(Capabilities::for_version)
            .unwrap_or_else(Capabilities::baseline);

        InstanceInfo {
            name: self.name().to_string(),
            url: self.url().to_string(),
            auth_type: self.auth_type(),
            state: self.state().await,
            version,
            capabilities,
        }
    }

    /// Call and classify the result
    pub async fn call_payload(&self, method: &str, params: Value) -> Result<Payload, ClientError> {
        self.call(method, params).await.map(Payload::classify)
    }

    pub(crate) async fn fetch_records(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Vec<Record>, ClientError> {
        self.call_payload(method, params)
            .await?
            .into_records()
            .map_err(|other| self.shape_error(method, "array of records", &other))
    }

    /// First record of a `*.get` result, or a not-found error
    pub(crate) async fn fetch_one(
        &self,
        method: &str,
        params: Value,
        entity: &'static str,
        key: &str,
    ) -> Result<Record, ClientError> {
        self.fetch_records(method, params)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::NotFound {
                instance: self.name().to_string(),
                entity,
                key: key.to_string(),
            })
    }

    pub(crate) async fn fetch_ids(
        &self,
        method: &str,
        params: Value,
    ) -> Result<Vec<String>, ClientError> {
        self.call_payload(method, params)
            .await?
            .into_ids()
            .map_err(|other| self.shape_error(method, "identifier list", &other))
    }

    /// First identifier of a create result
    pub(crate) async fn fetch_created_id(
        &self,
        method: &str,
        params: Value,
    ) -> Result<String, ClientError> {
        self.fetch_ids(method, params)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::Shape {
                instance: self.name().to_string(),
                method: method.to_string(),
                expected: "identifier list",
                actual: "empty identifier list",
            })
    }

    pub(crate) fn shape_error(
        &self,
        method: &str,
        expected: &'static str,
        actual: &Payload,
    ) -> ClientError {
        ClientError::Shape {
            instance: self.name().to_string(),
            method: method.to_string(),
            expected,
            actual: actual.kind(),
        }
    }

    /// Token to use for the next call, logging in if needed
    async fn current_token(&self) -> Result<Option<String>, ClientError> {
        let mut auth = self.auth.lock().await;
        if let Some(token) = &auth.token {
            return Ok(Some(token.clone()));
        }
        match &self.instance.credentials {
            Credentials::Password { username, password } => self
                .login_locked(&mut auth, username, password)
                .await
                .map(Some),
            Credentials::Token(_) => Ok(None),
        }
    }

    /// Replace `stale` after an expiry, unless another caller already did
    async fn renew_token(&self, stale: Option<&str>) -> Result<String, ClientError> {
        let mut auth = self.auth.lock().await;
        if let Some(current) = &auth.token {
            if Some(current.as_str()) != stale {
                return Ok(current.clone());
            }
        }
        match &self.instance.credentials {
            Credentials::Password { username, password } => {
                self.login_locked(&mut auth, username, password).await
            }
            Credentials::Token(token) => Ok(token.clone()),
        }
    }

    /// `user.login` with the auth lock held
    async fn login_locked(
        &self,
        auth: &mut AuthState,
        username: &str,
        password: &str,
    ) -> Result<String, ClientError> {
        self.invalidate_version().await;
        let version = self.version().await;
        let params = login_params(username, password, version.as_ref());

        let result = self
            .transport
            .invoke(
                &self.instance.url,
                LOGIN_METHOD,
                params,
                None,
                TransportVariant::Header,
            )
            .await
            .map_err(|source| self.call_error(LOGIN_METHOD, source))?;

        let token = Payload::classify(result)
            .into_string()
            .map_err(|other| self.shape_error(LOGIN_METHOD, "string", &other))?;

        auth.token = Some(token.clone());
        tracing::info!("[{}] Logged in as {}", self.name(), username);
        Ok(token)
    }

    /// One wire exchange with version-dependent variant and params
    async fn dispatch(
        &self,
        method: &str,
        params: Value,
        token: Option<&str>,
    ) -> Result<Value, ClientError> {
        let (variant, params) = match self.version().await {
            Some(version) => (
                version.transport_variant(),
                adapt_params(method, &params, &version),
            ),
            None => (TransportVariant::Legacy, params),
        };

        match self
            .transport
            .invoke(&self.instance.url, method, params, token, variant)
            .await
        {
            Ok(result) => Ok(result),
            Err(source) => {
                if !matches!(source, TransportError::Rpc(_)) {
                    self.invalidate_version().await;
                }
                Err(self.call_error(method, source))
            }
        }
    }

    fn is_session_expired(&self, err: &ClientError) -> bool {
        self.auth_type() == AuthType::Password
            && err
                .rpc_code()
                .is_some_and(|code| self.config.is_session_expired(code))
    }

    fn call_error(&self, method: &str, source: TransportError) -> ClientError {
        ClientError::Call {
            instance: self.name().to_string(),
            method: method.to_string(),
            source,
        }
    }

    async fn invalidate_version(&self) {
        *self.version.write().await = None;
    }
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

fn probe_params() -> Value {
    json!({ "output": ["userid"], "limit": 1 })
}
