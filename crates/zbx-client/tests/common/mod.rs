//! Shared test transport
//!
//! `MockTransport` plays a Zabbix server in memory: it answers the version
//! query and logins itself and serves scripted results for everything else.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use zbx_client::ClientSession;
use zbx_core::config::ClientConfig;
use zbx_core::{Instance, RpcTransport, TransportError};
use zbx_protocol::{ServerError, TransportVariant, INVALID_PARAMS};

/// One observed invocation
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
    pub auth: Option<String>,
    pub variant: TransportVariant,
}

#[derive(Default)]
pub struct MockTransport {
    /// Reported by `apiinfo.version`; detection fails when `None`
    version: Option<String>,
    login_fails: bool,
    /// Tokens answered with a session-expired error
    expired: Mutex<HashSet<String>>,
    /// Queued results per method, consumed first
    scripted: Mutex<HashMap<String, VecDeque<Result<Value, TransportError>>>>,
    /// Result per method once the queue is empty
    fallback: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<RecordedCall>>,
    /// Methods whose invocation panics
    panics: Mutex<HashSet<String>>,
    logins: AtomicUsize,
    version_queries: AtomicUsize,
}

impl MockTransport {
    pub fn with_version(version: &str) -> Self {
        Self {
            version: Some(version.to_string()),
            ..Default::default()
        }
    }

    /// Server whose version query always fails
    pub fn without_version() -> Self {
        Self::default()
    }

    pub fn failing_login(mut self) -> Self {
        self.login_fails = true;
        self
    }

    pub fn expire(&self, token: &str) {
        self.expired.lock().unwrap().insert(token.to_string());
    }

    pub fn script(&self, method: &str, result: Result<Value, TransportError>) {
        self.scripted
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(result);
    }

    pub fn panic_on(&self, method: &str) {
        self.panics.lock().unwrap().insert(method.to_string());
    }

    pub fn respond(&self, method: &str, result: Value) {
        self.fallback
            .lock()
            .unwrap()
            .insert(method.to_string(), result);
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn version_queries(&self) -> usize {
        self.version_queries.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls of `method`, in order
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }
}

pub fn rpc_error(code: i64, message: &str) -> TransportError {
    TransportError::Rpc(ServerError::new(code, message))
}

pub fn session_expired() -> TransportError {
    rpc_error(INVALID_PARAMS, "Session terminated, re-login, please.")
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn invoke(
        &self,
        _base_url: &str,
        method: &str,
        params: Value,
        auth: Option<&str>,
        variant: TransportVariant,
    ) -> Result<Value, TransportError> {
        if method == "apiinfo.version" {
            self.version_queries.fetch_add(1, Ordering::SeqCst);
            return match &self.version {
                Some(version) => Ok(json!(version)),
                None => Err(TransportError::HttpStatus { status: 500 }),
            };
        }

        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            params: params.clone(),
            auth: auth.map(str::to_string),
            variant,
        });

        let panics = self.panics.lock().unwrap().contains(method);
        if panics {
            panic!("{} blew up", method);
        }

        match method {
            "user.login" if self.login_fails => {
                Err(rpc_error(-32500, "Login name or password is incorrect."))
            }
            "user.login" => {
                let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(json!(format!("token-{}", n)))
            }
            "user.logout" => Ok(json!(true)),
            _ => {
                if let Some(token) = auth {
                    if self.expired.lock().unwrap().contains(token) {
                        return Err(session_expired());
                    }
                }
                let queued = self
                    .scripted
                    .lock()
                    .unwrap()
                    .get_mut(method)
                    .and_then(VecDeque::pop_front);
                if let Some(result) = queued {
                    return result;
                }
                Ok(self
                    .fallback
                    .lock()
                    .unwrap()
                    .get(method)
                    .cloned()
                    .unwrap_or_else(|| json!([])))
            }
        }
    }
}

pub fn test_config() -> Arc<ClientConfig> {
    Arc::new(ClientConfig {
        timeout: Duration::from_secs(5),
        ..Default::default()
    })
}

pub fn password_session(name: &str, transport: Arc<MockTransport>) -> ClientSession {
    ClientSession::new(
        Instance::with_password(name, format!("http://{}.example", name), "Admin", "zabbix"),
        transport,
        test_config(),
    )
}

pub fn token_session(name: &str, token: &str, transport: Arc<MockTransport>) -> ClientSession {
    ClientSession::new(
        Instance::with_token(name, format!("http://{}.example", name), token),
        transport,
        test_config(),
    )
}
