//! Registry of named sessions
//!
//! The registry lock is independent from session locks and is never held
//! across network I/O: registration logs in before taking the write lock,
//! and fan-out works on a snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;

use zbx_core::config::ConfigFile;
use zbx_core::{ClientError, PoolError, RpcTransport};

use crate::session::{ClientSession, InstanceInfo};

/// Outcome of one instance in a fan-out
pub type QueryResults = HashMap<String, Result<Value, ClientError>>;

#[derive(Default)]
struct Registry {
    sessions: HashMap<String, Arc<ClientSession>>,
    default: Option<String>,
}

impl Registry {
    fn snapshot(&self) -> Vec<Arc<ClientSession>> {
        self.sessions.values().cloned().collect()
    }
}

/// Instance info plus whether it is the default
#[derive(Debug, Clone, Serialize)]
pub struct PoolEntry {
    #[serde(flatten)]
    pub info: InstanceInfo,
    pub default: bool,
}

/// Registry of named [`ClientSession`]s with one default
#[derive(Default)]
pub struct ClientPool {
    registry: RwLock<Registry>,
}

/// Outcome of [`ClientPool::from_config`]
#[derive(Debug, Default)]
pub struct LoadReport {
    pub registered: Vec<String>,
    pub failed: Vec<PoolError>,
}

impl ClientPool {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Build sessions for every configured instance and register them.
    ///
    /// Instances that fail to register are logged and reported, not fatal.
    /// Default flags are applied in file order, so the last one wins.
    pub async fn from_config(
        config: &ConfigFile,
        transport: Arc<dyn RpcTransport>,
    ) -> (Self, LoadReport) {
        let pool = Self::new();
        let client_config = Arc::new(config.client.clone());
        let mut report = LoadReport::default();

        for entry in &config.instances {
            let instance = match entry.to_instance() {
                Ok(instance) => instance,
                Err(source) => {
                    tracing::warn!("Skipping instance {}: {}", entry.name, source);
                    report.failed.push(PoolError::Config {
                        name: entry.name.clone(),
                        source,
                    });
                    continue;
                }
            };

            let session = ClientSession::new(
                instance,
                Arc::clone(&transport),
                Arc::clone(&client_config),
            );
            match pool.add_instance(session).await {
                Ok(()) => report.registered.push(entry.name.clone()),
                Err(err) => {
                    tracing::warn!("{}", err);
                    report.failed.push(err);
                }
            }
        }

        for entry in config.instances.iter().filter(|i| i.default) {
            if let Err(err) = pool.set_default(&entry.name).await {
                tracing::warn!("Cannot use {} as default: {}", entry.name, err);
            }
        }

        (pool, report)
    }

    /// Log `session` in and register it under its instance name.
    ///
    /// The first registered instance becomes the default. The empty name
    /// is rejected since lookups treat it as the default.
    pub async fn add_instance(&self, session: ClientSession) -> Result<(), PoolError> {
        let name = session.name().to_string();
        if name.is_empty() {
            return Err(PoolError::EmptyName);
        }
        if self.registry.read().await.sessions.contains_key(&name) {
            return Err(PoolError::Duplicate(name));
        }

        if let Err(source) = session.login().await {
            return Err(PoolError::Registration { name, source });
        }

        let mut registry = self.registry.write().await;
        if registry.sessions.contains_key(&name) {
            drop(registry);
            if let Err(err) = session.logout().await {
                tracing::debug!("Logout of duplicate {} failed: {}", name, err);
            }
            return Err(PoolError::Duplicate(name));
        }

        registry.sessions.insert(name.clone(), Arc::new(session));
        if registry.default.is_none() {
            registry.default = Some(name.clone());
        }
        tracing::info!("Registered instance {}", name);
        Ok(())
    }

    /// Unregister and log out an instance.
    ///
    /// A removed default is replaced by another registered instance, or
    /// cleared when none is left. Logout failures are only logged.
    pub async fn remove_instance(&self, name: &str) -> Result<(), PoolError> {
        let session = {
            let mut registry = self.registry.write().await;
            let session = registry
                .sessions
                .remove(name)
                .ok_or_else(|| PoolError::NotFound(name.to_string()))?;
            if registry.default.as_deref() == Some(name) {
                let next = registry.sessions.keys().min().cloned();
                registry.default = next;
            }
            session
        };

        if let Err(err) = session.logout().await {
            tracing::warn!("Logout of {} failed: {}", name, err);
        }
        tracing::info!("Removed instance {}", name);
        Ok(())
    }

    /// Session by name; the empty name resolves to the default
    pub async fn get_session(&self, name: &str) -> Option<Arc<ClientSession>> {
        let registry = self.registry.read().await;
        let key = if name.is_empty() {
            registry.default.as_deref()?
        } else {
            name
        };
        registry.sessions.get(key).cloned()
    }

    pub async fn set_default(&self, name: &str) -> Result<(), PoolError> {
        let mut registry = self.registry.write().await;
        if !registry.sessions.contains_key(name) {
            return Err(PoolError::NotFound(name.to_string()));
        }
        registry.default = Some(name.to_string());
        Ok(())
    }

    pub async fn default_name(&self) -> Option<String> {
        self.registry.read().await.default.clone()
    }

    /// Registered names, sorted
    pub async fn instance_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .registry
            .read()
            .await
            .sessions
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Registered sessions, sorted by name
    pub async fn list_instances(&self) -> Vec<Arc<ClientSession>> {
        let mut sessions = self.registry.read().await.snapshot();
        sessions.sort_by(|a, b| a.name().cmp(b.name()));
        sessions
    }

    pub async fn len(&self) -> usize {
        self.registry.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.read().await.sessions.is_empty()
    }

    /// Probe every instance concurrently, one task each.
    ///
    /// A probe task that fails to complete counts as unhealthy.
    pub async fn health_check(&self) -> HashMap<String, bool> {
        let sessions = self.registry.read().await.snapshot();
        let (names, probes): (Vec<_>, Vec<_>) = sessions
            .into_iter()
            .map(|session| {
                let name = session.name().to_string();
                (name, tokio::spawn(async move { session.health_check().await }))
            })
            .unzip();

        names
            .into_iter()
            .zip(join_all(probes).await)
            .map(|(name, outcome)| {
                let healthy = outcome.unwrap_or_else(|e| {
                    tracing::warn!("[{}] Health probe task failed: {}", name, e);
                    false
                });
                (name, healthy)
            })
            .collect()
    }

    /// Names of instances passing the health probe, sorted
    pub async fn healthy_instances(&self) -> Vec<String> {
        let mut healthy: Vec<String> = self
            .health_check()
            .await
            .into_iter()
            .filter_map(|(name, ok)| ok.then_some(name))
            .collect();
        healthy.sort();
        healthy
    }

    /// Run `method` on every instance, one task each.
    ///
    /// With `only_healthy` instances failing the health probe are skipped.
    /// Every targeted instance has exactly one entry in the result.
    pub async fn query_all(&self, method: &str, params: Value, only_healthy: bool) -> QueryResults {
        let mut sessions = self.registry.read().await.snapshot();
        if only_healthy {
            let health = self.health_check().await;
            sessions.retain(|s| health.get(s.name()).copied().unwrap_or(false));
        }

        let tasks: Vec<_> = sessions
            .into_iter()
            .map(|session| {
                let method = method.to_string();
                let params = params.clone();
                let name = session.name().to_string();
                let handle = tokio::spawn(async move { session.call(&method, params).await });
                (name, handle)
            })
            .collect();

        let mut results = QueryResults::with_capacity(tasks.len());
        for (name, handle) in tasks {
            let outcome = handle.await.unwrap_or_else(|e| {
                Err(ClientError::Task {
                    instance: name.clone(),
                    method: method.to_string(),
                    reason: e.to_string(),
                })
            });
            results.insert(name, outcome);
        }
        results
    }

    /// [`InstanceInfo`] of every instance, sorted by name
    pub async fn instances_info(&self) -> Vec<PoolEntry> {
        let (sessions, default) = {
            let registry = self.registry.read().await;
            (registry.snapshot(), registry.default.clone())
        };

        let infos = join_all(sessions.iter().map(|s| s.instance_info())).await;
        let mut entries: Vec<PoolEntry> = infos
            .into_iter()
            .map(|info| PoolEntry {
                default: default.as_deref() == Some(info.name.as_str()),
                info,
            })
            .collect();
        entries.sort_by(|a, b| a.info.name.cmp(&b.info.name));
        entries
    }

    /// Log out every instance and clear the registry
    pub async fn shutdown(&self) {
        let sessions: Vec<_> = {
            let mut registry = self.registry.write().await;
            registry.default = None;
            registry.sessions.drain().map(|(_, s)| s).collect()
        };

        let logouts = sessions.iter().map(|session| async move {
            if let Err(err) = session.logout().await {
                tracing::warn!("Logout of {} failed: {}", session.name(), err);
            }
        });
        join_all(logouts).await;
        tracing::info!("Pool shut down ({} instances)", sessions.len());
    }
}
