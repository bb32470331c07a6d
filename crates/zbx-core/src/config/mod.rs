//! Configuration management for zbxhub

mod client;
mod instance;
pub mod serde_utils;

pub use client::ClientConfig;
pub use instance::InstanceConfig;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("zbxhub")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Complete configuration file: client settings plus instance list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Settings shared by every session
    pub client: ClientConfig,

    /// Instance descriptors, in file order
    pub instances: Vec<InstanceConfig>,
}

impl ConfigFile {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: ConfigFile = load_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check names, URLs and credentials of every instance.
    ///
    /// Several instances flagged `default` is not an error: the last one
    /// wins, and a warning is logged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for instance in &self.instances {
            if instance.name.trim().is_empty() {
                return Err(ConfigError::MissingField("instances.name".into()));
            }
            if !seen.insert(instance.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "Duplicate instance name: {}",
                    instance.name
                )));
            }
            instance.to_instance()?;
        }

        let defaults = self.instances.iter().filter(|i| i.default).count();
        if defaults > 1 {
            tracing::warn!(
                "{} instances are marked default; using {:?}",
                defaults,
                self.default_instance().unwrap_or_default()
            );
        }

        if self.client.session_expired_codes.is_empty() {
            tracing::warn!("session_expired_codes is empty; expired sessions will not be renewed");
        }

        Ok(())
    }

    /// Name of the instance marked default (last one wins)
    pub fn default_instance(&self) -> Option<&str> {
        self.instances
            .iter()
            .rev()
            .find(|i| i.default)
            .map(|i| i.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuthType;
    use std::time::Duration;

    fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_full_file() {
        let (_dir, path) = write(
            r#"
[client]
timeout = 10
version_cache_ttl = 0

[[instances]]
name = "prod"
url = "https://zabbix.example.com"
username = "Admin"
password = "zabbix"

[[instances]]
name = "lab"
url = "http://lab.local/zabbix/"
auth_type = "token"
token = "abc"
default = true
"#,
        );

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.client.timeout, Duration::from_secs(10));
        assert_eq!(config.client.version_cache_ttl, Duration::ZERO);
        assert_eq!(config.client.session_expired_codes, vec![-32602]);
        assert_eq!(config.instances.len(), 2);
        assert_eq!(config.instances[1].effective_auth_type(), AuthType::Token);
        assert_eq!(config.default_instance(), Some("lab"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigFile::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_parse_error() {
        let (_dir, path) = write("[[instances]\nname = ");
        assert!(matches!(
            ConfigFile::load(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let (_dir, path) = write(
            r#"
[[instances]]
name = "prod"
url = "http://a"
token = "x"

[[instances]]
name = "prod"
url = "http://b"
token = "y"
"#,
        );
        assert!(matches!(
            ConfigFile::load(&path),
            Err(ConfigError::Invalid(msg)) if msg.contains("prod")
        ));
    }

    #[test]
    fn test_last_default_wins() {
        let config: ConfigFile = toml::from_str(
            r#"
[[instances]]
name = "a"
url = "http://a"
token = "x"
default = true

[[instances]]
name = "b"
url = "http://b"
token = "y"
default = true
"#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.default_instance(), Some("b"));
    }

    #[test]
    fn test_empty_file_is_empty_config() {
        let (_dir, path) = write("");
        let config = ConfigFile::load(&path).unwrap();
        assert!(config.instances.is_empty());
        assert_eq!(config.default_instance(), None);
    }
}
