//! Instance descriptor configuration

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ConfigError;
use crate::types::{AuthType, Credentials, Instance};

/// One `[[instances]]` entry of the configuration file
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Unique instance name
    pub name: String,

    /// Frontend base URL
    pub url: String,

    /// Login name for password authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password for password authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Static API token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Explicit auth type; inferred from the fields present when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthType>,

    /// Whether this instance is the initial default
    #[serde(default)]
    pub default: bool,
}

impl InstanceConfig {
    /// Auth type after inference: a lone token means token auth
    pub fn effective_auth_type(&self) -> AuthType {
        match self.auth_type {
            Some(auth_type) => auth_type,
            None if self.token.is_some() && self.username.is_none() => AuthType::Token,
            None => AuthType::Password,
        }
    }

    /// Build the immutable descriptor consumed by sessions
    pub fn to_instance(&self) -> Result<Instance, ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "instances[{}].url",
                self.name
            )));
        }

        let credentials = match self.effective_auth_type() {
            AuthType::Token => {
                let token = non_empty(&self.token)
                    .ok_or_else(|| self.missing("token"))?
                    .to_string();
                Credentials::Token(token)
            }
            AuthType::Password => {
                let username = non_empty(&self.username)
                    .ok_or_else(|| self.missing("username"))?
                    .to_string();
                let password = self
                    .password
                    .clone()
                    .ok_or_else(|| self.missing("password"))?;
                Credentials::Password { username, password }
            }
        };

        Ok(Instance {
            name: self.name.clone(),
            url: self.url.clone(),
            credentials,
        })
    }

    fn missing(&self, field: &str) -> ConfigError {
        ConfigError::MissingField(format!("instances[{}].{}", self.name, field))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl fmt::Debug for InstanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceConfig")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("auth_type", &self.auth_type)
            .field("default", &self.default)
            .finish()
    }
}
