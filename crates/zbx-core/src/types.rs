//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a session authenticates against its instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    /// `user.login` with username and password, token obtained at runtime
    Password,
    /// Static API token supplied up front
    Token,
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthType::Password => write!(f, "password"),
            AuthType::Token => write!(f, "token"),
        }
    }
}

/// Credential set of one instance
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { username: String, password: String },
    Token(String),
}

impl Credentials {
    /// Auth type these credentials imply
    pub fn auth_type(&self) -> AuthType {
        match self {
            Credentials::Password { .. } => AuthType::Password,
            Credentials::Token(_) => AuthType::Token,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
        }
    }
}

/// Immutable descriptor of one Zabbix instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    /// Unique registry key
    pub name: String,
    /// Frontend base URL (the API path is appended when missing)
    pub url: String,
    pub credentials: Credentials,
}

impl Instance {
    /// Instance authenticating with username and password
    pub fn with_password(
        name: impl Into<String>,
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            credentials: Credentials::Password {
                username: username.into(),
                password: password.into(),
            },
        }
    }

    /// Instance authenticating with a static API token
    pub fn with_token(
        name: impl Into<String>,
        url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            credentials: Credentials::Token(token.into()),
        }
    }

    pub fn auth_type(&self) -> AuthType {
        self.credentials.auth_type()
    }
}
