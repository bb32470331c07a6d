//! zbx-core: Core abstractions and configuration for zbxhub
//!
//! This crate provides shared types, the transport trait, version detection
//! and the configuration structures used by the client and CLI components.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;
pub mod version;

pub use error::{ClientError, ConfigError, PoolError, TransportError, VersionError};
pub use traits::RpcTransport;
pub use types::{AuthType, Credentials, Instance};
pub use version::{Capabilities, Capability, VersionInfo};
