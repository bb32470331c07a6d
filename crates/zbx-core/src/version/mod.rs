//! Server version detection and version-derived behavior
//!
//! Everything a session needs to know about a server generation is derived
//! from its [`VersionInfo`]:
//!
//! - the [`TransportVariant`] (where the auth token travels),
//! - the [`Capabilities`] it advertises,
//! - which request parameters it understands ([`adapt_params`]),
//! - which methods exist at all ([`resolve_method`]).
//!
//! The gating data lives in declarative tables in [`tables`], so supporting
//! a new server release is a table edit.

mod capability;
pub mod tables;

pub use capability::{Capabilities, Capability};
pub use tables::{adapt_params, login_params, resolve_method, MethodUnsupported, ResolvedCall};

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::Serialize;
use serde_json::json;
use zbx_protocol::{Payload, TransportVariant};

use crate::error::VersionError;
use crate::traits::RpcTransport;

/// Method reporting the server's API version; must be called unauthenticated
pub const VERSION_METHOD: &str = "apiinfo.version";

/// First major version expecting the token in the `Authorization` header
pub const HEADER_AUTH_SINCE_MAJOR: u32 = 7;

/// Parsed server version.
///
/// Equality, ordering and hashing only consider `(major, minor, patch)`;
/// `raw` keeps the string the server reported.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub raw: String,
}

impl VersionInfo {
    /// Create a version from its numeric parts
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            raw: format!("{}.{}.{}", major, minor, patch),
        }
    }

    /// Parse a server version string.
    ///
    /// An optional letter prefix (`v7.0`) and any pre-release or build
    /// suffix (`5.0-beta`, `7.0.0+build`) are ignored. Major and minor must
    /// be numeric; a missing or non-numeric patch becomes 0.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let malformed = || VersionError::Malformed(raw.to_string());

        let trimmed = raw.trim().trim_start_matches(|c: char| c.is_ascii_alphabetic());
        let core = match trimmed.find(['-', '+']) {
            Some(pos) => &trimmed[..pos],
            None => trimmed,
        };

        let mut parts = core.split('.');
        let major = parse_segment(parts.next()).ok_or_else(malformed)?;
        let minor = parse_segment(parts.next()).ok_or_else(malformed)?;
        let patch = match parts.next() {
            None => 0,
            Some(segment) => segment.parse().unwrap_or_else(|_| {
                tracing::debug!("Non-numeric patch segment {:?} in {:?}, using 0", segment, raw);
                0
            }),
        };

        Ok(Self {
            major,
            minor,
            patch,
            raw: raw.to_string(),
        })
    }

    /// Whether this version is at least `major.minor`
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }

    /// Wire convention this server expects
    pub fn transport_variant(&self) -> TransportVariant {
        if self.major >= HEADER_AUTH_SINCE_MAJOR {
            TransportVariant::Header
        } else {
            TransportVariant::Legacy
        }
    }

    /// Feature flags this server supports
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_version(self)
    }

    fn triple(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch)
    }
}

fn parse_segment(segment: Option<&str>) -> Option<u32> {
    segment.filter(|s| !s.is_empty())?.parse().ok()
}

impl PartialEq for VersionInfo {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}

impl Eq for VersionInfo {}

impl PartialOrd for VersionInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}

impl Hash for VersionInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.triple().hash(state);
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for VersionInfo {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Ask the instance at `base_url` for its version.
///
/// The query is sent without any credentials: no `auth` member in the body
/// and no `Authorization` header, which every server generation accepts.
pub async fn detect(
    transport: &dyn RpcTransport,
    base_url: &str,
) -> Result<VersionInfo, VersionError> {
    let result = transport
        .invoke(
            base_url,
            VERSION_METHOD,
            json!([]),
            None,
            TransportVariant::Header,
        )
        .await?;

    let raw = Payload::classify(result)
        .into_string()
        .map_err(|other| VersionError::UnexpectedShape(other.kind()))?;

    let version = VersionInfo::parse(&raw)?;
    tracing::debug!("Detected API version {} at {}", version, base_url);
    Ok(version)
}
