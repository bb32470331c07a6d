//! zbx-client: Version-aware sessions for Zabbix instances
//!
//! A [`ClientSession`] authenticates against one instance, detects its
//! server version and adapts every call to it. A [`ClientPool`] keeps named
//! sessions with a default and fans calls out across all of them.
//! [`HttpTransport`] is the production wire transport.

pub mod pool;
pub mod session;
pub mod transport;

pub use pool::{ClientPool, LoadReport, PoolEntry, QueryResults};
pub use session::{ClientSession, InstanceInfo, ItemSpec, SessionState};
pub use transport::HttpTransport;
