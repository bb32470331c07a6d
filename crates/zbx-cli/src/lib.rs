//! zbxhub: Command-line interface for multi-instance Zabbix access
//!
//! Loads instances from the configuration file into a
//! [`ClientPool`](zbx_client::ClientPool) and runs API calls against one
//! instance or all of them.

pub mod commands;
pub mod output;
