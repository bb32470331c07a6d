//! CLI command implementations

mod call;
mod config;
mod hosts;
mod instances;

pub use call::{call_command, query_command};
pub use config::{config_init, config_show, config_validate};
pub use hosts::hosts_command;
pub use instances::{health_command, info_command, instances_command};

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::output::print_warning;
use zbx_client::{ClientPool, HttpTransport};
use zbx_core::config::ConfigFile;

/// Load the configuration and register every instance it names.
///
/// Instances that fail to register are reported as warnings; the pool
/// holds whatever succeeded.
pub async fn connect_pool(path: &Path) -> Result<ClientPool> {
    let config = ConfigFile::load(path)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;
    let transport =
        HttpTransport::new(&config.client).context("Failed to build HTTP transport")?;

    let (pool, report) = ClientPool::from_config(&config, Arc::new(transport)).await;
    for failure in &report.failed {
        print_warning(&failure.to_string());
    }
    tracing::info!("{} instances registered", report.registered.len());

    Ok(pool)
}
