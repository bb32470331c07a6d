//! Instance listing and health commands

use anyhow::{bail, Result};

use crate::output::{format_health, format_instances, print_info};
use zbx_client::ClientPool;

/// List registered instances with their detected versions
pub async fn instances_command(pool: &ClientPool, long: bool) -> Result<()> {
    let entries = pool.instances_info().await;
    println!("{}", format_instances(&entries, long));
    Ok(())
}

/// Probe every instance and print the outcome
pub async fn health_command(pool: &ClientPool) -> Result<()> {
    let health = pool.health_check().await;
    println!("{}", format_health(&health));

    let healthy = health.values().filter(|ok| **ok).count();
    if !health.is_empty() {
        print_info(&format!("{}/{} instances healthy", healthy, health.len()));
    }
    Ok(())
}

/// Print details of one instance as JSON (default when `name` is empty)
pub async fn info_command(pool: &ClientPool, name: &str) -> Result<()> {
    let Some(session) = pool.get_session(name).await else {
        if name.is_empty() {
            bail!("No default instance registered");
        }
        bail!("Unknown instance: {}", name);
    };

    // Detection errors are already folded into the info view
    let _ = session.detect_version().await;
    let info = session.instance_info().await;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
