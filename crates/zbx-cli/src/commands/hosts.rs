//! Host listing command

use anyhow::{bail, Result};

use crate::output::format_records;
use zbx_client::ClientPool;

const HOST_COLUMNS: &[&str] = &["hostid", "host", "name", "status", "available"];

/// List hosts of one instance as a table
pub async fn hosts_command(
    pool: &ClientPool,
    instance: &str,
    group: Option<&str>,
    name: Option<&str>,
) -> Result<()> {
    let Some(session) = pool.get_session(instance).await else {
        bail!("Unknown instance: {:?}", instance);
    };

    let hosts = session.get_hosts(group, name).await?;
    println!("[{}]", session.name());
    println!("{}", format_records(&hosts, HOST_COLUMNS));
    Ok(())
}
