//! Config command implementations

use std::path::Path;

use anyhow::{Context, Result};

use crate::output::{print_error, print_info, print_success, print_warning};
use zbx_core::config::ConfigFile;

/// Show the configuration with secrets redacted
pub fn config_show(path: &Path) -> Result<()> {
    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Run 'zbxhub config init' to create one");
        return Ok(());
    }

    let mut config = ConfigFile::load(path)
        .with_context(|| format!("Failed to load config file: {:?}", path))?;
    for instance in &mut config.instances {
        if instance.password.is_some() {
            instance.password = Some(REDACTED.to_string());
        }
        if instance.token.is_some() {
            instance.token = Some(REDACTED.to_string());
        }
    }

    print_info(&format!("Configuration file: {:?}", path));
    println!();
    println!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

const REDACTED: &str = "<redacted>";

/// Load and validate the configuration without contacting any instance
pub fn config_validate(path: &Path) -> Result<()> {
    let config = ConfigFile::load(path)
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    if config.instances.is_empty() {
        print_warning("No instances configured");
    }
    print_success(&format!(
        "{:?} is valid ({} instances, default: {})",
        path,
        config.instances.len(),
        config.default_instance().unwrap_or("first registered")
    ));
    Ok(())
}

/// Write a starter configuration
pub fn config_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        print_error(&format!("Config file already exists: {:?}", path));
        print_info("Use --force to overwrite");
        return Ok(());
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
            print_success(&format!("Created config directory: {:?}", dir));
        }
    }

    std::fs::write(path, STARTER_CONFIG)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    print_success(&format!("Created configuration file: {:?}", path));
    print_info("Edit the [[instances]] entries before use");
    Ok(())
}

const STARTER_CONFIG: &str = r#"# zbxhub configuration

[client]
# Per-request timeout in seconds
timeout = 30
# Seconds a detected server version is reused (0 = detect on every call)
version_cache_ttl = 300
# RPC error codes that trigger a single re-login for password sessions
session_expired_codes = [-32602]

[[instances]]
name = "prod"
url = "https://zabbix.example.com"
username = "Admin"
password = "zabbix"
default = true

# [[instances]]
# name = "lab"
# url = "http://lab.local/zabbix/"
# auth_type = "token"
# token = "<api token>"
"#;
