//! zbxhub CLI
//!
//! Single binary for working with several Zabbix instances:
//! - Configuration management (init, show, validate)
//! - Instance listing and health probes
//! - Raw and version-adapted API calls, on one instance or all

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zbx_core::config::default_config_path;
use zbxhub::commands;
use zbxhub::output::print_info;

#[derive(Parser)]
#[command(name = "zbxhub")]
#[command(author, version, about = "Multi-instance Zabbix API client")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "ZBXHUB_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured instances with their server versions
    #[command(alias = "ls")]
    Instances {
        /// Show capabilities of each instance
        #[arg(short, long)]
        long: bool,
    },

    /// Probe every instance and report which ones respond
    Health,

    /// Show details of one instance as JSON
    Info {
        /// Instance name (default instance when omitted)
        #[arg(short, long, default_value = "")]
        instance: String,
    },

    /// Call an API method on one instance
    Call {
        /// API method, e.g. host.get
        method: String,
        /// Params as JSON (defaults to {})
        params: Option<String>,
        /// Instance name (default instance when omitted)
        #[arg(short, long, default_value = "")]
        instance: String,
        /// Adapt method and params to the server version
        #[arg(long)]
        versioned: bool,
    },

    /// Call an API method on every instance concurrently
    Query {
        /// API method, e.g. host.get
        method: String,
        /// Params as JSON (defaults to {})
        params: Option<String>,
        /// Skip instances that fail a health probe
        #[arg(long)]
        healthy: bool,
    },

    /// List hosts of one instance
    Hosts {
        /// Instance name (default instance when omitted)
        #[arg(short, long, default_value = "")]
        instance: String,
        /// Restrict to a host group id
        #[arg(short, long)]
        group: Option<String>,
        /// Match a technical host name exactly
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration with secrets redacted
    Show,
    /// Check the configuration without contacting any instance
    Validate,
    /// Write a starter configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = cli.config.unwrap_or_else(default_config_path);

    let command = match cli.command {
        Commands::Config { action } => {
            return match action {
                ConfigAction::Show => commands::config_show(&config_path),
                ConfigAction::Validate => commands::config_validate(&config_path),
                ConfigAction::Init { force } => commands::config_init(&config_path, force),
                ConfigAction::Path => {
                    print_info(&format!("Config file: {:?}", config_path));
                    Ok(())
                }
            };
        }
        other => other,
    };

    let pool = commands::connect_pool(&config_path).await?;

    let result = match command {
        Commands::Instances { long } => commands::instances_command(&pool, long).await,
        Commands::Health => commands::health_command(&pool).await,
        Commands::Info { instance } => commands::info_command(&pool, &instance).await,
        Commands::Call {
            method,
            params,
            instance,
            versioned,
        } => {
            commands::call_command(&pool, &instance, &method, params.as_deref(), versioned).await
        }
        Commands::Query {
            method,
            params,
            healthy,
        } => commands::query_command(&pool, &method, params.as_deref(), healthy).await,
        Commands::Hosts {
            instance,
            group,
            name,
        } => {
            commands::hosts_command(&pool, &instance, group.as_deref(), name.as_deref()).await
        }
        Commands::Config { .. } => Ok(()),
    };

    pool.shutdown().await;
    result
}
