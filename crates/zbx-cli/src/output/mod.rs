//! Output formatting utilities for the CLI
//!
//! Tables for instances, health and API records, plus colored status lines.

use std::collections::HashMap;

use serde_json::Value;
use tabled::{
    builder::Builder,
    settings::{Style, Width},
    Table, Tabled,
};

use zbx_client::PoolEntry;
use zbx_protocol::Record;

/// Format registered instances as a table
///
/// The detailed view adds the capability list of each instance.
pub fn format_instances(entries: &[PoolEntry], detailed: bool) -> String {
    if entries.is_empty() {
        return "No instances registered".to_string();
    }

    #[derive(Tabled)]
    struct InstanceRow {
        #[tabled(rename = "")]
        default: &'static str,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "URL")]
        url: String,
        #[tabled(rename = "AUTH")]
        auth: String,
        #[tabled(rename = "VERSION")]
        version: String,
        #[tabled(rename = "STATE")]
        state: String,
    }

    #[derive(Tabled)]
    struct InstanceRowDetailed {
        #[tabled(rename = "")]
        default: &'static str,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "URL")]
        url: String,
        #[tabled(rename = "AUTH")]
        auth: String,
        #[tabled(rename = "VERSION")]
        version: String,
        #[tabled(rename = "CAPABILITIES")]
        capabilities: String,
    }

    let marker = |entry: &PoolEntry| if entry.default { "*" } else { "" };

    if detailed {
        let rows: Vec<InstanceRowDetailed> = entries
            .iter()
            .map(|e| InstanceRowDetailed {
                default: marker(e),
                name: e.info.name.clone(),
                url: e.info.url.clone(),
                auth: e.info.auth_type.to_string(),
                version: e.info.version_label(),
                capabilities: e
                    .info
                    .capabilities
                    .iter()
                    .map(|c| c.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();

        Table::new(rows)
            .with(Style::rounded())
            .with(Width::wrap(120))
            .to_string()
    } else {
        let rows: Vec<InstanceRow> = entries
            .iter()
            .map(|e| InstanceRow {
                default: marker(e),
                name: e.info.name.clone(),
                url: truncate(&e.info.url, 48),
                auth: e.info.auth_type.to_string(),
                version: e.info.version_label(),
                state: format!("{:?}", e.info.state).to_lowercase(),
            })
            .collect();

        Table::new(rows).with(Style::rounded()).to_string()
    }
}

/// Format health probe results, sorted by instance name
pub fn format_health(health: &HashMap<String, bool>) -> String {
    if health.is_empty() {
        return "No instances registered".to_string();
    }

    #[derive(Tabled)]
    struct HealthRow {
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "HEALTH")]
        health: &'static str,
    }

    let mut rows: Vec<HealthRow> = health
        .iter()
        .map(|(name, ok)| HealthRow {
            name: name.clone(),
            health: if *ok { "ok" } else { "unreachable" },
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Format records as a table with the given columns
///
/// Missing fields render as `-`; nested values render as compact JSON.
pub fn format_records(records: &[Record], columns: &[&str]) -> String {
    if records.is_empty() {
        return "No results".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_uppercase()));
    for record in records {
        builder.push_record(columns.iter().map(|c| cell(record.get(*c))));
    }

    builder
        .build()
        .with(Style::rounded())
        .with(Width::wrap(120))
        .to_string()
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Truncate a string with ellipsis if too long
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
///
/// Outputs to stderr.
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow with a warning symbol prefix
///
/// Outputs to stderr.
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}
