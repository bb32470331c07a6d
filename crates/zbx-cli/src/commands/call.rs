//! Raw API call commands

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use crate::output::{print_error, print_warning};
use zbx_client::ClientPool;

/// Parse a JSON params argument; absent means an empty object
pub fn parse_params(raw: Option<&str>) -> Result<Value> {
    match raw {
        None => Ok(Value::Object(Default::default())),
        Some(raw) => serde_json::from_str(raw)
            .with_context(|| format!("Params are not valid JSON: {}", raw)),
    }
}

/// Call one method on one instance and print the result
///
/// With `versioned`, the method and params are adapted to the server
/// version first.
pub async fn call_command(
    pool: &ClientPool,
    instance: &str,
    method: &str,
    params: Option<&str>,
    versioned: bool,
) -> Result<()> {
    let params = parse_params(params)?;
    let Some(session) = pool.get_session(instance).await else {
        bail!("Unknown instance: {:?}", instance);
    };

    let result = if versioned {
        session.call_versioned(method, params).await
    } else {
        session.call(method, params).await
    };

    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            print_error(&e.to_string());
            Err(e.into())
        }
    }
}

/// Call one method on every instance and print results keyed by name
pub async fn query_command(
    pool: &ClientPool,
    method: &str,
    params: Option<&str>,
    only_healthy: bool,
) -> Result<()> {
    let params = parse_params(params)?;
    if pool.is_empty().await {
        print_warning("No instances registered");
        return Ok(());
    }

    let results = pool.query_all(method, params, only_healthy).await;

    let mut output = BTreeMap::new();
    for (name, result) in results {
        let value = match result {
            Ok(value) => value,
            Err(e) => {
                print_warning(&e.to_string());
                serde_json::json!({ "error": e.to_string() })
            }
        };
        output.insert(name, value);
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
