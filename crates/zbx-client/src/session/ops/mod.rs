//! Typed convenience operations, one module per API area

mod events;
mod hosts;
mod items;
mod templates;
mod triggers;

pub use items::ItemSpec;

use serde_json::{Map, Value};

/// Merge `fields` into an object `params`, overwriting existing keys
pub(crate) fn with_fields(mut params: Map<String, Value>, fields: &[(&str, Value)]) -> Value {
    for (key, value) in fields {
        params.insert((*key).to_string(), value.clone());
    }
    Value::Object(params)
}
