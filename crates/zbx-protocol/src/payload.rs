//! Typed view over API results
//!
//! Zabbix results come in a handful of shapes: `*.get` returns an array of
//! objects, `*.create`/`update`/`delete` return an object holding one
//! identifier array (e.g. `{"hostids": ["10105"]}`), and a few methods
//! return scalars (`apiinfo.version`, `user.login`, `user.logout`).
//! [`Payload::classify`] sorts a raw result into one of these shapes once,
//! so callers match on a variant instead of probing JSON by hand.

use serde_json::{Map, Value};

/// A single flat API object
pub type Record = Map<String, Value>;

/// Classified API result
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Array whose elements are all objects (possibly empty)
    Records(Vec<Record>),
    /// Object with a single `*ids` member holding identifiers
    Ids { key: String, ids: Vec<String> },
    /// Any other object
    Record(Record),
    /// Anything else: strings, booleans, numbers, null, mixed arrays
    Scalar(Value),
}

impl Payload {
    /// Classify a raw result value
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Array(items) if items.iter().all(Value::is_object) => Payload::Records(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(record) => Some(record),
                        _ => None,
                    })
                    .collect(),
            ),
            Value::Object(record) => match identifier_list(&record) {
                Some((key, ids)) => Payload::Ids { key, ids },
                None => Payload::Record(record),
            },
            other => Payload::Scalar(other),
        }
    }

    /// Short description of the shape, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Records(_) => "array of records",
            Payload::Ids { .. } => "identifier list",
            Payload::Record(_) => "record",
            Payload::Scalar(Value::String(_)) => "string",
            Payload::Scalar(Value::Bool(_)) => "boolean",
            Payload::Scalar(Value::Number(_)) => "number",
            Payload::Scalar(Value::Null) => "null",
            Payload::Scalar(Value::Array(_)) => "array of non-records",
            Payload::Scalar(Value::Object(_)) => "object",
        }
    }

    /// Records of an array result
    pub fn into_records(self) -> Result<Vec<Record>, Payload> {
        match self {
            Payload::Records(records) => Ok(records),
            other => Err(other),
        }
    }

    /// Identifiers of a create/update/delete result
    pub fn into_ids(self) -> Result<Vec<String>, Payload> {
        match self {
            Payload::Ids { ids, .. } => Ok(ids),
            other => Err(other),
        }
    }

    /// String result such as a version or session token
    pub fn into_string(self) -> Result<String, Payload> {
        match self {
            Payload::Scalar(Value::String(s)) => Ok(s),
            other => Err(other),
        }
    }
}

/// Detect `{"<something>ids": [..]}` and extract the identifiers.
///
/// Zabbix sends identifiers as strings; numeric identifiers are accepted and
/// stringified.
fn identifier_list(record: &Record) -> Option<(String, Vec<String>)> {
    if record.len() != 1 {
        return None;
    }
    let (key, value) = record.iter().next()?;
    if !key.ends_with("ids") {
        return None;
    }
    let ids = value
        .as_array()?
        .iter()
        .map(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some((key.clone(), ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_records() {
        let payload = Payload::classify(json!([{"hostid": "1"}, {"hostid": "2"}]));
        let records = payload.into_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["hostid"], json!("2"));
    }

    #[test]
    fn test_classify_empty_array_as_records() {
        assert_eq!(Payload::classify(json!([])), Payload::Records(vec![]));
    }

    #[test]
    fn test_classify_ids() {
        let payload = Payload::classify(json!({"hostids": ["10105"]}));
        assert_eq!(
            payload,
            Payload::Ids {
                key: "hostids".into(),
                ids: vec!["10105".into()]
            }
        );

        let payload = Payload::classify(json!({"eventids": [42, "43"]}));
        assert_eq!(payload.into_ids().unwrap(), vec!["42", "43"]);
    }

    #[test]
    fn test_classify_record() {
        let payload = Payload::classify(json!({"hostid": "1", "host": "web01"}));
        assert!(matches!(payload, Payload::Record(_)));
        assert_eq!(payload.kind(), "record");
    }

    #[test]
    fn test_classify_scalars() {
        assert_eq!(
            Payload::classify(json!("7.0.2")).into_string().unwrap(),
            "7.0.2"
        );
        assert_eq!(Payload::classify(json!(true)).kind(), "boolean");
        assert_eq!(Payload::classify(json!([1, 2])).kind(), "array of non-records");
    }

    #[test]
    fn test_shape_mismatch_returns_payload() {
        let err = Payload::classify(json!("oops")).into_records().unwrap_err();
        assert_eq!(err.kind(), "string");
    }
}
