//! Declarative version gates
//!
//! Each table row names a `(major, minor)` boundary. Supporting a new server
//! generation should only require new rows here.

use serde_json::{json, Map, Value};
use std::fmt;

use super::capability::Capability;
use super::VersionInfo;

/// Minimum version of every capability; `(0, 0)` means always available
pub const CAPABILITY_TABLE: &[(Capability, (u32, u32))] = &[
    (Capability::HostManagement, (0, 0)),
    (Capability::ItemManagement, (0, 0)),
    (Capability::TriggerManagement, (0, 0)),
    (Capability::TemplateManagement, (0, 0)),
    (Capability::EventAcknowledgment, (0, 0)),
    (Capability::ProblemView, (4, 0)),
    (Capability::TagSupport, (4, 0)),
    (Capability::ImprovedApi, (4, 2)),
    (Capability::AdvancedDashboard, (5, 0)),
    (Capability::SlaSupport, (5, 0)),
    (Capability::EnhancedSecurity, (5, 2)),
    (Capability::AdvancedAnalytics, (6, 0)),
];

/// Parameter keys of one method that only a version range understands
#[derive(Debug, Clone, Copy)]
pub struct ParamGate {
    pub method: &'static str,
    pub keys: &'static [&'static str],
    /// Capability the keys belong to; its minimum version is the floor
    pub capability: Option<Capability>,
    /// First version accepting the keys, when not tied to a capability
    pub since: Option<(u32, u32)>,
    /// First version that no longer accepts the keys
    pub until: Option<(u32, u32)>,
}

impl ParamGate {
    const fn requires(
        method: &'static str,
        keys: &'static [&'static str],
        capability: Capability,
    ) -> Self {
        Self {
            method,
            keys,
            capability: Some(capability),
            since: None,
            until: None,
        }
    }

    const fn since(method: &'static str, keys: &'static [&'static str], at: (u32, u32)) -> Self {
        Self {
            method,
            keys,
            capability: None,
            since: Some(at),
            until: None,
        }
    }

    const fn until(method: &'static str, keys: &'static [&'static str], at: (u32, u32)) -> Self {
        Self {
            method,
            keys,
            capability: None,
            since: None,
            until: Some(at),
        }
    }

    /// First version accepting the keys, if bounded below
    pub fn floor(&self) -> Option<(u32, u32)> {
        self.capability.map(|c| c.minimum()).or(self.since)
    }

    /// Whether `version` accepts the gated keys
    pub fn allows(&self, version: &VersionInfo) -> bool {
        let above_floor = self
            .floor()
            .map_or(true, |(major, minor)| version.at_least(major, minor));
        let below_ceiling = self
            .until
            .map_or(true, |(major, minor)| !version.at_least(major, minor));
        above_floor && below_ceiling
    }
}

pub const PARAM_GATES: &[ParamGate] = &[
    ParamGate::requires("host.get", &["selectTags"], Capability::TagSupport),
    ParamGate::requires("item.get", &["selectTags"], Capability::TagSupport),
    ParamGate::requires("trigger.get", &["selectTags"], Capability::TagSupport),
    ParamGate::since("item.get", &["selectPreprocessing"], (4, 0)),
    ParamGate::since("trigger.get", &["selectDependencies"], (4, 0)),
    ParamGate::since("template.get", &["selectTags"], (5, 0)),
    ParamGate::since("event.acknowledge", &["action"], (4, 0)),
    ParamGate::until("item.get", &["selectApplications"], (5, 4)),
    ParamGate::until("template.get", &["selectApplications"], (5, 4)),
];

/// Drop the parameter keys `version` does not understand.
///
/// Non-object params and methods without gates are returned unchanged.
pub fn adapt_params(method: &str, params: &Value, version: &VersionInfo) -> Value {
    let Value::Object(map) = params else {
        return params.clone();
    };

    let mut adapted = map.clone();
    for gate in PARAM_GATES
        .iter()
        .filter(|gate| gate.method == method && !gate.allows(version))
    {
        for key in gate.keys {
            if adapted.remove(*key).is_some() {
                tracing::debug!("Dropped {}.{} for server {}", method, key, version);
            }
        }
    }
    Value::Object(adapted)
}

/// Keys `problem.get` shares with `trigger.get`
const PROBLEM_TO_TRIGGER_KEYS: &[&str] = &[
    "eventids",
    "groupids",
    "hostids",
    "objectids",
    "applicationids",
    "limit",
    "output",
];

/// How a method behaves below its minimum version
#[derive(Clone, Copy)]
pub enum MethodFallback {
    /// Call another method with converted params
    Rewrite {
        to: &'static str,
        convert: fn(&Value) -> Value,
    },
    /// No equivalent exists
    Unsupported,
}

#[derive(Clone, Copy)]
pub struct MethodGate {
    pub method: &'static str,
    pub since: (u32, u32),
    pub fallback: MethodFallback,
}

pub const METHOD_GATES: &[MethodGate] = &[
    MethodGate {
        method: "problem.get",
        since: (4, 0),
        fallback: MethodFallback::Rewrite {
            to: "trigger.get",
            convert: problem_to_trigger_params,
        },
    },
    MethodGate {
        method: "sla.get",
        since: (5, 0),
        fallback: MethodFallback::Unsupported,
    },
];

/// Method and params to actually send
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCall {
    pub method: String,
    pub params: Value,
}

/// The method does not exist on the detected server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodUnsupported {
    pub method: String,
    pub since: (u32, u32),
}

impl fmt::Display for MethodUnsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} requires server {}.{} or newer",
            self.method, self.since.0, self.since.1
        )
    }
}

impl std::error::Error for MethodUnsupported {}

/// Map `method` onto what `version` provides
pub fn resolve_method(
    method: &str,
    params: &Value,
    version: &VersionInfo,
) -> Result<ResolvedCall, MethodUnsupported> {
    let gate = METHOD_GATES
        .iter()
        .find(|gate| gate.method == method && !version.at_least(gate.since.0, gate.since.1));

    match gate {
        None => Ok(ResolvedCall {
            method: method.to_string(),
            params: params.clone(),
        }),
        Some(MethodGate {
            fallback: MethodFallback::Rewrite { to, convert },
            ..
        }) => {
            tracing::debug!("Rewriting {} as {} for server {}", method, to, version);
            Ok(ResolvedCall {
                method: to.to_string(),
                params: convert(params),
            })
        }
        Some(gate) => Err(MethodUnsupported {
            method: method.to_string(),
            since: gate.since,
        }),
    }
}

fn problem_to_trigger_params(params: &Value) -> Value {
    let mut converted = Map::new();
    if let Value::Object(map) = params {
        for key in PROBLEM_TO_TRIGGER_KEYS {
            if let Some(value) = map.get(*key) {
                converted.insert((*key).to_string(), value.clone());
            }
        }
    }
    converted.insert("filter".to_string(), json!({ "value": 1 }));
    Value::Object(converted)
}

/// First version naming the login field `username`
pub const USERNAME_KEY_SINCE: (u32, u32) = (5, 4);

/// `user.login` params for `version`; the modern key is used when unknown
pub fn login_params(username: &str, password: &str, version: Option<&VersionInfo>) -> Value {
    let modern = version.map_or(true, |v| {
        v.at_least(USERNAME_KEY_SINCE.0, USERNAME_KEY_SINCE.1)
    });
    let key = if modern { "username" } else { "user" };

    let mut params = Map::new();
    params.insert(key.to_string(), Value::String(username.to_string()));
    params.insert("password".to_string(), Value::String(password.to_string()));
    Value::Object(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Capabilities;

    fn v(major: u32, minor: u32) -> VersionInfo {
        VersionInfo::new(major, minor, 0)
    }

    #[test]
    fn test_host_tags_dropped_on_old_server() {
        let params = json!({ "output": "extend", "selectTags": "extend" });
        let adapted = adapt_params("host.get", &params, &v(3, 4));
        assert_eq!(adapted, json!({ "output": "extend" }));
        assert_eq!(adapt_params("host.get", &params, &v(4, 0)), params);
    }

    #[test]
    fn test_item_and_trigger_gates() {
        let params = json!({
            "selectTags": "extend",
            "selectPreprocessing": "extend",
            "hostids": "10084"
        });
        assert_eq!(
            adapt_params("item.get", &params, &v(3, 0)),
            json!({ "hostids": "10084" })
        );

        let params = json!({ "selectDependencies": "extend", "selectTags": "extend" });
        assert_eq!(adapt_params("trigger.get", &params, &v(3, 4)), json!({}));
        assert_eq!(adapt_params("trigger.get", &params, &v(6, 0)), params);
    }

    #[test]
    fn test_tag_gates_follow_tag_capability() {
        let floor = Capability::TagSupport.minimum();
        let tag_gates: Vec<_> = PARAM_GATES
            .iter()
            .filter(|gate| gate.capability == Some(Capability::TagSupport))
            .collect();
        assert_eq!(tag_gates.len(), 3);
        for gate in tag_gates {
            assert_eq!(gate.floor(), Some(floor));
            assert!(gate.keys.contains(&"selectTags"));
        }

        let params = json!({ "selectTags": "extend" });
        let below = VersionInfo::new(floor.0, floor.1, 0);
        for version in [v(3, 4), below] {
            let supported = Capabilities::for_version(&version).contains(Capability::TagSupport);
            let kept = adapt_params("host.get", &params, &version) == params;
            assert_eq!(supported, kept);
        }
    }

    #[test]
    fn test_template_tags_need_five() {
        let params = json!({ "selectTags": "extend" });
        assert_eq!(adapt_params("template.get", &params, &v(4, 4)), json!({}));
        assert_eq!(adapt_params("template.get", &params, &v(5, 0)), params);
    }

    #[test]
    fn test_applications_removed_in_five_four() {
        let params = json!({ "selectApplications": "extend", "output": "extend" });
        assert_eq!(adapt_params("item.get", &params, &v(5, 2)), params);
        assert_eq!(
            adapt_params("item.get", &params, &v(5, 4)),
            json!({ "output": "extend" })
        );
        assert_eq!(
            adapt_params("template.get", &params, &v(7, 0)),
            json!({ "output": "extend" })
        );
    }

    #[test]
    fn test_acknowledge_action_gate() {
        let params = json!({ "eventids": ["1"], "action": 6, "message": "ok" });
        assert_eq!(
            adapt_params("event.acknowledge", &params, &v(3, 4)),
            json!({ "eventids": ["1"], "message": "ok" })
        );
    }

    #[test]
    fn test_ungated_and_non_object_params_unchanged() {
        let params = json!({ "selectTags": "extend" });
        assert_eq!(adapt_params("user.get", &params, &v(2, 0)), params);
        assert_eq!(adapt_params("host.get", &json!([]), &v(2, 0)), json!([]));
    }

    #[test]
    fn test_problem_get_rewritten_below_four() {
        let params = json!({
            "hostids": ["10084"],
            "limit": 10,
            "recent": true,
            "severities": [4, 5]
        });
        let resolved = resolve_method("problem.get", &params, &v(3, 4)).unwrap();
        assert_eq!(resolved.method, "trigger.get");
        assert_eq!(
            resolved.params,
            json!({ "hostids": ["10084"], "limit": 10, "filter": { "value": 1 } })
        );

        let resolved = resolve_method("problem.get", &params, &v(4, 0)).unwrap();
        assert_eq!(resolved.method, "problem.get");
        assert_eq!(resolved.params, params);
    }

    #[test]
    fn test_sla_rejected_below_five() {
        let err = resolve_method("sla.get", &json!({}), &v(4, 4)).unwrap_err();
        assert_eq!(err.since, (5, 0));
        assert_eq!(err.to_string(), "sla.get requires server 5.0 or newer");
        assert!(resolve_method("sla.get", &json!({}), &v(5, 0)).is_ok());
    }

    #[test]
    fn test_login_username_key() {
        let old = login_params("Admin", "zabbix", Some(&v(5, 2)));
        assert_eq!(old, json!({ "user": "Admin", "password": "zabbix" }));

        let new = login_params("Admin", "zabbix", Some(&v(5, 4)));
        assert_eq!(new, json!({ "username": "Admin", "password": "zabbix" }));

        let unknown = login_params("Admin", "zabbix", None);
        assert!(unknown.get("username").is_some());
    }
}
