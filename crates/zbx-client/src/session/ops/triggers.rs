//! Trigger operations

use serde_json::{json, Map, Value};

use zbx_core::ClientError;
use zbx_protocol::Record;

use super::with_fields;
use crate::session::ClientSession;

const STATUS_ENABLED: u8 = 0;
const STATUS_DISABLED: u8 = 1;

impl ClientSession {
    /// Triggers with their hosts and items; `active` keeps enabled ones only
    pub async fn get_triggers(
        &self,
        host_id: Option<&str>,
        active: bool,
    ) -> Result<Vec<Record>, ClientError> {
        let mut params = json!({
            "output": "extend",
            "selectHosts": "extend",
            "selectItems": "extend",
            "selectTags": "extend",
        });
        if let Some(host_id) = host_id {
            params["hostids"] = json!(host_id);
        }
        if active {
            params["filter"] = json!({ "status": STATUS_ENABLED });
        }
        self.fetch_records("trigger.get", params).await
    }

    pub async fn get_trigger_by_id(&self, trigger_id: &str) -> Result<Record, ClientError> {
        let params = json!({
            "output": "extend",
            "selectHosts": "extend",
            "selectItems": "extend",
            "selectDependencies": "extend",
            "triggerids": trigger_id,
        });
        self.fetch_one("trigger.get", params, "trigger", trigger_id)
            .await
    }

    /// Create an enabled trigger; returns the new trigger id
    pub async fn create_trigger(
        &self,
        description: &str,
        expression: &str,
        priority: u8,
    ) -> Result<String, ClientError> {
        let params = json!({
            "description": description,
            "expression": expression,
            "priority": priority,
            "status": STATUS_ENABLED,
        });
        self.fetch_created_id("trigger.create", params).await
    }

    pub async fn update_trigger(
        &self,
        trigger_id: &str,
        changes: Map<String, Value>,
    ) -> Result<Vec<String>, ClientError> {
        let params = with_fields(changes, &[("triggerid", json!(trigger_id))]);
        self.fetch_ids("trigger.update", params).await
    }

    pub async fn delete_trigger(&self, trigger_id: &str) -> Result<Vec<String>, ClientError> {
        self.fetch_ids("trigger.delete", json!([trigger_id])).await
    }

    pub async fn enable_trigger(&self, trigger_id: &str) -> Result<Vec<String>, ClientError> {
        self.set_trigger_status(trigger_id, STATUS_ENABLED).await
    }

    pub async fn disable_trigger(&self, trigger_id: &str) -> Result<Vec<String>, ClientError> {
        self.set_trigger_status(trigger_id, STATUS_DISABLED).await
    }

    async fn set_trigger_status(
        &self,
        trigger_id: &str,
        status: u8,
    ) -> Result<Vec<String>, ClientError> {
        let params = json!({ "triggerid": trigger_id, "status": status });
        self.fetch_ids("trigger.update", params).await
    }
}
