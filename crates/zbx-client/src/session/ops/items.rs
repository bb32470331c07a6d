//! Item and history operations

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use zbx_core::ClientError;
use zbx_protocol::Record;

use super::with_fields;
use crate::session::ClientSession;

/// Definition of a new item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub host_id: String,
    pub name: String,
    pub key: String,
    /// Item type code; 0 is Zabbix agent
    pub item_type: String,
    /// Value type code; 3 is numeric unsigned
    pub value_type: String,
    pub delay: String,
    /// Interface id; the host's main interface when `None`
    pub interface_id: Option<String>,
}

impl ItemSpec {
    /// Agent item polled every 60 s
    pub fn new(host_id: impl Into<String>, name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            host_id: host_id.into(),
            name: name.into(),
            key: key.into(),
            item_type: "0".into(),
            value_type: "3".into(),
            delay: "60s".into(),
            interface_id: None,
        }
    }

    fn to_params(&self) -> Value {
        let mut params = json!({
            "hostid": self.host_id,
            "name": self.name,
            "key_": self.key,
            "type": self.item_type,
            "value_type": self.value_type,
            "delay": self.delay,
        });
        if let Some(interface_id) = &self.interface_id {
            params["interfaceid"] = json!(interface_id);
        }
        params
    }
}

impl ClientSession {
    /// Items of a host, optionally filtered by a name substring
    pub async fn get_items(
        &self,
        host_id: &str,
        name_filter: Option<&str>,
    ) -> Result<Vec<Record>, ClientError> {
        let mut params = json!({
            "output": "extend",
            "hostids": host_id,
            "selectTriggers": "extend",
            "selectApplications": "extend",
            "selectTags": "extend",
        });
        if let Some(name) = name_filter {
            params["search"] = json!({ "name": name });
        }
        self.fetch_records("item.get", params).await
    }

    pub async fn get_item_by_key(&self, host_id: &str, key: &str) -> Result<Record, ClientError> {
        let params = json!({
            "output": "extend",
            "hostids": host_id,
            "filter": { "key_": key },
        });
        self.fetch_one("item.get", params, "item", key).await
    }

    /// Item with its owning host
    pub async fn get_item_info(&self, item_id: &str) -> Result<Record, ClientError> {
        let params = json!({
            "output": "extend",
            "itemids": item_id,
            "selectHosts": ["hostid", "host", "name"],
        });
        self.fetch_one("item.get", params, "item", item_id).await
    }

    /// Latest `limit` history values, newest first
    pub async fn get_item_data(
        &self,
        item_id: &str,
        history: u8,
        limit: u32,
    ) -> Result<Vec<Record>, ClientError> {
        let params = json!({
            "output": "extend",
            "history": history,
            "itemids": item_id,
            "sortfield": "clock",
            "sortorder": "DESC",
            "limit": limit,
        });
        self.fetch_records("history.get", params).await
    }

    /// History values between two Unix timestamps, newest first
    pub async fn get_item_data_range(
        &self,
        item_id: &str,
        history: u8,
        time_from: i64,
        time_till: i64,
    ) -> Result<Vec<Record>, ClientError> {
        let params = json!({
            "output": "extend",
            "history": history,
            "itemids": item_id,
            "time_from": time_from,
            "time_till": time_till,
            "sortfield": "clock",
            "sortorder": "DESC",
        });
        self.fetch_records("history.get", params).await
    }

    /// Create an item; returns the new item id
    pub async fn create_item(&self, spec: &ItemSpec) -> Result<String, ClientError> {
        self.fetch_created_id("item.create", spec.to_params()).await
    }

    pub async fn update_item(
        &self,
        item_id: &str,
        changes: Map<String, Value>,
    ) -> Result<Vec<String>, ClientError> {
        let params = with_fields(changes, &[("itemid", json!(item_id))]);
        self.fetch_ids("item.update", params).await
    }

    pub async fn delete_item(&self, item_id: &str) -> Result<Vec<String>, ClientError> {
        self.fetch_ids("item.delete", json!([item_id])).await
    }
}
