//! Host operations

use serde_json::{json, Map, Value};

use zbx_core::ClientError;
use zbx_protocol::Record;

use super::with_fields;
use crate::session::ClientSession;

/// Upper bound on hosts returned by a listing
const HOST_LIST_LIMIT: u32 = 1000;

impl ClientSession {
    /// List hosts, optionally restricted to a group or a technical name
    pub async fn get_hosts(
        &self,
        group_id: Option<&str>,
        host_name: Option<&str>,
    ) -> Result<Vec<Record>, ClientError> {
        let mut params = json!({
            "output": ["hostid", "host", "name", "status", "available"],
            "limit": HOST_LIST_LIMIT,
        });
        if let Some(group_id) = group_id {
            params["groupids"] = json!(group_id);
        }
        if let Some(host_name) = host_name {
            params["filter"] = json!({ "host": host_name });
        }
        self.fetch_records("host.get", params).await
    }

    /// Host with its groups and interfaces
    pub async fn get_host_by_name(&self, host_name: &str) -> Result<Record, ClientError> {
        let params = json!({
            "output": ["hostid", "host", "name", "status", "available", "description", "lastaccess"],
            "filter": { "host": host_name },
            "selectGroups": ["groupid", "name", "internal"],
            "selectInterfaces": ["interfaceid", "ip", "dns", "port", "type", "main", "useip"],
            "selectTags": "extend",
        });
        self.fetch_one("host.get", params, "host", host_name).await
    }

    /// Like [`get_host_by_name`](Self::get_host_by_name) with fewer fields
    pub async fn get_host_by_name_lite(&self, host_name: &str) -> Result<Record, ClientError> {
        let params = json!({
            "output": ["hostid", "host", "name", "status", "available", "description"],
            "filter": { "host": host_name },
            "selectGroups": ["groupid", "name"],
            "selectInterfaces": ["interfaceid", "ip", "dns", "port", "type", "main"],
        });
        self.fetch_one("host.get", params, "host", host_name).await
    }

    pub async fn get_host_by_id(&self, host_id: &str) -> Result<Record, ClientError> {
        let params = json!({
            "output": "extend",
            "hostids": host_id,
            "selectTags": "extend",
        });
        self.fetch_one("host.get", params, "host", host_id).await
    }

    /// Create a host with one agent interface; returns the new host id
    pub async fn create_host(
        &self,
        name: &str,
        group_id: &str,
        ip: &str,
    ) -> Result<String, ClientError> {
        let params = json!({
            "host": name,
            "interfaces": [{
                "type": 1,
                "main": 1,
                "useip": 1,
                "ip": ip,
                "dns": "",
                "port": "10050",
            }],
            "groups": [{ "groupid": group_id }],
        });
        self.fetch_created_id("host.create", params).await
    }

    /// Apply `changes` to a host
    pub async fn update_host(
        &self,
        host_id: &str,
        changes: Map<String, Value>,
    ) -> Result<Vec<String>, ClientError> {
        let params = with_fields(changes, &[("hostid", json!(host_id))]);
        self.fetch_ids("host.update", params).await
    }

    pub async fn delete_host(&self, host_id: &str) -> Result<Vec<String>, ClientError> {
        self.fetch_ids("host.delete", json!([host_id])).await
    }

    pub async fn get_host_groups(&self) -> Result<Vec<Record>, ClientError> {
        let params = json!({ "output": ["groupid", "name", "internal"] });
        self.fetch_records("hostgroup.get", params).await
    }
}
