//! Template operations

use serde_json::{json, Map, Value};

use zbx_core::ClientError;
use zbx_protocol::Record;

use crate::session::ClientSession;

/// `[{key: id}, ..]`, the form mass operations expect
fn id_objects(key: &str, ids: &[&str]) -> Value {
    ids.iter()
        .map(|id| {
            let mut object = Map::new();
            object.insert(key.to_string(), json!(id));
            Value::Object(object)
        })
        .collect()
}

impl ClientSession {
    pub async fn get_templates(&self) -> Result<Vec<Record>, ClientError> {
        let params = json!({
            "output": ["templateid", "host", "name", "description"],
            "selectGroups": "extend",
            "selectTags": "extend",
        });
        self.fetch_records("template.get", params).await
    }

    /// Template with its groups, hosts, parents, triggers and items
    pub async fn get_template_by_id(&self, template_id: &str) -> Result<Record, ClientError> {
        let params = json!({
            "output": "extend",
            "selectGroups": "extend",
            "selectHosts": "extend",
            "selectTemplates": "extend",
            "selectTriggers": "extend",
            "selectItems": "extend",
            "selectApplications": "extend",
            "templateids": template_id,
        });
        self.fetch_one("template.get", params, "template", template_id)
            .await
    }

    /// Templates linked to a host
    pub async fn get_templates_by_host(&self, host_id: &str) -> Result<Vec<Record>, ClientError> {
        let params = json!({
            "output": ["templateid", "host", "name", "description"],
            "hostids": host_id,
        });
        self.fetch_records("template.get", params).await
    }

    pub async fn link_template(
        &self,
        host_id: &str,
        template_id: &str,
    ) -> Result<Vec<String>, ClientError> {
        self.mass_link_templates(&[host_id], &[template_id]).await
    }

    pub async fn link_templates(
        &self,
        host_id: &str,
        template_ids: &[&str],
    ) -> Result<Vec<String>, ClientError> {
        self.mass_link_templates(&[host_id], template_ids).await
    }

    /// Unlink a template from a host and clear the entities it brought
    pub async fn unlink_template(
        &self,
        host_id: &str,
        template_id: &str,
    ) -> Result<Vec<String>, ClientError> {
        self.mass_unlink_templates(&[host_id], &[template_id]).await
    }

    /// Unlink templates from a host.
    ///
    /// With `clear` the inherited entities are deleted too; otherwise they
    /// stay on the host as its own.
    pub async fn unlink_templates(
        &self,
        host_id: &str,
        template_ids: &[&str],
        clear: bool,
    ) -> Result<Vec<String>, ClientError> {
        if clear {
            return self.mass_unlink_templates(&[host_id], template_ids).await;
        }
        let params = json!({
            "hostids": [host_id],
            "templateids": template_ids,
        });
        self.fetch_ids("host.massremove", params).await
    }

    pub async fn mass_link_templates(
        &self,
        host_ids: &[&str],
        template_ids: &[&str],
    ) -> Result<Vec<String>, ClientError> {
        let params = json!({
            "hosts": id_objects("hostid", host_ids),
            "templates": id_objects("templateid", template_ids),
        });
        self.fetch_ids("template.massadd", params).await
    }

    /// Unlink templates from several hosts, deleting inherited entities
    pub async fn mass_unlink_templates(
        &self,
        host_ids: &[&str],
        template_ids: &[&str],
    ) -> Result<Vec<String>, ClientError> {
        let params = json!({
            "hostids": host_ids,
            "templateids_clear": template_ids,
        });
        self.fetch_ids("host.massremove", params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_objects() {
        assert_eq!(
            id_objects("hostid", &["1", "2"]),
            json!([{ "hostid": "1" }, { "hostid": "2" }])
        );
        assert_eq!(id_objects("templateid", &[]), json!([]));
    }
}
