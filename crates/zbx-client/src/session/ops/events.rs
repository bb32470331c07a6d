//! Event and problem operations

use serde_json::{json, Value};

use zbx_core::ClientError;
use zbx_protocol::{Payload, Record};

use crate::session::ClientSession;

/// Acknowledge (2) and add message (4)
const ACK_ACTION: u8 = 6;

fn default_event_query() -> Value {
    json!({
        "output": "extend",
        "source": 0,
        "object": 0,
        "sortfield": ["clock"],
        "sortorder": "DESC",
        "limit": 100,
    })
}

/// `problem.get` only sorts by `eventid` and has no `source`/`object` keys
fn default_problem_query() -> Value {
    json!({
        "output": "extend",
        "recent": false,
        "sortfield": ["eventid"],
        "sortorder": "DESC",
        "limit": 100,
    })
}

impl ClientSession {
    /// Latest events of one trigger
    pub async fn get_trigger_events(
        &self,
        trigger_id: &str,
        limit: u32,
    ) -> Result<Vec<Record>, ClientError> {
        let params = json!({
            "output": "extend",
            "select_acknowledges": "extend",
            "objectids": trigger_id,
            "source": 0,
            "object": 0,
            "sortfield": ["clock"],
            "sortorder": "DESC",
            "limit": limit,
        });
        self.fetch_records("event.get", params).await
    }

    /// Raw `event.get` query; the latest 100 trigger events when `params` is `None`
    pub async fn get_events(&self, params: Option<Value>) -> Result<Vec<Record>, ClientError> {
        let params = params.unwrap_or_else(default_event_query);
        self.fetch_records("event.get", params).await
    }

    pub async fn get_event_by_id(&self, event_id: &str) -> Result<Record, ClientError> {
        let params = json!({
            "output": "extend",
            "select_acknowledges": "extend",
            "select_alerts": "extend",
            "eventids": event_id,
        });
        self.fetch_one("event.get", params, "event", event_id).await
    }

    /// Acknowledge one event with a message
    pub async fn acknowledge_event(
        &self,
        event_id: &str,
        message: &str,
    ) -> Result<Vec<String>, ClientError> {
        self.mass_acknowledge_events(&[event_id], message).await
    }

    pub async fn mass_acknowledge_events(
        &self,
        event_ids: &[&str],
        message: &str,
    ) -> Result<Vec<String>, ClientError> {
        let params = json!({
            "eventids": event_ids,
            "message": message,
            "action": ACK_ACTION,
        });
        self.fetch_ids("event.acknowledge", params).await
    }

    /// Current problems; mapped onto `trigger.get` for servers without
    /// `problem.get`
    pub async fn get_problem_events(
        &self,
        params: Option<Value>,
    ) -> Result<Vec<Record>, ClientError> {
        let params = params.unwrap_or_else(default_problem_query);
        let method = "problem.get";
        let result = self.call_versioned(method, params).await?;
        Payload::classify(result)
            .into_records()
            .map_err(|other| self.shape_error(method, "array of records", &other))
    }
}
