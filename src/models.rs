//! Resources exposed by the daemon's REST API.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Answer to `GET /api`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub version: Value,
}

/// A device-protocol adapter and its settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bridge {
    pub id: String,
    pub vendor_prefix: String,
    pub instance_id: String,
    /// JSON Schema describing `settings`.
    pub settings_schema: Value,
    pub settings: Value,
}

/// A physical or virtual device.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Thing {
    pub id: String,
    pub name: Option<String>,
    pub bridge_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Keyed by channel name, in the order the daemon sent them.
    #[serde(default)]
    pub channels: IndexMap<String, Channel>,
}

impl Thing {
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }
}

/// One addressable data point of a thing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub sensor: bool,
    #[serde(rename = "type")]
    pub channel_type: String,
    #[serde(default)]
    pub value: Value,
}

impl Channel {
    /// Turn a command line argument into the value this channel accepts.
    ///
    /// Switches take `on` (anything else is off); every other channel
    /// type takes a JSON literal.
    pub fn parse_value(&self, raw: &str) -> Result<Value, serde_json::Error> {
        if self.channel_type == "SwitchChannel" {
            Ok(Value::Bool(raw == "on"))
        } else {
            serde_json::from_str(raw)
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub context_id: Value,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub dismissable: bool,
    pub created: Value,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub id: String,
    pub event_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Rule {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub actions: Vec<Value>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
}

/// Render a loosely typed field for a table cell.
pub fn display_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
