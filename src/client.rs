//! Blocking REST client for the daemon.
//!
//! Requires the `remote` feature (enabled by default).

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::ClientError;
use crate::models::{display_field, Bridge, Notification, Rule, ServerInfo, Thing, Trigger};

/// API version this client speaks.
pub const CLIENT_VERSION: &str = "0.1";

/// Default timeout for HTTP requests (10 seconds).
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection to one daemon.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl Client {
    /// Connect to `http://{host}:{port}/api` and check the API version.
    ///
    /// # Errors
    ///
    /// `ClientError::Connect` when nothing listens there,
    /// `ClientError::IncompatibleVersion` when the daemon speaks another version.
    pub fn connect(host: &str, port: u16) -> Result<Self, ClientError> {
        Self::connect_url(&format!("http://{}:{}/api", host, port))
    }

    /// Like [`Client::connect`] with an explicit API base URL.
    pub fn connect_url(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|source| ClientError::Network {
                url: base_url.to_string(),
                source,
            })?;

        let client = Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        };

        let info: ServerInfo = client.get("", &[])?;
        let server = display_field(&info.version);
        if server != CLIENT_VERSION {
            return Err(ClientError::IncompatibleVersion {
                server,
                client: CLIENT_VERSION.to_string(),
            });
        }

        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // --- Bridges ---

    pub fn bridges(&self) -> Result<Vec<Bridge>, ClientError> {
        self.get_map("/bridges", &[("expand", "true".into())])
    }

    pub fn bridge(&self, id: &str) -> Result<Bridge, ClientError> {
        self.get(&format!("/bridges/{}", id), &[])
    }

    pub fn bridge_types(&self) -> Result<Vec<String>, ClientError> {
        self.get("/bridges/types", &[])
    }

    /// Create a bridge of the given type and fetch it.
    pub fn add_bridge(&self, bridge_type: &str) -> Result<Bridge, ClientError> {
        let id: String = self.send(Method::POST, "/bridges", &[], Some(&json!(bridge_type)))?;
        self.bridge(&id)
    }

    pub fn bridge_things(&self, id: &str) -> Result<Vec<Thing>, ClientError> {
        self.get_map(&format!("/bridges/{}/things", id), &[])
    }

    pub fn bridge_running(&self, id: &str) -> Result<bool, ClientError> {
        self.get(&format!("/bridges/{}/running", id), &[])
    }

    pub fn set_bridge_settings(&self, id: &str, settings: &Value) -> Result<(), ClientError> {
        let _: Value = self.send(
            Method::PUT,
            &format!("/bridges/{}/settings", id),
            &[],
            Some(settings),
        )?;
        Ok(())
    }

    pub fn remove_bridge(&self, id: &str) -> Result<(), ClientError> {
        let _: Value = self.send(Method::DELETE, &format!("/bridges/{}", id), &[], None)?;
        Ok(())
    }

    // --- Things ---

    /// All things, optionally only those carrying one of `tags`.
    pub fn things(&self, tags: &[String]) -> Result<Vec<Thing>, ClientError> {
        let mut query = vec![("expand", "true".to_string())];
        query.extend(tags.iter().map(|tag| ("tag", tag.clone())));
        self.get_map("/things", &query)
    }

    pub fn thing(&self, id: &str) -> Result<Thing, ClientError> {
        self.get(&format!("/things/{}", id), &[])
    }

    pub fn tags(&self) -> Result<Vec<String>, ClientError> {
        self.get("/things/tags", &[])
    }

    pub fn scan(&self) -> Result<Value, ClientError> {
        self.get("/things/scan", &[])
    }

    pub fn thing_online(&self, id: &str) -> Result<bool, ClientError> {
        self.get(&format!("/things/{}/online", id), &[])
    }

    /// Returns whether the daemon accepted the new name.
    pub fn rename_thing(&self, id: &str, name: &str) -> Result<bool, ClientError> {
        let accepted: Value = self.send(
            Method::PUT,
            &format!("/things/{}/name", id),
            &[],
            Some(&json!(name)),
        )?;
        Ok(is_truthy(&accepted))
    }

    /// Returns the thing's tags after the change.
    pub fn add_thing_tag(&self, id: &str, tag: &str) -> Result<Vec<String>, ClientError> {
        self.send(
            Method::POST,
            &format!("/things/{}/tags", id),
            &[],
            Some(&json!(tag)),
        )
    }

    /// Returns the thing's tags after the change.
    pub fn remove_thing_tag(&self, id: &str, tag: &str) -> Result<Vec<String>, ClientError> {
        self.send(
            Method::DELETE,
            &format!("/things/{}/tags", id),
            &[],
            Some(&json!(tag)),
        )
    }

    pub fn apply_channel(
        &self,
        thing_id: &str,
        channel: &str,
        value: &Value,
    ) -> Result<(), ClientError> {
        let _: Value = self.send(
            Method::PUT,
            &format!("/things/{}/channels/{}", thing_id, channel),
            &[],
            Some(value),
        )?;
        Ok(())
    }

    pub fn remove_thing(&self, id: &str) -> Result<(), ClientError> {
        let _: Value = self.send(Method::DELETE, &format!("/things/{}", id), &[], None)?;
        Ok(())
    }

    // --- Notifications, triggers, rules, plugins ---

    pub fn notifications(&self) -> Result<Vec<Notification>, ClientError> {
        self.get("/notifications", &[])
    }

    pub fn triggers(&self) -> Result<Vec<Trigger>, ClientError> {
        self.get_map("/triggers", &[])
    }

    pub fn trigger(&self, id: &str) -> Result<Trigger, ClientError> {
        self.get(&format!("/triggers/{}", id), &[])
    }

    pub fn rules(&self) -> Result<Vec<Rule>, ClientError> {
        self.get_map("/rules", &[])
    }

    pub fn rule(&self, id: &str) -> Result<Rule, ClientError> {
        self.get(&format!("/rules/{}", id), &[])
    }

    /// Create an empty rule and fetch it.
    pub fn add_rule(&self) -> Result<Rule, ClientError> {
        let id: String = self.send(Method::POST, "/rules", &[], None)?;
        self.rule(&id)
    }

    pub fn add_rule_trigger(&self, rule_id: &str, trigger_id: &str) -> Result<(), ClientError> {
        let _: Value = self.send(
            Method::POST,
            &format!("/rules/{}/triggers", rule_id),
            &[],
            Some(&json!(trigger_id)),
        )?;
        Ok(())
    }

    pub fn plugins(&self) -> Result<Vec<Value>, ClientError> {
        self.get("/plugins", &[])
    }

    // --- Internal implementation ---

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        self.send(Method::GET, path, query, None)
    }

    /// GET an object keyed by id and return its values in server order.
    fn get_map<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ClientError> {
        let map: Map<String, Value> = self.get(path, query)?;
        map.into_iter()
            .map(|(_, value)| {
                serde_json::from_value(value).map_err(|source| ClientError::InvalidJson {
                    url: self.url(path),
                    source,
                })
            })
            .collect()
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Option<&Value>,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method.clone(), &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().map_err(|source| {
            if source.is_connect() {
                ClientError::Connect {
                    url: url.clone(),
                    source,
                }
            } else {
                ClientError::Network {
                    url: url.clone(),
                    source,
                }
            }
        })?;

        let status = response.status();
        let body = response.text().map_err(|source| ClientError::Network {
            url: url.clone(),
            source,
        })?;
        debug!(status = status.as_u16(), bytes = body.len(), "received response");

        if status != StatusCode::OK {
            return Err(ClientError::Status {
                method: method.to_string(),
                url,
                status: status.as_u16(),
                body,
            });
        }

        // Some endpoints answer with an empty body.
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|source| ClientError::InvalidJson { url, source })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
