//! List Item
//!
//! One member of a live collection as displayed by a panel.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConsoleError, ConsoleResult};
use crate::remote::RemoteDocument;

/// Free-form record fields, keyed by wire name
pub type Payload = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    /// Remote-assigned identifier (or a temporary one while a create is in flight)
    pub id: String,
    pub payload: Payload,
    #[serde(rename = "receivedAt")]
    pub received_at: DateTime<Utc>,
}

impl ListItem {
    pub fn new(id: impl Into<String>, payload: Payload) -> Self {
        Self::received(id, payload, Utc::now())
    }

    pub fn received(id: impl Into<String>, payload: Payload, received_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            payload,
            received_at,
        }
    }

    pub fn from_remote(doc: RemoteDocument, received_at: DateTime<Utc>) -> Self {
        Self::received(doc.id, doc.fields, received_at)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.payload.get(name).and_then(Value::as_str)
    }

    /// Decode the payload into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> ConsoleResult<T> {
        serde_json::from_value(Value::Object(self.payload.clone())).map_err(|e| {
            ConsoleError::invalid(format!("item {} does not decode: {}", self.id, e))
        })
    }
}
