//! Notification Entity
//!
//! Collection point reports pushed by the trucks. Field names follow the
//! documents written by the field app.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::CollectionKind;
use super::record::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Garbage bin point the message refers to
    #[serde(rename = "GBPoint")]
    pub gb_point: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "TimeStamp", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Record for Notification {
    const KIND: CollectionKind = CollectionKind::Notifications;
}
