//! Feedback Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::CollectionKind;
use super::record::Record;

/// Resident feedback; the console only reads it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(rename = "sentAt", default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl Record for Feedback {
    const KIND: CollectionKind = CollectionKind::Feedbacks;
}
