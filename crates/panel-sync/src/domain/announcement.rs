//! Announcement Entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collection::CollectionKind;
use super::record::Record;
use crate::error::{ConsoleError, ConsoleResult};

/// Public announcement shown to residents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub announcement: String,
    /// Missing on legacy documents
    #[serde(rename = "postedAt", default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
}

impl Announcement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            announcement: text.into(),
            posted_at: None,
        }
    }
}

impl Record for Announcement {
    const KIND: CollectionKind = CollectionKind::Announcements;

    fn validate(&self) -> ConsoleResult<()> {
        if self.announcement.trim().is_empty() {
            return Err(ConsoleError::invalid("announcement text is empty"));
        }
        Ok(())
    }
}
