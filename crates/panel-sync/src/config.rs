//! Console Configuration
//!
//! JSON configuration for the shell: alert timing, collection names and the
//! optional Firestore connection. Every field has a default, so a partial
//! file is valid.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::CollectionKind;
use crate::error::{ConsoleError, ConsoleResult};

pub const DEFAULT_ALERT_DURATION_MS: u32 = 3000;
pub const DEFAULT_TEMP_ID_PREFIX: &str = "pending-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// Auto-dismiss delay for alerts; 0 keeps an alert until dismissed
    pub alert_duration_ms: u32,
    /// Prefix of ids given to optimistically created items
    pub temp_id_prefix: String,
    /// Remote collection name overrides
    pub collections: BTreeMap<CollectionKind, String>,
    /// Live Firestore backend; `None` runs against the in-memory store
    pub firestore: Option<FirestoreConfig>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            alert_duration_ms: DEFAULT_ALERT_DURATION_MS,
            temp_id_prefix: DEFAULT_TEMP_ID_PREFIX.to_string(),
            collections: BTreeMap::new(),
            firestore: None,
        }
    }
}

impl ConsoleConfig {
    pub fn from_json_str(raw: &str) -> ConsoleResult<Self> {
        let config: ConsoleConfig = serde_json::from_str(raw)
            .map_err(|e| ConsoleError::Config(format!("parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConsoleResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConsoleError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        if self.temp_id_prefix.is_empty() {
            return Err(ConsoleError::Config("tempIdPrefix must not be empty".to_string()));
        }
        if let Some((kind, _)) = self.collections.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(ConsoleError::Config(format!(
                "collection name for {:?} must not be empty",
                kind
            )));
        }
        if let Some(firestore) = &self.firestore {
            firestore.validate()?;
        }
        Ok(())
    }

    /// Remote collection backing `kind`
    pub fn collection_name(&self, kind: CollectionKind) -> &str {
        self.collections
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_collection_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreConfig {
    pub project_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Bearer token of the signed-in operator
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

impl FirestoreConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            api_key: None,
            auth_token: None,
            database: default_database(),
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }

    pub fn validate(&self) -> ConsoleResult<()> {
        if self.project_id.trim().is_empty() {
            return Err(ConsoleError::Config("firestore.projectId must not be empty".to_string()));
        }
        if self.poll_interval_ms < 100 {
            return Err(ConsoleError::Config(format!(
                "firestore.pollIntervalMs too small: {}",
                self.poll_interval_ms
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = ConsoleConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.alert_duration_ms, 3000);
        assert_eq!(config.collection_name(CollectionKind::Schedules), "Schedules");
    }

    #[test]
    fn test_collection_override_and_firestore_defaults() {
        let raw = r#"{
            "alertDurationMs": 5000,
            "collections": { "Announcements": "PublicAnnouncements" },
            "firestore": { "projectId": "garbage-tracker", "apiKey": "k" }
        }"#;
        let config = ConsoleConfig::from_json_str(raw).expect("parse");

        assert_eq!(config.alert_duration_ms, 5000);
        assert_eq!(config.collection_name(CollectionKind::Announcements), "PublicAnnouncements");
        assert_eq!(config.collection_name(CollectionKind::Notifications), "Notifications");
        let firestore = config.firestore.expect("firestore section");
        assert_eq!(firestore.database, "(default)");
        assert_eq!(firestore.poll_interval_ms, 2000);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(ConsoleConfig::from_json_str(r#"{"tempIdPrefix": ""}"#).is_err());
        assert!(ConsoleConfig::from_json_str(r#"{"firestore": {"projectId": " "}}"#).is_err());
        assert!(ConsoleConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"alertDurationMs": 1500}}"#).expect("write");

        let config = ConsoleConfig::load(file.path()).expect("load");
        assert_eq!(config.alert_duration_ms, 1500);
        assert_eq!(config.temp_id_prefix, "pending-");

        let missing = ConsoleConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConsoleError::Config(_))));
    }
}
