//! Record Trait
//!
//! Typed view over a panel's free-form payload.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::collection::CollectionKind;
use super::list_item::{ListItem, Payload};
use crate::error::{ConsoleError, ConsoleResult};

/// A domain record stored in one remote collection
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Collection this record lives in
    const KIND: CollectionKind;

    /// Business checks run before any optimistic apply
    fn validate(&self) -> ConsoleResult<()> {
        Ok(())
    }

    fn to_payload(&self) -> ConsoleResult<Payload> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(ConsoleError::invalid(format!(
                "{} does not serialize to a map",
                Self::KIND.label()
            ))),
            Err(e) => Err(ConsoleError::invalid(e.to_string())),
        }
    }

    fn from_payload(payload: &Payload) -> ConsoleResult<Self> {
        serde_json::from_value(Value::Object(payload.clone()))
            .map_err(|e| ConsoleError::invalid(format!("bad {}: {}", Self::KIND.label(), e)))
    }

    fn from_item(item: &ListItem) -> ConsoleResult<Self> {
        Self::from_payload(&item.payload)
    }
}
