//! Remote Store - Core Traits
//!
//! A remote store hands out live queries that re-deliver the complete member
//! set of a collection on every change, and accepts point writes.

use async_trait::async_trait;
use futures::stream::LocalBoxStream;
use serde::{Deserialize, Serialize};

use crate::domain::Payload;
use crate::error::RemoteError;

/// One document as delivered by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDocument {
    pub id: String,
    pub fields: Payload,
}

impl RemoteDocument {
    pub fn new(id: impl Into<String>, fields: Payload) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Full, authoritative member set of a collection (never a diff)
pub type Snapshot = Vec<RemoteDocument>;

/// Snapshot deliveries for one collection, in store order.
///
/// An `Err` reports a broken delivery; the stream keeps going and resumes
/// with a fresh snapshot once the transport is healthy again. Dropping the
/// stream unregisters the query.
pub type LiveQuery = LocalBoxStream<'static, Result<Snapshot, RemoteError>>;

/// Live remote collection store
///
/// Single-threaded: futures are not `Send`, matching the console event loop.
#[async_trait(?Send)]
pub trait RemoteStore {
    /// Register a live query against `collection`
    fn watch(&self, collection: &str) -> LiveQuery;

    /// Create a document, returning its store-assigned id
    async fn create(&self, collection: &str, payload: Payload) -> Result<String, RemoteError>;

    /// Merge `payload` into an existing document
    async fn update(&self, collection: &str, id: &str, payload: Payload) -> Result<(), RemoteError>;

    /// Delete a document by id
    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError>;
}
