//! In-Memory Remote Store
//!
//! Process-local live store: every committed change re-delivers the full
//! collection to every watcher. Backs offline demos and tests, and can inject
//! write failures, broken deliveries and late acknowledgements.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use futures::channel::{mpsc, oneshot};
use futures::StreamExt;

use super::traits::{LiveQuery, RemoteDocument, RemoteStore, Snapshot};
use crate::domain::Payload;
use crate::error::RemoteError;

type Watcher = mpsc::UnboundedSender<Result<Snapshot, RemoteError>>;

#[derive(Default)]
struct MemoryState {
    collections: HashMap<String, Vec<RemoteDocument>>,
    watchers: HashMap<String, Vec<Watcher>>,
    next_id: u64,
    /// Consumed one per write, front first
    failures: VecDeque<RemoteError>,
    /// `Some` while acknowledgements are held back
    held_acks: Option<Vec<oneshot::Sender<()>>>,
    writes: usize,
}

impl MemoryState {
    fn snapshot(&self, collection: &str) -> Snapshot {
        self.collections.get(collection).cloned().unwrap_or_default()
    }

    fn broadcast(&mut self, collection: &str) {
        let snapshot = self.snapshot(collection);
        if let Some(watchers) = self.watchers.get_mut(collection) {
            watchers.retain(|tx| tx.unbounded_send(Ok(snapshot.clone())).is_ok());
        }
    }
}

#[derive(Default)]
pub struct MemoryRemote {
    state: RefCell<MemoryState>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a collection's content (as another client would) and notify watchers
    pub fn seed(&self, collection: &str, docs: Vec<RemoteDocument>) {
        let mut state = self.state.borrow_mut();
        state.collections.insert(collection.to_string(), docs);
        state.broadcast(collection);
    }

    /// Insert or replace one document out of band
    pub fn put(&self, collection: &str, id: &str, fields: Payload) {
        let mut state = self.state.borrow_mut();
        let docs = state.collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(doc) => doc.fields = fields,
            None => docs.push(RemoteDocument::new(id, fields)),
        }
        state.broadcast(collection);
    }

    /// Remove one document out of band
    pub fn remove(&self, collection: &str, id: &str) -> bool {
        let mut state = self.state.borrow_mut();
        let removed = match state.collections.get_mut(collection) {
            Some(docs) => {
                let before = docs.len();
                docs.retain(|d| d.id != id);
                docs.len() != before
            }
            None => false,
        };
        if removed {
            state.broadcast(collection);
        }
        removed
    }

    pub fn documents(&self, collection: &str) -> Snapshot {
        self.state.borrow().snapshot(collection)
    }

    /// Make the next write fail with `err` (queued, one per write)
    pub fn fail_next_write(&self, err: RemoteError) {
        self.state.borrow_mut().failures.push_back(err);
    }

    /// Deliver a broken-connection error to every watcher of `collection`
    pub fn interrupt(&self, collection: &str, err: RemoteError) {
        let mut state = self.state.borrow_mut();
        if let Some(watchers) = state.watchers.get_mut(collection) {
            watchers.retain(|tx| tx.unbounded_send(Err(err.clone())).is_ok());
        }
    }

    /// Re-deliver the current content, as a reconnected transport would
    pub fn resync(&self, collection: &str) {
        self.state.borrow_mut().broadcast(collection);
    }

    /// Commit writes immediately but hold their acknowledgement until
    /// [`MemoryRemote::release_acks`], so snapshots overtake write results
    pub fn hold_acks(&self) {
        let mut state = self.state.borrow_mut();
        if state.held_acks.is_none() {
            state.held_acks = Some(Vec::new());
        }
    }

    pub fn release_acks(&self) {
        let held = self.state.borrow_mut().held_acks.take();
        for tx in held.into_iter().flatten() {
            let _ = tx.send(());
        }
    }

    /// Live watchers still attached to `collection`
    pub fn watcher_count(&self, collection: &str) -> usize {
        let mut state = self.state.borrow_mut();
        match state.watchers.get_mut(collection) {
            Some(watchers) => {
                watchers.retain(|tx| !tx.is_closed());
                watchers.len()
            }
            None => 0,
        }
    }

    /// Write calls received, failed ones included
    pub fn write_count(&self) -> usize {
        self.state.borrow().writes
    }

    fn begin_write(&self) -> Option<RemoteError> {
        let mut state = self.state.borrow_mut();
        state.writes += 1;
        state.failures.pop_front()
    }

    async fn acknowledge(&self) {
        let pending = {
            let mut state = self.state.borrow_mut();
            state.held_acks.as_mut().map(|held| {
                let (tx, rx) = oneshot::channel();
                held.push(tx);
                rx
            })
        };
        if let Some(rx) = pending {
            let _ = rx.await;
        }
    }
}

#[async_trait(?Send)]
impl RemoteStore for MemoryRemote {
    fn watch(&self, collection: &str) -> LiveQuery {
        let (tx, rx) = mpsc::unbounded();
        let mut state = self.state.borrow_mut();
        let _ = tx.unbounded_send(Ok(state.snapshot(collection)));
        state.watchers.entry(collection.to_string()).or_default().push(tx);
        rx.boxed_local()
    }

    async fn create(&self, collection: &str, payload: Payload) -> Result<String, RemoteError> {
        if let Some(err) = self.begin_write() {
            self.acknowledge().await;
            return Err(err);
        }
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = format!("{}-{}", collection.to_lowercase(), state.next_id);
            state
                .collections
                .entry(collection.to_string())
                .or_default()
                .push(RemoteDocument::new(id.clone(), payload));
            state.broadcast(collection);
            id
        };
        self.acknowledge().await;
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, payload: Payload) -> Result<(), RemoteError> {
        if let Some(err) = self.begin_write() {
            self.acknowledge().await;
            return Err(err);
        }
        {
            let mut state = self.state.borrow_mut();
            let doc = state
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or_else(|| RemoteError::NotFound(format!("{}/{}", collection, id)))?;
            for (key, value) in payload {
                doc.fields.insert(key, value);
            }
            state.broadcast(collection);
        }
        self.acknowledge().await;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        if let Some(err) = self.begin_write() {
            self.acknowledge().await;
            return Err(err);
        }
        {
            let mut state = self.state.borrow_mut();
            if let Some(docs) = state.collections.get_mut(collection) {
                docs.retain(|d| d.id != id);
            }
            state.broadcast(collection);
        }
        self.acknowledge().await;
        Ok(())
    }
}
