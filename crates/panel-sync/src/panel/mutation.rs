//! Mutation Coordinator
//!
//! Create/update/delete for one panel. Each call validates synchronously,
//! applies its optimistic change right away and returns the remote write as
//! a future. Resolution commits or rolls back the change and reports the
//! outcome through the alert queue. If the panel was torn down meanwhile,
//! the store side of the resolution is skipped.

use std::rc::Rc;

use chrono::{SecondsFormat, Utc};
use futures::future::LocalBoxFuture;
use serde_json::Value;

use super::alert::AlertQueue;
use super::confirm::{SharedGate, WeakGate};
use super::list_store::{PendingMutation, SharedListStore, WeakListStore};
use crate::domain::{CollectionKind, Operation, Payload};
use crate::error::{ConsoleError, ConsoleResult};
use crate::remote::RemoteStore;

/// A remote write in flight; the shell spawns it on the event loop
pub type InFlight = LocalBoxFuture<'static, ConsoleResult<MutationOutcome>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Created { id: String },
    Updated { id: String },
    Deleted { id: String },
}

impl MutationOutcome {
    pub fn id(&self) -> &str {
        match self {
            MutationOutcome::Created { id }
            | MutationOutcome::Updated { id }
            | MutationOutcome::Deleted { id } => id,
        }
    }
}

pub struct MutationCoordinator<R: RemoteStore + ?Sized> {
    kind: CollectionKind,
    collection_name: String,
    remote: Rc<R>,
    store: WeakListStore,
    alerts: AlertQueue,
    gate: Option<WeakGate>,
}

impl<R: RemoteStore + ?Sized + 'static> MutationCoordinator<R> {
    pub fn new(
        kind: CollectionKind,
        collection_name: impl Into<String>,
        remote: Rc<R>,
        store: &SharedListStore,
        alerts: AlertQueue,
    ) -> Self {
        Self {
            kind,
            collection_name: collection_name.into(),
            remote,
            store: store.downgrade(),
            alerts,
            gate: None,
        }
    }

    /// Close this confirmation dialog when a delete of its target succeeds
    pub fn with_gate(mut self, gate: &SharedGate) -> Self {
        self.gate = Some(gate.downgrade());
        self
    }

    pub fn create(&self, mut payload: Payload) -> ConsoleResult<InFlight> {
        self.ensure_allowed(Operation::Create)?;
        if let Some(field) = self.kind.created_at_field() {
            if !payload.contains_key(field) {
                let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
                payload.insert(field.to_string(), Value::String(now));
            }
        }
        Ok(self.submit(PendingMutation::create(payload)))
    }

    pub fn update(&self, id: &str, payload: Payload) -> ConsoleResult<InFlight> {
        self.ensure_allowed(Operation::Update)?;
        self.ensure_target(id)?;
        if payload.is_empty() {
            return Err(ConsoleError::invalid(format!("nothing to update on {}", id)));
        }
        Ok(self.submit(PendingMutation::update(id, payload)))
    }

    pub fn delete(&self, id: &str) -> ConsoleResult<InFlight> {
        self.ensure_allowed(Operation::Delete)?;
        self.ensure_target(id)?;
        Ok(self.submit(PendingMutation::delete(id)))
    }

    fn ensure_allowed(&self, operation: Operation) -> ConsoleResult<()> {
        if self.kind.allows(operation) {
            Ok(())
        } else {
            Err(ConsoleError::invalid(format!(
                "{} does not support {}",
                self.collection_name,
                operation.as_str()
            )))
        }
    }

    fn ensure_target(&self, id: &str) -> ConsoleResult<()> {
        if id.trim().is_empty() {
            return Err(ConsoleError::invalid(format!("{} id is required", self.kind.label())));
        }
        let temporary = self
            .store
            .upgrade()
            .map(|store| store.read(|s| s.is_temporary(id)))
            .unwrap_or(false);
        if temporary {
            return Err(ConsoleError::invalid(format!("{} is still being created", id)));
        }
        Ok(())
    }

    fn submit(&self, mutation: PendingMutation) -> InFlight {
        let operation = mutation.operation;
        let store = self.store.clone();
        let prior = store
            .upgrade()
            .map(|s| s.modify(|s| s.apply_optimistic(mutation.clone())));
        let target_id = prior
            .as_ref()
            .map(|p| p.target_id().to_string())
            .or_else(|| mutation.target_id.clone())
            .unwrap_or_default();

        let remote = self.remote.clone();
        let collection = self.collection_name.clone();
        let kind = self.kind;
        let alerts = self.alerts.clone();
        let gate = self.gate.clone();
        let payload = mutation.submitted_payload;

        tracing::debug!(
            collection = %collection,
            operation = operation.as_str(),
            target = %target_id,
            "optimistic change applied"
        );

        Box::pin(async move {
            let result = match operation {
                Operation::Create => remote
                    .create(&collection, payload)
                    .await
                    .map(|id| MutationOutcome::Created { id }),
                Operation::Update => remote
                    .update(&collection, &target_id, payload)
                    .await
                    .map(|_| MutationOutcome::Updated { id: target_id.clone() }),
                Operation::Delete => remote
                    .delete(&collection, &target_id)
                    .await
                    .map(|_| MutationOutcome::Deleted { id: target_id.clone() }),
            };

            match result {
                Ok(outcome) => {
                    match (prior, store.upgrade()) {
                        (Some(prior), Some(store)) => {
                            let assigned = match &outcome {
                                MutationOutcome::Created { id } => Some(id.as_str()),
                                _ => None,
                            };
                            store.modify(|s| s.commit(&prior, assigned));
                        }
                        _ => tracing::debug!(collection = %collection, "panel closed, commit skipped"),
                    }
                    if operation == Operation::Delete {
                        if let Some(gate) = gate.and_then(|g| g.upgrade()) {
                            gate.modify(|g| g.close_if_targets(&target_id));
                        }
                    }
                    tracing::info!(
                        collection = %collection,
                        operation = operation.as_str(),
                        id = outcome.id(),
                        "mutation committed"
                    );
                    alerts.success(kind.success_message(operation));
                    Ok(outcome)
                }
                Err(err) => {
                    match (prior, store.upgrade()) {
                        (Some(prior), Some(store)) => {
                            store.modify(|s| s.rollback(prior));
                        }
                        _ => tracing::debug!(collection = %collection, "panel closed, rollback skipped"),
                    }
                    tracing::warn!(
                        collection = %collection,
                        operation = operation.as_str(),
                        target = %target_id,
                        error = %err,
                        "mutation failed, rolled back"
                    );
                    alerts.error(kind.failure_message(operation));
                    Err(ConsoleError::RemoteWriteFailure(err))
                }
            }
        })
    }
}
