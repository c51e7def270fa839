//! Panel Layer
//!
//! Everything one list-backed console panel needs: its live subscription,
//! local store, mutation coordinator and delete confirmation, plus the
//! shell-wide alert queue they report through.

mod alert;
mod confirm;
mod list_store;
mod listeners;
mod mutation;
mod subscription;

#[cfg(test)]
mod tests;

use std::rc::Rc;

pub use alert::{Alert, AlertKind, AlertQueue};
pub use confirm::{ConfirmationGate, ConfirmationRequest, GateState, SharedGate, WeakGate};
pub use list_store::{LocalListStore, MutationId, PendingMutation, PriorState, SharedListStore, WeakListStore};
pub use mutation::{InFlight, MutationCoordinator, MutationOutcome};
pub use subscription::{Subscription, SubscriptionHandle, SubscriptionManager};

use crate::domain::{CollectionKind, ListItem, Operation, Payload, Record};
use crate::error::{ConsoleError, ConsoleResult};
use crate::remote::RemoteStore;
use crate::runtime::SharedRuntime;

/// One open console panel and the surface the view layer may call
pub struct Panel<R: RemoteStore + ?Sized + 'static> {
    kind: CollectionKind,
    collection_name: String,
    store: SharedListStore,
    subscriptions: SubscriptionManager<R>,
    subscription: Option<SubscriptionHandle>,
    coordinator: MutationCoordinator<R>,
    gate: SharedGate,
    alerts: AlertQueue,
}

impl<R: RemoteStore + ?Sized + 'static> Panel<R> {
    /// Mount a panel: create its store and subscribe to `collection_name`
    pub fn open(
        kind: CollectionKind,
        collection_name: impl Into<String>,
        temp_id_prefix: &str,
        remote: Rc<R>,
        runtime: SharedRuntime,
        alerts: AlertQueue,
    ) -> Self {
        let collection_name = collection_name.into();
        let store = SharedListStore::new(LocalListStore::new(temp_id_prefix));
        let gate = SharedGate::default();
        let coordinator =
            MutationCoordinator::new(kind, collection_name.clone(), remote.clone(), &store, alerts.clone())
                .with_gate(&gate);
        let subscriptions = SubscriptionManager::new(remote, runtime, alerts.clone());
        let subscription = Some(subscriptions.open(&collection_name, &store));

        tracing::info!(collection = %collection_name, "panel opened");
        Self {
            kind,
            collection_name,
            store,
            subscriptions,
            subscription,
            coordinator,
            gate,
            alerts,
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// Items in display order
    pub fn list(&self) -> Vec<ListItem> {
        self.store.items()
    }

    pub fn get(&self, id: &str) -> Option<ListItem> {
        self.store.read(|s| s.get(id).cloned())
    }

    pub fn is_temporary(&self, id: &str) -> bool {
        self.store.read(|s| s.is_temporary(id))
    }

    pub fn create(&self, payload: Payload) -> ConsoleResult<InFlight> {
        self.coordinator.create(payload)
    }

    pub fn create_record<T: Record>(&self, record: &T) -> ConsoleResult<InFlight> {
        self.ensure_record_kind::<T>()?;
        record.validate()?;
        self.create(record.to_payload()?)
    }

    pub fn update(&self, id: &str, payload: Payload) -> ConsoleResult<InFlight> {
        self.coordinator.update(id, payload)
    }

    pub fn update_record<T: Record>(&self, id: &str, record: &T) -> ConsoleResult<InFlight> {
        self.ensure_record_kind::<T>()?;
        record.validate()?;
        self.update(id, record.to_payload()?)
    }

    /// Open the delete confirmation for `id`; nothing is written yet
    pub fn request_delete(&self, id: &str) -> ConsoleResult<()> {
        if !self.kind.allows(Operation::Delete) {
            return Err(ConsoleError::invalid(format!(
                "{} does not support delete",
                self.collection_name
            )));
        }
        if id.trim().is_empty() {
            return Err(ConsoleError::invalid(format!("{} id is required", self.kind.label())));
        }
        let replaced = self.gate.modify(|gate| gate.request(ConfirmationRequest::delete(id)));
        if let Some(previous) = replaced {
            tracing::debug!(previous = %previous.target_id, next = %id, "confirmation replaced");
        }
        Ok(())
    }

    /// The open confirmation, if any
    pub fn pending_delete(&self) -> Option<ConfirmationRequest> {
        self.gate.read(|gate| gate.pending().cloned())
    }

    /// Execute the pending delete. `Ok(None)` when no confirmation is open.
    pub fn confirm_delete(&self) -> ConsoleResult<Option<InFlight>> {
        let request = self.gate.modify(|gate| gate.confirm());
        match request {
            Some(request) => self.coordinator.delete(&request.target_id).map(Some),
            None => Ok(None),
        }
    }

    pub fn cancel_delete(&self) {
        self.gate.modify(|gate| gate.cancel());
    }

    /// Called whenever the delete confirmation opens or closes
    pub fn on_confirmation_change(&self, listener: impl Fn(&GateState) + 'static) {
        self.gate.on_change(listener);
    }

    pub fn current_alert(&self) -> Option<Alert> {
        self.alerts.current()
    }

    pub fn dismiss_alert(&self) {
        self.alerts.hide();
    }

    pub fn subscription_status(&self) -> Option<Subscription> {
        self.subscription.as_ref().map(SubscriptionHandle::status)
    }

    /// Called with the displayed list after every change
    pub fn on_change(&self, listener: impl Fn(&[ListItem]) + 'static) {
        self.store.on_change(listener);
    }

    /// Unmount: stop deliveries and clear the store
    pub fn close(mut self) {
        if let Some(handle) = self.subscription.take() {
            self.subscriptions.close(handle);
        }
        self.store.modify(|s| s.clear());
        tracing::info!(collection = %self.collection_name, "panel closed");
    }

    fn ensure_record_kind<T: Record>(&self) -> ConsoleResult<()> {
        if T::KIND == self.kind {
            Ok(())
        } else {
            Err(ConsoleError::invalid(format!(
                "{} record does not belong in {}",
                T::KIND.label(),
                self.collection_name
            )))
        }
    }
}
