//! Subscription Manager
//!
//! Owns the live query behind a panel. Every delivered snapshot replaces the
//! bound store's base; a broken delivery is recorded and surfaced once until
//! the transport recovers. Dropping the handle unregisters the query and no
//! callback runs after that.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use futures::future::AbortHandle;
use futures::StreamExt;

use super::alert::AlertQueue;
use super::list_store::SharedListStore;
use crate::domain::ListItem;
use crate::error::{ConsoleError, RemoteError};
use crate::remote::RemoteStore;
use crate::runtime::{spawn_abortable, SharedRuntime};

/// Live query state for one panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub collection_name: String,
    pub active: bool,
    pub last_error: Option<RemoteError>,
}

impl Subscription {
    pub fn error(&self) -> Option<ConsoleError> {
        self.last_error.clone().map(ConsoleError::SubscriptionFailure)
    }
}

/// Scoped ownership of a live query; dropping it closes the query
pub struct SubscriptionHandle {
    status: Rc<RefCell<Subscription>>,
    abort: AbortHandle,
}

impl SubscriptionHandle {
    pub fn status(&self) -> Subscription {
        self.status.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.status.borrow().active
    }

    pub fn close(self) {}
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.abort.abort();
        let mut status = self.status.borrow_mut();
        if status.active {
            status.active = false;
            tracing::debug!(collection = %status.collection_name, "subscription closed");
        }
    }
}

fn connection_lost_message(collection_name: &str) -> String {
    format!("Connection to {} lost. Retrying...", collection_name)
}

pub struct SubscriptionManager<R: RemoteStore + ?Sized> {
    remote: Rc<R>,
    runtime: SharedRuntime,
    alerts: AlertQueue,
}

impl<R: RemoteStore + ?Sized + 'static> SubscriptionManager<R> {
    pub fn new(remote: Rc<R>, runtime: SharedRuntime, alerts: AlertQueue) -> Self {
        Self {
            remote,
            runtime,
            alerts,
        }
    }

    /// Start delivering `collection_name` snapshots into `target`
    pub fn open(&self, collection_name: &str, target: &SharedListStore) -> SubscriptionHandle {
        let status = Rc::new(RefCell::new(Subscription {
            collection_name: collection_name.to_string(),
            active: true,
            last_error: None,
        }));

        let mut live = self.remote.watch(collection_name);
        let store = target.downgrade();
        let task_status = status.clone();
        let alerts = self.alerts.clone();
        let collection = collection_name.to_string();

        let abort = spawn_abortable(self.runtime.as_ref(), async move {
            while let Some(delivery) = live.next().await {
                let Some(store) = store.upgrade() else {
                    break;
                };
                match delivery {
                    Ok(snapshot) => {
                        if let Some(err) = task_status.borrow_mut().last_error.take() {
                            tracing::info!(collection = %collection, error = %err, "subscription recovered");
                        }
                        let received_at = Utc::now();
                        let items: Vec<ListItem> = snapshot
                            .into_iter()
                            .map(|doc| ListItem::from_remote(doc, received_at))
                            .collect();
                        store.modify(|s| s.replace_all(items));
                    }
                    Err(err) => {
                        let first = {
                            let mut status = task_status.borrow_mut();
                            let first = status.last_error.is_none();
                            status.last_error = Some(err.clone());
                            first
                        };
                        tracing::warn!(collection = %collection, error = %err, "snapshot delivery failed");
                        if first {
                            alerts.info(connection_lost_message(&collection));
                        }
                    }
                }
            }
            task_status.borrow_mut().active = false;
            tracing::debug!(collection = %collection, "live query ended");
        });

        tracing::debug!(collection = %collection_name, "subscription opened");
        SubscriptionHandle { status, abort }
    }

    pub fn close(&self, handle: SubscriptionHandle) {
        handle.close();
    }
}
