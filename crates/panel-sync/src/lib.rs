//! Panel Sync
//!
//! Reconciliation and mutation core for the waste collection console.
//!
//! Layered the same way for every list-backed panel:
//! - domain: list items, collection kinds and typed records
//! - remote: the live remote store seam (in-memory and Firestore)
//! - panel: alert queue, confirmation gate, local list store,
//!   subscription manager and mutation coordinator
//! - console: the application shell handle that opens panels

mod config;
mod console;
mod error;
mod runtime;

pub mod domain;
pub mod panel;
pub mod remote;

pub use config::{ConsoleConfig, FirestoreConfig};
pub use console::Console;
pub use error::{ConsoleError, ConsoleResult, RemoteError};
pub use runtime::{spawn_abortable, Runtime, SharedRuntime};

#[cfg(feature = "tokio-runtime")]
pub use runtime::TokioRuntime;

pub use domain::{
    Announcement, CollectionKind, Day, Feedback, ListItem, Notification, Operation, Payload,
    Record, Schedule,
};
pub use panel::{
    Alert, AlertKind, AlertQueue, ConfirmationGate, ConfirmationRequest, GateState, InFlight,
    LocalListStore, MutationCoordinator, MutationOutcome, Panel, PendingMutation, PriorState,
    SharedGate, SharedListStore, Subscription, SubscriptionHandle, SubscriptionManager,
};
pub use remote::{FirestoreRemote, LiveQuery, MemoryRemote, RemoteDocument, RemoteStore, Snapshot};
