//! Global Console State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The panel core
//! owns the data; this store only mirrors what it displays.

use leptos::prelude::*;
use panel_sync::{Alert, CollectionKind, ListItem};
use reactive_stores::Store;

/// Displayed state of every panel plus the shell alert
#[derive(Clone, Debug, Default, Store)]
pub struct ConsoleState {
    pub announcements: Vec<ListItem>,
    pub notifications: Vec<ListItem>,
    pub schedules: Vec<ListItem>,
    pub feedbacks: Vec<ListItem>,
    /// Visible alert, if any
    pub alert: Option<Alert>,
}

/// Type alias for the store
pub type ConsoleStore = Store<ConsoleState>;

/// Get the console store from context
pub fn use_console_store() -> ConsoleStore {
    expect_context::<ConsoleStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Mirror a panel's displayed list
pub fn store_set_items(store: &ConsoleStore, kind: CollectionKind, items: Vec<ListItem>) {
    match kind {
        CollectionKind::Announcements => *store.announcements().write() = items,
        CollectionKind::Notifications => *store.notifications().write() = items,
        CollectionKind::Schedules => *store.schedules().write() = items,
        CollectionKind::Feedbacks => *store.feedbacks().write() = items,
    }
}

/// Read a panel's displayed list (tracked)
pub fn store_items(store: &ConsoleStore, kind: CollectionKind) -> Vec<ListItem> {
    match kind {
        CollectionKind::Announcements => store.announcements().get(),
        CollectionKind::Notifications => store.notifications().get(),
        CollectionKind::Schedules => store.schedules().get(),
        CollectionKind::Feedbacks => store.feedbacks().get(),
    }
}

pub fn store_set_alert(store: &ConsoleStore, alert: Option<Alert>) {
    *store.alert().write() = alert;
}
