//! Application Context
//!
//! Shared state provided via Leptos Context API: the console handle, the
//! mounted panels and the view-level selection signals.

use std::collections::BTreeMap;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use panel_sync::{
    CollectionKind, Console, ConsoleError, ConsoleResult, GateState, InFlight, Panel, Record,
    RemoteStore,
};

use crate::store::{store_set_alert, store_set_items, ConsoleStore};

pub type SharedConsole = Rc<Console<dyn RemoteStore>>;
type Panels = BTreeMap<CollectionKind, Panel<dyn RemoteStore>>;

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    console: StoredValue<SharedConsole, LocalStorage>,
    panels: StoredValue<Panels, LocalStorage>,
    store: ConsoleStore,
    /// Panel currently shown - read
    pub active_kind: ReadSignal<CollectionKind>,
    /// Panel currently shown - write
    set_active_kind: WriteSignal<CollectionKind>,
    /// Item whose delete confirmation is open - read
    pub pending_delete: ReadSignal<Option<String>>,
    /// Item whose delete confirmation is open - write
    set_pending_delete: WriteSignal<Option<String>>,
}

impl AppContext {
    pub fn new(console: SharedConsole, store: ConsoleStore) -> Self {
        let alert_store = store;
        console
            .alerts()
            .on_change(move |alert| store_set_alert(&alert_store, alert.clone()));

        let (active_kind, set_active_kind) = signal(CollectionKind::Announcements);
        let (pending_delete, set_pending_delete) = signal::<Option<String>>(None);
        Self {
            console: StoredValue::new_local(console),
            panels: StoredValue::new_local(BTreeMap::new()),
            store,
            active_kind,
            set_active_kind,
            pending_delete,
            set_pending_delete,
        }
    }

    pub fn show(&self, kind: CollectionKind) {
        self.set_pending_delete.set(None);
        self.set_active_kind.set(kind);
    }

    /// Mount `kind` and unmount every other panel
    pub fn mount_only(&self, kind: CollectionKind) {
        let store = self.store;
        let set_pending_delete = self.set_pending_delete;
        let console = self.console.get_value();
        self.panels.update_value(|panels| {
            let stale: Vec<CollectionKind> = panels.keys().copied().filter(|k| *k != kind).collect();
            for other in stale {
                if let Some(panel) = panels.remove(&other) {
                    panel.close();
                }
                store_set_items(&store, other, Vec::new());
            }
            if !panels.contains_key(&kind) {
                let panel = console.open_panel(kind);
                panel.on_change(move |items| store_set_items(&store, kind, items.to_vec()));
                panel.on_confirmation_change(move |state| {
                    set_pending_delete.set(match state {
                        GateState::Pending(request) => Some(request.target_id.clone()),
                        GateState::Idle => None,
                    })
                });
                store_set_items(&store, kind, panel.list());
                panels.insert(kind, panel);
            }
        });
    }

    /// Unmount everything (shell teardown)
    pub fn close_all(&self) {
        self.panels.update_value(|panels| {
            for (kind, panel) in std::mem::take(panels) {
                tracing::debug!(kind = ?kind, "closing panel");
                panel.close();
            }
        });
    }

    pub fn is_temporary(&self, kind: CollectionKind, id: &str) -> bool {
        self.panels
            .with_value(|panels| panels.get(&kind).map(|p| p.is_temporary(id)))
            .unwrap_or(false)
    }

    pub fn create_record<T: Record>(&self, record: &T) -> ConsoleResult<()> {
        self.submit(T::KIND, |panel| panel.create_record(record))
    }

    pub fn update_record<T: Record>(&self, id: &str, record: &T) -> ConsoleResult<()> {
        self.submit(T::KIND, |panel| panel.update_record(id, record))
    }

    pub fn request_delete(&self, kind: CollectionKind, id: &str) -> ConsoleResult<()> {
        self.with_panel(kind, |panel| panel.request_delete(id))
    }

    pub fn confirm_delete(&self, kind: CollectionKind) -> ConsoleResult<()> {
        let write = self.with_panel(kind, |panel| panel.confirm_delete())?;
        if let Some(write) = write {
            drive(kind, write);
        }
        Ok(())
    }

    pub fn cancel_delete(&self, kind: CollectionKind) {
        let _ = self.with_panel(kind, |panel| {
            panel.cancel_delete();
            Ok(())
        });
    }

    pub fn dismiss_alert(&self) {
        self.console.with_value(|console| console.dismiss_alert());
    }

    fn submit(
        &self,
        kind: CollectionKind,
        start: impl FnOnce(&Panel<dyn RemoteStore>) -> ConsoleResult<InFlight>,
    ) -> ConsoleResult<()> {
        let write = self.with_panel(kind, start)?;
        drive(kind, write);
        Ok(())
    }

    fn with_panel<T>(
        &self,
        kind: CollectionKind,
        f: impl FnOnce(&Panel<dyn RemoteStore>) -> ConsoleResult<T>,
    ) -> ConsoleResult<T> {
        self.panels.with_value(|panels| match panels.get(&kind) {
            Some(panel) => f(panel),
            None => Err(ConsoleError::invalid(format!(
                "{} panel is not open",
                kind.label()
            ))),
        })
    }
}

/// Await a write in the background; outcome alerts come from the core
fn drive(kind: CollectionKind, write: InFlight) {
    spawn_local(async move {
        match write.await {
            Ok(outcome) => tracing::debug!(kind = ?kind, id = outcome.id(), "write settled"),
            Err(e) => tracing::warn!(kind = ?kind, error = %e, "write failed"),
        }
    });
}
