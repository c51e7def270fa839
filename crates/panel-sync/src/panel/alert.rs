//! Alert Queue
//!
//! Single-slot transient notification owned by the application shell.
//! The most recent alert wins; each `show` restarts the auto-dismiss timer.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::future::AbortHandle;
use serde::{Deserialize, Serialize};

use super::listeners::Listeners;
use crate::runtime::{spawn_abortable, SharedRuntime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    #[serde(rename = "durationMs")]
    pub duration_ms: u32,
    pub visible: bool,
}

impl Alert {
    pub fn new(kind: AlertKind, message: impl Into<String>, duration_ms: u32) -> Self {
        Self {
            kind,
            message: message.into(),
            duration_ms,
            visible: true,
        }
    }

    pub fn success(message: impl Into<String>, duration_ms: u32) -> Self {
        Self::new(AlertKind::Success, message, duration_ms)
    }

    pub fn error(message: impl Into<String>, duration_ms: u32) -> Self {
        Self::new(AlertKind::Error, message, duration_ms)
    }

    pub fn info(message: impl Into<String>, duration_ms: u32) -> Self {
        Self::new(AlertKind::Info, message, duration_ms)
    }
}

#[derive(Default)]
struct AlertSlot {
    alert: Option<Alert>,
    timer: Option<AbortHandle>,
}

struct AlertShared {
    slot: RefCell<AlertSlot>,
    listeners: Listeners<Option<Alert>>,
}

/// Process-wide alert slot. Cloning shares the same slot.
#[derive(Clone)]
pub struct AlertQueue {
    shared: Rc<AlertShared>,
    runtime: SharedRuntime,
    default_duration_ms: u32,
}

impl AlertQueue {
    pub fn new(runtime: SharedRuntime, default_duration_ms: u32) -> Self {
        Self {
            shared: Rc::new(AlertShared {
                slot: RefCell::new(AlertSlot::default()),
                listeners: Listeners::default(),
            }),
            runtime,
            default_duration_ms,
        }
    }

    pub fn default_duration_ms(&self) -> u32 {
        self.default_duration_ms
    }

    /// Replace the active alert and (re)start its dismiss timer
    pub fn show(&self, mut alert: Alert) {
        alert.visible = true;
        let duration_ms = alert.duration_ms;
        tracing::debug!(kind = ?alert.kind, message = %alert.message, "alert shown");
        {
            let mut slot = self.shared.slot.borrow_mut();
            if let Some(timer) = slot.timer.take() {
                timer.abort();
            }
            slot.alert = Some(alert.clone());
        }

        if duration_ms > 0 {
            let weak = Rc::downgrade(&self.shared);
            let sleep = self.runtime.sleep(Duration::from_millis(u64::from(duration_ms)));
            let timer = spawn_abortable(self.runtime.as_ref(), async move {
                sleep.await;
                if let Some(shared) = weak.upgrade() {
                    shared.slot.borrow_mut().timer = None;
                    AlertQueue::clear(&shared);
                }
            });
            self.shared.slot.borrow_mut().timer = Some(timer);
        }

        self.shared.listeners.notify(&Some(alert));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(Alert::success(message, self.default_duration_ms));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(Alert::error(message, self.default_duration_ms));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.show(Alert::info(message, self.default_duration_ms));
    }

    /// Hide immediately and cancel the pending timer
    pub fn hide(&self) {
        if let Some(timer) = self.shared.slot.borrow_mut().timer.take() {
            timer.abort();
        }
        AlertQueue::clear(&self.shared);
    }

    /// The visible alert, if any
    pub fn current(&self) -> Option<Alert> {
        self.shared
            .slot
            .borrow()
            .alert
            .clone()
            .filter(|alert| alert.visible)
    }

    pub fn on_change(&self, listener: impl Fn(&Option<Alert>) + 'static) {
        self.shared.listeners.add(listener);
    }

    fn clear(shared: &AlertShared) {
        let was_visible = {
            let mut slot = shared.slot.borrow_mut();
            match slot.alert.as_mut() {
                Some(alert) if alert.visible => {
                    alert.visible = false;
                    true
                }
                _ => false,
            }
        };
        if was_visible {
            shared.listeners.notify(&None);
        }
    }
}
