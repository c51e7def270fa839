//! Confirmation Gate
//!
//! Two-step confirmation in front of destructive mutations. One request may
//! be open at a time; a new request replaces the open one.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::listeners::Listeners;
use crate::domain::Operation;

/// An open confirmation dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub target_id: String,
    pub operation: Operation,
}

impl ConfirmationRequest {
    pub fn delete(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            operation: Operation::Delete,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateState {
    #[default]
    Idle,
    Pending(ConfirmationRequest),
}

#[derive(Debug, Default)]
pub struct ConfirmationGate {
    state: GateState,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GateState::Idle
    }

    pub fn pending(&self) -> Option<&ConfirmationRequest> {
        match &self.state {
            GateState::Pending(request) => Some(request),
            GateState::Idle => None,
        }
    }

    /// Open a request; returns the one it replaced (last caller wins)
    pub fn request(&mut self, request: ConfirmationRequest) -> Option<ConfirmationRequest> {
        match std::mem::replace(&mut self.state, GateState::Pending(request)) {
            GateState::Pending(previous) => Some(previous),
            GateState::Idle => None,
        }
    }

    /// Close the dialog and hand back the request to execute
    pub fn confirm(&mut self) -> Option<ConfirmationRequest> {
        self.take()
    }

    /// Close the dialog without side effects
    pub fn cancel(&mut self) -> Option<ConfirmationRequest> {
        self.take()
    }

    /// Close the dialog if it is asking about `target_id`
    pub fn close_if_targets(&mut self, target_id: &str) -> bool {
        let targets = self.pending().map(|r| r.target_id == target_id).unwrap_or(false);
        if targets {
            self.state = GateState::Idle;
        }
        targets
    }

    fn take(&mut self) -> Option<ConfirmationRequest> {
        match std::mem::take(&mut self.state) {
            GateState::Pending(request) => Some(request),
            GateState::Idle => None,
        }
    }
}

struct GateCell {
    gate: RefCell<ConfirmationGate>,
    listeners: Listeners<GateState>,
}

/// Shared handle to a panel's gate; listeners hear every open and close
#[derive(Clone)]
pub struct SharedGate {
    cell: Rc<GateCell>,
}

impl Default for SharedGate {
    fn default() -> Self {
        Self::new(ConfirmationGate::new())
    }
}

impl SharedGate {
    pub fn new(gate: ConfirmationGate) -> Self {
        Self {
            cell: Rc::new(GateCell {
                gate: RefCell::new(gate),
                listeners: Listeners::default(),
            }),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&ConfirmationGate) -> R) -> R {
        f(&self.cell.gate.borrow())
    }

    /// Run `f` on the gate, then notify listeners if its state changed
    pub fn modify<R>(&self, f: impl FnOnce(&mut ConfirmationGate) -> R) -> R {
        let (result, changed) = {
            let mut gate = self.cell.gate.borrow_mut();
            let before = gate.state().clone();
            let result = f(&mut gate);
            let after = gate.state().clone();
            (result, (before != after).then_some(after))
        };
        if let Some(state) = changed {
            self.cell.listeners.notify(&state);
        }
        result
    }

    pub fn on_change(&self, listener: impl Fn(&GateState) + 'static) {
        self.cell.listeners.add(listener);
    }

    pub fn downgrade(&self) -> WeakGate {
        WeakGate(Rc::downgrade(&self.cell))
    }
}

#[derive(Clone)]
pub struct WeakGate(Weak<GateCell>);

impl WeakGate {
    pub fn upgrade(&self) -> Option<SharedGate> {
        self.0.upgrade().map(|cell| SharedGate { cell })
    }
}
