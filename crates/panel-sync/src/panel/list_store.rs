//! Local List Store
//!
//! Ordered, id-keyed items for one panel. The displayed list is the last
//! authoritative base (snapshots plus committed writes) with every pending
//! optimistic mutation folded over it in application order, so a snapshot
//! never clobbers an in-flight edit and never duplicates an id.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use chrono::{DateTime, Utc};

use super::listeners::Listeners;
use crate::domain::{ListItem, Operation, Payload};

pub type MutationId = u64;

/// An optimistic change waiting for its remote write to resolve
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    pub operation: Operation,
    /// Item affected; for creates, the temporary id once applied
    pub target_id: Option<String>,
    /// Item as it was displayed before the change
    pub prior_snapshot: Option<ListItem>,
    /// Full record for creates, changed fields for updates, empty for deletes
    pub submitted_payload: Payload,
}

impl PendingMutation {
    pub fn create(payload: Payload) -> Self {
        Self {
            operation: Operation::Create,
            target_id: None,
            prior_snapshot: None,
            submitted_payload: payload,
        }
    }

    pub fn update(id: impl Into<String>, payload: Payload) -> Self {
        Self {
            operation: Operation::Update,
            target_id: Some(id.into()),
            prior_snapshot: None,
            submitted_payload: payload,
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Self {
            operation: Operation::Delete,
            target_id: Some(id.into()),
            prior_snapshot: None,
            submitted_payload: Payload::new(),
        }
    }
}

/// Display state captured by [`LocalListStore::apply_optimistic`]
#[derive(Debug, Clone, PartialEq)]
pub struct PriorState {
    mutation_id: MutationId,
    mutation: PendingMutation,
    items: Vec<ListItem>,
    revision: u64,
}

impl PriorState {
    pub fn mutation_id(&self) -> MutationId {
        self.mutation_id
    }

    /// The mutation as applied (temporary id and prior snapshot filled in)
    pub fn mutation(&self) -> &PendingMutation {
        &self.mutation
    }

    pub fn target_id(&self) -> &str {
        self.mutation.target_id.as_deref().unwrap_or_default()
    }

    /// Displayed sequence right before the optimistic change
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }
}

#[derive(Debug, Clone)]
struct Overlay {
    id: MutationId,
    mutation: PendingMutation,
    target_id: String,
    prior_index: usize,
    applied_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct LocalListStore {
    base: Vec<ListItem>,
    items: Vec<ListItem>,
    pending: Vec<Overlay>,
    /// Bumped on every change to base, overlays or display
    revision: u64,
    next_mutation: MutationId,
    next_temp: u64,
    temp_prefix: String,
}

impl Default for LocalListStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_TEMP_ID_PREFIX)
    }
}

impl LocalListStore {
    pub fn new(temp_prefix: impl Into<String>) -> Self {
        Self {
            base: Vec::new(),
            items: Vec::new(),
            pending: Vec::new(),
            revision: 0,
            next_mutation: 0,
            next_temp: 0,
            temp_prefix: temp_prefix.into(),
        }
    }

    /// Displayed items, in display order
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&ListItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_mutations(&self) -> impl Iterator<Item = &PendingMutation> {
        self.pending.iter().map(|overlay| &overlay.mutation)
    }

    /// True while `id` belongs to an optimistic create that is still pending.
    ///
    /// Remote ids that happen to share the temporary prefix are not temporary.
    pub fn is_temporary(&self, id: &str) -> bool {
        self.pending
            .iter()
            .any(|overlay| overlay.mutation.operation == Operation::Create && overlay.target_id == id)
    }

    /// Take a snapshot as the new authoritative base.
    ///
    /// Duplicate ids in the snapshot collapse onto the first position with
    /// the last fields seen. Pending mutations are re-applied on top.
    pub fn replace_all(&mut self, items: Vec<ListItem>) {
        self.base = dedup_by_id(items);
        self.reconcile_with_snapshot();
        tracing::debug!(
            items = self.items.len(),
            pending = self.pending.len(),
            "snapshot applied"
        );
    }

    /// Apply `mutation` to the displayed list before the remote confirms it
    pub fn apply_optimistic(&mut self, mut mutation: PendingMutation) -> PriorState {
        let prior_items = self.items.clone();
        self.next_mutation += 1;
        let mutation_id = self.next_mutation;

        let (target_id, prior_index) = match mutation.operation {
            Operation::Create => (self.next_temp_id(), self.items.len()),
            Operation::Update | Operation::Delete => {
                let id = mutation.target_id.clone().unwrap_or_default();
                let position = self.items.iter().position(|item| item.id == id);
                mutation.prior_snapshot = position.map(|pos| self.items[pos].clone());
                (id, position.unwrap_or(self.items.len()))
            }
        };
        mutation.target_id = Some(target_id.clone());

        let overlay = Overlay {
            id: mutation_id,
            mutation: mutation.clone(),
            target_id,
            prior_index,
            applied_at: Utc::now(),
        };
        apply_overlay(&mut self.items, &overlay);
        self.pending.push(overlay);
        self.revision += 1;

        PriorState {
            mutation_id,
            mutation,
            items: prior_items,
            revision: self.revision,
        }
    }

    /// The remote write succeeded: fold the change into the base.
    ///
    /// A create is renamed to `assigned_id`, or dropped when a snapshot
    /// already delivered that id. Returns false if the mutation is no longer
    /// pending (store cleared).
    pub fn commit(&mut self, prior: &PriorState, assigned_id: Option<&str>) -> bool {
        let Some(position) = self.position_of(prior.mutation_id) else {
            return false;
        };
        let mut overlay = self.pending.remove(position);
        if let Some(id) = assigned_id {
            overlay.target_id = id.to_string();
            overlay.mutation.target_id = Some(id.to_string());
        }
        apply_overlay(&mut self.base, &overlay);
        self.reconcile_with_snapshot();
        true
    }

    /// The remote write failed: drop the optimistic change.
    ///
    /// When nothing else touched the store since the apply, the exact prior
    /// sequence is restored; otherwise the display is rebuilt from the base
    /// and the remaining pending mutations.
    pub fn rollback(&mut self, prior: PriorState) -> bool {
        let Some(position) = self.position_of(prior.mutation_id) else {
            return false;
        };
        self.pending.remove(position);
        if self.revision == prior.revision {
            self.items = prior.items;
            self.revision += 1;
        } else {
            self.reconcile_with_snapshot();
        }
        true
    }

    /// Drop everything (panel teardown)
    pub fn clear(&mut self) {
        self.base.clear();
        self.items.clear();
        self.pending.clear();
        self.revision += 1;
    }

    /// Rebuild the display: base first, then pending overlays take precedence
    fn reconcile_with_snapshot(&mut self) {
        let mut view = self.base.clone();
        for overlay in &self.pending {
            apply_overlay(&mut view, overlay);
        }
        self.items = view;
        self.revision += 1;
    }

    /// Next `<prefix><n>` not already used by a displayed or base item
    fn next_temp_id(&mut self) -> String {
        loop {
            self.next_temp += 1;
            let candidate = format!("{}{}", self.temp_prefix, self.next_temp);
            let taken = self
                .base
                .iter()
                .chain(self.items.iter())
                .any(|item| item.id == candidate);
            if !taken {
                return candidate;
            }
        }
    }

    fn position_of(&self, mutation_id: MutationId) -> Option<usize> {
        self.pending.iter().position(|overlay| overlay.id == mutation_id)
    }
}

fn apply_overlay(view: &mut Vec<ListItem>, overlay: &Overlay) {
    let target = overlay.target_id.as_str();
    let submitted = &overlay.mutation.submitted_payload;
    match overlay.mutation.operation {
        Operation::Create => {
            // A snapshot that already carries the created document shows it next to
            // this temporary row until the write is acknowledged and commit drops it
            if !view.iter().any(|item| item.id == target) {
                view.push(ListItem::received(target, submitted.clone(), overlay.applied_at));
            }
        }
        Operation::Update => match view.iter_mut().find(|item| item.id == target) {
            Some(item) => merge_fields(&mut item.payload, submitted),
            None => {
                // Removed remotely while the edit is in flight: the edit still shows
                if let Some(prior) = &overlay.mutation.prior_snapshot {
                    let mut item = prior.clone();
                    merge_fields(&mut item.payload, submitted);
                    let at = overlay.prior_index.min(view.len());
                    view.insert(at, item);
                }
            }
        },
        Operation::Delete => view.retain(|item| item.id != target),
    }
}

fn merge_fields(payload: &mut Payload, changes: &Payload) {
    for (key, value) in changes {
        payload.insert(key.clone(), value.clone());
    }
}

fn dedup_by_id(items: Vec<ListItem>) -> Vec<ListItem> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(items.len());
    let mut unique: Vec<ListItem> = Vec::with_capacity(items.len());
    for item in items {
        match index.get(&item.id) {
            Some(&pos) => unique[pos] = item,
            None => {
                index.insert(item.id.clone(), unique.len());
                unique.push(item);
            }
        }
    }
    unique
}

struct ListCell {
    store: RefCell<LocalListStore>,
    listeners: Listeners<[ListItem]>,
}

/// Shared handle to a panel's store; notifies listeners after every change
#[derive(Clone)]
pub struct SharedListStore {
    cell: Rc<ListCell>,
}

impl SharedListStore {
    pub fn new(store: LocalListStore) -> Self {
        Self {
            cell: Rc::new(ListCell {
                store: RefCell::new(store),
                listeners: Listeners::default(),
            }),
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&LocalListStore) -> R) -> R {
        f(&self.cell.store.borrow())
    }

    pub fn modify<R>(&self, f: impl FnOnce(&mut LocalListStore) -> R) -> R {
        let (result, items) = {
            let mut store = self.cell.store.borrow_mut();
            let result = f(&mut store);
            (result, store.items().to_vec())
        };
        self.cell.listeners.notify(items.as_slice());
        result
    }

    pub fn items(&self) -> Vec<ListItem> {
        self.read(|store| store.items().to_vec())
    }

    pub fn on_change(&self, listener: impl Fn(&[ListItem]) + 'static) {
        self.cell.listeners.add(listener);
    }

    pub fn downgrade(&self) -> WeakListStore {
        WeakListStore(Rc::downgrade(&self.cell))
    }
}

/// Non-owning handle held by subscriptions and in-flight writes
#[derive(Clone)]
pub struct WeakListStore(Weak<ListCell>);

impl WeakListStore {
    pub fn upgrade(&self) -> Option<SharedListStore> {
        self.0.upgrade().map(|cell| SharedListStore { cell })
    }
}
