//! Remote Store Layer
//!
//! Abstract live-collection interface plus its implementations.
//! Panels read through a live query and write through point operations.

mod firestore;
mod memory;
mod traits;

#[cfg(test)]
mod tests;

pub use firestore::FirestoreRemote;
pub use memory::MemoryRemote;
pub use traits::{LiveQuery, RemoteDocument, RemoteStore, Snapshot};
