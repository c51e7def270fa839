//! Error types shared by the console core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by a remote store (write rejections, broken live queries)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum RemoteError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rejected by store: {0}")]
    Rejected(String),
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Errors surfaced by the console core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    /// Rejected before any remote call (missing id, operation not allowed, bad record)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Create/update/delete rejected by the backing store or transport
    #[error("remote write failed: {0}")]
    RemoteWriteFailure(#[source] RemoteError),
    /// Live query delivery interrupted
    #[error("subscription failed: {0}")]
    SubscriptionFailure(#[source] RemoteError),
    #[error("configuration error: {0}")]
    Config(String),
}

impl ConsoleError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ConsoleError::InvalidArgument(msg.into())
    }

    /// True for failures that never reached the remote store
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, ConsoleError::InvalidArgument(_))
    }
}

/// Common result type for console operations
pub type ConsoleResult<T> = Result<T, ConsoleError>;
