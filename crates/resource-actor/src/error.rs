//! # Framework Errors
//!
//! Common error types used by the store actor, its clients and the persistence layer.

/// Errors that can occur within the actor framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Identity mismatch: stored under {expected}, entity carries {found}")]
    IdentityMismatch { expected: String, found: String },
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
    #[error("Storage error: {0}")]
    Storage(#[from] PersistenceError),
    #[error("Change {0} was discarded by a failed commit")]
    ChangesDiscarded(crate::message::Revision),
    #[error("No identifiers left to allocate")]
    IdsExhausted,
}

/// Errors raised by a [`Persistence`](crate::persistence::Persistence) backend.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Commit rejected: {0}")]
    Rejected(String),
}
