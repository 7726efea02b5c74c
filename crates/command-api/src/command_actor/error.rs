//! Error types for the Command resource.

use crate::model::CommandId;
use crate::validation::ValidationErrors;
use resource_actor::{FrameworkError, PatchFailure};
use thiserror::Error;

/// Every way a command request can end other than success.
///
/// The service is the only place these are produced for callers; the transport boundary
/// turns each variant into a status code.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CommandError {
    /// No command is stored under this ID.
    #[error("Command not found: {0}")]
    NotFound(CommandId),

    /// One or more fields broke their constraints.
    #[error("Command validation error: {0}")]
    ValidationFailed(#[from] ValidationErrors),

    /// A patch operation could not be applied.
    #[error("Command patch error: {0}")]
    PatchFailed(#[from] PatchFailure),

    /// The commit to persistence failed. Nothing from the request was kept.
    #[error("Command storage error: {0}")]
    StorageFailed(String),

    /// The store rejected a request it should never have received.
    #[error("Command store error: {0}")]
    Internal(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for CommandError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => id
                .parse()
                .map(|id| CommandError::NotFound(CommandId(id)))
                .unwrap_or_else(|_| CommandError::Internal(format!("Item not found: {id}"))),
            FrameworkError::Storage(e) => CommandError::StorageFailed(e.to_string()),
            FrameworkError::ChangesDiscarded(_) => CommandError::StorageFailed(e.to_string()),
            FrameworkError::IdentityMismatch { .. }
            | FrameworkError::EntityError(_)
            | FrameworkError::IdsExhausted => {
                CommandError::Internal(e.to_string())
            }
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                CommandError::ActorCommunicationError(e.to_string())
            }
        }
    }
}
