//! # Generic Messages
//!
//! This module defines the generic message types used for communication between
//! the `ResourceClient` and `ResourceActor`.

use crate::entity::ResourceEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Position of one recorded change in the store's change sequence.
///
/// Create, Replace and Delete hand back the revision of the change they recorded. Passing it
/// to a commit asks about *that* change: the commit fails if a rollback already discarded it,
/// even when some other request's commit emptied the pending list in the meantime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(pub(crate) u64);

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Internal message type sent to the actor to request operations.
///
/// # The Store Contract
/// The variants map onto the store operations a resource needs:
///
/// - **Create**: Allocates an ID and builds the entity from [`ResourceEntity::Create`].
/// - **Get**: Fetches the current working state of the resource by ID.
/// - **Replace**: Overwrites the stored entity. The entity must carry the same ID.
/// - **Delete**: Removes the resource.
/// - **List**: Returns every resource ordered by ID.
/// - **Commit**: Flushes the pending changes to persistence in one transaction. With
///   `through` set, it first checks whether that revision was already resolved: already
///   persisted is `Ok`, discarded by a failed commit is [`FrameworkError::ChangesDiscarded`].
///
/// Create, Replace and Delete only touch the working state; nothing is durable until
/// a Commit succeeds.
#[derive(Debug)]
pub enum ResourceRequest<T: ResourceEntity> {
    Create {
        params: T::Create,
        respond_to: Response<(T, Revision)>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Replace {
        id: T::Id,
        entity: T,
        respond_to: Response<Revision>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<Revision>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Commit {
        through: Option<Revision>,
        respond_to: Response<()>,
    },
}
