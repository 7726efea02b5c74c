//! # Generic Client
//!
//! This module defines the generic client for communicating with the store actor.

use crate::entity::ResourceEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Response, Revision};
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for interacting with a `ResourceActor`.
///
/// The client holds only the sender half of the actor's channel, so cloning is cheap and
/// clones can be handed to any number of tasks. When the last clone is dropped the actor's
/// loop ends.
pub struct ResourceClient<T: ResourceEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: ResourceEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: ResourceEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    /// Stores a new entity under a fresh ID. Returns it with the revision of the change.
    pub async fn create(&self, params: T::Create) -> Result<(T, Revision), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn replace(&self, id: T::Id, entity: T) -> Result<Revision, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Replace {
            id,
            entity,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<Revision, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { respond_to })
            .await
    }

    /// Flushes whatever is pending.
    pub async fn commit(&self) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Commit {
            through: None,
            respond_to,
        })
        .await
    }

    /// Makes sure the change recorded as `revision` is persisted.
    ///
    /// Fails with [`FrameworkError::ChangesDiscarded`] if a failed commit already threw it away.
    pub async fn commit_through(&self, revision: Revision) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Commit {
            through: Some(revision),
            respond_to,
        })
        .await
    }
}
