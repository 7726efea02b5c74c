//! # ActorClient Trait
//!
//! Provides a common interface for resource-specific clients, adding default `get`, `list`,
//! `delete` and `commit` methods built on top of a generic `ResourceClient`.
use crate::{FrameworkError, ResourceClient, ResourceEntity, Revision};
use async_trait::async_trait;

/// Trait for resource-specific clients to inherit the standard store operations.
///
/// A domain client only supplies access to its inner [`ResourceClient`] and a mapping from
/// [`FrameworkError`] into its own error type.
///
/// # Example
///
/// ```rust
/// use resource_actor::{ActorClient, FrameworkError, ResourceClient, ResourceEntity};
/// use async_trait::async_trait;
///
/// #[derive(Clone, Debug)] struct Note { id: u32 }
/// #[derive(Debug, thiserror::Error)] #[error("{0}")] struct NoteError(String);
///
/// impl ResourceEntity for Note {
///     type Id = u32;
///     type Create = ();
///     type Error = NoteError;
///     fn from_create_params(id: u32, _: ()) -> Result<Self, NoteError> { Ok(Self { id }) }
///     fn id(&self) -> u32 { self.id }
/// }
///
/// struct NoteClient { inner: ResourceClient<Note> }
///
/// #[async_trait]
/// impl ActorClient<Note> for NoteClient {
///     type Error = NoteError;
///     fn inner(&self) -> &ResourceClient<Note> { &self.inner }
///     fn map_error(e: FrameworkError) -> NoteError { NoteError(e.to_string()) }
/// }
///
/// async fn usage(client: NoteClient) {
///     // get(), list(), delete() and commit() are provided automatically
///     let _ = client.get(1).await;
///     let _ = client.delete(1).await;
///     let _ = client.commit().await;
/// }
/// ```
#[async_trait]
pub trait ActorClient<T: ResourceEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific resource error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch an entity by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Fetch every entity, ordered by ID.
    #[tracing::instrument(skip(self))]
    async fn list(&self) -> Result<Vec<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().list().await.map_err(Self::map_error)
    }

    /// Delete an entity by ID. The removal is pending until committed.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<Revision, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }

    /// Flush pending changes to persistence.
    #[tracing::instrument(skip(self))]
    async fn commit(&self) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().commit().await.map_err(Self::map_error)
    }

    /// Persist the change recorded as `revision`, failing if it was discarded.
    #[tracing::instrument(skip(self))]
    async fn commit_through(&self, revision: Revision) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner()
            .commit_through(revision)
            .await
            .map_err(Self::map_error)
    }
}
