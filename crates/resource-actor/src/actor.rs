//! # Generic Store Actor
//!
//! This module defines the `ResourceActor`, the component that owns the entity store for one
//! resource type. It implements the "Server" side of the Actor Model, processing requests
//! sequentially so every store operation is atomic without locks.

use crate::client::ResourceClient;
use crate::entity::ResourceEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Revision};
use crate::persistence::{Change, Persistence};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The generic actor that manages a collection of entities.
///
/// # Architecture Note
/// This struct is the "Server" half of the actor. It owns the state and the receiver end of
/// the channel. Requests are handled one at a time, so `get`, `create`, `replace` and
/// `delete` are individually atomic and the maps need no `Mutex`.
///
/// # Working State and Commits
///
/// The actor keeps two maps:
///
/// * `store` - the working state every request reads and mutates.
/// * `committed` - the state as of the last successful commit.
///
/// Each mutation is also appended to `pending`. On `Commit` the pending changes go to the
/// [`Persistence`] backend in one call:
///
/// * **success** - `committed` catches up with `store`, `pending` is cleared.
/// * **failure** - `store` is rolled back to `committed`, `pending` is dropped and the caller
///   receives [`FrameworkError::Storage`].
///
/// Every recorded change gets the next [`Revision`]. A failed commit resolves the revisions it
/// held as discarded, and a later `Commit` that names one of them fails with
/// [`FrameworkError::ChangesDiscarded`]. A request that stages a change and then commits
/// through its revision therefore never reports success for a write another request's failed
/// commit threw away.
///
/// The ID counter never moves backwards, so an ID is not handed out twice in the lifetime of
/// the actor, even after a delete or a failed commit.
///
/// # Usage Pattern
///
/// ```rust
/// use resource_actor::{MemoryPersistence, ResourceActor, ResourceEntity};
/// use std::sync::Arc;
///
/// #[derive(Clone, Debug)] struct Note { id: u32, text: String }
/// #[derive(Debug, thiserror::Error)] #[error("note error")] struct NoteError;
///
/// impl ResourceEntity for Note {
///     type Id = u32;
///     type Create = String;
///     type Error = NoteError;
///     fn from_create_params(id: u32, text: String) -> Result<Self, NoteError> { Ok(Self { id, text }) }
///     fn id(&self) -> u32 { self.id }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = ResourceActor::<Note>::new(10, Arc::new(MemoryPersistence::new()));
///     tokio::spawn(actor.run());
///
///     let (note, revision) = client.create("hello".to_string()).await.unwrap();
///     client.commit_through(revision).await.unwrap();
///     assert_eq!(note.id, 1);
/// }
/// ```
pub struct ResourceActor<T: ResourceEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    persistence: Arc<dyn Persistence<T>>,
    store: BTreeMap<T::Id, T>,
    committed: BTreeMap<T::Id, T>,
    pending: Vec<Change<T>>,
    next_id: u32,
    /// Revision of the most recently recorded change.
    revision: u64,
    /// Every revision up to here has been either persisted or discarded.
    resolved: u64,
    /// Inclusive revision ranges thrown away by failed commits.
    discarded: Vec<(u64, u64)>,
}

impl<T: ResourceEntity> ResourceActor<T> {
    /// Creates an empty `ResourceActor` and its associated `ResourceClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    /// * `persistence` - The backend commits are flushed to.
    pub fn new(
        buffer_size: usize,
        persistence: Arc<dyn Persistence<T>>,
    ) -> (Self, ResourceClient<T>) {
        Self::with_rows(buffer_size, persistence, BTreeMap::new(), 1)
    }

    /// Creates a `ResourceActor` whose state is restored from `persistence`.
    ///
    /// The ID counter resumes after the highest stored ID. A table already holding the
    /// largest possible ID is refused with [`FrameworkError::IdsExhausted`].
    pub async fn open(
        buffer_size: usize,
        persistence: Arc<dyn Persistence<T>>,
    ) -> Result<(Self, ResourceClient<T>), FrameworkError> {
        let rows = persistence.load().await?;
        let store: BTreeMap<T::Id, T> = rows.into_iter().map(|row| (row.id(), row)).collect();
        let next_id = match store.keys().next_back() {
            Some(id) => Into::<u32>::into(*id)
                .checked_add(1)
                .ok_or(FrameworkError::IdsExhausted)?,
            None => 1,
        };
        Ok(Self::with_rows(buffer_size, persistence, store, next_id))
    }

    fn with_rows(
        buffer_size: usize,
        persistence: Arc<dyn Persistence<T>>,
        store: BTreeMap<T::Id, T>,
        next_id: u32,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            persistence,
            committed: store.clone(),
            store,
            pending: Vec::new(),
            next_id,
            revision: 0,
            resolved: 0,
            discarded: Vec::new(),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop, processing messages until every client is dropped.
    pub async fn run(mut self) {
        // Extract just the type name (e.g., "Command" instead of "command_api::model::Command")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, size = self.store.len(), next_id = self.next_id, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let Some(following) = self.next_id.checked_add(1) else {
                        warn!(entity_type, next_id = self.next_id, "Create failed, no IDs left");
                        let _ = respond_to.send(Err(FrameworkError::IdsExhausted));
                        continue;
                    };
                    let id = T::Id::from(self.next_id);
                    self.next_id = following;

                    match T::from_create_params(id, params) {
                        Ok(item) => {
                            self.store.insert(id, item.clone());
                            let revision = self.record(Change::Upsert(item.clone()));
                            info!(entity_type, %id, %revision, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok((item, revision)));
                        }
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            let _ = respond_to.send(Err(FrameworkError::EntityError(Box::new(e))));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Replace {
                    id,
                    entity,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?entity, "Replace");
                    let result = self.replace(id, entity);
                    match &result {
                        Ok(revision) => info!(entity_type, %id, %revision, "Replaced"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Replace failed"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    if self.store.remove(&id).is_some() {
                        let revision = self.record(Change::Delete(id));
                        info!(entity_type, %id, %revision, size = self.store.len(), "Deleted");
                        let _ = respond_to.send(Ok(revision));
                    } else {
                        warn!(entity_type, %id, "Not found");
                        let _ = respond_to.send(Err(FrameworkError::NotFound(id.to_string())));
                    }
                }
                ResourceRequest::List { respond_to } => {
                    debug!(entity_type, size = self.store.len(), "List");
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Commit {
                    through,
                    respond_to,
                } => {
                    let result = match through {
                        Some(revision) => self.commit_through(revision, entity_type).await,
                        None => self.commit(entity_type).await,
                    };
                    let _ = respond_to.send(result);
                }
            }
        }

        info!(entity_type, size = self.store.len(), pending = self.pending.len(), "Shutdown");
    }

    fn record(&mut self, change: Change<T>) -> Revision {
        self.pending.push(change);
        self.revision += 1;
        Revision(self.revision)
    }

    fn was_discarded(&self, revision: Revision) -> bool {
        self.discarded
            .iter()
            .any(|(first, last)| (*first..=*last).contains(&revision.0))
    }

    fn replace(&mut self, id: T::Id, entity: T) -> Result<Revision, FrameworkError> {
        if entity.id() != id {
            return Err(FrameworkError::IdentityMismatch {
                expected: id.to_string(),
                found: entity.id().to_string(),
            });
        }
        match self.store.get_mut(&id) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(self.record(Change::Upsert(entity)))
            }
            None => Err(FrameworkError::NotFound(id.to_string())),
        }
    }

    /// Commits on behalf of the request that recorded `revision`.
    async fn commit_through(
        &mut self,
        revision: Revision,
        entity_type: &str,
    ) -> Result<(), FrameworkError> {
        if revision.0 > self.resolved {
            return self.commit(entity_type).await;
        }
        if self.was_discarded(revision) {
            warn!(entity_type, %revision, "Commit requested for a discarded change");
            return Err(FrameworkError::ChangesDiscarded(revision));
        }
        debug!(entity_type, %revision, "Change already committed");
        Ok(())
    }

    async fn commit(&mut self, entity_type: &str) -> Result<(), FrameworkError> {
        if self.pending.is_empty() {
            debug!(entity_type, "Commit with no pending changes");
            return Ok(());
        }

        let changes = std::mem::take(&mut self.pending);
        let first = self.resolved + 1;
        self.resolved = self.revision;
        match self.persistence.commit(&changes).await {
            Ok(()) => {
                self.committed = self.store.clone();
                info!(entity_type, changes = changes.len(), size = self.store.len(), "Committed");
                Ok(())
            }
            Err(e) => {
                self.store = self.committed.clone();
                self.discarded.push((first, self.revision));
                warn!(
                    entity_type,
                    error = %e,
                    discarded = changes.len(),
                    "Commit failed, rolled back to last committed state"
                );
                Err(FrameworkError::Storage(e))
            }
        }
    }
}
