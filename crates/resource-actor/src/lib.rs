//! # Resource Actor
//!
//! Building blocks for serving one typed resource through a store actor: a generic
//! [`ResourceActor`] that owns the entities, a cloneable [`ResourceClient`] to talk to it, a
//! [`Persistence`] seam the actor commits to, and a [`patch`] engine that applies partial
//! updates to fixed-shape records.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ResourceEntity`]) - the resource type, its ID and creation payload
//! 2. **Runtime Layer** ([`ResourceActor`]) - sequential request processing, working state,
//!    pending changes and commits
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorClient`]) - type-safe async access
//! 4. **Durability Layer** ([`Persistence`]) - where committed changes go
//!
//! ## Store Semantics
//!
//! `create`, `replace` and `delete` change the actor's working state immediately and are
//! recorded as pending changes. `commit` hands all pending changes to the persistence backend
//! in one call. If that call fails the working state is rolled back to the last committed
//! state, so readers never keep seeing changes that were not stored.
//!
//! Each recorded change carries a [`Revision`]. A request that commits with
//! `commit_through(revision)` learns the fate of its own change. The commit fails if another
//! request's failed commit discarded that change first.
//!
//! ```rust
//! use resource_actor::{MemoryPersistence, ResourceActor, ResourceEntity};
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug)] struct Note { id: u32, text: String }
//! #[derive(Debug, thiserror::Error)] #[error("note error")] struct NoteError;
//!
//! impl ResourceEntity for Note {
//!     type Id = u32;
//!     type Create = String;
//!     type Error = NoteError;
//!     fn from_create_params(id: u32, text: String) -> Result<Self, NoteError> { Ok(Self { id, text }) }
//!     fn id(&self) -> u32 { self.id }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let table = Arc::new(MemoryPersistence::<Note>::new());
//!     let (actor, client) = ResourceActor::<Note>::new(10, table.clone());
//!     tokio::spawn(actor.run());
//!
//!     client.create("draft".to_string()).await.unwrap();
//!     assert!(table.rows().is_empty());
//!
//!     client.commit().await.unwrap();
//!     assert_eq!(table.rows().len(), 1);
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - The actor runs in its own Tokio task and handles one request at a time
//! - Every store operation is therefore atomic; concurrent writers are last-write-wins
//! - Commits await the persistence backend inside the loop
//!
//! ## Testing
//!
//! [`mock::MockClient`] answers a real [`ResourceClient`] from scripted expectations, so code
//! layered on top of the store can be tested without running an actor.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod patch;
pub mod persistence;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::ResourceClient;
pub use client_trait::ActorClient;
pub use entity::ResourceEntity;
pub use error::{FrameworkError, PersistenceError};
pub use message::{ResourceRequest, Response, Revision};
pub use patch::{apply_patch, PatchError, PatchFailure, PatchOperation};
pub use persistence::{Change, JsonFilePersistence, MemoryPersistence, Persistence};
