//! # ResourceEntity Trait
//!
//! The `ResourceEntity` trait defines the contract a resource type must satisfy to be held by
//! the generic [`ResourceActor`](crate::ResourceActor). It names the identifier, the creation
//! payload and the error type, and gives the actor a way to build a new entity from a freshly
//! assigned identifier.
//!
//! # Architecture Note
//! The store loop (create/get/replace/delete/list/commit) is written *once* against this
//! trait. Associated types keep the payloads apart: a `Command` store only accepts a
//! `CommandCreate`, and the compiler rejects anything else.
//!
//! # Identity
//! Identifiers are allocated by the actor from a monotonically increasing `u32` counter, so
//! `Id` converts both ways. `id()` lets the actor check that a replacement entity still
//! carries the identifier it is stored under.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any resource entity must implement to be managed by a `ResourceActor`.
pub trait ResourceEntity: Clone + Debug + Send + Sync + 'static {
    /// The unique identifier for this entity.
    /// Must round-trip through `u32` for counter-based allocation.
    type Id: Copy + Ord + Hash + Send + Sync + Display + Debug + From<u32> + Into<u32>;

    /// The data required to create a new instance.
    type Create: Send + Sync + Debug;

    /// The error type for this entity.
    ///
    /// # Design Note: Error Granularity
    ///
    /// One error enum per entity rather than one per operation. Clients match on a single
    /// type, at the cost of some operations being able to name variants they never produce.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full entity from the allocated ID and the creation payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// The identifier this entity carries.
    fn id(&self) -> Self::Id;
}
