//! # Command Actor
//!
//! The store actor for [`Command`] entities.
//!
//! ## Structure
//!
//! - [`entity`] - [`ResourceEntity`](resource_actor::ResourceEntity) implementation for [`Command`]
//! - [`error`] - [`CommandError`], the error type of every command operation
//! - [`new()`] / [`open()`] - Factory functions that create the actor and client
//!
//! ## Usage
//!
//! ```rust
//! use command_api::command_actor;
//! use command_api::model::CommandCreate;
//! use resource_actor::{ActorClient, MemoryPersistence};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (actor, client) = command_actor::new(32, Arc::new(MemoryPersistence::new()));
//!     tokio::spawn(actor.run());
//!
//!     let params = CommandCreate {
//!         how_to: "List files".to_string(),
//!         platform: "linux".to_string(),
//!         command_line: "ls -la".to_string(),
//!     };
//!     let (command, revision) = client.create_command(params).await?;
//!     client.commit_through(revision).await?;
//!     assert_eq!(command.id.0, 1);
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::CommandClient;
use crate::model::Command;
use resource_actor::{Persistence, ResourceActor};
use std::sync::Arc;

/// Creates an empty Command actor and its client.
pub fn new(
    buffer_size: usize,
    persistence: Arc<dyn Persistence<Command>>,
) -> (ResourceActor<Command>, CommandClient) {
    let (actor, generic_client) = ResourceActor::new(buffer_size, persistence);
    (actor, CommandClient::new(generic_client))
}

/// Creates a Command actor restored from `persistence`.
pub async fn open(
    buffer_size: usize,
    persistence: Arc<dyn Persistence<Command>>,
) -> Result<(ResourceActor<Command>, CommandClient), CommandError> {
    let (actor, generic_client) = ResourceActor::open(buffer_size, persistence).await?;
    Ok((actor, CommandClient::new(generic_client)))
}
