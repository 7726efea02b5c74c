//! # Command Client
//!
//! A high-level API for the `Command` store actor. It wraps a `ResourceClient<Command>`
//! and converts framework errors into [`CommandError`].
use crate::command_actor::CommandError;
use crate::model::{Command, CommandCreate, CommandId};
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, ResourceClient, Revision};
use tracing::{debug, instrument};

/// Client for interacting with the Command actor.
#[derive(Clone)]
pub struct CommandClient {
    inner: ResourceClient<Command>,
}

impl CommandClient {
    pub fn new(inner: ResourceClient<Command>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<Command> for CommandClient {
    type Error = CommandError;

    fn inner(&self) -> &ResourceClient<Command> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        CommandError::from(e)
    }
}

impl CommandClient {
    /// Stores a new command under a fresh ID. Pending until committed through the returned
    /// revision.
    #[instrument(skip(self))]
    pub async fn create_command(
        &self,
        params: CommandCreate,
    ) -> Result<(Command, Revision), CommandError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(Self::map_error)
    }

    /// Overwrites the command stored under `id`. Pending until committed.
    #[instrument(skip(self))]
    pub async fn replace_command(
        &self,
        id: CommandId,
        command: Command,
    ) -> Result<Revision, CommandError> {
        debug!("Sending request");
        self.inner
            .replace(id, command)
            .await
            .map_err(Self::map_error)
    }
}
