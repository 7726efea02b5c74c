//! # Update Orchestrator
//!
//! [`CommandService`] sequences the store, the shape mapper, the patch engine and the
//! validation gate for every request on the Command resource. It is the single place
//! where lower-level failures become [`CommandError`] outcomes.
//!
//! Every mutating request ends with a commit through the revision of its own change. A
//! request that fails before reaching the store leaves no pending change behind. A failed
//! commit is rolled back by the store, and a change discarded by another request's failed
//! commit is reported as a storage failure. A request either persists completely or fails.

use crate::clients::CommandClient;
use crate::command_actor::CommandError;
use crate::mapper;
use crate::model::{Command, CommandCreate, CommandId, CommandRead, CommandUpdate};
use crate::validation::{FieldLimits, Validate};
use resource_actor::{apply_patch, ActorClient, PatchOperation};
use tracing::{info, instrument, warn};

/// Request handling for the Command resource.
///
/// Cheap to clone; clones share the same store actor.
#[derive(Clone)]
pub struct CommandService {
    client: CommandClient,
    limits: FieldLimits,
}

impl CommandService {
    pub fn new(client: CommandClient, limits: FieldLimits) -> Self {
        Self { client, limits }
    }

    /// Every stored command, ordered by ID.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CommandRead>, CommandError> {
        let commands = self.client.list().await?;
        Ok(commands.iter().map(mapper::to_read_shape).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: CommandId) -> Result<CommandRead, CommandError> {
        let command = self.fetch(id).await?;
        Ok(mapper::to_read_shape(&command))
    }

    /// Validates `params`, stores a new command and commits it.
    #[instrument(skip(self))]
    pub async fn create(&self, params: CommandCreate) -> Result<CommandRead, CommandError> {
        params.validate(&self.limits).inspect_err(|errors| {
            warn!(violations = errors.violations().len(), "Create rejected");
        })?;

        let (command, revision) = self.client.create_command(params).await?;
        self.client.commit_through(revision).await?;

        info!(id = %command.id, "Command created");
        Ok(mapper::to_read_shape(&command))
    }

    /// Full replace: every mutable field is taken from `update`.
    #[instrument(skip(self))]
    pub async fn replace(&self, id: CommandId, update: CommandUpdate) -> Result<(), CommandError> {
        let mut command = self.fetch(id).await?;

        update.validate(&self.limits).inspect_err(|errors| {
            warn!(%id, violations = errors.violations().len(), "Replace rejected");
        })?;

        mapper::apply_update_shape(update, &mut command);
        self.store(id, command).await?;

        info!(%id, "Command replaced");
        Ok(())
    }

    /// Partial update: `operations` are applied in order to the command's update shape, and
    /// the result must pass validation before anything is stored.
    #[instrument(skip(self, operations), fields(operations = operations.len()))]
    pub async fn patch(
        &self,
        id: CommandId,
        operations: &[PatchOperation],
    ) -> Result<(), CommandError> {
        let mut command = self.fetch(id).await?;

        let shape = mapper::project_to_update_shape(&command);
        let patched = apply_patch(&shape, operations).inspect_err(|failure| {
            warn!(%id, index = failure.index, error = %failure.error, "Patch rejected");
        })?;

        patched.validate(&self.limits).inspect_err(|errors| {
            warn!(%id, violations = errors.violations().len(), "Patched command rejected");
        })?;

        mapper::apply_update_shape(patched, &mut command);
        self.store(id, command).await?;

        info!(%id, "Command patched");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: CommandId) -> Result<(), CommandError> {
        self.fetch(id).await?;
        let revision = self.client.delete(id).await?;
        self.client.commit_through(revision).await?;

        info!(%id, "Command deleted");
        Ok(())
    }

    async fn fetch(&self, id: CommandId) -> Result<Command, CommandError> {
        self.client
            .get(id)
            .await?
            .ok_or(CommandError::NotFound(id))
    }

    async fn store(&self, id: CommandId, command: Command) -> Result<(), CommandError> {
        let revision = self.client.replace_command(id, command).await?;
        self.client.commit_through(revision).await
    }
}
