//! [`ResourceEntity`] implementation for the [`Command`] domain type.

use crate::command_actor::CommandError;
use crate::mapper;
use crate::model::{Command, CommandCreate, CommandId};
use resource_actor::ResourceEntity;

impl ResourceEntity for Command {
    type Id = CommandId;
    type Create = CommandCreate;
    type Error = CommandError;

    /// Maps the create payload onto a new entity under the allocated ID.
    ///
    /// The payload has already passed validation in the service.
    fn from_create_params(id: CommandId, params: CommandCreate) -> Result<Self, Self::Error> {
        Ok(Command {
            id,
            ..mapper::to_entity(params)
        })
    }

    fn id(&self) -> CommandId {
        self.id
    }
}
