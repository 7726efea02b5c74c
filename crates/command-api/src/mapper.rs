//! # Shape Mapper
//!
//! Pure conversions between the [`Command`] entity and its wire shapes. The mapping is fixed
//! at compile time; there is no runtime mapper configuration to mutate.
//!
//! The identifier only flows *out* ([`to_read_shape`]). Nothing a client sends can set it:
//! [`to_entity`] leaves it unassigned and [`apply_update_shape`] never touches it.

use crate::model::{Command, CommandCreate, CommandId, CommandRead, CommandUpdate};

/// Builds an entity from a create payload. The ID is [`CommandId::UNASSIGNED`].
pub fn to_entity(create: CommandCreate) -> Command {
    Command {
        id: CommandId::UNASSIGNED,
        how_to: create.how_to,
        platform: create.platform,
        command_line: create.command_line,
    }
}

/// Copies the client-modifiable fields of `command` into an update shape.
pub fn project_to_update_shape(command: &Command) -> CommandUpdate {
    CommandUpdate {
        how_to: command.how_to.clone(),
        platform: command.platform.clone(),
        command_line: command.command_line.clone(),
    }
}

/// Overwrites the mutable fields of `command` with `update`, in place.
pub fn apply_update_shape(update: CommandUpdate, command: &mut Command) {
    command.how_to = update.how_to;
    command.platform = update.platform;
    command.command_line = update.command_line;
}

pub fn to_read_shape(command: &Command) -> CommandRead {
    CommandRead {
        id: command.id,
        how_to: command.how_to.clone(),
        platform: command.platform.clone(),
        command_line: command.command_line.clone(),
    }
}
