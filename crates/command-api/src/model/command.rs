use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Commands.
///
/// Allocated by the store, starting at 1. `0` marks an entity that has not been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(pub u32);

impl CommandId {
    /// Placeholder carried by an entity before the store assigns its ID.
    pub const UNASSIGNED: CommandId = CommandId(0);
}

impl From<u32> for CommandId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<CommandId> for u32 {
    fn from(id: CommandId) -> Self {
        id.0
    }
}

impl Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored command-line snippet: what it does, where it runs, and the command itself.
///
/// # Actor Framework
/// This struct implements the [`ResourceEntity`](resource_actor::ResourceEntity) trait,
/// allowing it to be held by a [`ResourceActor`](resource_actor::ResourceActor).
/// It is also the row type written to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: CommandId,
    pub how_to: String,
    pub platform: String,
    pub command_line: String,
}

/// Payload for creating a new command.
///
/// Missing members decode as empty strings so validation can report them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandCreate {
    pub how_to: String,
    pub platform: String,
    pub command_line: String,
}

/// The client-modifiable fields of a command.
///
/// Used as the full-replace body and as the document a patch is applied to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandUpdate {
    pub how_to: String,
    pub platform: String,
    pub command_line: String,
}

/// What clients get back when they read a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRead {
    pub id: CommandId,
    pub how_to: String,
    pub platform: String,
    pub command_line: String,
}
