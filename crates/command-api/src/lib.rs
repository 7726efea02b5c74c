//! # Command API
//!
//! A single "Command" resource (a how-to note, its platform and the command line itself)
//! with create, read, full replace, JSON-Patch partial update and delete.
//!
//! ## Components
//!
//! - **[model]**: The [`Command`](model::Command) entity and its create/update/read shapes.
//! - **[command_actor]**: The store actor for commands and [`CommandError`](command_actor::CommandError).
//! - **[clients]**: [`CommandClient`](clients::CommandClient), the typed handle on the store.
//! - **[mapper]**: Pure conversions between the entity and its shapes.
//! - **[validation]**: Required and length rules on the mutable fields.
//! - **[orchestrator]**: [`CommandService`](orchestrator::CommandService), which runs each
//!   request through fetch, patch, validation, replace and commit.
//! - **[transport]**: Decoding of `(method, path, body)` and encoding of status codes.
//! - **[config]** and **[lifecycle]**: Configuration, startup and shutdown.
//!
//! The binary in `main.rs` drives a complete request sequence through [`transport::handle`].

pub mod clients;
pub mod command_actor;
pub mod config;
pub mod lifecycle;
pub mod mapper;
pub mod model;
pub mod orchestrator;
pub mod transport;
pub mod validation;
