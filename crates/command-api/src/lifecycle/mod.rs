//! # System Lifecycle
//!
//! Starting, wiring and stopping the Command API.
//!
//! [`CommandSystem::new`] picks the persistence backend from the configuration, restores
//! the store actor from it, spawns the actor and puts a [`CommandService`](crate::orchestrator::CommandService)
//! in front of it. [`CommandSystem::shutdown`] drops the service, which closes the actor's
//! channel, then awaits the actor task.
//!
//! ## Graceful Shutdown
//!
//! 1. **Drop all clients** - Closes the sender side of the channel
//! 2. **Actor detects closure** - `receiver.recv()` returns `None`
//! 3. **Await completion** - Wait for the actor task to finish
//!
//! Pending changes that were never committed are discarded with the actor.
//!
//! [`setup_tracing`] initializes structured logging and is called once by the binary.

pub mod command_system;
pub mod telemetry;

pub use command_system::*;
pub use telemetry::*;
