use crate::command_actor::{self, CommandError};
use crate::config::{CommandApiConfig, ConfigError};
use crate::model::Command;
use crate::orchestrator::CommandService;
use resource_actor::{JsonFilePersistence, MemoryPersistence, Persistence};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to start command store: {0}")]
    Startup(#[from] CommandError),

    #[error("Actor task failed: {0}")]
    Shutdown(String),
}

/// The running Command API: one store actor and the service in front of it.
///
/// # Example
///
/// ```ignore
/// let system = CommandSystem::new(CommandApiConfig::default()).await?;
///
/// let response = transport::handle(&system.service, "GET", "/api/commands", b"").await;
///
/// system.shutdown().await?;
/// ```
pub struct CommandSystem {
    /// Request handling for the Command resource
    pub service: CommandService,

    /// Task handle of the store actor (used for graceful shutdown)
    handle: tokio::task::JoinHandle<()>,
}

impl CommandSystem {
    /// Starts the system described by `config`.
    ///
    /// With `[storage] path` set, committed commands live in that JSON file and are
    /// restored from it; otherwise an in-memory table is used.
    pub async fn new(config: CommandApiConfig) -> Result<Self, SystemError> {
        config.validate()?;

        let persistence: Arc<dyn Persistence<Command>> = match &config.storage.path {
            Some(path) => {
                info!(path = %path.display(), "Using JSON file storage");
                Arc::new(JsonFilePersistence::new(path.clone()))
            }
            None => {
                info!("Using in-memory storage");
                Arc::new(MemoryPersistence::new())
            }
        };

        Self::with_persistence(&config, persistence).await
    }

    /// Starts the system on an already-built persistence backend.
    pub async fn with_persistence(
        config: &CommandApiConfig,
        persistence: Arc<dyn Persistence<Command>>,
    ) -> Result<Self, SystemError> {
        let (actor, client) = command_actor::open(config.channel_capacity, persistence).await?;
        let handle = tokio::spawn(actor.run());

        Ok(Self {
            service: CommandService::new(client, config.limits),
            handle,
        })
    }

    /// Gracefully shuts down the system.
    ///
    /// Dropping the service drops the last client, which closes the actor's channel. The
    /// actor drains what is already queued and exits. Clones of the service still held
    /// elsewhere keep the actor alive, so drop them first.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        drop(self.service);

        if let Err(e) = self.handle.await {
            error!("Actor task failed: {:?}", e);
            return Err(SystemError::Shutdown(format!("{e:?}")));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
