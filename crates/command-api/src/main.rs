use command_api::config::CommandApiConfig;
use command_api::lifecycle::{setup_tracing, CommandSystem, SystemError};
use command_api::orchestrator::CommandService;
use command_api::transport::{self, ApiResponse};
use tracing::{info, Instrument};

async fn send(service: &CommandService, method: &str, path: &str, body: &str) -> ApiResponse {
    let response = transport::handle(service, method, path, body.as_bytes()).await;
    let body = response
        .body
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    info!(
        method,
        path,
        status = response.status,
        location = response.location.as_deref().unwrap_or(""),
        %body,
        "Response"
    );
    response
}

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    setup_tracing();

    let config = CommandApiConfig::from_env()?;
    info!(?config, "Starting command API");

    let system = CommandSystem::new(config).await?;
    let service = &system.service;

    let created = async {
        send(
            service,
            "POST",
            "/api/commands",
            r#"{"howTo":"List files","platform":"linux","commandLine":"ls -la"}"#,
        )
        .await
    }
    .instrument(tracing::info_span!("create"))
    .await;

    let location = created
        .location
        .unwrap_or_else(|| "/api/commands/1".to_string());

    async {
        send(
            service,
            "PATCH",
            &location,
            r#"[{"op":"test","path":"/platform","value":"linux"},{"op":"replace","path":"/howto","value":"List all files"}]"#,
        )
        .await;
        send(
            service,
            "PATCH",
            &location,
            r#"[{"op":"replace","path":"/nonexistentfield","value":"x"}]"#,
        )
        .await;
        send(
            service,
            "PUT",
            &location,
            r#"{"howTo":"List all files","platform":"macos","commandLine":""}"#,
        )
        .await;
    }
    .instrument(tracing::info_span!("update"))
    .await;

    send(service, "GET", "/api/commands", "").await;
    send(service, "DELETE", &location, "").await;
    send(service, "GET", &location, "").await;

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
