use command_api::clients::CommandClient;
use command_api::command_actor::CommandError;
use command_api::model::{Command, CommandCreate, CommandId, CommandUpdate};
use command_api::orchestrator::CommandService;
use command_api::validation::FieldLimits;
use resource_actor::mock::MockClient;
use resource_actor::{FrameworkError, PatchOperation, PersistenceError};
use serde_json::json;

/// Service tests against a mocked store.
///
/// The mock answers each store request from a queue, so these tests pin down exactly which
/// calls the service makes, in which order, and how it reacts to failures a real store only
/// produces under load or on a broken disk.
fn service(mock: &MockClient<Command>) -> CommandService {
    CommandService::new(CommandClient::new(mock.client()), FieldLimits::default())
}

fn stored() -> Command {
    Command {
        id: CommandId(3),
        how_to: "old".to_string(),
        platform: "linux".to_string(),
        command_line: "ls".to_string(),
    }
}

fn storage_error() -> FrameworkError {
    FrameworkError::Storage(PersistenceError::Rejected("disk full".to_string()))
}

#[tokio::test]
async fn test_patch_fetches_replaces_and_commits() {
    let mut mock = MockClient::<Command>::new();
    mock.expect_get(CommandId(3)).return_ok(Some(stored()));
    mock.expect_replace(CommandId(3)).return_ok(());
    mock.expect_commit().return_ok(());

    let operations = [PatchOperation::Replace {
        path: "/howto".to_string(),
        value: json!("newval"),
    }];
    service(&mock)
        .patch(CommandId(3), &operations)
        .await
        .unwrap();

    assert_eq!(
        mock.replaced(),
        vec![Command {
            how_to: "newval".to_string(),
            ..stored()
        }]
    );
    mock.verify();
}

#[tokio::test]
async fn test_rejected_patch_never_reaches_the_store() {
    let mut mock = MockClient::<Command>::new();
    mock.expect_get(CommandId(3)).return_ok(Some(stored()));

    let operations = [PatchOperation::Remove {
        path: "/nonexistentfield".to_string(),
    }];
    let result = service(&mock).patch(CommandId(3), &operations).await;

    assert!(matches!(result, Err(CommandError::PatchFailed(_))));
    assert!(mock.replaced().is_empty());
    mock.verify();
}

#[tokio::test]
async fn test_invalid_replace_never_reaches_the_store() {
    let mut mock = MockClient::<Command>::new();
    mock.expect_get(CommandId(3)).return_ok(Some(stored()));

    let result = service(&mock)
        .replace(CommandId(3), CommandUpdate::default())
        .await;

    match result {
        Err(CommandError::ValidationFailed(errors)) => assert_eq!(errors.violations().len(), 3),
        other => panic!("expected validation failure, got {other:?}"),
    }
    mock.verify();
}

#[tokio::test]
async fn test_missing_command_stops_every_update() {
    let mut mock = MockClient::<Command>::new();
    mock.expect_get(CommandId(8)).return_ok(None);
    mock.expect_get(CommandId(8)).return_ok(None);
    mock.expect_get(CommandId(8)).return_ok(None);

    let service = service(&mock);
    assert_eq!(
        service.patch(CommandId(8), &[]).await,
        Err(CommandError::NotFound(CommandId(8)))
    );
    assert_eq!(
        service.replace(CommandId(8), CommandUpdate::default()).await,
        Err(CommandError::NotFound(CommandId(8)))
    );
    assert_eq!(
        service.delete(CommandId(8)).await,
        Err(CommandError::NotFound(CommandId(8)))
    );
    mock.verify();
}

#[tokio::test]
async fn test_commit_failure_is_storage_failed() {
    let mut mock = MockClient::<Command>::new();
    mock.expect_get(CommandId(3)).return_ok(Some(stored()));
    mock.expect_replace(CommandId(3)).return_ok(());
    mock.expect_commit().return_err(storage_error());

    let update = CommandUpdate {
        how_to: "new".to_string(),
        platform: "linux".to_string(),
        command_line: "ls -la".to_string(),
    };
    let result = service(&mock).replace(CommandId(3), update).await;

    assert!(matches!(
        result,
        Err(CommandError::StorageFailed(message)) if message.contains("disk full")
    ));
    mock.verify();
}

#[tokio::test]
async fn test_create_commits_and_returns_read_shape() {
    let mut mock = MockClient::<Command>::new();
    mock.expect_create().return_ok(stored());
    mock.expect_commit().return_ok(());

    let created = service(&mock)
        .create(CommandCreate {
            how_to: "old".to_string(),
            platform: "linux".to_string(),
            command_line: "ls".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(created.id, CommandId(3));
    mock.verify();
}

#[tokio::test]
async fn test_delete_removed_concurrently_is_not_found() {
    let mut mock = MockClient::<Command>::new();
    mock.expect_get(CommandId(3)).return_ok(Some(stored()));
    mock.expect_delete(CommandId(3))
        .return_err(FrameworkError::NotFound("3".to_string()));

    let result = service(&mock).delete(CommandId(3)).await;
    assert_eq!(result, Err(CommandError::NotFound(CommandId(3))));
    mock.verify();
}

#[tokio::test]
async fn test_closed_store_is_a_communication_error() {
    let mut mock = MockClient::<Command>::new();
    mock.expect_list().return_err(FrameworkError::ActorClosed);

    let result = service(&mock).list().await;
    assert!(matches!(
        result,
        Err(CommandError::ActorCommunicationError(_))
    ));
    mock.verify();
}
