use resource_actor::{
    FrameworkError, MemoryPersistence, Persistence, ResourceActor, ResourceClient,
    ResourceEntity,
};
use std::sync::Arc;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Ticket {
    id: u32,
    title: String,
}

#[derive(Debug)]
struct TicketCreate {
    title: String,
}

#[derive(Debug, thiserror::Error)]
#[error("Ticket title must not be empty")]
struct TicketError;

impl ResourceEntity for Ticket {
    type Id = u32;
    type Create = TicketCreate;
    type Error = TicketError;

    fn from_create_params(id: u32, params: TicketCreate) -> Result<Self, Self::Error> {
        if params.title.is_empty() {
            return Err(TicketError);
        }
        Ok(Self {
            id,
            title: params.title,
        })
    }

    fn id(&self) -> u32 {
        self.id
    }
}

fn ticket(id: u32, title: &str) -> Ticket {
    Ticket {
        id,
        title: title.to_string(),
    }
}

fn spawn_store(
    table: Arc<MemoryPersistence<Ticket>>,
) -> (ResourceClient<Ticket>, tokio::task::JoinHandle<()>) {
    let (actor, client) = ResourceActor::<Ticket>::new(10, table);
    let handle = tokio::spawn(actor.run());
    (client, handle)
}

async fn create(client: &ResourceClient<Ticket>, title: &str) -> Ticket {
    client
        .create(TicketCreate {
            title: title.to_string(),
        })
        .await
        .unwrap()
        .0
}

// --- Tests ---

#[tokio::test]
async fn test_store_full_lifecycle() {
    let table = Arc::new(MemoryPersistence::new());
    let (client, handle) = spawn_store(table.clone());

    // 1. Create
    let created = create(&client, "first").await;
    assert_eq!(created, ticket(1, "first"));

    // 2. Replace
    client.replace(1, ticket(1, "renamed")).await.unwrap();
    assert_eq!(client.get(1).await.unwrap(), Some(ticket(1, "renamed")));

    // 3. Nothing is durable before commit
    assert!(table.rows().is_empty());
    client.commit().await.unwrap();
    assert_eq!(table.rows(), vec![ticket(1, "renamed")]);

    // 4. Delete
    client.delete(1).await.unwrap();
    client.commit().await.unwrap();
    assert!(client.get(1).await.unwrap().is_none());
    assert!(table.rows().is_empty());

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_ids_are_never_reused() {
    let (client, _handle) = spawn_store(Arc::new(MemoryPersistence::new()));

    create(&client, "a").await;
    let second = create(&client, "b").await;
    client.delete(second.id).await.unwrap();

    let third = create(&client, "c").await;
    assert_eq!(third.id, 3);

    let ids: Vec<u32> = client.list().await.unwrap().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let (client, _handle) = spawn_store(Arc::new(MemoryPersistence::new()));

    assert!(client.get(42).await.unwrap().is_none());
    assert!(matches!(
        client.replace(42, ticket(42, "x")).await,
        Err(FrameworkError::NotFound(_))
    ));
    assert!(matches!(
        client.delete(42).await,
        Err(FrameworkError::NotFound(_))
    ));

    // Double delete
    create(&client, "once").await;
    client.delete(1).await.unwrap();
    assert!(matches!(
        client.delete(1).await,
        Err(FrameworkError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_replace_cannot_change_identity() {
    let (client, _handle) = spawn_store(Arc::new(MemoryPersistence::new()));
    create(&client, "mine").await;
    create(&client, "other").await;

    let result = client.replace(1, ticket(2, "hijack")).await;
    assert!(matches!(
        result,
        Err(FrameworkError::IdentityMismatch { .. })
    ));
    assert_eq!(client.get(1).await.unwrap(), Some(ticket(1, "mine")));
    assert_eq!(client.get(2).await.unwrap(), Some(ticket(2, "other")));
}

#[tokio::test]
async fn test_entity_error_is_reported() {
    let (client, _handle) = spawn_store(Arc::new(MemoryPersistence::new()));

    let result = client
        .create(TicketCreate {
            title: String::new(),
        })
        .await;
    assert!(matches!(result, Err(FrameworkError::EntityError(_))));
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_commit_rolls_back_working_state() {
    let table = Arc::new(MemoryPersistence::new());
    let (client, _handle) = spawn_store(table.clone());

    create(&client, "kept").await;
    client.commit().await.unwrap();

    table.set_failing(true);
    client.replace(1, ticket(1, "lost")).await.unwrap();
    create(&client, "also lost").await;

    let result = client.commit().await;
    assert!(matches!(result, Err(FrameworkError::Storage(_))));

    // Working state matches what was last committed
    assert_eq!(client.list().await.unwrap(), vec![ticket(1, "kept")]);
    assert_eq!(table.rows(), vec![ticket(1, "kept")]);

    // Pending changes were dropped, the counter kept moving
    table.set_failing(false);
    client.commit().await.unwrap();
    assert_eq!(table.commit_count(), 1);
    assert_eq!(create(&client, "next").await.id, 3);
}

#[tokio::test]
async fn test_open_restores_rows_and_counter() {
    let table = Arc::new(MemoryPersistence::with_rows(vec![
        ticket(4, "four"),
        ticket(9, "nine"),
    ]));
    let rows = table.load().await.unwrap();
    assert_eq!(rows.len(), 2);

    let (actor, client) = ResourceActor::<Ticket>::open(10, table).await.unwrap();
    tokio::spawn(actor.run());

    assert_eq!(client.get(9).await.unwrap(), Some(ticket(9, "nine")));
    assert_eq!(create(&client, "ten").await.id, 10);
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let (client, _handle) = spawn_store(Arc::new(MemoryPersistence::new()));

    let mut handles = vec![];
    for i in 0..20 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .create(TicketCreate {
                    title: format!("t{i}"),
                })
                .await
                .unwrap()
                .0
                .id
        }));
    }

    let mut ids = vec![];
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<u32>>());
}

#[tokio::test]
async fn test_closed_actor_is_reported() {
    let (actor, client) = ResourceActor::<Ticket>::new(10, Arc::new(MemoryPersistence::new()));
    drop(actor);

    assert!(matches!(
        client.get(1).await,
        Err(FrameworkError::ActorClosed)
    ));
}

#[tokio::test]
async fn test_change_discarded_by_another_commit_is_reported() {
    let table = Arc::new(MemoryPersistence::new());
    let (client, _handle) = spawn_store(table.clone());
    create(&client, "old").await;
    client.commit().await.unwrap();

    // First request stages its write but has not committed yet
    let first = client.replace(1, ticket(1, "first write")).await.unwrap();

    // Second request commits while storage is down, dropping the first request's write too
    table.set_failing(true);
    assert!(matches!(
        client.commit().await,
        Err(FrameworkError::Storage(_))
    ));
    table.set_failing(false);

    let result = client.commit_through(first).await;
    assert!(matches!(result, Err(FrameworkError::ChangesDiscarded(r)) if r == first));
    assert_eq!(client.get(1).await.unwrap(), Some(ticket(1, "old")));
    assert_eq!(table.rows(), vec![ticket(1, "old")]);
}

#[tokio::test]
async fn test_change_committed_by_another_request_is_ok() {
    let table = Arc::new(MemoryPersistence::new());
    let (client, _handle) = spawn_store(table.clone());
    create(&client, "old").await;
    client.commit().await.unwrap();

    let first = client.replace(1, ticket(1, "first write")).await.unwrap();
    client.commit().await.unwrap();

    // A later failure must not taint a change that already reached storage
    let (_, second) = client
        .create(TicketCreate {
            title: "second".to_string(),
        })
        .await
        .unwrap();
    table.set_failing(true);
    assert!(client.commit_through(second).await.is_err());
    table.set_failing(false);

    client.commit_through(first).await.unwrap();
    assert_eq!(table.rows(), vec![ticket(1, "first write")]);
    assert_eq!(table.commit_count(), 2);
}

#[tokio::test]
async fn test_open_refuses_table_at_id_limit() {
    let table = Arc::new(MemoryPersistence::with_rows(vec![ticket(u32::MAX, "last")]));
    let result = ResourceActor::<Ticket>::open(10, table).await;
    assert!(matches!(result, Err(FrameworkError::IdsExhausted)));
}

#[tokio::test]
async fn test_create_stops_before_id_overflow() {
    let table = Arc::new(MemoryPersistence::with_rows(vec![ticket(u32::MAX - 2, "near")]));
    let (actor, client) = ResourceActor::<Ticket>::open(10, table).await.unwrap();
    tokio::spawn(actor.run());

    assert_eq!(create(&client, "fits").await.id, u32::MAX - 1);
    let result = client
        .create(TicketCreate {
            title: "overflow".to_string(),
        })
        .await;
    assert!(matches!(result, Err(FrameworkError::IdsExhausted)));
    assert_eq!(client.list().await.unwrap().len(), 2);
}
