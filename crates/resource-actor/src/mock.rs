//! # Mock Store & Testing Guide
//!
//! `MockClient<T>` hands out a real [`ResourceClient<T>`] whose requests are answered from a
//! queue of expectations instead of a running store. Code that sits *on top of* the store
//! (services, orchestration, error mapping) can then be tested deterministically, including
//! failures that are awkward to provoke with a real actor.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockClient | Real Actor |
//! |---------|------------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves tokio spawn) |
//! | **Determinism** | 100% Deterministic | Subject to scheduler |
//! | **State** | No real state (expectations) | Real state management |
//! | **Use Case** | Testing logic *around* the client | Testing the store or full system |
//! | **Error Injection** | Easy (`return_err`) | Needs a failing persistence backend |
//!
//! ## Example
//!
//! ```rust
//! use resource_actor::mock::MockClient;
//! use resource_actor::{FrameworkError, ResourceEntity};
//!
//! #[derive(Clone, Debug, PartialEq)] struct Note { id: u32 }
//! #[derive(Debug, thiserror::Error)] #[error("note error")] struct NoteError;
//!
//! impl ResourceEntity for Note {
//!     type Id = u32;
//!     type Create = ();
//!     type Error = NoteError;
//!     fn from_create_params(id: u32, _: ()) -> Result<Self, NoteError> { Ok(Self { id }) }
//!     fn id(&self) -> u32 { self.id }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockClient::<Note>::new();
//!     mock.expect_get(1).return_ok(Some(Note { id: 1 }));
//!     mock.expect_commit().return_err(FrameworkError::ActorClosed);
//!
//!     let client = mock.client();
//!     assert_eq!(client.get(1).await.unwrap(), Some(Note { id: 1 }));
//!     assert!(matches!(client.commit().await, Err(FrameworkError::ActorClosed)));
//!
//!     mock.verify();
//! }
//! ```
//!
//! Expectations are consumed in order. A request that does not match the next expectation
//! (wrong operation or wrong ID) panics the mock task, which the caller observes as
//! [`FrameworkError::ActorDropped`].

use crate::client::ResourceClient;
use crate::entity::ResourceEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Revision};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the response the mock answers it with.
enum Expectation<T: ResourceEntity> {
    Get {
        id: T::Id,
        response: Result<Option<T>, FrameworkError>,
    },
    Create {
        response: Result<T, FrameworkError>,
    },
    Replace {
        id: T::Id,
        response: Result<(), FrameworkError>,
    },
    Delete {
        id: T::Id,
        response: Result<(), FrameworkError>,
    },
    List {
        response: Result<Vec<T>, FrameworkError>,
    },
    Commit {
        response: Result<(), FrameworkError>,
    },
}

type ExpectationQueue<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

fn check_id<T: ResourceEntity>(operation: &str, expected: T::Id, requested: T::Id) {
    assert_eq!(
        expected, requested,
        "{operation} requested for {requested}, expected {expected}"
    );
}

/// A mock store with expectation tracking for fluent testing.
pub struct MockClient<T: ResourceEntity> {
    client: ResourceClient<T>,
    expectations: ExpectationQueue<T>,
    replaced: Arc<Mutex<Vec<T>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ResourceEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ResourceEntity> MockClient<T> {
    /// Creates a new mock client with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: ExpectationQueue<T> = Arc::new(Mutex::new(VecDeque::new()));
        let replaced = Arc::new(Mutex::new(Vec::new()));
        let expectations_clone = expectations.clone();
        let replaced_clone = replaced.clone();

        // Spawn background task to answer requests
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        ResourceRequest::Get { id, respond_to },
                        Some(Expectation::Get {
                            id: expected,
                            response,
                        }),
                    ) => {
                        check_id::<T>("Get", expected, id);
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Create { respond_to, .. },
                        Some(Expectation::Create { response }),
                    ) => {
                        let _ = respond_to.send(response.map(|item| (item, Revision::default())));
                    }
                    (
                        ResourceRequest::Replace {
                            id,
                            entity,
                            respond_to,
                        },
                        Some(Expectation::Replace {
                            id: expected,
                            response,
                        }),
                    ) => {
                        check_id::<T>("Replace", expected, id);
                        replaced_clone.lock().unwrap().push(entity);
                        let _ = respond_to.send(response.map(|()| Revision::default()));
                    }
                    (
                        ResourceRequest::Delete { id, respond_to },
                        Some(Expectation::Delete {
                            id: expected,
                            response,
                        }),
                    ) => {
                        check_id::<T>("Delete", expected, id);
                        let _ = respond_to.send(response.map(|()| Revision::default()));
                    }
                    (ResourceRequest::List { respond_to }, Some(Expectation::List { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Commit { respond_to, .. },
                        Some(Expectation::Commit { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {request:?}");
                    }
                }
            }
        });

        Self {
            client: ResourceClient::new(sender),
            expectations,
            replaced,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self, id: T::Id) -> GetExpectationBuilder<T> {
        GetExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `create` operation.
    pub fn expect_create(&mut self) -> CreateExpectationBuilder<T> {
        CreateExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `replace` operation. The entity sent is recorded, see [`replaced`](Self::replaced).
    pub fn expect_replace(&mut self, id: T::Id) -> ReplaceExpectationBuilder<T> {
        ReplaceExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `delete` operation.
    pub fn expect_delete(&mut self, id: T::Id) -> DeleteExpectationBuilder<T> {
        DeleteExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `list` operation.
    pub fn expect_list(&mut self) -> ListExpectationBuilder<T> {
        ListExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `commit` operation.
    pub fn expect_commit(&mut self) -> CommitExpectationBuilder<T> {
        CommitExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Entities received by `replace` requests, in arrival order.
    pub fn replaced(&self) -> Vec<T> {
        self.replaced.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Generates `<Variant>ExpectationBuilder` with `return_ok` / `return_err`.
macro_rules! expectation_builder {
    ($variant:ident, $ok:ty $(, $id:ident)?) => {
        paste::paste! {
            #[doc = concat!("Builder for `", stringify!($variant), "` expectations.")]
            pub struct [<$variant ExpectationBuilder>]<T: ResourceEntity> {
                $($id: T::Id,)?
                expectations: ExpectationQueue<T>,
            }

            impl<T: ResourceEntity> [<$variant ExpectationBuilder>]<T> {
                /// Sets the expectation to return a successful result.
                pub fn return_ok(self, value: $ok) {
                    self.push(Ok(value));
                }

                /// Sets the expectation to return an error.
                pub fn return_err(self, error: FrameworkError) {
                    self.push(Err(error));
                }

                fn push(self, response: Result<$ok, FrameworkError>) {
                    let mut exps = self.expectations.lock().unwrap();
                    exps.push_back(Expectation::$variant {
                        $($id: self.$id,)?
                        response,
                    });
                }
            }
        }
    };
}

expectation_builder!(Get, Option<T>, id);
expectation_builder!(Create, T);
expectation_builder!(Replace, (), id);
expectation_builder!(Delete, (), id);
expectation_builder!(List, Vec<T>);
expectation_builder!(Commit, ());

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: u32,
        text: String,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("note error")]
    struct NoteError;

    impl ResourceEntity for Note {
        type Id = u32;
        type Create = String;
        type Error = NoteError;

        fn from_create_params(id: u32, text: String) -> Result<Self, Self::Error> {
            Ok(Self { id, text })
        }

        fn id(&self) -> u32 {
            self.id
        }
    }

    fn note(id: u32, text: &str) -> Note {
        Note {
            id,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_client_with_expectations() {
        let mut mock = MockClient::<Note>::new();
        mock.expect_create().return_ok(note(1, "first"));
        mock.expect_replace(1).return_ok(());
        mock.expect_commit().return_ok(());
        mock.expect_list().return_ok(vec![note(1, "second")]);

        let client = mock.client();
        let (created, _) = client.create("first".to_string()).await.unwrap();
        assert_eq!(created.id, 1);

        let revision = client.replace(1, note(1, "second")).await.unwrap();
        client.commit_through(revision).await.unwrap();
        assert_eq!(client.list().await.unwrap(), vec![note(1, "second")]);

        assert_eq!(mock.replaced(), vec![note(1, "second")]);
        mock.verify();
    }

    #[tokio::test]
    async fn test_mock_client_error_injection() {
        let mut mock = MockClient::<Note>::new();
        mock.expect_delete(7)
            .return_err(FrameworkError::NotFound("7".to_string()));

        let result = mock.client().delete(7).await;
        assert!(matches!(result, Err(FrameworkError::NotFound(id)) if id == "7"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_unexpected_request_drops_response() {
        let mut mock = MockClient::<Note>::new();
        mock.expect_get(1).return_ok(None);

        // Wrong operation: the mock task panics and the response channel is dropped
        let result = mock.client().commit().await;
        assert!(matches!(result, Err(FrameworkError::ActorDropped)));
    }
}
