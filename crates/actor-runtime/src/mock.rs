//! # Mock Actors & Testing Guide
//!
//! The [`MockActor<T>`] type hands out a real [`ActorRef<T>`], but the mailbox behind it is
//! served by a scripted task instead of a [`ResourceActor`](crate::ResourceActor). It lets you
//! queue the responses a test needs, so code written against an `ActorRef` (kind-specific
//! clients, coordinators) can be tested without activating anything or touching state.
//!
//! ## When to use Mocks vs Real Actors
//!
//! | Feature | MockActor | Real Actor |
//! |---------|-----------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but involves activation and state I/O) |
//! | **Determinism** | 100% Deterministic | Subject to scheduler |
//! | **State** | No real state (expectations) | Real persisted fields |
//! | **Use Case** | Unit testing logic *around* the reference | Testing the entity itself or full system |
//! | **Error Injection** | Easy (`return_err`) | Hard (requires specific state) |
//!
//! ## Testing Strategies
//!
//! 1. **Client logic test**: a [`MockActor`] with queued expectations behind a kind-specific
//!    client; assert on what the client makes of the replies.
//! 2. **Single kind test**: an [`ActorRegistry`](crate::ActorRegistry) over an
//!    [`InMemoryStateStore`](crate::InMemoryStateStore); drive one instance directly.
//! 3. **Full system test**: every kind wired together, the way the application does it.
//!
//! ## Testing Failure Scenarios
//!
//! Errors that are hard to provoke with real instances (a closed mailbox, a timeout) are one
//! `return_err` away:
//!
//! ```rust,ignore
//! let mut mock = MockActor::<Warehouse>::new("w1".to_string());
//! mock.expect_action().return_err(FrameworkError::ActorClosed);
//! let result = WarehouseClient::new(mock.actor_ref()).prepare(&txn, &op).await;
//! assert!(result.is_err());
//! mock.verify();
//! ```
//!
//! ## Mocking Utilities
//!
//! Use [`create_mock_ref`] to get a reference and the raw receiver, or use the fluent
//! [`MockActor`] API.

use crate::client::ActorRef;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::message::{ResourceRequest, Response};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected request and the response to give it.
enum Expectation<T: ActorEntity> {
    Get {
        response: Result<T, FrameworkError>,
    },
    Action {
        response: Result<T::ActionResult, FrameworkError>,
    },
}

type Expectations<T> = Arc<Mutex<VecDeque<Expectation<T>>>>;

/// A scripted actor instance with expectation tracking.
///
/// Requests are matched against expectations strictly in order. A request that does not match
/// the next expectation makes the serving task panic, which surfaces in the test as
/// [`FrameworkError::ActorDropped`] on the caller side and as a failed [`MockActor::verify`].
pub struct MockActor<T: ActorEntity> {
    actor_ref: ActorRef<T>,
    expectations: Expectations<T>,
    received: Arc<Mutex<Vec<T::Action>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: ActorEntity> MockActor<T>
where
    T::Action: Clone,
{
    /// Creates a mock instance with no expectations.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(id: T::Id) -> Self {
        let (sender, mut receiver) = mpsc::channel::<ResourceRequest<T>>(100);
        let expectations: Expectations<T> = Arc::new(Mutex::new(VecDeque::new()));
        let received = Arc::new(Mutex::new(Vec::new()));
        let expectations_clone = expectations.clone();
        let received_clone = received.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                if matches!(request, ResourceRequest::Shutdown) {
                    break;
                }
                let expectation = expectations_clone
                    .lock()
                    .expect("expectations lock poisoned")
                    .pop_front();

                match (request, expectation) {
                    (ResourceRequest::Get { respond_to }, Some(Expectation::Get { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        ResourceRequest::Action { action, respond_to },
                        Some(Expectation::Action { response }),
                    ) => {
                        received_clone
                            .lock()
                            .expect("received lock poisoned")
                            .push(action);
                        // A tell has nobody waiting for the scripted response.
                        if let Some(respond_to) = respond_to {
                            let _ = respond_to.send(response);
                        }
                    }
                    _ => {
                        panic!("Unexpected request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            actor_ref: ActorRef::new(id, sender),
            expectations,
            received,
            _handle: handle,
        }
    }

    /// Returns the reference for use in tests.
    pub fn actor_ref(&self) -> ActorRef<T> {
        self.actor_ref.clone()
    }

    /// Expects a `get` (snapshot) request.
    pub fn expect_get(&mut self) -> GetExpectationBuilder<T> {
        GetExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Expects an action, delivered by `call`, `call_async` or `tell`.
    pub fn expect_action(&mut self) -> ActionExpectationBuilder<T> {
        ActionExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Actions received so far, in arrival order.
    pub fn received_actions(&self) -> Vec<T::Action> {
        self.received
            .lock()
            .expect("received lock poisoned")
            .clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().expect("expectations lock poisoned");
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder<T: ActorEntity> {
    expectations: Expectations<T>,
}

impl<T: ActorEntity> GetExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T, FrameworkError>) {
        let mut exps = self.expectations.lock().expect("expectations lock poisoned");
        exps.push_back(Expectation::Get { response });
    }
}

/// Builder for `action` expectations.
pub struct ActionExpectationBuilder<T: ActorEntity> {
    expectations: Expectations<T>,
}

impl<T: ActorEntity> ActionExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, result: T::ActionResult) {
        self.push(Ok(result));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T::ActionResult, FrameworkError>) {
        let mut exps = self.expectations.lock().expect("expectations lock poisoned");
        exps.push_back(Expectation::Action { response });
    }
}

// =============================================================================
// RAW CHANNEL HELPERS
// =============================================================================

/// Creates a reference and the receiver of its mailbox, for asserting requests by hand.
///
/// # Testing Strategy
/// The test plays the instance: it pulls each request off `receiver`, inspects it, and answers
/// through the enclosed responder. This allows simulating success, failure and delays
/// deterministically, including replies that never come.
///
/// **Note**: Consider using [`MockActor`] for a more fluent API.
pub fn create_mock_ref<T: ActorEntity>(
    id: T::Id,
    buffer_size: usize,
) -> (ActorRef<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ActorRef::new(id, sender), receiver)
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<Response<T>> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request.
///
/// The responder is `None` when the action was sent with `tell`.
pub async fn expect_action<T: ActorEntity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Action, Option<Response<T::ActionResult>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { action, respond_to }) => Some((action, respond_to)),
        _ => None,
    }
}
