//! # Transaction Client
//!
//! Provides a high‑level API for interacting with one coordinator instance.
//! It wraps an `ActorRef<Transaction>` and hides the action/result enums.
use crate::model::{Decision, Operation};
use crate::participant::ParticipantHandle;
use crate::transaction_actor::{
    TransactRequest, Transaction, TransactionAction, TransactionActionResult, TransactionError,
    TransactionRecord,
};
use actor_runtime::{ActorClient, ActorRef, FrameworkError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

const COMPLETION_POLL: Duration = Duration::from_millis(10);

/// Client for interacting with a Transaction actor.
#[derive(Clone, Debug)]
pub struct TransactionClient {
    inner: ActorRef<Transaction>,
}

impl TransactionClient {
    pub fn new(inner: ActorRef<Transaction>) -> Self {
        Self { inner }
    }

    /// Instance name of the coordinator.
    pub fn name(&self) -> &str {
        self.inner.id()
    }

    /// Runs the commit protocol over `participants`, `operations[i]` going to `participants[i]`.
    ///
    /// Returns once the decision is durable. The commit phase continues in the background;
    /// use [`TransactionClient::await_completion`] to wait for it.
    #[instrument(skip(self, participants, operations), fields(txn = %self.name(), n = participants.len()))]
    pub async fn transact(
        &self,
        participants: Vec<ParticipantHandle>,
        operations: Vec<Operation>,
    ) -> Result<Decision, TransactionError> {
        debug!(?operations, "Sending transact");
        let request = TransactRequest::new(participants, operations);
        match self.inner.call(TransactionAction::Transact(request)).await {
            Ok(TransactionActionResult::Transact(decision)) => {
                info!(%decision, "Transaction decided");
                Ok(decision)
            }
            Ok(other) => Err(unexpected(other)),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// Whether every participant has acknowledged the decision.
    pub async fn is_complete(&self) -> Result<bool, TransactionError> {
        match self.inner.call(TransactionAction::IsComplete).await {
            Ok(TransactionActionResult::IsComplete(complete)) => Ok(complete),
            Ok(other) => Err(unexpected(other)),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    /// The coordinator's durable record as it is now.
    pub async fn record(&self) -> Result<TransactionRecord, TransactionError> {
        self.snapshot().await.map(|txn| txn.record)
    }

    /// Polls until the commit phase is complete or `deadline` has passed. Returns the last
    /// observed completion flag.
    #[instrument(skip(self), fields(txn = %self.name()))]
    pub async fn await_completion(&self, deadline: Duration) -> Result<bool, TransactionError> {
        let give_up = Instant::now() + deadline;
        loop {
            if self.is_complete().await? {
                return Ok(true);
            }
            if Instant::now() >= give_up {
                debug!("Still incomplete at deadline");
                return Ok(false);
            }
            tokio::time::sleep(COMPLETION_POLL).await;
        }
    }
}

fn unexpected(result: TransactionActionResult) -> TransactionError {
    TransactionError::ActorCommunication(format!("unexpected reply {result:?}"))
}

#[async_trait]
impl ActorClient<Transaction> for TransactionClient {
    type Error = TransactionError;

    fn inner(&self) -> &ActorRef<Transaction> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.into_entity_error::<TransactionError>()
            .unwrap_or_else(|e| TransactionError::ActorCommunication(e.to_string()))
    }
}
