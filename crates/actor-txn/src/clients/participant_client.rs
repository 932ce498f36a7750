//! # Participant Client
//!
//! Provides a high‑level API for interacting with one participant actor.
//! It wraps an `ActorRef<ParticipantEntity<K>>` and implements the [`Participant`] contract on
//! top of it, which is how the coordinator reaches participant actors.
use crate::model::{Decision, EntityKind, FieldMap, Operation, TxnId};
use crate::participant::Participant;
use crate::participant_actor::{
    ParticipantAction, ParticipantActionResult, ParticipantEntity, ParticipantError,
};
use actor_runtime::{ActorClient, ActorRef, FrameworkError};
use async_trait::async_trait;
use std::fmt;
use tracing::{debug, instrument};

/// Client for interacting with a participant actor of kind `K`.
pub struct ParticipantClient<K: EntityKind> {
    inner: ActorRef<ParticipantEntity<K>>,
}

impl<K: EntityKind> Clone for ParticipantClient<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: EntityKind> fmt::Debug for ParticipantClient<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantClient({}/{})", K::KIND, self.inner.id())
    }
}

impl<K: EntityKind> ParticipantClient<K> {
    pub fn new(inner: ActorRef<ParticipantEntity<K>>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> &K::Id {
        self.inner.id()
    }

    /// Committed values and versions of the named fields. Fields the participant does not have
    /// are left out of the result.
    #[instrument(skip(self), fields(participant = %self.name()))]
    pub async fn read(&self, names: &[&str]) -> Result<FieldMap, ParticipantError> {
        debug!("Reading fields");
        let names = names.iter().map(|name| name.to_string()).collect();
        match self.inner.call(ParticipantAction::GetMultiple(names)).await {
            Ok(ParticipantActionResult::GetMultiple(fields)) => Ok(fields),
            Ok(other) => Err(unexpected(other)),
            Err(e) => Err(Self::map_error(e)),
        }
    }
}

fn unexpected(result: ParticipantActionResult) -> ParticipantError {
    ParticipantError::ActorCommunication(format!("unexpected reply {result:?}"))
}

#[async_trait]
impl<K: EntityKind> Participant for ParticipantClient<K> {
    fn name(&self) -> String {
        format!("{}/{}", K::KIND, self.inner.id())
    }

    async fn prepare(&self, txn_id: &TxnId, operation: &Operation) -> Result<bool, ParticipantError> {
        debug!(participant = %self.name(), %txn_id, "Sending prepare");
        let action = ParticipantAction::Prepare {
            txn_id: *txn_id,
            operation: operation.clone(),
        };
        match self.inner.call(action).await {
            Ok(ParticipantActionResult::Prepare(vote)) => Ok(vote),
            Ok(other) => Err(unexpected(other)),
            Err(e) => Err(Self::map_error(e)),
        }
    }

    async fn commit(
        &self,
        txn_id: &TxnId,
        decision: Decision,
        operation: &Operation,
    ) -> Result<(), ParticipantError> {
        debug!(participant = %self.name(), %txn_id, %decision, "Sending commit");
        let action = ParticipantAction::Commit {
            txn_id: *txn_id,
            decision,
            operation: operation.clone(),
        };
        match self.inner.call(action).await {
            Ok(ParticipantActionResult::Commit(())) => Ok(()),
            Ok(other) => Err(unexpected(other)),
            Err(e) => Err(Self::map_error(e)),
        }
    }
}

#[async_trait]
impl<K: EntityKind> ActorClient<ParticipantEntity<K>> for ParticipantClient<K> {
    type Error = ParticipantError;

    fn inner(&self) -> &ActorRef<ParticipantEntity<K>> {
        &self.inner
    }

    /// Errors raised by the participant itself come back as they were; everything else is a
    /// communication failure.
    fn map_error(e: FrameworkError) -> Self::Error {
        e.into_entity_error::<ParticipantError>()
            .unwrap_or_else(|e| ParticipantError::ActorCommunication(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Customer, CustomerId, Warehouse, WarehouseId};
    use actor_runtime::mock::{create_mock_ref, expect_action, MockActor};

    #[tokio::test]
    async fn test_prepare_returns_the_vote() {
        let (actor_ref, mut receiver) = create_mock_ref::<ParticipantEntity<Warehouse>>(WarehouseId(1), 10);
        let client = ParticipantClient::new(actor_ref);
        let txn = TxnId::new();
        let op = Operation::new().write("ytd", 10, 0);

        let expected_op = op.clone();
        let prepare_task = tokio::spawn(async move { client.prepare(&txn, &op).await });

        let (action, responder) = expect_action(&mut receiver)
            .await
            .expect("Expected Action request");
        assert_eq!(
            action,
            ParticipantAction::Prepare {
                txn_id: txn,
                operation: expected_op
            }
        );
        responder
            .expect("prepare is a call")
            .send(Ok(ParticipantActionResult::Prepare(false)))
            .unwrap();

        assert!(!prepare_task.await.unwrap().unwrap());
    }

    #[tokio::test]
    async fn test_participant_errors_are_recovered() {
        let mut mock = MockActor::<ParticipantEntity<Customer>>::new(CustomerId::new(1, 1, 1));
        let txn = TxnId::new();
        mock.expect_action()
            .return_err(FrameworkError::EntityError(Box::new(ParticipantError::NotPrepared(txn))));

        let client = ParticipantClient::new(mock.actor_ref());
        let result = client.commit(&txn, Decision::Commit, &Operation::new()).await;

        assert!(matches!(result, Err(ParticipantError::NotPrepared(id)) if id == txn));
        mock.verify();
    }

    #[tokio::test]
    async fn test_runtime_errors_become_communication_errors() {
        let mut mock = MockActor::<ParticipantEntity<Customer>>::new(CustomerId::new(1, 1, 1));
        mock.expect_action().return_err(FrameworkError::ActorClosed);

        let client = ParticipantClient::new(mock.actor_ref());
        let result = client.prepare(&TxnId::new(), &Operation::new()).await;

        assert!(matches!(result, Err(ParticipantError::ActorCommunication(_))));
        mock.verify();
    }

    #[tokio::test]
    async fn test_read_and_name() {
        let mut mock = MockActor::<ParticipantEntity<Warehouse>>::new(WarehouseId(7));
        mock.expect_action()
            .return_ok(ParticipantActionResult::GetMultiple(Warehouse::initial_fields()));

        let client = ParticipantClient::new(mock.actor_ref());
        assert_eq!(client.name(), "Warehouse/7");

        let fields = client.read(&["ytd"]).await.unwrap();
        assert_eq!(fields["ytd"].val, 30_000_000);
        assert_eq!(
            mock.received_actions(),
            vec![ParticipantAction::GetMultiple(vec!["ytd".to_string()])]
        );
        mock.verify();
    }
}
