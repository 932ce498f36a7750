//! ActorEntity implementation shared by every participant kind.
//!
//! One generic entity, parameterised by an [`EntityKind`], hosts the [`ParticipantLedger`].
//! Each change is written to the instance's state before it is applied and before the reply
//! goes out, so a vote or an applied commit survives a crash.

use super::actions::{ParticipantAction, ParticipantActionResult};
use super::error::ParticipantError;
use super::ledger::{LedgerChange, ParticipantLedger, PrepareOutcome};
use crate::model::EntityKind;
use actor_runtime::{ActorContext, ActorEntity, ActorState};
use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, info};

pub struct ParticipantEntity<K: EntityKind> {
    pub ledger: ParticipantLedger,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EntityKind> ParticipantEntity<K> {
    fn from_ledger(ledger: ParticipantLedger) -> Self {
        Self {
            ledger,
            _kind: PhantomData,
        }
    }

    async fn persist(
        &mut self,
        change: LedgerChange,
        state: &ActorState,
    ) -> Result<(), ParticipantError> {
        let write = change.to_write()?;
        state.set_multiple(write.set).await?;
        for key in &write.remove {
            state.remove(key).await?;
        }
        self.ledger.apply(change);
        Ok(())
    }
}

impl<K: EntityKind> Clone for ParticipantEntity<K> {
    fn clone(&self) -> Self {
        Self::from_ledger(self.ledger.clone())
    }
}

impl<K: EntityKind> fmt::Debug for ParticipantEntity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::KIND).field("ledger", &self.ledger).finish()
    }
}

#[async_trait]
impl<K: EntityKind> ActorEntity for ParticipantEntity<K> {
    const KIND: &'static str = K::KIND;
    type Id = K::Id;
    type Action = ParticipantAction;
    type ActionResult = ParticipantActionResult;
    type Context = ();
    type Error = ParticipantError;

    /// Loads the ledger, or initializes and persists the kind's default fields.
    async fn on_activate(
        id: K::Id,
        state: &ActorState,
        _ctx: &Self::Context,
    ) -> Result<Self, Self::Error> {
        if let Some(ledger) = ParticipantLedger::from_state(&state.get_all().await?)? {
            return Ok(Self::from_ledger(ledger));
        }
        let ledger = ParticipantLedger::new(K::initial_fields());
        state.set_multiple(ledger.to_state()?).await?;
        info!(entity_type = K::KIND, %id, "Initialized fields");
        Ok(Self::from_ledger(ledger))
    }

    async fn handle_action(
        &mut self,
        action: ParticipantAction,
        ctx: &ActorContext<'_, Self>,
    ) -> Result<ParticipantActionResult, Self::Error> {
        let entity_type = K::KIND;
        let id = ctx.id;
        match action {
            ParticipantAction::Prepare { txn_id, operation } => {
                let (outcome, change) = self.ledger.plan_prepare(&txn_id, &operation, K::validate);
                match &outcome {
                    PrepareOutcome::Staged => debug!(entity_type, %id, %txn_id, "Staged update"),
                    PrepareOutcome::Repeated(vote) => {
                        debug!(entity_type, %id, %txn_id, vote, "Repeated prepare")
                    }
                    PrepareOutcome::Rejected(reason) => {
                        info!(entity_type, %id, %txn_id, %reason, "Voted abort")
                    }
                }
                if let Some(change) = change {
                    self.persist(change, ctx.state).await?;
                }
                Ok(ParticipantActionResult::Prepare(outcome.vote()))
            }
            ParticipantAction::Commit {
                txn_id,
                decision,
                operation,
            } => {
                match self.ledger.plan_commit(&txn_id, decision, &operation)? {
                    Some(change) => {
                        self.persist(change, ctx.state).await?;
                        info!(entity_type, %id, %txn_id, %decision, "Finalized");
                    }
                    None => debug!(entity_type, %id, %txn_id, "Already finalized"),
                }
                Ok(ParticipantActionResult::Commit(()))
            }
            ParticipantAction::GetMultiple(names) => {
                Ok(ParticipantActionResult::GetMultiple(self.ledger.read(&names)))
            }
        }
    }
}
