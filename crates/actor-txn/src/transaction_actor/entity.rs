//! ActorEntity implementation for the transaction coordinator.
//!
//! One instance coordinates one transaction. Its persisted record has three fields:
//!
//! | Field | Value | Written |
//! |-------|-------|---------|
//! | `id` | transaction id (UUID) | on first activation |
//! | `decision` | `"commit"` / `"abort"` | once, after the prepare round |
//! | `commitComplete` | `true` | once, after every participant acknowledged |
//!
//! Because the decision is durable before any participant hears about it, a coordinator
//! re-activated after a crash never runs a second prepare round: it only resends the
//! decision.

use super::actions::{TransactRequest, TransactionAction, TransactionActionResult};
use super::error::TransactionError;
use super::rounds::{commit_round, prepare_round};
use crate::config::CoordinatorConfig;
use crate::model::{Decision, TxnId};
use actor_runtime::{ActorContext, ActorEntity, ActorState};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

const ID: &str = "id";
const DECISION: &str = "decision";
const COMMIT_COMPLETE: &str = "commitComplete";

/// The coordinator's durable record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TxnId,
    pub decision: Option<Decision>,
    #[serde(rename = "commitComplete")]
    pub commit_complete: bool,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub record: TransactionRecord,
}

type Ctx<'a> = ActorContext<'a, Transaction>;

impl Transaction {
    /// The `transact` entry point, for first calls and retries alike.
    async fn transact(
        &mut self,
        request: TransactRequest,
        attempt: u32,
        ctx: &Ctx<'_>,
    ) -> Result<Decision, TransactionError> {
        if request.participants.len() != request.operations.len() {
            return Err(TransactionError::LengthMismatch {
                participants: request.participants.len(),
                operations: request.operations.len(),
            });
        }

        let txn_id = self.record.id;
        let decision = match self.record.decision {
            Some(decision) if self.record.commit_complete => {
                debug!(%txn_id, %decision, "Already complete");
                return Ok(decision);
            }
            Some(decision) => {
                info!(%txn_id, %decision, attempt, "Resuming commit phase");
                decision
            }
            None => {
                let decision =
                    prepare_round(txn_id, &request, ctx.deps.call_timeout).await;
                self.record_decision(decision, ctx.state).await?
            }
        };

        dispatch(ctx, TransactionAction::SendCommit { request, attempt });
        Ok(decision)
    }

    /// Persists `proposed` unless a decision is already on record, which then wins.
    async fn record_decision(
        &mut self,
        proposed: Decision,
        state: &ActorState,
    ) -> Result<Decision, TransactionError> {
        let txn_id = self.record.id;
        let decision = match state.get::<Decision>(DECISION).await? {
            Some(existing) => {
                if existing != proposed {
                    warn!(%txn_id, %existing, %proposed, "Keeping decision already on record");
                }
                existing
            }
            None => {
                state.set(DECISION, &proposed).await?;
                proposed
            }
        };
        info!(%txn_id, %decision, "Decided");
        self.record.decision = Some(decision);
        Ok(decision)
    }

    /// One commit round. On failure, schedules a retry of `transact` after a backoff.
    async fn send_commit(
        &mut self,
        request: TransactRequest,
        attempt: u32,
        ctx: &Ctx<'_>,
    ) -> Result<(), TransactionError> {
        let txn_id = self.record.id;
        if self.record.commit_complete {
            return Ok(());
        }
        let Some(decision) = self.record.decision else {
            warn!(%txn_id, "Commit requested before a decision");
            return Ok(());
        };

        if commit_round(txn_id, decision, &request, ctx.deps.call_timeout).await {
            ctx.state.set(COMMIT_COMPLETE, &true).await?;
            self.record.commit_complete = true;
            info!(%txn_id, %decision, "Commit phase complete");
            return Ok(());
        }

        let retry = &ctx.deps.retry;
        let next = attempt + 1;
        if next > retry.max_attempts {
            error!(%txn_id, %decision, attempts = next, "Commit phase abandoned");
            return Ok(());
        }

        let delay = retry.backoff(next);
        warn!(%txn_id, attempt = next, delay_ms = delay.as_millis() as u64, "Retrying commit phase");
        let Some(myself) = ctx.myself() else {
            warn!(%txn_id, "Coordinator stopping, retry dropped");
            return Ok(());
        };
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = myself
                .tell(TransactionAction::Retry {
                    request,
                    attempt: next,
                })
                .await
            {
                debug!(%txn_id, error = %e, "Retry not delivered");
            }
        });
        Ok(())
    }
}

/// Tells `action` to the coordinator itself from a detached task. The handler that calls this
/// is still running, so sending inline could wait on its own full mailbox.
fn dispatch(ctx: &Ctx<'_>, action: TransactionAction) {
    let Some(myself) = ctx.myself() else {
        warn!(id = %ctx.id, "Coordinator stopping, commit phase not dispatched");
        return;
    };
    tokio::spawn(async move {
        if let Err(e) = myself.tell(action).await {
            debug!(error = %e, "Commit phase not delivered");
        }
    });
}

#[async_trait]
impl ActorEntity for Transaction {
    const KIND: &'static str = "Transaction";
    type Id = String;
    type Action = TransactionAction;
    type ActionResult = TransactionActionResult;
    type Context = CoordinatorConfig;
    type Error = TransactionError;

    /// Loads the record, assigning and persisting a fresh transaction id on first activation.
    async fn on_activate(
        name: String,
        state: &ActorState,
        _config: &CoordinatorConfig,
    ) -> Result<Self, Self::Error> {
        let id = match state.get::<TxnId>(ID).await? {
            Some(id) => id,
            None => {
                let id = TxnId::new();
                state.set(ID, &id).await?;
                info!(%name, txn_id = %id, "Assigned transaction id");
                id
            }
        };
        let record = TransactionRecord {
            id,
            decision: state.get(DECISION).await?,
            commit_complete: state.get(COMMIT_COMPLETE).await?.unwrap_or(false),
        };
        Ok(Self { record })
    }

    async fn handle_action(
        &mut self,
        action: TransactionAction,
        ctx: &ActorContext<'_, Self>,
    ) -> Result<TransactionActionResult, Self::Error> {
        match action {
            TransactionAction::Transact(request) => self
                .transact(request, 0, ctx)
                .await
                .map(TransactionActionResult::Transact),
            TransactionAction::Retry { request, attempt } => self
                .transact(request, attempt, ctx)
                .await
                .map(TransactionActionResult::Retry),
            TransactionAction::SendCommit { request, attempt } => self
                .send_commit(request, attempt, ctx)
                .await
                .map(TransactionActionResult::SendCommit),
            TransactionAction::IsComplete => Ok(TransactionActionResult::IsComplete(
                self.record.commit_complete,
            )),
        }
    }
}
