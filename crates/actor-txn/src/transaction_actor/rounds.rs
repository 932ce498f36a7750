//! The two fan-out rounds of the protocol.
//!
//! Every participant is called concurrently and every call is bounded by the same deadline.
//! Neither round ever fails: an error, a missed deadline or a panicked call task is folded
//! into the result (an abort vote, or a missing acknowledgement).

use super::actions::TransactRequest;
use crate::model::{Decision, TxnId};
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Asks every participant to prepare and combines the votes.
pub(crate) async fn prepare_round(
    txn_id: TxnId,
    request: &TransactRequest,
    deadline: Duration,
) -> Decision {
    let mut calls = JoinSet::new();
    for (participant, operation) in request.participants.iter().zip(&request.operations) {
        let participant = participant.clone();
        let operation = operation.clone();
        calls.spawn(async move {
            let name = participant.name();
            let vote = timeout(deadline, participant.prepare(&txn_id, &operation)).await;
            (name, vote)
        });
    }

    let mut votes = Vec::with_capacity(request.participants.len());
    while let Some(joined) = calls.join_next().await {
        let vote = match joined {
            Ok((name, Ok(Ok(vote)))) => {
                debug!(%txn_id, participant = %name, vote, "Vote");
                vote
            }
            Ok((name, Ok(Err(e)))) => {
                warn!(%txn_id, participant = %name, error = %e, "Prepare failed");
                false
            }
            Ok((name, Err(_))) => {
                warn!(%txn_id, participant = %name, ?deadline, "Prepare timed out");
                false
            }
            Err(e) => {
                warn!(%txn_id, error = %e, "Prepare task failed");
                false
            }
        };
        votes.push(vote);
    }

    let decision = Decision::from_votes(votes);
    info!(%txn_id, %decision, "Votes collected");
    decision
}

/// Sends `decision` to every participant. `true` only if all of them acknowledged it.
pub(crate) async fn commit_round(
    txn_id: TxnId,
    decision: Decision,
    request: &TransactRequest,
    deadline: Duration,
) -> bool {
    let mut calls = JoinSet::new();
    for (participant, operation) in request.participants.iter().zip(&request.operations) {
        let participant = participant.clone();
        let operation = operation.clone();
        calls.spawn(async move {
            let name = participant.name();
            let ack = timeout(deadline, participant.commit(&txn_id, decision, &operation)).await;
            (name, ack)
        });
    }

    let mut acked = true;
    while let Some(joined) = calls.join_next().await {
        match joined {
            Ok((name, Ok(Ok(())))) => debug!(%txn_id, participant = %name, "Commit acknowledged"),
            Ok((name, Ok(Err(e)))) => {
                warn!(%txn_id, participant = %name, error = %e, "Commit failed");
                acked = false;
            }
            Ok((name, Err(_))) => {
                warn!(%txn_id, participant = %name, ?deadline, "Commit timed out");
                acked = false;
            }
            Err(e) => {
                warn!(%txn_id, error = %e, "Commit task failed");
                acked = false;
            }
        }
    }
    acked
}
