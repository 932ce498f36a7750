//! Custom actions for the participant actors.
//!
//! The two protocol operations plus a plain read used by drivers to compute their updates.
//! Reads are not part of the protocol: they see committed values only and take no locks.

use crate::model::{Decision, FieldMap, Operation, TxnId};

/// Actions understood by every participant kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ParticipantAction {
    /// Validate and stage an update. Answered with the vote.
    Prepare {
        txn_id: TxnId,
        operation: Operation,
    },
    /// Apply or discard the staged update of `txn_id`.
    Commit {
        txn_id: TxnId,
        decision: Decision,
        operation: Operation,
    },
    /// Read the committed value and version of the named fields. Unknown names are skipped.
    GetMultiple(Vec<String>),
}

/// Results from ParticipantActions - variants match 1:1 with ParticipantAction
#[derive(Debug, Clone, PartialEq)]
pub enum ParticipantActionResult {
    Prepare(bool),
    Commit(()),
    GetMultiple(FieldMap),
}
