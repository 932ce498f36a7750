//! Actions for the Transaction actor.
//!
//! Only [`TransactionAction::Transact`] and [`TransactionAction::IsComplete`] are meant for
//! callers. The coordinator tells itself the other two to run the commit phase off the
//! caller's path.

use crate::model::{Decision, Operation};
use crate::participant::ParticipantHandle;
use std::fmt;

/// The participants of one transaction and what each of them is asked to do.
/// `operations[i]` is applied by `participants[i]`.
#[derive(Clone)]
pub struct TransactRequest {
    pub participants: Vec<ParticipantHandle>,
    pub operations: Vec<Operation>,
}

impl TransactRequest {
    pub fn new(participants: Vec<ParticipantHandle>, operations: Vec<Operation>) -> Self {
        Self {
            participants,
            operations,
        }
    }
}

impl fmt::Debug for TransactRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.participants.iter().map(|p| p.name()).collect();
        f.debug_struct("TransactRequest")
            .field("participants", &names)
            .field("operations", &self.operations)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum TransactionAction {
    /// Run the protocol (or resume it) and answer with the decision.
    Transact(TransactRequest),
    /// `Transact` re-sent after a failed commit round; `attempt` counts retries from 1.
    Retry {
        request: TransactRequest,
        attempt: u32,
    },
    /// One commit round for the recorded decision.
    SendCommit {
        request: TransactRequest,
        attempt: u32,
    },
    /// Whether every participant acknowledged the decision.
    IsComplete,
}

/// Results from TransactionActions - variants match 1:1 with TransactionAction
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionActionResult {
    Transact(Decision),
    Retry(Decision),
    SendCommit(()),
    IsComplete(bool),
}
