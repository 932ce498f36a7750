//! Error types for the participant actors.

use crate::model::TxnId;
use actor_runtime::StateError;
use thiserror::Error;

/// Errors that can occur while a participant prepares or commits.
///
/// A refused update is not an error: `prepare` reports it as an abort vote.
#[derive(Debug, Error)]
pub enum ParticipantError {
    /// A commit decision arrived for a transaction this participant never staged.
    #[error("Transaction {0} was not prepared here")]
    NotPrepared(TxnId),

    /// The commit carries a different operation than the one staged at prepare time.
    #[error("Commit of transaction {0} does not match the prepared operation")]
    OperationMismatch(TxnId),

    /// The ledger could not be read or persisted.
    #[error("Participant state error: {0}")]
    State(#[from] StateError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunication(String),
}

impl From<String> for ParticipantError {
    fn from(msg: String) -> Self {
        ParticipantError::ActorCommunication(msg)
    }
}
