//! Error types for the Transaction actor.

use actor_runtime::StateError;
use thiserror::Error;

/// Errors that can occur while coordinating a transaction.
///
/// An abort is not an error: it is a [`Decision`](crate::model::Decision).
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Participants and operations must pair up one to one.
    #[error("{participants} participants but {operations} operations")]
    LengthMismatch {
        participants: usize,
        operations: usize,
    },

    /// The coordinator record could not be read or persisted.
    #[error("Transaction state error: {0}")]
    State(#[from] StateError),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunication(String),
}

impl From<String> for TransactionError {
    fn from(msg: String) -> Self {
        TransactionError::ActorCommunication(msg)
    }
}
