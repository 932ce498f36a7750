//! # Runtime Errors
//!
//! This module defines the common error types used throughout the actor runtime.
//! By centralizing error definitions, we ensure consistent error handling across
//! all actors, clients and state stores.

use std::time::Duration;

/// Errors that can occur within the actor runtime itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("No reply within {0:?}")]
    Timeout(Duration),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
    #[error("Actor task failed: {0}")]
    TaskFailed(String),
}

impl FrameworkError {
    /// Recovers the entity's own error type from an [`FrameworkError::EntityError`].
    ///
    /// Returns the original error unchanged when it is not an entity error or
    /// when the boxed error is of a different type.
    pub fn into_entity_error<E>(self) -> Result<E, FrameworkError>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match self {
            FrameworkError::EntityError(inner) => inner
                .downcast::<E>()
                .map(|e| *e)
                .map_err(FrameworkError::EntityError),
            other => Err(other),
        }
    }
}

/// Errors raised by a [`StateStore`](crate::state::StateStore).
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("State serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("State I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Corrupt state for {key}: {reason}")]
    Corrupt { key: String, reason: String },
}
