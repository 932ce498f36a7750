//! # ActorClient Trait
//!
//! Provides a common interface for kind‑specific clients, adding a default `snapshot` method
//! built on top of a generic [`ActorRef`].
use crate::{ActorEntity, ActorRef, FrameworkError};
use async_trait::async_trait;

/// Trait for kind-specific clients to inherit standard operations.
///
/// # Example
///
/// ```rust,ignore
/// struct CounterClient {
///     inner: ActorRef<Counter>,
/// }
///
/// #[async_trait]
/// impl ActorClient<Counter> for CounterClient {
///     type Error = CounterError;
///
///     fn inner(&self) -> &ActorRef<Counter> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         CounterError::Actor(e.to_string())
///     }
/// }
///
/// // snapshot() is provided automatically
/// let counter = client.snapshot().await?;
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The kind-specific error type.
    type Error: Send + Sync;

    /// Access the inner reference.
    fn inner(&self) -> &ActorRef<T>;

    /// Map runtime errors to the kind-specific error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch a snapshot of the instance.
    #[tracing::instrument(skip(self))]
    async fn snapshot(&self) -> Result<T, Self::Error> {
        tracing::debug!(entity_type = T::KIND, id = %self.inner().id(), "Sending request");
        self.inner().get().await.map_err(Self::map_error)
    }
}
