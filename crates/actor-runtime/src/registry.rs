//! # Actor Registry
//!
//! The registry maps stable ids to running instances of one actor kind. Referencing an id for
//! the first time spawns its instance; every later reference reuses the same mailbox, which is
//! what serializes all invocations against one id.

use crate::actor::ResourceActor;
use crate::client::ActorRef;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::state::{ActorKey, ActorState, StateStore};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

struct Activation<T: ActorEntity> {
    actor_ref: ActorRef<T>,
    handle: JoinHandle<()>,
}

struct RegistryInner<T: ActorEntity> {
    actors: DashMap<T::Id, Activation<T>>,
    store: Arc<dyn StateStore>,
    context: Arc<T::Context>,
    mailbox_size: usize,
}

/// Keyed collection of actor instances of kind `T`.
///
/// Cheap to clone; clones share the same instances.
///
/// ```rust,ignore
/// let registry = ActorRegistry::<Counter>::new(store, (), 32);
/// let a = registry.actor_ref("a".to_string()); // spawns instance "a"
/// let again = registry.actor_ref("a".to_string()); // same mailbox
/// registry.shutdown().await?;
/// ```
pub struct ActorRegistry<T: ActorEntity> {
    inner: Arc<RegistryInner<T>>,
}

impl<T: ActorEntity> Clone for ActorRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ActorEntity> fmt::Debug for ActorRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorRegistry")
            .field("kind", &T::KIND)
            .field("active", &self.inner.actors.len())
            .finish()
    }
}

impl<T: ActorEntity> ActorRegistry<T> {
    /// # Arguments
    ///
    /// * `store` - Where instances of this kind persist their fields.
    /// * `context` - Dependencies injected into every instance.
    /// * `mailbox_size` - Capacity of each instance's mailbox.
    pub fn new(store: Arc<dyn StateStore>, context: T::Context, mailbox_size: usize) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                actors: DashMap::new(),
                store,
                context: Arc::new(context),
                mailbox_size,
            }),
        }
    }

    /// Reference to instance `id`, spawning it on first use.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn actor_ref(&self, id: T::Id) -> ActorRef<T> {
        if let Some(existing) = self.inner.actors.get(&id) {
            if !existing.actor_ref.is_closed() {
                return existing.actor_ref.clone();
            }
        }

        let mut entry = self.inner.actors.entry(id.clone()).or_insert_with(|| self.spawn(id.clone()));
        if entry.actor_ref.is_closed() {
            // The previous instance stopped (e.g. after shutdown); start a fresh one.
            *entry = self.spawn(id);
        }
        entry.actor_ref.clone()
    }

    fn spawn(&self, id: T::Id) -> Activation<T> {
        let state = ActorState::new(
            ActorKey::new(T::KIND, id.to_string()),
            self.inner.store.clone(),
        );
        let (actor, actor_ref) = ResourceActor::new(id.clone(), self.inner.mailbox_size, state);
        let handle = tokio::spawn(actor.run(self.inner.context.clone()));
        debug!(entity_type = T::KIND, %id, "Spawned");
        Activation { actor_ref, handle }
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.inner.actors.contains_key(id)
    }

    /// Number of instances spawned and not yet shut down.
    pub fn active_count(&self) -> usize {
        self.inner.actors.len()
    }

    /// Stops instance `id` after the messages already queued to it and forgets it.
    ///
    /// Returns `false` when no such instance is registered. The next [`ActorRegistry::actor_ref`]
    /// for `id` activates a fresh instance from the persisted fields; references obtained
    /// before this call fail with [`FrameworkError::ActorClosed`].
    pub async fn passivate(&self, id: &T::Id) -> Result<bool, FrameworkError> {
        let Some((id, activation)) = self.inner.actors.remove(id) else {
            return Ok(false);
        };
        let _ = activation.actor_ref.shutdown().await;
        drop(activation.actor_ref);
        activation.handle.await.map_err(|e| {
            error!(entity_type = T::KIND, %id, error = ?e, "Actor task failed");
            FrameworkError::TaskFailed(format!("{}/{}: {}", T::KIND, id, e))
        })?;
        debug!(entity_type = T::KIND, %id, "Passivated");
        Ok(true)
    }

    /// Stops every instance after the messages already queued to it, then waits for all of them.
    ///
    /// References held elsewhere stay valid as values, but calls through them fail with
    /// [`FrameworkError::ActorClosed`] once their instance has stopped.
    pub async fn shutdown(&self) -> Result<(), FrameworkError> {
        let ids: Vec<T::Id> = self
            .inner
            .actors
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        info!(entity_type = T::KIND, count = ids.len(), "Shutting down");

        let mut failures = Vec::new();
        for id in ids {
            let Some((_, activation)) = self.inner.actors.remove(&id) else {
                continue;
            };
            // An instance whose mailbox is already closed has nothing left to drain.
            let _ = activation.actor_ref.shutdown().await;
            drop(activation.actor_ref);
            if let Err(e) = activation.handle.await {
                error!(entity_type = T::KIND, %id, error = ?e, "Actor task failed");
                failures.push(format!("{}/{}: {}", T::KIND, id, e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(FrameworkError::TaskFailed(failures.join("; ")))
        }
    }
}
