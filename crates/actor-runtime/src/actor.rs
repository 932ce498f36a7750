//! # Actor Instance Loop
//!
//! This module defines the `ResourceActor`, the "Server" side of one actor instance. It owns
//! the instance (once activated), the receiver end of its mailbox and a handle to its
//! persisted state, and processes messages strictly one at a time.

use crate::client::{ActorRef, WeakActorRef};
use crate::entity::{ActorContext, ActorEntity};
use crate::error::FrameworkError;
use crate::message::ResourceRequest;
use crate::state::ActorState;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One running actor instance.
///
/// # Architecture Note
/// **Concurrency Model**:
/// Even though we might have thousands of `ResourceActor` instances running, each one
/// processes its own messages *sequentially* in a loop. This means we don't need
/// `Mutex` or `RwLock` for the entity! The "Actor Model" gives us safety through
/// exclusive ownership of state within the task, while different instances run in parallel.
///
/// # Activation
/// The entity is built lazily by [`ActorEntity::on_activate`] when the first message arrives.
/// If activation fails, that message is answered with the error and the next message tries
/// again, so a transient state-store failure does not wedge the instance.
///
/// # Usage Pattern
///
/// Instances are normally created through an [`ActorRegistry`](crate::ActorRegistry). Direct use:
///
/// ```rust,ignore
/// let (actor, actor_ref) = ResourceActor::<Counter>::new(id, 32, state);
/// tokio::spawn(actor.run(Arc::new(())));
/// actor_ref.call(CounterAction::Incr(1)).await?;
/// ```
pub struct ResourceActor<T: ActorEntity> {
    id: T::Id,
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    state: ActorState,
    myself: WeakActorRef<T>,
    instance: Option<T>,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Creates a new instance loop and the first reference to it.
    ///
    /// # Arguments
    ///
    /// * `id` - Id of the instance.
    /// * `buffer_size` - The capacity of the mailbox. If it is full, senders wait for space.
    /// * `state` - Handle to the instance's persisted fields.
    pub fn new(id: T::Id, buffer_size: usize, state: ActorState) -> (Self, ActorRef<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor_ref = ActorRef::new(id.clone(), sender);
        let actor = Self {
            id,
            receiver,
            state,
            myself: actor_ref.downgrade(),
            instance: None,
        };
        (actor, actor_ref)
    }

    async fn activate(&mut self, context: &T::Context) -> Result<&mut T, FrameworkError> {
        if self.instance.is_none() {
            let entity = T::on_activate(self.id.clone(), &self.state, context)
                .await
                .map_err(|e| FrameworkError::EntityError(Box::new(e)))?;
            info!(entity_type = T::KIND, id = %self.id, "Activated");
            self.instance = Some(entity);
        }
        self.instance
            .as_mut()
            .ok_or_else(|| FrameworkError::TaskFailed(format!("{}/{} lost its instance", T::KIND, self.id)))
    }

    /// Runs the instance's event loop until its mailbox closes or a `Shutdown` arrives.
    ///
    /// # Context Injection
    /// The `context` is shared by every instance of the kind and injected into every hook.
    pub async fn run(mut self, context: Arc<T::Context>) {
        let entity_type = T::KIND;
        debug!(entity_type, id = %self.id, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Get { respond_to } => {
                    let snapshot = self.activate(context.as_ref()).await.map(|entity| entity.clone());
                    debug!(entity_type, id = %self.id, ok = snapshot.is_ok(), "Get");
                    let _ = respond_to.send(snapshot);
                }
                ResourceRequest::Action { action, respond_to } => {
                    debug!(entity_type, id = %self.id, ?action, "Action");
                    let id = self.id.clone();
                    let state = self.state.clone();
                    let myself = self.myself.clone();
                    let result = match self.activate(context.as_ref()).await {
                        Ok(entity) => {
                            let ctx = ActorContext::new(&id, &state, context.as_ref(), &myself);
                            entity
                                .handle_action(action, &ctx)
                                .await
                                .map_err(|e| FrameworkError::EntityError(Box::new(e)))
                        }
                        Err(e) => Err(e),
                    };
                    match &result {
                        Ok(_) => debug!(entity_type, %id, "Action ok"),
                        Err(e) => warn!(entity_type, %id, error = %e, "Action failed"),
                    }
                    if let Some(respond_to) = respond_to {
                        let _ = respond_to.send(result);
                    }
                }
                ResourceRequest::Shutdown => {
                    debug!(entity_type, id = %self.id, "Shutdown requested");
                    break;
                }
            }
        }

        debug!(entity_type, id = %self.id, "Actor stopped");
    }
}
