//! # ActorEntity Trait
//!
//! The `ActorEntity` trait defines the contract that every actor kind (a coordinator, a
//! warehouse, a customer, …) must implement to be hosted by the runtime. It specifies
//! associated types for IDs, actions, context and errors, and provides the two hooks the
//! runtime drives: `on_activate` and `handle_action`.
//!
//! # Architecture Note
//! One implementation of the trait describes a whole *kind* of actor. The
//! [`ActorRegistry`](crate::ActorRegistry) creates one instance per id on first reference,
//! and each instance owns its own mailbox, task and persisted key space.
//!
//! We use "Associated Types" to enforce type safety. A `Transaction` actor only accepts
//! `TransactionAction` messages and you can't accidentally send it a participant's
//! `Prepare`. The compiler prevents this class of bugs entirely.

use crate::client::{ActorRef, WeakActorRef};
use crate::state::ActorState;
use async_trait::async_trait;
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any actor kind must implement to be hosted by a [`ResourceActor`](crate::ResourceActor).
///
/// # Async & Context
/// This trait is `#[async_trait]` to allow asynchronous operations in hooks (e.g., calling other
/// actors or touching persisted state). It also defines a `Context` type, which is shared by
/// every instance of the kind and injected into every hook. This allows "Late Binding" of
/// dependencies (handing clients to the registry instead of to each entity).
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Stable name of the kind. Used in logs and as the namespace of persisted state.
    const KIND: &'static str;

    /// The unique identifier of one instance (e.g., String, a composite key).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;

    /// Enum representing the operations this kind understands.
    type Action: Send + Sync + Debug + 'static;

    /// The result type returned by actions.
    type ActionResult: Send + Sync + Debug + 'static;

    /// The runtime context (dependencies) shared by every instance of the kind.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync + 'static;

    /// The error type for this kind.
    ///
    /// # Design Note: Error Granularity
    ///
    /// The runtime enforces a **Per-Actor Error Type** (one enum for the whole kind) rather than
    /// **Per-Message Error Types**. Clients deal with a single error type and can recover it
    /// from a [`FrameworkError`](crate::FrameworkError) with `into_entity_error`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Builds the in-memory instance from its persisted state.
    ///
    /// Called exactly once per live instance, before the first action is handled. The state
    /// may be empty (first ever reference), in which case the entity must initialise and
    /// persist its defaults itself.
    async fn on_activate(
        id: Self::Id,
        state: &ActorState,
        ctx: &Self::Context,
    ) -> Result<Self, Self::Error>;

    /// Handle one action. Actions of one instance never run concurrently.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &ActorContext<'_, Self>,
    ) -> Result<Self::ActionResult, Self::Error>;
}

/// Everything an instance can reach while it handles an action.
pub struct ActorContext<'a, T: ActorEntity> {
    /// Id of the instance handling the action.
    pub id: &'a T::Id,
    /// The instance's persisted fields.
    pub state: &'a ActorState,
    /// Dependencies shared by the kind.
    pub deps: &'a T::Context,
    myself: &'a WeakActorRef<T>,
}

impl<'a, T: ActorEntity> ActorContext<'a, T> {
    pub(crate) fn new(
        id: &'a T::Id,
        state: &'a ActorState,
        deps: &'a T::Context,
        myself: &'a WeakActorRef<T>,
    ) -> Self {
        Self {
            id,
            state,
            deps,
            myself,
        }
    }

    /// A reference to the instance's own mailbox, for `tell`-to-self.
    ///
    /// `None` once every external reference is gone and the instance is winding down.
    pub fn myself(&self) -> Option<ActorRef<T>> {
        self.myself.upgrade()
    }
}
