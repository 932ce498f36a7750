//! # Actor Runtime
//!
//! This crate provides the building blocks for hosting **virtual actors** on Tokio: keyed,
//! single-threaded, stateful instances that are activated on first reference, talk to each
//! other only through messages, and keep their fields in a durable key/value store.
//!
//! ## Why Virtual Actors?
//!
//! ### Actor Model
//!
//! - Isolated state (no shared memory, no locks)
//! - Message-passing concurrency
//! - Sequential processing within each instance eliminates races on its fields
//!
//! ### Keyed Activation
//!
//! - An instance is named by its kind plus a stable id (`Transaction/txn-7`, `Customer/1:2:3`)
//! - Nobody creates or destroys instances explicitly; referencing an id is enough
//! - An instance's fields outlive the in-memory object, so a restarted process resumes
//!   exactly where the persisted state left off
//!
//! **Further Reading**:
//! - [Actor Model (Wikipedia)](https://en.wikipedia.org/wiki/Actor_model)
//! - [Actors in Rust](https://ryhl.io/blog/actors-with-tokio/) - Practical guide to implementing actors with Tokio
//!
//! ## Architecture Overview
//!
//! The runtime separates concerns into four layers:
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - Your business logic, activation and action handling
//! 2. **Runtime Layer** ([`ResourceActor`], [`ActorRegistry`]) - Mailboxes, activation and lifecycle
//! 3. **Interface Layer** ([`ActorRef`], [`ActorClient`]) - Type-safe `call` / `call_async` / `tell`
//! 4. **State Layer** ([`StateStore`], [`ActorState`]) - Per-instance persisted fields
//!
//! ## Example
//!
//! ```rust
//! use actor_runtime::{ActorContext, ActorEntity, ActorRegistry, ActorState, InMemoryStateStore};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! #[derive(Clone, Debug)]
//! struct Counter {
//!     value: i64,
//! }
//!
//! #[derive(Debug)]
//! enum CounterAction {
//!     Incr(i64),
//! }
//!
//! #[async_trait]
//! impl ActorEntity for Counter {
//!     const KIND: &'static str = "Counter";
//!     type Id = String;
//!     type Action = CounterAction;
//!     type ActionResult = i64;
//!     type Context = ();
//!     type Error = actor_runtime::StateError;
//!
//!     async fn on_activate(_id: String, state: &ActorState, _ctx: &()) -> Result<Self, Self::Error> {
//!         Ok(Self { value: state.get("value").await?.unwrap_or(0) })
//!     }
//!
//!     async fn handle_action(
//!         &mut self,
//!         action: CounterAction,
//!         ctx: &ActorContext<'_, Self>,
//!     ) -> Result<i64, Self::Error> {
//!         match action {
//!             CounterAction::Incr(by) => {
//!                 self.value += by;
//!                 ctx.state.set("value", &self.value).await?;
//!                 Ok(self.value)
//!             }
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = ActorRegistry::<Counter>::new(Arc::new(InMemoryStateStore::new()), (), 8);
//!     let counter = registry.actor_ref("a".to_string());
//!     assert_eq!(counter.call(CounterAction::Incr(2)).await.unwrap(), 2);
//!     registry.shutdown().await.unwrap();
//! }
//! ```
//!
//! ## Context Injection Pattern
//!
//! Dependencies are handed to the [`ActorRegistry`] once per kind, not to each instance.
//! A coordinator kind whose context holds the registries of the participant kinds can reach
//! any participant by id, while the participants know nothing about the coordinator.
//!
//! ## Concurrency Model
//!
//! - Each instance runs in its own Tokio task
//! - Messages are processed **sequentially** within an instance (no locks needed!)
//! - Instances run in **parallel** with each other
//! - An instance must never `call` itself; it uses `tell` through [`ActorContext::myself`]
//!
//! ## Testing
//!
//! The [`mock`] module provides a `MockActor` that answers requests from a queue of
//! expectations, so client code (e.g. a participant client) can be tested without activating
//! any real instance.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod registry;
pub mod state;
pub mod tracing;

// Re-export core types for convenience
pub use actor::ResourceActor;
pub use client::{ActorRef, PendingReply, WeakActorRef};
pub use client_trait::ActorClient;
pub use entity::{ActorContext, ActorEntity};
pub use error::{FrameworkError, StateError};
pub use message::{ResourceRequest, Response};
pub use registry::ActorRegistry;
pub use state::{
    ActorKey, ActorState, FileStateStore, InMemoryStateStore, StateMap, StateStore,
};
