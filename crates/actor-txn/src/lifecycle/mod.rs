//! # System Lifecycle & Orchestration
//!
//! This module wires the actor kinds of the system together and tears them down again.
//!
//! ## The TxnSystem Pattern
//!
//! The [`TxnSystem`] is the "conductor":
//!
//! 1. **State** - opens the file-backed store when `state_dir` is configured, otherwise keeps
//!    everything in memory
//! 2. **Registries** - one per kind: Warehouse, District, Customer and Transaction
//! 3. **Dependency Injection** - the coordinator kind gets the [`CoordinatorConfig`](crate::config::CoordinatorConfig) as its
//!    context; participants need nothing
//! 4. **Transactions** - mints a fresh coordinator instance per business transaction
//! 5. **Graceful Shutdown** - coordinators first, then participants
//!
//! ```rust,ignore
//! let system = TxnSystem::new(CoordinatorConfig::from_env()?).await?;
//! let receipt = system.payment(PaymentRequest { w_id: 1, d_id: 1, c_id: 1, amount: 500 }).await?;
//! receipt.transaction.await_completion(Duration::from_secs(5)).await?;
//! system.shutdown().await?;
//! ```
//!
//! ## Graceful Shutdown
//!
//! Every instance keeps a weak reference to itself, and the registries hold the only strong
//! ones, so dropping clients alone would not stop anything. Shutdown therefore sends an
//! explicit `Shutdown` message to every instance, which ends its loop after the messages
//! already queued, and awaits the tasks.
//!
//! Coordinators go first: a commit phase still running finishes its round against live
//! participants. Retries scheduled for later are dropped; the recorded decision lets a later
//! `transact` pick them up.
//!
//! ## Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging for the entire system.
//!
//! ```bash
//! RUST_LOG=info cargo run      # protocol milestones
//! RUST_LOG=debug cargo run     # every vote, acknowledgement and payload
//! ```

pub mod txn_system;

pub use actor_runtime::tracing::setup_tracing;
pub use txn_system::*;
