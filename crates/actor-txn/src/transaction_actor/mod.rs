//! # Transaction Actor
//!
//! The two-phase-commit coordinator. One instance per transaction, addressed by an instance
//! name; the instance assigns itself a [`TxnId`](crate::model::TxnId) on first activation.
//!
//! ## Protocol
//!
//! ```text
//! transact(participants, operations)
//!   ├─ lengths differ ─────────────► LengthMismatch (nobody contacted)
//!   ├─ commitComplete ─────────────► recorded decision
//!   ├─ decision recorded ──────────► skip prepare
//!   └─ otherwise: prepare round ───► decision = AND(votes), persisted
//!   tell self SendCommit ──────────► reply decision to caller
//!
//! SendCommit
//!   ├─ all acknowledged ───────────► commitComplete = true
//!   └─ otherwise ──── backoff ─────► tell self Retry (≤ max_attempts)
//! ```
//!
//! ## Structure
//!
//! - [`entity`] - [`Transaction`] and its persisted [`TransactionRecord`]
//! - `rounds` - concurrent prepare and commit fan-out with per-call deadlines
//! - [`actions`] - [`TransactionAction`], [`TransactionActionResult`], [`TransactRequest`]
//! - [`error`] - [`TransactionError`]

pub mod actions;
pub mod entity;
pub mod error;
mod rounds;

pub use actions::*;
pub use entity::{Transaction, TransactionRecord};
pub use error::*;

use crate::config::CoordinatorConfig;
use actor_runtime::{ActorRegistry, StateStore};
use std::sync::Arc;

/// Creates the registry hosting every coordinator instance.
pub fn registry(store: Arc<dyn StateStore>, config: CoordinatorConfig) -> ActorRegistry<Transaction> {
    let mailbox_size = config.mailbox_size;
    ActorRegistry::new(store, config, mailbox_size)
}
