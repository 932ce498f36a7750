//! # Participant Actors
//!
//! The Warehouse, District and Customer kinds. They share one entity implementation and differ
//! only in their [`EntityKind`]: instance key, initial fields and validation.
//!
//! ## Structure
//!
//! - [`ledger`] - [`ParticipantLedger`], the prepare/commit state machine
//! - [`entity`] - [`ActorEntity`](actor_runtime::ActorEntity) implementation hosting the ledger
//! - [`error`] - [`ParticipantError`] type for type-safe error handling
//! - [`actions`] - [`ParticipantAction`] and [`ParticipantActionResult`]
//! - [`registry()`] - Factory for the registry of one kind
//!
//! ## Usage
//!
//! ```rust
//! use actor_runtime::InMemoryStateStore;
//! use actor_txn::clients::ParticipantClient;
//! use actor_txn::model::{Decision, Operation, TxnId, Warehouse, WarehouseId};
//! use actor_txn::participant::Participant;
//! use actor_txn::participant_actor;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouses = participant_actor::registry::<Warehouse>(Arc::new(InMemoryStateStore::new()), 8);
//!     let warehouse = ParticipantClient::new(warehouses.actor_ref(WarehouseId(1)));
//!
//!     let ytd = warehouse.read(&["ytd"]).await?["ytd"];
//!     let op = Operation::new().write("ytd", ytd.val + 500, ytd.version);
//!     let txn = TxnId::new();
//!
//!     assert!(warehouse.prepare(&txn, &op).await?);
//!     warehouse.commit(&txn, Decision::Commit, &op).await?;
//!     assert_eq!(warehouse.read(&["ytd"]).await?["ytd"].val, ytd.val + 500);
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod entity;
pub mod error;
pub mod ledger;

pub use actions::*;
pub use entity::ParticipantEntity;
pub use error::*;
pub use ledger::{LedgerChange, LedgerWrite, ParticipantLedger, PendingUpdate, PrepareOutcome, Rejection};

use crate::model::{Customer, District, EntityKind, Warehouse};
use actor_runtime::{ActorRegistry, StateStore};
use std::sync::Arc;

pub type WarehouseActor = ParticipantEntity<Warehouse>;
pub type DistrictActor = ParticipantEntity<District>;
pub type CustomerActor = ParticipantEntity<Customer>;

/// Creates the registry hosting every instance of participant kind `K`.
pub fn registry<K: EntityKind>(
    store: Arc<dyn StateStore>,
    mailbox_size: usize,
) -> ActorRegistry<ParticipantEntity<K>> {
    ActorRegistry::new(store, (), mailbox_size)
}
