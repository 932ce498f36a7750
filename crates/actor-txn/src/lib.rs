//! # Actor Transactions
//!
//! Two-phase commit across independently addressed, stateful actors, built on
//! [`actor_runtime`].
//!
//! - **[model]**: Ids, decisions, versioned fields and per-participant operations.
//! - **[participant]**: The [`Participant`](participant::Participant) contract the coordinator drives.
//! - **[participant_actor]**: Warehouse, District and Customer actors over a versioned ledger.
//! - **[transaction_actor]**: The coordinator: prepare round, durable decision, commit with retries.
//! - **[clients]**: Type-safe wrappers (e.g. [`TransactionClient`](clients::TransactionClient)).
//! - **[payment]**: The TPC-C payment driver.
//! - **[lifecycle]**: [`TxnSystem`](lifecycle::TxnSystem), which wires and stops everything.
//! - **[config]**: [`CoordinatorConfig`](config::CoordinatorConfig), from defaults or the environment.

pub mod clients;
pub mod config;
pub mod lifecycle;
pub mod model;
pub mod participant;
pub mod participant_actor;
pub mod payment;
pub mod transaction_actor;
