//! # Actor State
//!
//! Every actor instance owns a small key space of named fields. The fields are
//! read and written through an [`ActorState`] handle, which forwards to a shared
//! [`StateStore`]. Writes are durable as soon as the returned future resolves, so
//! an instance re-activated after a restart sees exactly what was last written.
//!
//! Values are stored as JSON. The typed helpers on [`ActorState`] take care of
//! the serde round trip, so entities work with their own types:
//!
//! ```rust,ignore
//! let decision: Option<Decision> = state.get("decision").await?;
//! state.set("decision", &Decision::Commit).await?;
//! ```
//!
//! Two stores ship with the runtime:
//! - [`InMemoryStateStore`] for tests and ephemeral systems.
//! - [`FileStateStore`] that keeps one JSON document per actor instance on disk.

mod file;
mod memory;

pub use file::FileStateStore;
pub use memory::InMemoryStateStore;

use crate::error::StateError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::sync::Arc;

/// All persisted fields of one actor instance.
pub type StateMap = BTreeMap<String, Value>;

/// Address of one actor instance's key space (`kind` + instance id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorKey {
    pub kind: String,
    pub id: String,
}

impl ActorKey {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl Display for ActorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

/// Storage backend for per-actor fields.
///
/// Implementations must give read-your-writes consistency for a single key
/// space. The runtime never touches one key space from two tasks at once,
/// because an actor instance processes its messages sequentially.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Reads one field, `None` when absent.
    async fn get(&self, key: &ActorKey, field: &str) -> Result<Option<Value>, StateError>;

    /// Writes one field, creating it when absent.
    async fn set(&self, key: &ActorKey, field: &str, value: Value) -> Result<(), StateError>;

    /// Writes several fields at once. Returns how many of them did not exist before.
    async fn set_multiple(&self, key: &ActorKey, fields: StateMap) -> Result<usize, StateError>;

    /// Reads every field of the key space. Empty for an instance never written.
    async fn get_all(&self, key: &ActorKey) -> Result<StateMap, StateError>;

    /// Removes one field. Returns whether it existed.
    async fn remove(&self, key: &ActorKey, field: &str) -> Result<bool, StateError>;

    /// Removes every field. Returns how many were removed.
    async fn remove_all(&self, key: &ActorKey) -> Result<usize, StateError>;
}

/// Handle to the state of a single actor instance.
///
/// Cheap to clone: it holds the instance key and a shared store.
#[derive(Clone)]
pub struct ActorState {
    key: ActorKey,
    store: Arc<dyn StateStore>,
}

impl ActorState {
    pub fn new(key: ActorKey, store: Arc<dyn StateStore>) -> Self {
        Self { key, store }
    }

    pub fn key(&self) -> &ActorKey {
        &self.key
    }

    pub async fn get<V: DeserializeOwned>(&self, field: &str) -> Result<Option<V>, StateError> {
        match self.store.get(&self.key, field).await? {
            // A field explicitly set to null reads the same as an absent one.
            Some(Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    pub async fn set<V: Serialize + ?Sized>(&self, field: &str, value: &V) -> Result<(), StateError> {
        let value = serde_json::to_value(value)?;
        self.store.set(&self.key, field, value).await
    }

    pub async fn set_multiple(&self, fields: StateMap) -> Result<usize, StateError> {
        self.store.set_multiple(&self.key, fields).await
    }

    pub async fn get_all(&self) -> Result<StateMap, StateError> {
        self.store.get_all(&self.key).await
    }

    pub async fn remove(&self, field: &str) -> Result<bool, StateError> {
        self.store.remove(&self.key, field).await
    }

    pub async fn remove_all(&self) -> Result<usize, StateError> {
        self.store.remove_all(&self.key).await
    }
}

impl fmt::Debug for ActorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorState").field("key", &self.key).finish()
    }
}
