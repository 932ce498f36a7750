use super::{ActorKey, StateMap, StateStore};
use crate::error::StateError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// A [`StateStore`] that persists each actor instance as one JSON document.
///
/// Layout: `<root>/<kind>/<id>.json`, with path-unsafe bytes percent-encoded.
/// Every mutation rewrites the document through a temporary file that is synced,
/// renamed over the document, and made durable by syncing the directory. A crash
/// leaves either the old or the new document behind.
#[derive(Debug)]
pub struct FileStateStore {
    root: PathBuf,
    locks: DashMap<ActorKey, Arc<Mutex<()>>>,
}

impl FileStateStore {
    /// Opens (and creates, when missing) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StateError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "File state store opened");
        Ok(Self {
            root,
            locks: DashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &ActorKey) -> PathBuf {
        self.root
            .join(encode_segment(&key.kind))
            .join(format!("{}.json", encode_segment(&key.id)))
    }

    fn lock_for(&self, key: &ActorKey) -> Arc<Mutex<()>> {
        self.locks.entry(key.clone()).or_default().value().clone()
    }

    async fn load(&self, key: &ActorKey) -> Result<StateMap, StateError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StateError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StateMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &ActorKey, fields: &StateMap) -> Result<(), StateError> {
        let path = self.path_for(key);
        if fields.is_empty() {
            return match tokio::fs::remove_file(&path).await {
                Ok(()) => sync_parent(&path).await,
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            };
        }
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&serde_json::to_vec_pretty(fields)?).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &path).await?;
        sync_parent(&path).await
    }

    /// Read-modify-write of one document under its key lock.
    async fn update<R, F>(&self, key: &ActorKey, apply: F) -> Result<R, StateError>
    where
        F: FnOnce(&mut StateMap) -> R + Send,
        R: Send,
    {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;
        let mut fields = self.load(key).await?;
        let result = apply(&mut fields);
        self.save(key, &fields).await?;
        Ok(result)
    }
}

/// Makes a rename or unlink inside the document's directory durable.
#[cfg(unix)]
async fn sync_parent(path: &Path) -> Result<(), StateError> {
    if let Some(parent) = path.parent() {
        tokio::fs::File::open(parent).await?.sync_all().await?;
    }
    Ok(())
}

// Directories cannot be opened for syncing here.
#[cfg(not(unix))]
async fn sync_parent(_path: &Path) -> Result<(), StateError> {
    Ok(())
}

fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    encoded
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, key: &ActorKey, field: &str) -> Result<Option<Value>, StateError> {
        Ok(self.load(key).await?.remove(field))
    }

    async fn set(&self, key: &ActorKey, field: &str, value: Value) -> Result<(), StateError> {
        self.update(key, |fields| {
            fields.insert(field.to_string(), value);
        })
        .await
    }

    async fn set_multiple(&self, key: &ActorKey, new_fields: StateMap) -> Result<usize, StateError> {
        self.update(key, |fields| {
            new_fields
                .into_iter()
                .filter(|(field, value)| fields.insert(field.clone(), value.clone()).is_none())
                .count()
        })
        .await
    }

    async fn get_all(&self, key: &ActorKey) -> Result<StateMap, StateError> {
        self.load(key).await
    }

    async fn remove(&self, key: &ActorKey, field: &str) -> Result<bool, StateError> {
        self.update(key, |fields| fields.remove(field).is_some()).await
    }

    async fn remove_all(&self, key: &ActorKey) -> Result<usize, StateError> {
        self.update(key, |fields| {
            let removed = fields.len();
            fields.clear();
            removed
        })
        .await
    }
}
