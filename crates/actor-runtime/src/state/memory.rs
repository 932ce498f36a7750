use super::{ActorKey, StateMap, StateStore};
use crate::error::StateError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

/// A [`StateStore`] that keeps everything in process memory.
///
/// Contents survive actor re-activation (and registry restarts that share the
/// same store) but not the process.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    actors: DashMap<ActorKey, StateMap>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actor instances with at least one stored field.
    pub fn len(&self) -> usize {
        self.actors.iter().filter(|entry| !entry.value().is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, key: &ActorKey, field: &str) -> Result<Option<Value>, StateError> {
        Ok(self
            .actors
            .get(key)
            .and_then(|fields| fields.get(field).cloned()))
    }

    async fn set(&self, key: &ActorKey, field: &str, value: Value) -> Result<(), StateError> {
        self.actors
            .entry(key.clone())
            .or_default()
            .insert(field.to_string(), value);
        Ok(())
    }

    async fn set_multiple(&self, key: &ActorKey, fields: StateMap) -> Result<usize, StateError> {
        let mut entry = self.actors.entry(key.clone()).or_default();
        let mut created = 0;
        for (field, value) in fields {
            if entry.insert(field, value).is_none() {
                created += 1;
            }
        }
        Ok(created)
    }

    async fn get_all(&self, key: &ActorKey) -> Result<StateMap, StateError> {
        Ok(self
            .actors
            .get(key)
            .map(|fields| fields.value().clone())
            .unwrap_or_default())
    }

    async fn remove(&self, key: &ActorKey, field: &str) -> Result<bool, StateError> {
        Ok(self
            .actors
            .get_mut(key)
            .map(|mut fields| fields.remove(field).is_some())
            .unwrap_or(false))
    }

    async fn remove_all(&self, key: &ActorKey) -> Result<usize, StateError> {
        Ok(self
            .actors
            .remove(key)
            .map(|(_, fields)| fields.len())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn set_multiple_counts_only_new_fields() {
        let store = InMemoryStateStore::new();
        let key = ActorKey::new("Foo", "123");
        store.set(&key, "key1", json!(42)).await.unwrap();
        store.set(&key, "key2", json!("abc123")).await.unwrap();

        let fields = StateMap::from([
            ("key1".to_string(), json!(2020)),
            ("key10".to_string(), json!({ "myData": 1234 })),
        ]);
        assert_eq!(store.set_multiple(&key, fields).await.unwrap(), 1);

        let all = store.get_all(&key).await.unwrap();
        assert_eq!(all["key1"], json!(2020));
        assert_eq!(all["key2"], json!("abc123"));
        assert_eq!(all["key10"]["myData"], json!(1234));
    }

    #[tokio::test]
    async fn remove_and_remove_all() {
        let store = InMemoryStateStore::new();
        let key = ActorKey::new("Foo", "123");
        store.set(&key, "key1", json!(1)).await.unwrap();
        store.set(&key, "key2", json!(2)).await.unwrap();

        assert!(store.remove(&key, "key2").await.unwrap());
        assert!(!store.remove(&key, "key2").await.unwrap());
        assert!(!store.get_all(&key).await.unwrap().contains_key("key2"));

        assert_eq!(store.remove_all(&key).await.unwrap(), 1);
        assert!(store.get_all(&key).await.unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn key_spaces_are_isolated() {
        let store = InMemoryStateStore::new();
        let a = ActorKey::new("Foo", "1");
        let b = ActorKey::new("Bar", "1");
        store.set(&a, "x", json!(1)).await.unwrap();

        assert_eq!(store.get(&b, "x").await.unwrap(), None);
        assert_eq!(store.len(), 1);
    }
}
