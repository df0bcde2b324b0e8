//! crates/tutor_core/src/store.rs
//!
//! A process-local `KeyValueStore` and the schema version marker shared by
//! every store implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::ports::{get_typed, set_typed, KeyValueStore, PortError, PortResult};

pub const SCHEMA_VERSION_KEY: &str = "schema_version";
pub const SCHEMA_VERSION: u32 = 1;

/// Keeps every value in memory; nothing survives a restart.
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<Value>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> PortResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Stamps a fresh store with the current schema version and refuses data
/// written by a newer release.
pub async fn ensure_schema_version(store: &dyn KeyValueStore) -> PortResult<u32> {
    match get_typed::<u32>(store, SCHEMA_VERSION_KEY).await? {
        Some(version) if version > SCHEMA_VERSION => Err(PortError::Unexpected(format!(
            "stored data uses schema version {}, this build understands up to {}",
            version, SCHEMA_VERSION
        ))),
        Some(version) => Ok(version),
        None => {
            set_typed(store, SCHEMA_VERSION_KEY, &SCHEMA_VERSION).await?;
            info!("Initialised key-value store at schema version {}", SCHEMA_VERSION);
            Ok(SCHEMA_VERSION)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("students").await.unwrap(), None);
        store.set("students", json!({})).await.unwrap();
        assert_eq!(store.get("students").await.unwrap(), Some(json!({})));
    }

    #[tokio::test]
    async fn schema_version_is_written_once() {
        let store = InMemoryStore::new();
        assert_eq!(ensure_schema_version(&store).await.unwrap(), SCHEMA_VERSION);
        assert_eq!(
            store.get(SCHEMA_VERSION_KEY).await.unwrap(),
            Some(json!(SCHEMA_VERSION))
        );
        assert_eq!(ensure_schema_version(&store).await.unwrap(), SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn newer_schema_is_refused() {
        let store = InMemoryStore::new();
        store.set(SCHEMA_VERSION_KEY, json!(99)).await.unwrap();
        assert!(ensure_schema_version(&store).await.is_err());
    }
}
