//! In-memory credential storage implementation.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{CredentialStore, StoreError};
use crate::credential::{CredentialShape, Document};

/// In-memory credential store for testing and development.
///
/// This store is not persistent; data is lost when the process exits.
/// Keys are listed in sorted order.
///
/// # Thread Safety
///
/// This implementation uses interior mutability via `RwLock` and is
/// safe to share across threads.
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, Document>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a memory store with initial records.
    pub fn with_data(data: BTreeMap<String, Document>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Get a copy of the raw record stored under `key`.
    pub fn raw(&self, key: &str) -> Option<Document> {
        self.data.read().ok()?.get(key).cloned()
    }

    /// Get the number of stored records.
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("keys_count", &self.len())
            .finish()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let data = self.data.read().map_err(|e| StoreError::BackendError {
            message: format!("lock poisoned: {}", e),
        })?;
        Ok(data.keys().cloned().collect())
    }

    async fn save(&self, key: &str, record: &dyn CredentialShape) -> Result<(), StoreError> {
        let document = record.to_document()?;
        let mut data = self.data.write().map_err(|e| StoreError::BackendError {
            message: format!("lock poisoned: {}", e),
        })?;
        data.insert(key.to_string(), document);
        Ok(())
    }

    async fn get(&self, key: &str, target: &mut dyn CredentialShape) -> Result<(), StoreError> {
        let document = {
            let data = self.data.read().map_err(|e| StoreError::BackendError {
                message: format!("lock poisoned: {}", e),
            })?;
            data.get(key).cloned().ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })?
        };
        target.apply_document(document)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().map_err(|e| StoreError::BackendError {
            message: format!("lock poisoned: {}", e),
        })?;
        match data.remove(key) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                key: key.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::credential::CredentialBase;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_save_get() {
        let store = MemoryStore::new();

        store.save("test-key", &CredentialBase::new("aws")).await.unwrap();

        let mut base = CredentialBase::default();
        store.get("test-key", &mut base).await.unwrap();
        assert_eq!(base.provisioner_name(), "aws");
    }

    #[tokio::test]
    async fn test_memory_store_get_nonexistent() {
        let store = MemoryStore::new();
        let mut base = CredentialBase::default();

        let result = store.get("nonexistent", &mut base).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_memory_store_get_undecodable() {
        let mut data = BTreeMap::new();
        data.insert("broken".to_string(), json!({ "no_discriminator": true }));
        let store = MemoryStore::with_data(data);

        let mut base = CredentialBase::default();
        let result = store.get("broken", &mut base).await;
        assert!(matches!(result, Err(StoreError::Codec(CodecError::Shape(_)))));
    }

    #[tokio::test]
    async fn test_memory_store_save_overwrites() {
        let store = MemoryStore::new();

        store.save("key", &CredentialBase::new("aws")).await.unwrap();
        store.save("key", &CredentialBase::new("azure")).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.raw("key"), Some(json!({ "provisioner": "azure" })));
    }

    #[tokio::test]
    async fn test_memory_store_delete() {
        let store = MemoryStore::new();

        store.save("test-key", &CredentialBase::new("aws")).await.unwrap();
        store.delete("test-key").await.unwrap();

        assert!(store.is_empty());
        let result = store.delete("test-key").await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_memory_store_list_sorted() {
        let store = MemoryStore::new();
        assert!(store.list().await.unwrap().is_empty());

        for key in ["staging", "prod", "dev"] {
            store.save(key, &CredentialBase::new("aws")).await.unwrap();
        }

        assert_eq!(store.list().await.unwrap(), vec!["dev", "prod", "staging"]);
    }
}
