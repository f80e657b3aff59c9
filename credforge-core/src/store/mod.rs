//! Credential storage abstraction.
//!
//! This module provides:
//! - [`CredentialStore`] - Trait for credential storage backends
//! - [`MemoryStore`] - In-memory implementation for testing
//! - [`FileStore`] - One JSON file per credential in a directory
//! - [`StoreBackend`] / [`create_store`] - Select a backend from configuration
//!
//! Stores persist [`Document`](crate::credential::Document)s. They never need
//! to know a credential's concrete type: `get` decodes into whatever
//! [`CredentialShape`] the caller hands in.
//!
//! # Example
//!
//! ```rust,ignore
//! use credforge_core::store::{CredentialStore, MemoryStore};
//! use credforge_core::CredentialBase;
//!
//! let store = MemoryStore::new();
//! store.save("prod", &aws_credential).await?;
//!
//! let mut base = CredentialBase::default();
//! store.get("prod", &mut base).await?;
//! assert_eq!(base.provisioner_name(), "aws");
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::codec::CodecError;
use crate::credential::CredentialShape;

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Error type for credential store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No credential is stored under the key.
    #[error("credential not found: {key}")]
    NotFound { key: String },

    /// The key cannot be used with this backend.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// The storage backend encountered an error.
    #[error("backend error: {message}")]
    BackendError { message: String },

    /// I/O error reading or writing a record.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record is not valid JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record could not be encoded from, or decoded into, the given shape.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Abstraction over credential storage backends.
///
/// Implementations include:
/// - [`MemoryStore`] - In-memory storage for testing
/// - [`FileStore`] - JSON files on local disk
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// List the keys of all stored credentials.
    ///
    /// Returns an empty vec if the store is empty.
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Store a credential at the given key.
    ///
    /// Overwrites any existing value.
    async fn save(&self, key: &str, record: &dyn CredentialShape) -> Result<(), StoreError>;

    /// Read the credential at `key` into `target`.
    ///
    /// Returns [`StoreError::NotFound`] if the key doesn't exist.
    async fn get(&self, key: &str, target: &mut dyn CredentialShape) -> Result<(), StoreError>;

    /// Delete the credential at `key`.
    ///
    /// Returns [`StoreError::NotFound`] if the key doesn't exist.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl CredentialStore for Box<dyn CredentialStore> {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        (**self).list().await
    }

    async fn save(&self, key: &str, record: &dyn CredentialShape) -> Result<(), StoreError> {
        (**self).save(key, record).await
    }

    async fn get(&self, key: &str, target: &mut dyn CredentialShape) -> Result<(), StoreError> {
        (**self).get(key, target).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key).await
    }
}

#[async_trait]
impl<S: CredentialStore + ?Sized> CredentialStore for Arc<S> {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        (**self).list().await
    }

    async fn save(&self, key: &str, record: &dyn CredentialShape) -> Result<(), StoreError> {
        (**self).save(key, record).await
    }

    async fn get(&self, key: &str, target: &mut dyn CredentialShape) -> Result<(), StoreError> {
        (**self).get(key, target).await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key).await
    }
}

/// Which storage backend to use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreBackend {
    /// Keep credentials in memory; nothing survives the process.
    Memory,

    /// Keep credentials as JSON files in a directory.
    ///
    /// `None` selects [`FileStore::default_dir`].
    File {
        #[serde(default)]
        path: Option<PathBuf>,
    },
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::File { path: None }
    }
}

/// Create a credential store for the given backend.
///
/// # Example
///
/// ```rust,ignore
/// use credforge_core::store::{create_store, StoreBackend};
///
/// let store = create_store(&StoreBackend::Memory).await?;
/// ```
pub async fn create_store(
    backend: &StoreBackend,
) -> Result<Box<dyn CredentialStore>, StoreError> {
    match backend {
        StoreBackend::Memory => {
            tracing::warn!(
                "Using in-memory credential storage. \
                 Credentials will not persist across restarts."
            );
            Ok(Box::new(MemoryStore::new()))
        }
        StoreBackend::File { path } => {
            let dir = match path {
                Some(path) => path.clone(),
                None => FileStore::default_dir()?,
            };
            let store = FileStore::open(&dir).await?;
            tracing::info!("Using file credential storage at {:?}", dir);
            Ok(Box::new(store))
        }
    }
}
