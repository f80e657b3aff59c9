//! Directory-backed credential storage implementation.

use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{CredentialStore, StoreError};
use crate::credential::{CredentialShape, Document};

const RECORD_EXTENSION: &str = "json";

/// Credential store keeping one pretty-printed JSON file per key.
///
/// # Storage Location
///
/// Records live at `{dir}/{key}.json`. The default directory is
/// `~/.local/share/credforge/credentials` on Linux,
/// `~/Library/Application Support/com.raibid-labs.credforge/credentials`
/// on macOS and `%APPDATA%\raibid-labs\credforge\data\credentials` on Windows.
///
/// Writes go to a temporary file that is then renamed over the record, so a
/// concurrent reader sees either the old or the new record, never a partial one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Get the default storage directory.
    pub fn default_dir() -> Result<PathBuf, StoreError> {
        let dirs = directories::ProjectDirs::from("com", "raibid-labs", "credforge").ok_or_else(
            || StoreError::BackendError {
                message: "no home directory available for credential storage".to_string(),
            },
        )?;
        Ok(dirs.data_dir().join("credentials"))
    }

    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// The directory this store reads and writes.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.{}", key, RECORD_EXTENSION)))
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let reason = if key.is_empty() {
        Some("key must not be empty")
    } else if key.starts_with('.') {
        Some("key must not start with '.'")
    } else if key.contains(['/', '\\']) {
        Some("key must not contain path separators")
    } else if key.chars().any(char::is_control) {
        Some("key must not contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

/// Write `contents` to a fresh temporary file in `dir` and rename it over `target`.
///
/// Every call gets its own temporary file, so overlapping writes of one key
/// each publish a complete record and the last rename wins.
fn write_atomic(dir: &Path, prefix: &str, target: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let mut tmp = tempfile::Builder::new()
        .prefix(prefix)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

fn not_found_or(key: &str, err: std::io::Error) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound {
            key: key.to_string(),
        }
    } else {
        StoreError::Io(err)
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_key(key).is_ok() {
                    keys.push(key.to_string());
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn save(&self, key: &str, record: &dyn CredentialShape) -> Result<(), StoreError> {
        let path = self.record_path(key)?;
        let contents = serde_json::to_vec_pretty(&record.to_document()?)?;

        let dir = self.dir.clone();
        let prefix = format!(".{}.", key);
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &prefix, &target, &contents))
            .await
            .map_err(|e| StoreError::BackendError {
                message: format!("write task failed: {}", e),
            })??;

        tracing::debug!(key = %key, path = ?path, "Wrote credential record");
        Ok(())
    }

    async fn get(&self, key: &str, target: &mut dyn CredentialShape) -> Result<(), StoreError> {
        let path = self.record_path(key)?;
        let contents = tokio::fs::read(&path)
            .await
            .map_err(|e| not_found_or(key, e))?;

        let document: Document = serde_json::from_slice(&contents)?;
        target.apply_document(document)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.record_path(key)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or(key, e))
    }
}
