// ABOUTME: Persistent storage for the single signing key-pair record
// ABOUTME: KeyStore trait with in-memory and file-backed implementations supporting put-if-absent
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use super::jwk::RsaJwk;
use async_trait::async_trait;
use oidc_bridge_core::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Persisted signing key pair, both halves in JWK form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEntry {
    /// Verification key
    pub public_key: RsaJwk,
    /// Signing key
    pub private_key: RsaJwk,
}

/// Durable storage for one `KeyEntry`
///
/// Implementations must give read-your-writes consistency within a process.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Read the stored entry, if any
    async fn get(&self) -> AppResult<Option<KeyEntry>>;

    /// Store the entry, replacing any existing one
    async fn put(&self, entry: KeyEntry) -> AppResult<()>;

    /// Store the entry only when the store is empty
    ///
    /// Returns the entry held by the store after the call: `entry` itself when
    /// it was written, otherwise the entry that was already present.
    async fn put_if_absent(&self, entry: KeyEntry) -> AppResult<KeyEntry>;
}

/// Process-local key store, used in tests and when no key file is configured
#[derive(Clone, Default)]
pub struct InMemoryKeyStore {
    entry: Arc<RwLock<Option<KeyEntry>>>,
}

impl InMemoryKeyStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with an entry
    #[must_use]
    pub fn with_entry(entry: KeyEntry) -> Self {
        Self {
            entry: Arc::new(RwLock::new(Some(entry))),
        }
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn get(&self) -> AppResult<Option<KeyEntry>> {
        Ok(self.entry.read().await.clone())
    }

    async fn put(&self, entry: KeyEntry) -> AppResult<()> {
        *self.entry.write().await = Some(entry);
        Ok(())
    }

    async fn put_if_absent(&self, entry: KeyEntry) -> AppResult<KeyEntry> {
        let mut guard = self.entry.write().await;
        Ok(guard.get_or_insert(entry).clone())
    }
}

/// Key store backed by a single JSON file
///
/// `put_if_absent` links a fully written staging file into place, which fails
/// when the target exists, so concurrent processes sharing the file agree on one key.
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    /// Create a store for the given file path; the file need not exist yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the key file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{:016x}.tmp", rand::random::<u64>()));
        PathBuf::from(name)
    }

    async fn read_entry(&self) -> AppResult<Option<KeyEntry>> {
        match fs::read(&self.path).await {
            Ok(bytes) => {
                let entry = serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::storage(format!(
                        "Key file {} is not a valid key entry: {e}",
                        self.path.display()
                    ))
                })?;
                Ok(Some(entry))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Outcome of linking the staging file onto the key path
    async fn settle_link(&self, linked: io::Result<()>, entry: KeyEntry) -> AppResult<KeyEntry> {
        match linked {
            Ok(()) => {
                info!(path = %self.path.display(), "Persisted new signing key file");
                Ok(entry)
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(path = %self.path.display(), "Signing key file already present");
                self.read_entry().await?.ok_or_else(|| {
                    AppError::storage(format!(
                        "Key file {} vanished during creation",
                        self.path.display()
                    ))
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn get(&self) -> AppResult<Option<KeyEntry>> {
        self.read_entry().await
    }

    async fn put(&self, entry: KeyEntry) -> AppResult<()> {
        self.ensure_parent().await?;
        let bytes = serde_json::to_vec(&entry)?;

        // Readers only ever see a complete file
        let tmp = self.staging_path();
        fs::write(&tmp, &bytes).await?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            discard_staging(&tmp).await;
            return Err(e.into());
        }
        info!(path = %self.path.display(), "Replaced signing key file");
        Ok(())
    }

    async fn put_if_absent(&self, entry: KeyEntry) -> AppResult<KeyEntry> {
        self.ensure_parent().await?;
        let tmp = self.staging_path();
        fs::write(&tmp, serde_json::to_vec(&entry)?).await?;

        // Linking fails if the target exists, and the target is never partially written
        let linked = fs::hard_link(&tmp, &self.path).await;
        discard_staging(&tmp).await;
        self.settle_link(linked, entry).await
    }
}

/// Remove a staging file; failure leaves a stray file but never fails the write
async fn discard_staging(tmp: &Path) {
    if let Err(e) = fs::remove_file(tmp).await {
        warn!(path = %tmp.display(), error = %e, "Failed to remove staging key file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tag: &str) -> KeyEntry {
        let jwk = RsaJwk {
            kty: "RSA".to_owned(),
            key_use: None,
            kid: None,
            alg: None,
            key_ops: None,
            ext: None,
            n: tag.to_owned(),
            e: "AQAB".to_owned(),
            d: None,
            p: None,
            q: None,
            dp: None,
            dq: None,
            qi: None,
        };
        KeyEntry {
            public_key: jwk.clone(),
            private_key: jwk,
        }
    }

    #[tokio::test]
    async fn test_in_memory_put_if_absent_keeps_first_entry() {
        let store = InMemoryKeyStore::new();
        assert!(store.get().await.unwrap().is_none());

        let first = store.put_if_absent(entry("first")).await.unwrap();
        let second = store.put_if_absent(entry("second")).await.unwrap();

        assert_eq!(first, entry("first"));
        assert_eq!(second, entry("first"));
        assert_eq!(store.get().await.unwrap(), Some(entry("first")));
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::new(dir.path().join("keys").join("signing.json"));

        assert!(store.get().await.unwrap().is_none());
        store.put(entry("a")).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Some(entry("a")));
    }

    #[tokio::test]
    async fn test_file_store_put_if_absent_returns_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::new(dir.path().join("signing.json"));

        assert_eq!(store.put_if_absent(entry("a")).await.unwrap(), entry("a"));
        assert_eq!(store.put_if_absent(entry("b")).await.unwrap(), entry("a"));
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signing.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = FileKeyStore::new(path);
        assert!(store.get().await.is_err());
    }

    #[tokio::test]
    async fn test_file_store_link_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::new(dir.path().join("signing.json"));

        let denied = io::Error::new(ErrorKind::PermissionDenied, "link denied");
        let error = store.settle_link(Err(denied), entry("a")).await.unwrap_err();

        assert!(error.message.contains("link denied"));
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_staging_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        discard_staging(&dir.path().join("signing.json.tmp")).await;
    }

    #[tokio::test]
    async fn test_file_store_put_if_absent_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::new(dir.path().join("signing.json"));

        store.put_if_absent(entry("a")).await.unwrap();
        store.put_if_absent(entry("b")).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("signing.json")]);
    }
}
