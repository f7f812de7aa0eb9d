// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem-backed blob store for raw uploaded file bytes.
//!
//! Each blob is a uuid-named file plus a JSON sidecar carrying size and
//! content type. URLs are `file://` paths; a CDN-backed store would
//! implement the same trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use supio_core::{BlobMetadata, BlobStore, StorageId, SupioError};
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
struct SidecarMetadata {
    size: u64,
    content_type: Option<String>,
}

fn io_err(e: std::io::Error) -> SupioError {
    SupioError::Storage {
        source: Box::new(e),
    }
}

/// Blob store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Creates a store rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, id: &StorageId) -> PathBuf {
        self.root.join(id.as_str())
    }

    fn meta_path(&self, id: &StorageId) -> PathBuf {
        self.root.join(format!("{}.meta.json", id.as_str()))
    }

    async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, SupioError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(e)),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(
        &self,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<StorageId, SupioError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(io_err)?;

        let id = StorageId(uuid::Uuid::new_v4().to_string());
        tokio::fs::write(self.blob_path(&id), bytes)
            .await
            .map_err(io_err)?;

        let sidecar = SidecarMetadata {
            size: bytes.len() as u64,
            content_type: content_type.map(str::to_string),
        };
        let encoded = serde_json::to_vec(&sidecar).map_err(|e| SupioError::Storage {
            source: Box::new(e),
        })?;
        tokio::fs::write(self.meta_path(&id), encoded)
            .await
            .map_err(io_err)?;

        Ok(id)
    }

    async fn get(&self, id: &StorageId) -> Result<Option<Vec<u8>>, SupioError> {
        Self::read_optional(&self.blob_path(id)).await
    }

    async fn get_url(&self, id: &StorageId) -> Result<Option<String>, SupioError> {
        let path = self.blob_path(id);
        match tokio::fs::metadata(&path).await {
            Ok(_) => {
                let absolute = path
                    .canonicalize()
                    .unwrap_or(path);
                Ok(Some(format!("file://{}", absolute.display())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(e)),
        }
    }

    async fn get_metadata(&self, id: &StorageId) -> Result<Option<BlobMetadata>, SupioError> {
        let Some(raw) = Self::read_optional(&self.meta_path(id)).await? else {
            return Ok(None);
        };
        let sidecar: SidecarMetadata =
            serde_json::from_slice(&raw).map_err(|e| SupioError::Storage {
                source: Box::new(e),
            })?;
        Ok(Some(BlobMetadata {
            size: sidecar.size,
            content_type: sidecar.content_type,
        }))
    }

    async fn delete(&self, id: &StorageId) -> Result<(), SupioError> {
        for path in [self.blob_path(id), self.meta_path(id)] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(storage_id = id.as_str(), "blob already removed");
                }
                Err(e) => return Err(io_err(e)),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn store_get_roundtrips() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        let id = store
            .store(b"hello blob", Some("text/plain"))
            .await
            .unwrap();
        let bytes = store.get(&id).await.unwrap().unwrap();
        assert_eq!(bytes, b"hello blob");

        let meta = store.get_metadata(&id).await.unwrap().unwrap();
        assert_eq!(meta.size, 10);
        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));

        let url = store.get_url(&id).await.unwrap().unwrap();
        assert!(url.starts_with("file://"), "got {url}");
    }

    #[tokio::test]
    async fn delete_removes_blob_and_metadata() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());

        let id = store.store(b"bytes", None).await.unwrap();
        store.delete(&id).await.unwrap();

        assert!(store.get(&id).await.unwrap().is_none());
        assert!(store.get_url(&id).await.unwrap().is_none());
        assert!(store.get_metadata(&id).await.unwrap().is_none());

        // Double delete is a no-op.
        store.delete(&id).await.unwrap();
    }

    #[tokio::test]
    async fn missing_blob_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        let id = StorageId("no-such-blob".to_string());

        assert!(store.get(&id).await.unwrap().is_none());
        assert!(store.get_metadata(&id).await.unwrap().is_none());
        assert!(store.get_url(&id).await.unwrap().is_none());
    }
}
