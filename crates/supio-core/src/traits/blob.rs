// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw blob storage trait for uploaded file bytes.

use async_trait::async_trait;

use crate::error::SupioError;
use crate::types::StorageId;

/// Metadata about a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMetadata {
    /// Size of the stored bytes.
    pub size: u64,
    /// MIME type recorded at store time, when known.
    pub content_type: Option<String>,
}

/// Backend for raw uploaded file bytes.
///
/// Knowledge entries link to blobs via [`StorageId`]; the entry row, not the
/// blob, is the source of truth for listings.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores bytes and returns a new storage id.
    async fn store(&self, bytes: &[u8], content_type: Option<&str>)
        -> Result<StorageId, SupioError>;

    /// Reads a blob back. `None` if it was deleted.
    async fn get(&self, id: &StorageId) -> Result<Option<Vec<u8>>, SupioError>;

    /// Resolves a retrievable URL for the blob, `None` if it no longer exists.
    async fn get_url(&self, id: &StorageId) -> Result<Option<String>, SupioError>;

    /// Size and content type, `None` if the blob no longer exists.
    async fn get_metadata(&self, id: &StorageId) -> Result<Option<BlobMetadata>, SupioError>;

    /// Deletes the blob. Deleting a missing blob is not an error.
    async fn delete(&self, id: &StorageId) -> Result<(), SupioError>;
}
