// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File catalog: the user-facing read/write side of the knowledge store.
//!
//! Upload pipeline: store raw bytes -> extract text -> add to the knowledge
//! store -> release the fresh blob when the content already existed.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use supio_core::{BlobStore, EntryId, EntryStatus, RequestContext, SupioError};
use tracing::{debug, warn};

use crate::extractor::ContentExtractor;
use crate::store::{EntryMetadata, KnowledgeEntry, KnowledgeStore, NewEntry};

/// An upload received from the dashboard.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    /// Guessed from the filename extension when absent or empty.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
    pub category: Option<String>,
}

/// Result of an upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddedFile {
    pub entry_id: EntryId,
    /// URL of the stored raw file; `None` when the upload deduplicated
    /// against an existing entry.
    pub url: Option<String>,
}

/// Simplified ingestion status shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicFileStatus {
    Ready,
    Processing,
    Error,
}

/// User-facing view of a knowledge entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicFile {
    pub id: EntryId,
    /// File name with extension.
    pub name: String,
    /// Display extension ("pdf", "txt", ...).
    #[serde(rename = "type")]
    pub file_type: String,
    /// Human-readable size, or "unknown" when the blob is gone.
    pub size: String,
    pub status: PublicFileStatus,
    /// Retrievable URL, `None` when raw storage no longer exists.
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// A page of [`PublicFile`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePage {
    pub page: Vec<PublicFile>,
    pub is_done: bool,
    pub next_cursor: Option<i64>,
}

/// Guess a MIME type from the filename extension.
fn guess_mime_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit('.')
        .next()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Format a byte count as B/KB/MB/GB with one decimal place.
fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{} {}", rounded as u64, UNITS[exponent])
    } else {
        format!("{rounded:.1} {}", UNITS[exponent])
    }
}

/// The file catalog over one knowledge store.
#[derive(Clone)]
pub struct FileCatalog {
    store: KnowledgeStore,
    blobs: Arc<dyn BlobStore>,
    extractor: ContentExtractor,
}

impl FileCatalog {
    pub fn new(store: KnowledgeStore, blobs: Arc<dyn BlobStore>, extractor: ContentExtractor) -> Self {
        Self {
            store,
            blobs,
            extractor,
        }
    }

    /// Ingests an uploaded file into the caller's namespace.
    ///
    /// On duplicate content the add is a no-op success and the freshly
    /// stored blob is released, so at most one raw object survives per
    /// content hash. Extraction failures also release the fresh blob.
    pub async fn add_file(
        &self,
        ctx: &RequestContext,
        upload: UploadFile,
    ) -> Result<AddedFile, SupioError> {
        let organization_id = ctx.organization_id().to_string();
        let mime_type = upload
            .mime_type
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| guess_mime_type(&upload.filename).to_string());

        let storage_id = self
            .blobs
            .store(&upload.bytes, Some(&mime_type))
            .await?;

        let text = match self
            .extractor
            .extract(&upload.filename, &mime_type, &upload.bytes)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                // No orphaned raw storage on a failed pipeline.
                if let Err(cleanup) = self.blobs.delete(&storage_id).await {
                    warn!(error = %cleanup, "failed to release blob after extraction failure");
                }
                return Err(e);
            }
        };

        let content_hash = hex::encode(Sha256::digest(&upload.bytes));
        let outcome = self
            .store
            .add(NewEntry {
                namespace: organization_id.clone(),
                key: upload.filename.clone(),
                title: upload.filename.clone(),
                text,
                content_hash,
                metadata: EntryMetadata {
                    storage_id: Some(storage_id.clone()),
                    uploaded_by: organization_id,
                    filename: upload.filename,
                    category: upload.category,
                },
            })
            .await?;

        if !outcome.created {
            debug!(entry_id = outcome.entry_id.as_str(), "entry already exists, releasing blob");
            self.blobs.delete(&storage_id).await?;
        }

        let url = self.blobs.get_url(&storage_id).await?;
        Ok(AddedFile {
            entry_id: outcome.entry_id,
            url,
        })
    }

    /// Lists the caller's files, newest pages last, optionally filtered by
    /// category. The filter applies after page conversion.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        category: Option<&str>,
        cursor: Option<i64>,
        page_size: usize,
    ) -> Result<FilePage, SupioError> {
        let organization_id = ctx.organization_id();

        if self.store.get_namespace(organization_id).await?.is_none() {
            return Ok(FilePage {
                page: Vec::new(),
                is_done: true,
                next_cursor: None,
            });
        }

        let entries = self.store.list(organization_id, cursor, page_size).await?;

        let mut files = Vec::with_capacity(entries.page.len());
        for entry in &entries.page {
            files.push(self.to_public_file(entry).await?);
        }

        let files = match category {
            Some(category) => files
                .into_iter()
                .filter(|f| f.category.as_deref() == Some(category))
                .collect(),
            None => files,
        };

        Ok(FilePage {
            page: files,
            is_done: entries.is_done,
            next_cursor: entries.next_cursor,
        })
    }

    /// Deletes a file: raw blob first (best effort), then the entry, which
    /// is the source of truth for listings.
    pub async fn delete_file(
        &self,
        ctx: &RequestContext,
        entry_id: &EntryId,
    ) -> Result<(), SupioError> {
        let organization_id = ctx.organization_id();

        if self.store.get_namespace(organization_id).await?.is_none() {
            return Err(SupioError::Unauthorized("Invalid namespace".to_string()));
        }

        let entry = self
            .store
            .get(entry_id)
            .await?
            .ok_or_else(|| SupioError::NotFound("Entry not found".to_string()))?;

        if entry.metadata.uploaded_by != organization_id {
            return Err(SupioError::Unauthorized(
                "Invalid organization ID".to_string(),
            ));
        }

        if let Some(ref storage_id) = entry.metadata.storage_id {
            if let Err(e) = self.blobs.delete(storage_id).await {
                warn!(
                    entry_id = entry_id.as_str(),
                    storage_id = storage_id.as_str(),
                    error = %e,
                    "blob delete failed, removing entry anyway"
                );
            }
        }

        self.store.delete(entry_id).await
    }

    async fn to_public_file(&self, entry: &KnowledgeEntry) -> Result<PublicFile, SupioError> {
        let mut size = "unknown".to_string();
        let mut url = None;

        if let Some(ref storage_id) = entry.metadata.storage_id {
            // Size resolution is best effort: a missing or broken blob must
            // not fail the whole page.
            match self.blobs.get_metadata(storage_id).await {
                Ok(Some(metadata)) => size = format_file_size(metadata.size),
                Ok(None) => {}
                Err(e) => warn!(
                    storage_id = storage_id.as_str(),
                    error = %e,
                    "failed to get blob metadata"
                ),
            }
            url = self.blobs.get_url(storage_id).await.unwrap_or(None);
        }

        let name = if entry.key.is_empty() {
            "Unknown".to_string()
        } else {
            entry.key.clone()
        };
        let file_type = name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != name)
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "txt".to_string());

        let status = match entry.status {
            EntryStatus::Ready => PublicFileStatus::Ready,
            EntryStatus::Pending => PublicFileStatus::Processing,
            EntryStatus::Error => PublicFileStatus::Error,
        };

        Ok(PublicFile {
            id: entry.id.clone(),
            name,
            file_type,
            size,
            status,
            url,
            category: entry.metadata.category.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::ExtractorModels;
    use supio_storage::{Database, FsBlobStore};
    use supio_test_utils::MockProvider;
    use tempfile::tempdir;

    struct Fixture {
        catalog: FileCatalog,
        store: KnowledgeStore,
        blobs: Arc<FsBlobStore>,
        _dir: tempfile::TempDir,
    }

    async fn setup() -> Fixture {
        setup_with_provider(Arc::new(MockProvider::new())).await
    }

    async fn setup_with_provider(provider: Arc<MockProvider>) -> Fixture {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let store = KnowledgeStore::new(db);
        let blobs = Arc::new(FsBlobStore::new(dir.path().join("blobs")));
        let extractor = ContentExtractor::new(
            provider,
            ExtractorModels {
                vision: "vision".into(),
                document: "document".into(),
                markdown: "markdown".into(),
            },
            1024,
        );
        let catalog = FileCatalog::new(store.clone(), blobs.clone(), extractor);
        Fixture {
            catalog,
            store,
            blobs,
            _dir: dir,
        }
    }

    fn ctx(org: &str) -> RequestContext {
        RequestContext::new(org)
    }

    fn upload(filename: &str, bytes: &[u8]) -> UploadFile {
        UploadFile {
            filename: filename.to_string(),
            mime_type: None,
            bytes: bytes.to_vec(),
            category: None,
        }
    }

    #[tokio::test]
    async fn upload_then_reupload_dedups_and_releases_blob() {
        let f = setup().await;

        let first = f
            .catalog
            .add_file(&ctx("org1"), upload("faq.txt", b"Q: Hi A: Hello"))
            .await
            .unwrap();
        assert!(first.url.is_some());

        let second = f
            .catalog
            .add_file(&ctx("org1"), upload("faq.txt", b"Q: Hi A: Hello"))
            .await
            .unwrap();
        assert_eq!(second.entry_id, first.entry_id);

        // Entry count unchanged, and exactly one blob survives.
        let page = f.store.list("org1", None, 10).await.unwrap();
        assert_eq!(page.page.len(), 1);
        let surviving = page.page[0].metadata.storage_id.as_ref().unwrap();
        assert!(f.blobs.get(surviving).await.unwrap().is_some());
        assert!(second.url.is_none(), "loser blob was released");
    }

    #[tokio::test]
    async fn list_maps_entries_to_public_files() {
        let f = setup().await;
        f.catalog
            .add_file(
                &ctx("org1"),
                UploadFile {
                    filename: "guide.md".to_string(),
                    mime_type: Some("text/plain".to_string()),
                    bytes: b"# Guide body".to_vec(),
                    category: Some("docs".to_string()),
                },
            )
            .await
            .unwrap();

        let page = f.catalog.list(&ctx("org1"), None, None, 10).await.unwrap();
        assert_eq!(page.page.len(), 1);
        let file = &page.page[0];
        assert_eq!(file.name, "guide.md");
        assert_eq!(file.file_type, "md");
        assert_eq!(file.size, "12 B");
        assert_eq!(file.status, PublicFileStatus::Ready);
        assert!(file.url.is_some());
        assert_eq!(file.category.as_deref(), Some("docs"));
    }

    #[tokio::test]
    async fn list_filters_by_category_after_conversion() {
        let f = setup().await;
        for (name, category) in [("a.txt", "docs"), ("b.txt", "legal"), ("c.txt", "docs")] {
            f.catalog
                .add_file(
                    &ctx("org1"),
                    UploadFile {
                        filename: name.to_string(),
                        mime_type: None,
                        bytes: format!("content of {name}").into_bytes(),
                        category: Some(category.to_string()),
                    },
                )
                .await
                .unwrap();
        }

        let docs = f
            .catalog
            .list(&ctx("org1"), Some("docs"), None, 10)
            .await
            .unwrap();
        assert_eq!(docs.page.len(), 2);
        assert!(docs.page.iter().all(|file| file.category.as_deref() == Some("docs")));
    }

    #[tokio::test]
    async fn list_for_unknown_org_is_empty() {
        let f = setup().await;
        let page = f.catalog.list(&ctx("org_new"), None, None, 10).await.unwrap();
        assert!(page.page.is_empty());
        assert!(page.is_done);
    }

    #[tokio::test]
    async fn size_reports_unknown_when_blob_is_gone() {
        let f = setup().await;
        f.catalog
            .add_file(&ctx("org1"), upload("faq.txt", b"Q: Hi"))
            .await
            .unwrap();

        // Blob vanishes out from under the catalog.
        let page = f.store.list("org1", None, 10).await.unwrap();
        let storage_id = page.page[0].metadata.storage_id.clone().unwrap();
        f.blobs.delete(&storage_id).await.unwrap();

        let files = f.catalog.list(&ctx("org1"), None, None, 10).await.unwrap();
        assert_eq!(files.page[0].size, "unknown");
        assert!(files.page[0].url.is_none());
    }

    #[tokio::test]
    async fn delete_file_enforces_ownership() {
        let f = setup().await;
        let added = f
            .catalog
            .add_file(&ctx("org1"), upload("faq.txt", b"Q: Hi"))
            .await
            .unwrap();

        // Unknown namespace for org2: Unauthorized.
        let err = f
            .catalog
            .delete_file(&ctx("org2"), &added.entry_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::Unauthorized(_)));

        // org2 now has a namespace but does not own the entry.
        f.catalog
            .add_file(&ctx("org2"), upload("own.txt", b"mine"))
            .await
            .unwrap();
        let err = f
            .catalog
            .delete_file(&ctx("org2"), &added.entry_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn delete_file_removes_entry_and_blob() {
        let f = setup().await;
        let added = f
            .catalog
            .add_file(&ctx("org1"), upload("faq.txt", b"Q: Hi"))
            .await
            .unwrap();

        let page = f.store.list("org1", None, 10).await.unwrap();
        let storage_id = page.page[0].metadata.storage_id.clone().unwrap();

        f.catalog
            .delete_file(&ctx("org1"), &added.entry_id)
            .await
            .unwrap();

        assert!(f.store.get(&added.entry_id).await.unwrap().is_none());
        assert!(f.blobs.get(&storage_id).await.unwrap().is_none());

        let err = f
            .catalog
            .delete_file(&ctx("org1"), &added.entry_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::NotFound(_)));
    }

    #[tokio::test]
    async fn failed_extraction_releases_fresh_blob() {
        let provider = Arc::new(MockProvider::failing("model down"));
        let f = setup_with_provider(provider).await;

        let err = f
            .catalog
            .add_file(&ctx("org1"), upload("scan.png", &[0x89, 0x50]))
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::ExtractionFailed(_)));

        // Nothing was ingested and no blob survives.
        assert!(f.store.get_namespace("org1").await.unwrap().is_none());
        let blob_dir = f._dir.path().join("blobs");
        let survivors = std::fs::read_dir(&blob_dir)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(survivors, 0, "orphaned blob left behind");
    }

    #[test]
    fn format_file_size_examples() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(10_695_475), "10.2 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
    }

    #[test]
    fn guess_mime_type_from_extension() {
        assert_eq!(guess_mime_type("faq.txt"), "text/plain");
        assert_eq!(guess_mime_type("guide.MD"), "text/markdown");
        assert_eq!(guess_mime_type("page.html"), "text/html");
        assert_eq!(guess_mime_type("doc.pdf"), "application/pdf");
        assert_eq!(guess_mime_type("noextension"), "application/octet-stream");
    }
}
