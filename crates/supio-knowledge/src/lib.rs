// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge base for the Supio support engine.
//!
//! A namespace-partitioned, content-addressed document index with BM25
//! search, the content extraction pipeline in front of it, and the
//! user-facing file catalog on top.

pub mod catalog;
pub mod extractor;
pub mod store;

pub use catalog::{AddedFile, FileCatalog, FilePage, PublicFile, PublicFileStatus, UploadFile};
pub use extractor::{ContentExtractor, ExtractorModels, ALLOWED_TYPES, SUPPORTED_IMAGE_TYPES};
pub use store::{
    AddOutcome, EntryMetadata, EntryPage, KnowledgeEntry, KnowledgeStore, NamespaceHandle,
    NewEntry, SearchHit, SearchResult,
};
