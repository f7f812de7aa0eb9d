// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Supio support engine.
//!
//! This crate provides the error taxonomy, identifier newtypes, explicit
//! request context, provider-neutral completion types, and the adapter
//! traits (blob storage, secret store, identity) consumed by the rest of
//! the workspace.

pub mod error;
pub mod provider;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SupioError;
pub use provider::{
    ChatMessage, CompletionRequest, CompletionResponse, ContentPart, LlmProvider, Role,
    TokenUsage, ToolSpec,
};
pub use traits::{BlobMetadata, BlobStore, IdentityProvider, SecretStore, SecretStoreError};
pub use types::{
    now_ms, ContactSessionId, ConversationId, ConversationStatus, EntryId, EntryStatus,
    MessageId, RequestContext, SessionMetadata, StorageId, ThreadId,
    AUTO_REFRESH_THRESHOLD_MS, SESSION_DURATION_MS,
};
