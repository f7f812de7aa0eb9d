// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Supio support engine.

use thiserror::Error;

/// The primary error type used across all Supio crates.
///
/// The first six variants are the caller-facing taxonomy surfaced by the
/// gateway; the rest cover infrastructure failures.
#[derive(Debug, Error)]
pub enum SupioError {
    /// Session, ownership, or identity failures.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Missing conversation, entry, plugin, or session.
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid state for the requested operation (e.g. messaging a resolved
    /// conversation).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Uploaded content has a MIME type outside the extraction allow-list.
    #[error("unsupported content type: {0}")]
    UnsupportedType(String),

    /// The content extraction pipeline failed.
    #[error("content extraction failed: {0}")]
    ExtractionFailed(String),

    /// AI agent model or tool execution failure.
    #[error("agent error: {0}")]
    Agent(String),

    /// Storage backend errors (database connection, query failure, blob I/O).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM provider errors (API failure, token limits, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (invalid TOML, missing required fields, bad
    /// credential material).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SupioError {
    /// Short machine-readable code for the caller-facing taxonomy.
    pub fn code(&self) -> &'static str {
        match self {
            SupioError::Unauthorized(_) => "UNAUTHORIZED",
            SupioError::NotFound(_) => "NOT_FOUND",
            SupioError::BadRequest(_) => "BAD_REQUEST",
            SupioError::UnsupportedType(_) => "UNSUPPORTED_TYPE",
            SupioError::ExtractionFailed(_) => "EXTRACTION_FAILED",
            SupioError::Agent(_) => "AGENT_ERROR",
            SupioError::Storage { .. } => "STORAGE_ERROR",
            SupioError::Provider { .. } => "PROVIDER_ERROR",
            SupioError::Config(_) => "CONFIG_ERROR",
            SupioError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
