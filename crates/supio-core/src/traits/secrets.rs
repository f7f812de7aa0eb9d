// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External secret store trait for per-organization integration credentials.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

use crate::error::SupioError;

/// Errors from the external secret store.
///
/// `AlreadyExists` is distinguished so callers can implement the
/// create-then-fallback-to-put upsert without string matching.
#[derive(Debug, Error)]
pub enum SecretStoreError {
    #[error("secret already exists: {0}")]
    AlreadyExists(String),

    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("secret store error: {0}")]
    Other(String),
}

impl From<SecretStoreError> for SupioError {
    fn from(e: SecretStoreError) -> Self {
        match e {
            SecretStoreError::NotFound(name) => {
                SupioError::NotFound(format!("secret not found: {name}"))
            }
            // An exists-race that escapes the upsert fallback, or any other
            // backend failure, is a configuration problem, not a missing
            // resource.
            other => SupioError::Config(other.to_string()),
        }
    }
}

/// Pointer-style access to an external secret manager.
///
/// The core only reads and writes named values; secret lifecycle (rotation,
/// deletion policy) belongs to the backing service.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Creates a new secret. Fails with [`SecretStoreError::AlreadyExists`]
    /// when the name is taken.
    async fn create(&self, name: &str, value: SecretString) -> Result<(), SecretStoreError>;

    /// Writes a new version of an existing secret.
    async fn put(&self, name: &str, value: SecretString) -> Result<(), SecretStoreError>;

    /// Fetches the current value. `Ok(None)` when the secret does not exist.
    async fn get(&self, name: &str) -> Result<Option<SecretString>, SecretStoreError>;
}
