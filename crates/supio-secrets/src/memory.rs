// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory secret store for tests and local runs.
//!
//! Mirrors the create/put/get semantics of an external secret manager,
//! including the AlreadyExists discrimination the upsert worker relies on.

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use supio_core::{SecretStore, SecretStoreError};
use tokio::sync::Mutex;

/// Process-local [`SecretStore`].
#[derive(Default)]
pub struct MemorySecretStore {
    secrets: Mutex<HashMap<String, SecretString>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets (test helper).
    pub async fn len(&self) -> usize {
        self.secrets.lock().await.len()
    }

    /// Whether no secrets are stored.
    pub async fn is_empty(&self) -> bool {
        self.secrets.lock().await.is_empty()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn create(&self, name: &str, value: SecretString) -> Result<(), SecretStoreError> {
        let mut secrets = self.secrets.lock().await;
        if secrets.contains_key(name) {
            return Err(SecretStoreError::AlreadyExists(name.to_string()));
        }
        secrets.insert(name.to_string(), value);
        Ok(())
    }

    async fn put(&self, name: &str, value: SecretString) -> Result<(), SecretStoreError> {
        let mut secrets = self.secrets.lock().await;
        if !secrets.contains_key(name) {
            return Err(SecretStoreError::NotFound(name.to_string()));
        }
        secrets.insert(name.to_string(), value);
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Option<SecretString>, SecretStoreError> {
        let secrets = self.secrets.lock().await;
        Ok(secrets
            .get(name)
            .map(|s| SecretString::from(s.expose_secret().to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get() {
        let store = MemorySecretStore::new();
        store
            .create("tenant/org_1/vapi", SecretString::from("v1".to_string()))
            .await
            .unwrap();

        let value = store.get("tenant/org_1/vapi").await.unwrap().unwrap();
        assert_eq!(value.expose_secret(), "v1");
        assert!(store.get("tenant/org_2/vapi").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_twice_reports_already_exists() {
        let store = MemorySecretStore::new();
        store
            .create("name", SecretString::from("v1".to_string()))
            .await
            .unwrap();

        let err = store
            .create("name", SecretString::from("v2".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, SecretStoreError::AlreadyExists(_)));

        // Original value untouched.
        let value = store.get("name").await.unwrap().unwrap();
        assert_eq!(value.expose_secret(), "v1");
    }

    #[tokio::test]
    async fn put_replaces_existing_only() {
        let store = MemorySecretStore::new();
        let err = store
            .put("missing", SecretString::from("v".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, SecretStoreError::NotFound(_)));

        store
            .create("name", SecretString::from("v1".to_string()))
            .await
            .unwrap();
        store
            .put("name", SecretString::from("v2".to_string()))
            .await
            .unwrap();
        let value = store.get("name").await.unwrap().unwrap();
        assert_eq!(value.expose_secret(), "v2");
    }
}
