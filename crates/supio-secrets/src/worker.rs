// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background worker draining the secret-upsert queue.
//!
//! For each task: write the secret to the external store (create, falling
//! back to put when it already exists), then upsert the plugin row through
//! a second transactional write. Failed tasks retry up to the queue's
//! max_attempts.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use supio_core::{SecretStore, SecretStoreError, SupioError};
use supio_storage::queries::{plugins, tasks};
use supio_storage::Database;
use tracing::{error, info, warn};

use crate::plugins::{secret_name, SecretUpsertTask, SECRET_UPSERT_QUEUE};

/// Drains the `secret-upsert` queue.
pub struct SecretWorker {
    db: Database,
    secrets: Arc<dyn SecretStore>,
}

impl SecretWorker {
    pub fn new(db: Database, secrets: Arc<dyn SecretStore>) -> Self {
        Self { db, secrets }
    }

    /// Processes at most one queued task. Returns whether one was taken.
    pub async fn run_once(&self) -> Result<bool, SupioError> {
        let Some(task) = tasks::dequeue(&self.db, SECRET_UPSERT_QUEUE).await? else {
            return Ok(false);
        };

        match self.process(&task.payload).await {
            Ok(()) => {
                tasks::ack(&self.db, task.id).await?;
            }
            Err(e) => {
                warn!(task_id = task.id, error = %e, "secret upsert failed");
                tasks::fail(&self.db, task.id).await?;
            }
        }
        Ok(true)
    }

    /// Polls the queue forever, sleeping `poll_interval` when it runs dry.
    pub async fn run(&self, poll_interval: Duration) {
        info!("secret worker started");
        loop {
            match self.run_once().await {
                Ok(true) => {}
                Ok(false) => tokio::time::sleep(poll_interval).await,
                Err(e) => {
                    error!(error = %e, "secret worker queue error");
                    tokio::time::sleep(poll_interval).await;
                }
            }
        }
    }

    async fn process(&self, payload: &str) -> Result<(), SupioError> {
        let task: SecretUpsertTask = serde_json::from_str(payload)
            .map_err(|e| SupioError::Internal(format!("invalid task payload: {e}")))?;

        let name = secret_name(&task.organization_id, &task.service);
        let encoded = serde_json::to_string(&task.value)
            .map_err(|e| SupioError::Internal(format!("failed to encode secret value: {e}")))?;

        // Create, falling back to put on the exists-race.
        match self
            .secrets
            .create(&name, SecretString::from(encoded.clone()))
            .await
        {
            Ok(()) => {}
            Err(SecretStoreError::AlreadyExists(_)) => {
                self.secrets
                    .put(&name, SecretString::from(encoded))
                    .await
                    .map_err(SupioError::from)?;
            }
            Err(e) => return Err(e.into()),
        }

        // Second write: the pointer row that makes the secret reachable.
        plugins::upsert(&self.db, &task.organization_id, &task.service, &name).await?;

        info!(
            organization_id = task.organization_id.as_str(),
            service = task.service.as_str(),
            secret_name = name.as_str(),
            "secret upserted"
        );
        Ok(())
    }
}
