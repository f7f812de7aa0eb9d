// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin linkage: the public surface of per-organization integration
//! credentials.
//!
//! `upsert` does no external I/O itself: it enqueues an idempotent
//! background task which the [`crate::worker::SecretWorker`] performs, then
//! writes the plugin row pointing at the stored secret.

use serde::{Deserialize, Serialize};
use supio_core::{RequestContext, SupioError};
use supio_storage::queries::{plugins, tasks};
use supio_storage::{Database, Plugin};
use tracing::info;

/// Queue drained by the secret worker.
pub const SECRET_UPSERT_QUEUE: &str = "secret-upsert";

/// Payload of one queued secret upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretUpsertTask {
    pub organization_id: String,
    pub service: String,
    /// Credentials object, stored as the secret's JSON value.
    pub value: serde_json::Value,
}

/// The tenant-scoped secret name for an (organization, service) pair.
pub fn secret_name(organization_id: &str, service: &str) -> String {
    format!("tenant/{organization_id}/{service}")
}

/// Plugin operations for the dashboard.
#[derive(Clone)]
pub struct PluginService {
    db: Database,
}

impl PluginService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Schedules a credential upsert for the caller's organization.
    ///
    /// Returns once the task is durably queued; the secret write and the
    /// plugin row follow asynchronously. Calling repeatedly just updates
    /// the same secret.
    pub async fn upsert(
        &self,
        ctx: &RequestContext,
        service: &str,
        value: serde_json::Value,
    ) -> Result<(), SupioError> {
        let task = SecretUpsertTask {
            organization_id: ctx.organization_id().to_string(),
            service: service.to_string(),
            value,
        };
        let payload = serde_json::to_string(&task)
            .map_err(|e| SupioError::Internal(format!("failed to encode task payload: {e}")))?;

        let task_id = tasks::enqueue(&self.db, SECRET_UPSERT_QUEUE, &payload).await?;
        info!(
            task_id,
            organization_id = ctx.organization_id(),
            service,
            "secret upsert queued"
        );
        Ok(())
    }

    /// The plugin row for the caller's organization, `None` when the
    /// integration is not connected.
    pub async fn get_one(
        &self,
        ctx: &RequestContext,
        service: &str,
    ) -> Result<Option<Plugin>, SupioError> {
        plugins::get(&self.db, ctx.organization_id(), service).await
    }

    /// Disconnects an integration: removes only the pointer row, never the
    /// external secret.
    pub async fn remove(&self, ctx: &RequestContext, service: &str) -> Result<(), SupioError> {
        let removed = plugins::remove(&self.db, ctx.organization_id(), service).await?;
        if !removed {
            return Err(SupioError::NotFound("Plugin not found".to_string()));
        }
        Ok(())
    }
}
