// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Short-lived, expiring identity for anonymous widget visitors.
//!
//! Sessions expire lazily by timestamp comparison at read time; there is no
//! background sweep. The only mutation after creation is the opportunistic
//! refresh driven by the message router.

use supio_core::{
    now_ms, ContactSessionId, SessionMetadata, SupioError, AUTO_REFRESH_THRESHOLD_MS,
    SESSION_DURATION_MS,
};
use supio_storage::queries::contact_sessions;
use supio_storage::{ContactSession, Database};
use tracing::debug;

/// Outcome of a validation check. Never mutates the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub reason: Option<String>,
}

/// Contact session lifecycle operations.
#[derive(Clone)]
pub struct ContactSessionService {
    db: Database,
}

impl ContactSessionService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates a session expiring `SESSION_DURATION_MS` from now.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        organization_id: &str,
        metadata: Option<SessionMetadata>,
    ) -> Result<ContactSessionId, SupioError> {
        let id = ContactSessionId(uuid::Uuid::new_v4().to_string());
        let expires_at = now_ms() + SESSION_DURATION_MS;
        let metadata = metadata
            .map(|m| serde_json::to_string(&m))
            .transpose()
            .map_err(|e| SupioError::Internal(format!("failed to encode session metadata: {e}")))?;

        contact_sessions::create(
            &self.db,
            &ContactSession {
                id: id.as_str().to_string(),
                name: name.to_string(),
                email: email.to_string(),
                organization_id: organization_id.to_string(),
                expires_at,
                metadata,
                created_at: String::new(),
            },
        )
        .await?;

        debug!(
            contact_session_id = id.as_str(),
            organization_id, expires_at, "contact session created"
        );
        Ok(id)
    }

    /// Checks whether a session is currently valid. Pure read.
    pub async fn validate(&self, id: &ContactSessionId) -> Result<Validation, SupioError> {
        let Some(session) = contact_sessions::get(&self.db, id.as_str()).await? else {
            return Ok(Validation {
                valid: false,
                reason: Some("Contact session not found".to_string()),
            });
        };

        if session.expires_at <= now_ms() {
            return Ok(Validation {
                valid: false,
                reason: Some("Contact session has expired".to_string()),
            });
        }

        Ok(Validation {
            valid: true,
            reason: None,
        })
    }

    /// Resolves a session and checks it has not expired.
    ///
    /// The shared first step of every session-authorized operation.
    pub async fn resolve_valid(
        &self,
        id: &ContactSessionId,
    ) -> Result<ContactSession, SupioError> {
        let session = contact_sessions::get(&self.db, id.as_str())
            .await?
            .filter(|s| now_ms() < s.expires_at)
            .ok_or_else(|| SupioError::Unauthorized("Invalid session".to_string()))?;
        Ok(session)
    }

    /// Extends a session's expiry when it is within
    /// `AUTO_REFRESH_THRESHOLD_MS` of expiring; otherwise a no-op.
    ///
    /// Invoked by the message router on every accepted message, never by
    /// the client directly. Returns the new expiry when one was written.
    pub async fn refresh(&self, id: &ContactSessionId) -> Result<Option<i64>, SupioError> {
        let session = self.resolve_valid(id).await?;

        let now = now_ms();
        if session.expires_at - now >= AUTO_REFRESH_THRESHOLD_MS {
            return Ok(None);
        }

        let expires_at = now + SESSION_DURATION_MS;
        contact_sessions::update_expires_at(&self.db, id.as_str(), expires_at).await?;
        debug!(contact_session_id = id.as_str(), expires_at, "contact session refreshed");
        Ok(Some(expires_at))
    }
}
