// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the persisted tables.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use supio_core::ConversationStatus;

/// One anonymous widget visitor engagement.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSession {
    pub id: String,
    pub name: String,
    pub email: String,
    pub organization_id: String,
    /// Absolute expiry as epoch milliseconds. Valid iff `now < expires_at`.
    pub expires_at: i64,
    /// JSON-encoded [`supio_core::SessionMetadata`], when captured.
    pub metadata: Option<String>,
    pub created_at: String,
}

/// One support thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub thread_id: String,
    pub organization_id: String,
    pub contact_session_id: String,
    pub status: ConversationStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// One message within a thread. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: String,
    pub thread_id: String,
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// A page of thread messages in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePage {
    pub page: Vec<StoredMessage>,
    pub is_done: bool,
    pub next_cursor: Option<i64>,
}

/// Linkage row pointing an (organization, service) pair at an external secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plugin {
    pub id: String,
    pub organization_id: String,
    pub service: String,
    pub secret_name: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Billing subscription state, one row per organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub organization_id: String,
    pub status: String,
    pub updated_at: String,
}

/// Per-organization widget configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSettings {
    pub organization_id: String,
    pub greet_message: String,
    pub suggestion_1: Option<String>,
    pub suggestion_2: Option<String>,
    pub suggestion_3: Option<String>,
    pub voice_assistant_id: Option<String>,
    pub voice_phone_number: Option<String>,
}

/// One entry in the crash-safe background task queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: i64,
    pub queue_name: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: String,
    pub updated_at: String,
    pub locked_until: Option<String>,
}

/// Parse a status column into [`ConversationStatus`], reporting a typed
/// conversion failure instead of panicking on unexpected values.
pub(crate) fn status_from_sql(
    idx: usize,
    raw: String,
) -> Result<ConversationStatus, rusqlite::Error> {
    ConversationStatus::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
