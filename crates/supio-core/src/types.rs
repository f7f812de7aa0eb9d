// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Supio workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Session lifetime in milliseconds (24 hours).
pub const SESSION_DURATION_MS: i64 = 24 * 60 * 60 * 1000;

/// Auto-refresh threshold in milliseconds (4 hours).
///
/// Sessions are refreshed when their remaining lifetime falls below this.
pub const AUTO_REFRESH_THRESHOLD_MS: i64 = 4 * 60 * 60 * 1000;

/// Unique identifier for a knowledge-store entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub String);

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

/// Unique identifier for a widget visitor's contact session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactSessionId(pub String);

/// Opaque handle for the message sequence underlying a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

/// Unique identifier for a single message within a thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Unique identifier for a raw blob in the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageId(pub String);

macro_rules! impl_id_display {
    ($($t:ty),*) => {
        $(
            impl std::fmt::Display for $t {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }
            impl $t {
                /// Borrow the underlying string.
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }
        )*
    };
}

impl_id_display!(EntryId, ConversationId, ContactSessionId, ThreadId, MessageId, StorageId);

/// Lifecycle status of a support conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    /// Open, AI agent may respond.
    Unresolved,
    /// Handed to a human operator; the agent stays silent.
    Escalated,
    /// Closed; no further messages are accepted.
    Resolved,
}

/// Internal ingestion status of a knowledge-store entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Ready,
    Pending,
    Error,
}

/// Explicit per-request identity context.
///
/// Carries the caller's resolved organization id through every dashboard
/// operation instead of an ambient lookup. Constructed by the gateway's
/// identity extractor and threaded down by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    organization_id: String,
}

impl RequestContext {
    /// Builds a context for an already-authenticated organization.
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
        }
    }

    /// The caller's organization id, which is also its knowledge namespace.
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }
}

/// Optional environment hints captured when a widget visitor starts a session.
///
/// Everything here is best-effort browser telemetry; no field is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone_offset: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
}

/// Current wall-clock time as epoch milliseconds.
///
/// Session expiry is carried as epoch millis everywhere, so the comparison
/// `now < expires_at` needs no timezone handling.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
