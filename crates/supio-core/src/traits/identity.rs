// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity provider trait for dashboard callers.

use async_trait::async_trait;

use crate::error::SupioError;

/// Resolves an authenticated dashboard request to its organization.
///
/// The gateway passes the presented bearer credential; implementations
/// return the owning organization id or `Unauthorized`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Maps a credential to an organization id.
    async fn organization_id(&self, credential: &str) -> Result<String, SupioError>;
}
