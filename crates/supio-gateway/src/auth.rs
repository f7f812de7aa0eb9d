// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard identity: bearer credential to [`RequestContext`].
//!
//! Every dashboard route runs behind [`org_middleware`], which resolves the
//! presented credential through an [`IdentityProvider`] and injects the
//! explicit per-request context. No handler ever sees an unresolved
//! identity.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use supio_core::{IdentityProvider, RequestContext, SupioError};

use crate::error::ApiError;

/// Identity provider backed by a static credential table.
///
/// Stands in for the hosted identity service in local deployments; the
/// gateway only depends on the trait.
pub struct TokenMapIdentity {
    tokens: HashMap<String, String>,
}

impl TokenMapIdentity {
    /// `tokens` maps bearer credential -> organization id.
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl IdentityProvider for TokenMapIdentity {
    async fn organization_id(&self, credential: &str) -> Result<String, SupioError> {
        self.tokens
            .get(credential)
            .cloned()
            .ok_or_else(|| SupioError::Unauthorized("Invalid credentials".to_string()))
    }
}

/// Middleware resolving the caller's organization for dashboard routes.
///
/// Fails `Unauthorized` when the bearer credential is missing or unknown;
/// otherwise inserts a [`RequestContext`] extension for handlers.
pub async fn org_middleware(
    State(identity): State<Arc<dyn IdentityProvider>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| SupioError::Unauthorized("Missing bearer credential".to_string()))?;

    let organization_id = identity.organization_id(credential).await?;
    request
        .extensions_mut()
        .insert(RequestContext::new(organization_id));
    Ok(next.run(request).await)
}
