// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-organization credential resolution for the voice integration.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use supio_core::{SecretStore, SupioError};
use supio_storage::queries::plugins;
use supio_storage::Database;

/// Voice provider credentials stored as the plugin's secret value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredentials {
    #[serde(default)]
    public_api_key: Option<String>,
    #[serde(default)]
    private_api_key: Option<String>,
}

/// Resolved, complete credentials.
#[derive(Debug)]
pub struct VoiceCredentials {
    pub public_api_key: String,
    pub private_api_key: SecretString,
}

/// Resolves an organization's credentials for a service.
///
/// The error ladder distinguishes the three failure points: no plugin row,
/// no secret behind it, and a secret missing one of the two keys.
pub async fn resolve_credentials(
    db: &Database,
    secrets: &Arc<dyn SecretStore>,
    organization_id: &str,
    service: &str,
) -> Result<VoiceCredentials, SupioError> {
    let plugin = plugins::get(db, organization_id, service)
        .await?
        .ok_or_else(|| SupioError::NotFound("Plugin not found".to_string()))?;

    let secret = secrets
        .get(&plugin.secret_name)
        .await
        .map_err(SupioError::from)?
        .ok_or_else(|| SupioError::NotFound("Credentials not found".to_string()))?;

    let stored: StoredCredentials = serde_json::from_str(secret.expose_secret())
        .map_err(|_| SupioError::NotFound("Credentials not found".to_string()))?;

    let (Some(public_api_key), Some(private_api_key)) =
        (stored.public_api_key, stored.private_api_key)
    else {
        return Err(SupioError::NotFound(
            "Credentials incomplete. Please reconnect your account.".to_string(),
        ));
    };

    if public_api_key.is_empty() || private_api_key.is_empty() {
        return Err(SupioError::NotFound(
            "Credentials incomplete. Please reconnect your account.".to_string(),
        ));
    }

    Ok(VoiceCredentials {
        public_api_key,
        private_api_key: SecretString::from(private_api_key),
    })
}
