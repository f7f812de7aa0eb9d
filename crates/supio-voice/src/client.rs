// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! REST client for the voice provider API.
//!
//! Minimal typed surface: listing phone numbers and assistants with a
//! per-organization bearer token.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use supio_core::SupioError;
use tracing::debug;

/// A provider phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneNumber {
    pub id: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

/// A provider voice assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// HTTP client for the voice provider.
#[derive(Debug, Clone)]
pub struct VoiceClient {
    client: reqwest::Client,
    base_url: String,
}

impl VoiceClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SupioError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SupioError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Lists the account's phone numbers.
    pub async fn list_phone_numbers(
        &self,
        token: &SecretString,
    ) -> Result<Vec<PhoneNumber>, SupioError> {
        self.get_json("/phone-number", token).await
    }

    /// Lists the account's assistants.
    pub async fn list_assistants(&self, token: &SecretString) -> Result<Vec<Assistant>, SupioError> {
        self.get_json("/assistant", token).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        token: &SecretString,
    ) -> Result<T, SupioError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(|e| SupioError::Provider {
                message: format!("voice API request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(%status, path, "voice API response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SupioError::Provider {
                message: format!("voice API returned {status}: {body}"),
                source: None,
            });
        }

        response.json::<T>().await.map_err(|e| SupioError::Provider {
            message: format!("failed to parse voice API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
