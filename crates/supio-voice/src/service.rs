// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Org-scoped voice operations: credential resolution glued to the client.

use std::sync::Arc;

use supio_core::{RequestContext, SecretStore, SupioError};
use supio_secrets::resolve_credentials;
use supio_storage::Database;

use crate::client::{Assistant, PhoneNumber, VoiceClient};

/// The service name under which voice credentials are stored.
pub const VOICE_SERVICE: &str = "vapi";

/// Voice operations for the dashboard.
#[derive(Clone)]
pub struct VoiceService {
    db: Database,
    secrets: Arc<dyn SecretStore>,
    client: VoiceClient,
}

impl VoiceService {
    pub fn new(db: Database, secrets: Arc<dyn SecretStore>, client: VoiceClient) -> Self {
        Self {
            db,
            secrets,
            client,
        }
    }

    /// Phone numbers of the caller's connected voice account.
    pub async fn list_phone_numbers(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<PhoneNumber>, SupioError> {
        let credentials =
            resolve_credentials(&self.db, &self.secrets, ctx.organization_id(), VOICE_SERVICE)
                .await?;
        self.client
            .list_phone_numbers(&credentials.private_api_key)
            .await
    }

    /// Assistants of the caller's connected voice account.
    pub async fn list_assistants(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<Assistant>, SupioError> {
        let credentials =
            resolve_credentials(&self.db, &self.secrets, ctx.organization_id(), VOICE_SERVICE)
                .await?;
        self.client.list_assistants(&credentials.private_api_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use supio_secrets::MemorySecretStore;
    use supio_storage::queries::plugins;
    use tempfile::tempdir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn resolves_credentials_then_calls_the_provider() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let memory = Arc::new(MemorySecretStore::new());
        plugins::upsert(&db, "org_1", "vapi", "tenant/org_1/vapi").await.unwrap();
        supio_core::SecretStore::create(
            memory.as_ref(),
            "tenant/org_1/vapi",
            SecretString::from(
                r#"{"publicApiKey": "pk", "privateApiKey": "sk-tenant"}"#.to_string(),
            ),
        )
        .await
        .unwrap();

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/phone-number"))
            .and(header("authorization", "Bearer sk-tenant"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "pn-1", "number": "+15550100"}
            ])))
            .mount(&server)
            .await;

        let service = VoiceService::new(
            db,
            memory,
            VoiceClient::new(server.uri()).unwrap(),
        );
        let numbers = service
            .list_phone_numbers(&RequestContext::new("org_1"))
            .await
            .unwrap();
        assert_eq!(numbers[0].id, "pn-1");
    }

    #[tokio::test]
    async fn unconnected_org_gets_plugin_not_found() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let service = VoiceService::new(
            db,
            Arc::new(MemorySecretStore::new()),
            VoiceClient::new("http://127.0.0.1:9").unwrap(),
        );
        let err = service
            .list_assistants(&RequestContext::new("org_1"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "not found: Plugin not found");
    }
}
