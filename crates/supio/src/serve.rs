// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `supio serve` command implementation.
//!
//! Wires the full engine: SQLite storage, filesystem blob store, Anthropic
//! provider, knowledge base, conversation services, the secret worker, and
//! the gateway HTTP server.

use std::sync::Arc;
use std::time::Duration;

use supio_agent::{ContactSessionService, ConversationService, MessageRouter, RouterConfig};
use supio_anthropic::AnthropicClient;
use supio_config::SupioConfig;
use supio_core::{LlmProvider, SecretStore, SupioError};
use supio_gateway::{start_server, GatewayState, ServerConfig, TokenMapIdentity};
use supio_knowledge::{ContentExtractor, ExtractorModels, FileCatalog, KnowledgeStore};
use supio_secrets::{MemorySecretStore, PluginService, SecretWorker};
use supio_storage::{Database, FsBlobStore};
use supio_voice::{VoiceClient, VoiceService};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber from config, honoring `RUST_LOG`.
fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Runs the `supio serve` command.
pub async fn run_serve(config: SupioConfig) -> Result<(), SupioError> {
    init_tracing(&config.agent.log_level);
    info!("starting supio serve");

    let db = Database::open(&config.storage.database_path).await?;
    let blobs = Arc::new(FsBlobStore::new(&config.storage.blob_dir));

    let api_key = match config.anthropic.api_key.clone() {
        Some(key) => key,
        None => std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            SupioError::Config(
                "anthropic.api_key is not set and ANTHROPIC_API_KEY is unset".to_string(),
            )
        })?,
    };
    let provider: Arc<dyn LlmProvider> = Arc::new(AnthropicClient::new(
        api_key,
        config.anthropic.api_version.clone(),
        config.anthropic.default_model.clone(),
    )?);

    let knowledge = KnowledgeStore::new(db.clone());
    let extractor = ContentExtractor::new(
        provider.clone(),
        ExtractorModels {
            vision: config.anthropic.extraction_model.clone(),
            document: config.anthropic.default_model.clone(),
            markdown: config.anthropic.extraction_model.clone(),
        },
        config.anthropic.max_tokens,
    );
    let catalog = FileCatalog::new(knowledge.clone(), blobs, extractor);

    let sessions = ContactSessionService::new(db.clone());
    let conversations = ConversationService::new(
        db.clone(),
        sessions.clone(),
        config.agent.default_greet_message.clone(),
    );
    let router = MessageRouter::new(
        db.clone(),
        knowledge,
        provider,
        RouterConfig {
            max_tokens: config.anthropic.max_tokens,
            max_tool_iterations: config.agent.max_tool_iterations,
            history_limit: config.agent.history_limit,
        },
    );

    // Secrets live in an external manager behind the SecretStore trait; the
    // bundled store keeps them process-local.
    warn!("using in-memory secret store; integration credentials do not survive restarts");
    let secrets: Arc<dyn SecretStore> = Arc::new(MemorySecretStore::new());

    let plugins = PluginService::new(db.clone());
    let worker = SecretWorker::new(db.clone(), secrets.clone());
    let poll_interval = Duration::from_secs(config.worker.poll_interval_secs);
    tokio::spawn(async move {
        worker.run(poll_interval).await;
    });

    let voice = VoiceService::new(
        db.clone(),
        secrets,
        VoiceClient::new(config.voice.base_url.clone())?,
    );

    let state = GatewayState {
        db,
        sessions,
        conversations,
        router,
        catalog,
        plugins,
        voice,
        identity: Arc::new(TokenMapIdentity::new(config.identity.tokens.clone())),
    };

    start_server(
        &ServerConfig {
            host: config.server.host.clone(),
            port: config.server.port,
        },
        state,
    )
    .await
}
