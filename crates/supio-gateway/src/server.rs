// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Three route groups: widget routes (contact-session-scoped, no operator
//! identity), dashboard routes behind the org-identity middleware, and the
//! billing webhook ingress.

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use supio_agent::{ContactSessionService, ConversationService, MessageRouter};
use supio_core::{IdentityProvider, SupioError};
use supio_knowledge::FileCatalog;
use supio_secrets::PluginService;
use supio_storage::Database;
use supio_voice::VoiceService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::org_middleware;
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub db: Database,
    pub sessions: ContactSessionService,
    pub conversations: ConversationService,
    pub router: MessageRouter,
    pub catalog: FileCatalog,
    pub plugins: PluginService,
    pub voice: VoiceService,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Gateway bind configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the full gateway router.
pub fn build_router(state: GatewayState) -> Router {
    let widget_routes = Router::new()
        .route("/widget/contact-sessions", post(handlers::create_contact_session))
        .route(
            "/widget/contact-sessions/validate",
            post(handlers::validate_contact_session),
        )
        .route("/widget/conversations", post(handlers::create_conversation))
        .route(
            "/widget/conversations/{conversation_id}",
            get(handlers::get_conversation),
        )
        .route(
            "/widget/threads/{thread_id}/messages",
            get(handlers::list_messages),
        )
        .route("/widget/messages", post(handlers::post_message))
        .with_state(state.clone());

    let dashboard_routes = Router::new()
        .route("/dashboard/files", post(handlers::upload_file).get(handlers::list_files))
        .route("/dashboard/files/{entry_id}", delete(handlers::delete_file))
        .route(
            "/dashboard/conversations/{conversation_id}/contact-session",
            get(handlers::get_conversation_contact_session),
        )
        .route(
            "/dashboard/plugins",
            post(handlers::upsert_plugin),
        )
        .route(
            "/dashboard/plugins/{service}",
            get(handlers::get_plugin).delete(handlers::remove_plugin),
        )
        .route(
            "/dashboard/widget-settings",
            get(handlers::get_widget_settings).post(handlers::upsert_widget_settings),
        )
        .route("/dashboard/voice/phone-numbers", get(handlers::list_phone_numbers))
        .route("/dashboard/voice/assistants", get(handlers::list_assistants))
        .route_layer(axum_middleware::from_fn_with_state(
            state.identity.clone(),
            org_middleware,
        ))
        .with_state(state.clone());

    // Signature verification happens upstream; this handler takes the
    // already-verified event.
    let webhook_routes = Router::new()
        .route("/webhooks/billing", post(handlers::billing_webhook))
        .with_state(state);

    Router::new()
        .merge(widget_routes)
        .merge(dashboard_routes)
        .merge(webhook_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds and serves the gateway.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), SupioError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SupioError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| SupioError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
