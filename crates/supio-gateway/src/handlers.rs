// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the widget API, dashboard API, and billing
//! webhook ingress.

use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use supio_core::{
    ContactSessionId, ConversationId, ConversationStatus, EntryId, RequestContext,
    SessionMetadata, SupioError, ThreadId,
};
use supio_knowledge::{AddedFile, FilePage, UploadFile};
use supio_storage::queries::{subscriptions, widget_settings};
use supio_storage::{MessagePage, Plugin, WidgetSettings};
use supio_voice::{Assistant, PhoneNumber};
use tracing::info;

use crate::error::ApiError;
use crate::server::GatewayState;

const DEFAULT_PAGE_SIZE: usize = 20;
const MAX_PAGE_SIZE: usize = 100;

fn page_size(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

// --- Widget API ---

/// Request body for POST /widget/contact-sessions.
#[derive(Debug, Deserialize)]
pub struct CreateContactSessionRequest {
    pub name: String,
    pub email: String,
    pub organization_id: String,
    #[serde(default)]
    pub metadata: Option<SessionMetadata>,
}

/// Response body carrying a created id.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// POST /widget/contact-sessions
pub async fn create_contact_session(
    State(state): State<GatewayState>,
    Json(body): Json<CreateContactSessionRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let id = state
        .sessions
        .create(&body.name, &body.email, &body.organization_id, body.metadata)
        .await?;
    Ok(Json(CreatedResponse {
        id: id.as_str().to_string(),
    }))
}

/// Request body for POST /widget/contact-sessions/validate.
#[derive(Debug, Deserialize)]
pub struct ValidateSessionRequest {
    pub contact_session_id: String,
}

/// Response body for session validation.
#[derive(Debug, Serialize)]
pub struct ValidateSessionResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// POST /widget/contact-sessions/validate
pub async fn validate_contact_session(
    State(state): State<GatewayState>,
    Json(body): Json<ValidateSessionRequest>,
) -> Result<Json<ValidateSessionResponse>, ApiError> {
    let validation = state
        .sessions
        .validate(&ContactSessionId(body.contact_session_id))
        .await?;
    Ok(Json(ValidateSessionResponse {
        valid: validation.valid,
        reason: validation.reason,
    }))
}

/// Request body for POST /widget/conversations.
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    pub contact_session_id: String,
    pub organization_id: String,
}

/// POST /widget/conversations
pub async fn create_conversation(
    State(state): State<GatewayState>,
    Json(body): Json<CreateConversationRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let id = state
        .conversations
        .create(
            &ContactSessionId(body.contact_session_id),
            &body.organization_id,
        )
        .await?;
    Ok(Json(CreatedResponse {
        id: id.as_str().to_string(),
    }))
}

/// Query string carrying the caller's session.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub contact_session_id: String,
}

/// Response body for GET /widget/conversations/{id}.
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub id: String,
    pub status: ConversationStatus,
    pub thread_id: String,
}

/// GET /widget/conversations/{conversation_id}
pub async fn get_conversation(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<ConversationResponse>, ApiError> {
    let summary = state
        .conversations
        .get_one(
            &ConversationId(conversation_id),
            &ContactSessionId(query.contact_session_id),
        )
        .await?;
    Ok(Json(ConversationResponse {
        id: summary.id.as_str().to_string(),
        status: summary.status,
        thread_id: summary.thread_id.as_str().to_string(),
    }))
}

/// Query string for message listing.
#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub contact_session_id: String,
    #[serde(default)]
    pub cursor: Option<i64>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// GET /widget/threads/{thread_id}/messages
pub async fn list_messages(
    State(state): State<GatewayState>,
    Path(thread_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<MessagePage>, ApiError> {
    let page = state
        .conversations
        .list_messages(
            &ThreadId(thread_id),
            &ContactSessionId(query.contact_session_id),
            query.cursor,
            page_size(query.page_size),
        )
        .await?;
    Ok(Json(page))
}

/// Request body for POST /widget/messages.
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub prompt: String,
    pub thread_id: String,
    pub contact_session_id: String,
}

/// POST /widget/messages
pub async fn post_message(
    State(state): State<GatewayState>,
    Json(body): Json<PostMessageRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .router
        .post_message(
            &body.prompt,
            &ThreadId(body.thread_id),
            &ContactSessionId(body.contact_session_id),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- Dashboard API ---

/// Request body for POST /dashboard/files.
#[derive(Debug, Deserialize)]
pub struct UploadFileRequest {
    pub filename: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    /// File content, base64 encoded.
    pub bytes: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// POST /dashboard/files
pub async fn upload_file(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<UploadFileRequest>,
) -> Result<Json<AddedFile>, ApiError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&body.bytes)
        .map_err(|e| SupioError::BadRequest(format!("invalid base64 file content: {e}")))?;

    let added = state
        .catalog
        .add_file(
            &ctx,
            UploadFile {
                filename: body.filename,
                mime_type: body.mime_type,
                bytes,
                category: body.category,
            },
        )
        .await?;
    Ok(Json(added))
}

/// Query string for file listing.
#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub cursor: Option<i64>,
    #[serde(default)]
    pub page_size: Option<usize>,
}

/// GET /dashboard/files
pub async fn list_files(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<RequestContext>,
    Query(query): Query<FilesQuery>,
) -> Result<Json<FilePage>, ApiError> {
    let page = state
        .catalog
        .list(
            &ctx,
            query.category.as_deref(),
            query.cursor,
            page_size(query.page_size),
        )
        .await?;
    Ok(Json(page))
}

/// DELETE /dashboard/files/{entry_id}
pub async fn delete_file(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<RequestContext>,
    Path(entry_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.catalog.delete_file(&ctx, &EntryId(entry_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Contact session as exposed to operators.
#[derive(Debug, Serialize)]
pub struct ContactSessionResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub organization_id: String,
    pub expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SessionMetadata>,
    pub created_at: String,
}

/// GET /dashboard/conversations/{conversation_id}/contact-session
pub async fn get_conversation_contact_session(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<RequestContext>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ContactSessionResponse>, ApiError> {
    let session = state
        .conversations
        .get_contact_session_for_conversation(&ctx, &ConversationId(conversation_id))
        .await?;

    let metadata = session
        .metadata
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok());

    Ok(Json(ContactSessionResponse {
        id: session.id,
        name: session.name,
        email: session.email,
        organization_id: session.organization_id,
        expires_at: session.expires_at,
        metadata,
        created_at: session.created_at,
    }))
}

/// Request body for POST /dashboard/plugins.
#[derive(Debug, Deserialize)]
pub struct UpsertPluginRequest {
    pub service: String,
    /// Credentials object stored as the secret value.
    pub value: serde_json::Value,
}

/// POST /dashboard/plugins
pub async fn upsert_plugin(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<UpsertPluginRequest>,
) -> Result<StatusCode, ApiError> {
    state.plugins.upsert(&ctx, &body.service, body.value).await?;
    Ok(StatusCode::ACCEPTED)
}

/// GET /dashboard/plugins/{service}
pub async fn get_plugin(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<RequestContext>,
    Path(service): Path<String>,
) -> Result<Json<Option<Plugin>>, ApiError> {
    let plugin = state.plugins.get_one(&ctx, &service).await?;
    Ok(Json(plugin))
}

/// DELETE /dashboard/plugins/{service}
pub async fn remove_plugin(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<RequestContext>,
    Path(service): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.plugins.remove(&ctx, &service).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /dashboard/widget-settings
pub async fn get_widget_settings(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Option<WidgetSettings>>, ApiError> {
    let settings = widget_settings::get(&state.db, ctx.organization_id()).await?;
    Ok(Json(settings))
}

/// Request body for POST /dashboard/widget-settings.
#[derive(Debug, Deserialize)]
pub struct WidgetSettingsRequest {
    pub greet_message: String,
    #[serde(default)]
    pub suggestion_1: Option<String>,
    #[serde(default)]
    pub suggestion_2: Option<String>,
    #[serde(default)]
    pub suggestion_3: Option<String>,
    #[serde(default)]
    pub voice_assistant_id: Option<String>,
    #[serde(default)]
    pub voice_phone_number: Option<String>,
}

/// POST /dashboard/widget-settings
pub async fn upsert_widget_settings(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<WidgetSettingsRequest>,
) -> Result<StatusCode, ApiError> {
    widget_settings::upsert(
        &state.db,
        &WidgetSettings {
            organization_id: ctx.organization_id().to_string(),
            greet_message: body.greet_message,
            suggestion_1: body.suggestion_1,
            suggestion_2: body.suggestion_2,
            suggestion_3: body.suggestion_3,
            voice_assistant_id: body.voice_assistant_id,
            voice_phone_number: body.voice_phone_number,
        },
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /dashboard/voice/phone-numbers
pub async fn list_phone_numbers(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<PhoneNumber>>, ApiError> {
    Ok(Json(state.voice.list_phone_numbers(&ctx).await?))
}

/// GET /dashboard/voice/assistants
pub async fn list_assistants(
    State(state): State<GatewayState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<Json<Vec<Assistant>>, ApiError> {
    Ok(Json(state.voice.list_assistants(&ctx).await?))
}

// --- Billing webhook ingress ---

/// Already-verified subscription event from the billing provider.
#[derive(Debug, Deserialize)]
pub struct BillingEvent {
    pub organization_id: String,
    pub status: String,
}

/// POST /webhooks/billing
pub async fn billing_webhook(
    State(state): State<GatewayState>,
    Json(event): Json<BillingEvent>,
) -> Result<StatusCode, ApiError> {
    subscriptions::upsert(&state.db, &event.organization_id, &event.status).await?;
    info!(
        organization_id = event.organization_id.as_str(),
        status = event.status.as_str(),
        "subscription updated from webhook"
    );
    Ok(StatusCode::OK)
}
