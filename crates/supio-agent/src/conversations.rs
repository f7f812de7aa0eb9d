// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation lifecycle and session-to-conversation authorization.

use supio_core::{
    ContactSessionId, ConversationId, ConversationStatus, RequestContext, SupioError, ThreadId,
};
use supio_storage::queries::{conversations, messages, widget_settings};
use supio_storage::{ContactSession, Conversation, Database, MessagePage, StoredMessage};
use tracing::info;

use crate::contact_sessions::ContactSessionService;

/// What the widget sees of a conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub status: ConversationStatus,
    /// The key to load messages.
    pub thread_id: ThreadId,
}

/// Conversation lifecycle operations.
#[derive(Clone)]
pub struct ConversationService {
    db: Database,
    sessions: ContactSessionService,
    default_greet_message: String,
}

impl ConversationService {
    pub fn new(db: Database, sessions: ContactSessionService, default_greet_message: String) -> Self {
        Self {
            db,
            sessions,
            default_greet_message,
        }
    }

    /// Starts a conversation for a valid contact session.
    ///
    /// Allocates a fresh thread, seeds it with the organization's greeting
    /// (widget settings, falling back to the default), and inserts the
    /// conversation as `unresolved`.
    pub async fn create(
        &self,
        contact_session_id: &ContactSessionId,
        organization_id: &str,
    ) -> Result<ConversationId, SupioError> {
        let session = self.sessions.resolve_valid(contact_session_id).await?;

        let thread_id = uuid::Uuid::new_v4().to_string();
        let greet_message = widget_settings::get(&self.db, organization_id)
            .await?
            .map(|s| s.greet_message)
            .unwrap_or_else(|| self.default_greet_message.clone());

        messages::insert(
            &self.db,
            &StoredMessage {
                id: uuid::Uuid::new_v4().to_string(),
                thread_id: thread_id.clone(),
                role: "assistant".to_string(),
                content: greet_message,
                created_at: String::new(),
            },
        )
        .await?;

        let conversation_id = ConversationId(uuid::Uuid::new_v4().to_string());
        conversations::insert(
            &self.db,
            &Conversation {
                id: conversation_id.as_str().to_string(),
                thread_id: thread_id.clone(),
                organization_id: organization_id.to_string(),
                contact_session_id: session.id,
                status: ConversationStatus::Unresolved,
                created_at: String::new(),
                updated_at: String::new(),
            },
        )
        .await?;

        info!(
            conversation_id = conversation_id.as_str(),
            thread_id, organization_id, "conversation created"
        );
        Ok(conversation_id)
    }

    /// Fetches a conversation for its owning session.
    pub async fn get_one(
        &self,
        conversation_id: &ConversationId,
        contact_session_id: &ContactSessionId,
    ) -> Result<ConversationSummary, SupioError> {
        let session = self.sessions.resolve_valid(contact_session_id).await?;

        let conversation = conversations::get(&self.db, conversation_id.as_str())
            .await?
            .ok_or_else(|| SupioError::NotFound("Conversation not found".to_string()))?;

        if conversation.contact_session_id != session.id {
            return Err(SupioError::Unauthorized("Incorrect session".to_string()));
        }

        Ok(ConversationSummary {
            id: ConversationId(conversation.id),
            status: conversation.status,
            thread_id: ThreadId(conversation.thread_id),
        })
    }

    /// Dashboard side: resolves a conversation's owning contact session for
    /// the caller's organization.
    pub async fn get_contact_session_for_conversation(
        &self,
        ctx: &RequestContext,
        conversation_id: &ConversationId,
    ) -> Result<ContactSession, SupioError> {
        let conversation = conversations::get(&self.db, conversation_id.as_str())
            .await?
            .ok_or_else(|| SupioError::NotFound("Conversation not found".to_string()))?;

        if conversation.organization_id != ctx.organization_id() {
            return Err(SupioError::Unauthorized(
                "Invalid organization ID".to_string(),
            ));
        }

        supio_storage::queries::contact_sessions::get(&self.db, &conversation.contact_session_id)
            .await?
            .ok_or_else(|| SupioError::NotFound("Contact session not found".to_string()))
    }

    /// Lists a thread's messages for its owning session, in insertion order.
    ///
    /// Same authorization chain as posting a message: valid session, thread
    /// resolves, session owns the conversation.
    pub async fn list_messages(
        &self,
        thread_id: &ThreadId,
        contact_session_id: &ContactSessionId,
        cursor: Option<i64>,
        page_size: usize,
    ) -> Result<MessagePage, SupioError> {
        let session = self.sessions.resolve_valid(contact_session_id).await?;

        let conversation = conversations::get_by_thread_id(&self.db, thread_id.as_str())
            .await?
            .ok_or_else(|| SupioError::NotFound("Conversation not found".to_string()))?;

        if conversation.contact_session_id != session.id {
            return Err(SupioError::Unauthorized("Incorrect session".to_string()));
        }

        messages::list_page(&self.db, thread_id.as_str(), cursor, page_size).await
    }
}
