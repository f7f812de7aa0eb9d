// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The agent's tools: knowledge search, escalate, resolve.
//!
//! Tools execute inside the model's tool-call loop, so they return
//! descriptive strings instead of raising: a hard error here would corrupt
//! the conversation turn.

use std::sync::Arc;

use supio_core::{ChatMessage, CompletionRequest, ConversationStatus, LlmProvider, ToolSpec};
use supio_knowledge::KnowledgeStore;
use supio_storage::queries::{conversations, messages};
use supio_storage::{Database, StoredMessage};
use tracing::{info, warn};

use crate::prompts::SEARCH_INTERPRETER_PROMPT;

/// Tool names as exposed to the model.
pub const SEARCH_TOOL: &str = "search_knowledge";
pub const ESCALATE_TOOL: &str = "escalate_conversation";
pub const RESOLVE_TOOL: &str = "resolve_conversation";

/// Number of knowledge entries retrieved per search.
pub const SEARCH_LIMIT: usize = 5;

/// The three tool definitions granted to the agent.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: SEARCH_TOOL.to_string(),
            description:
                "Search the knowledge base for relevant information to help answer user questions"
                    .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query to find the relevant information"
                    }
                },
                "required": ["query"]
            }),
        },
        ToolSpec {
            name: ESCALATE_TOOL.to_string(),
            description: "Escalate the conversation to a human operator".to_string(),
            input_schema: serde_json::json!({"type": "object", "properties": {}}),
        },
        ToolSpec {
            name: RESOLVE_TOOL.to_string(),
            description: "Mark the conversation as resolved".to_string(),
            input_schema: serde_json::json!({"type": "object", "properties": {}}),
        },
    ]
}

/// Executes agent tools against one thread.
#[derive(Clone)]
pub struct AgentTools {
    db: Database,
    knowledge: KnowledgeStore,
    provider: Arc<dyn LlmProvider>,
    max_tokens: u32,
}

impl AgentTools {
    pub fn new(
        db: Database,
        knowledge: KnowledgeStore,
        provider: Arc<dyn LlmProvider>,
        max_tokens: u32,
    ) -> Self {
        Self {
            db,
            knowledge,
            provider,
            max_tokens,
        }
    }

    /// Runs one tool call and returns the string fed back to the model.
    pub async fn execute(
        &self,
        thread_id: &str,
        name: &str,
        input: &serde_json::Value,
    ) -> String {
        match name {
            SEARCH_TOOL => self.search(thread_id, input).await,
            ESCALATE_TOOL => self.set_status(thread_id, ConversationStatus::Escalated).await,
            RESOLVE_TOOL => self.set_status(thread_id, ConversationStatus::Resolved).await,
            other => {
                warn!(tool = other, "model requested unknown tool");
                format!("Unknown tool: {other}")
            }
        }
    }

    /// RAG search: retrieve from the conversation's namespace, synthesize a
    /// grounded answer, and persist it as an assistant message.
    ///
    /// The persisted answer IS the tool's output; the router must not write
    /// the same content again.
    async fn search(&self, thread_id: &str, input: &serde_json::Value) -> String {
        let Some(query) = input.get("query").and_then(|q| q.as_str()) else {
            return "Missing search query".to_string();
        };

        let conversation = match conversations::get_by_thread_id(&self.db, thread_id).await {
            Ok(Some(conversation)) => conversation,
            Ok(None) => return "Conversation not found".to_string(),
            Err(e) => {
                warn!(error = %e, "search tool failed to resolve conversation");
                return "Conversation not found".to_string();
            }
        };

        let result = match self
            .knowledge
            .search(&conversation.organization_id, query, SEARCH_LIMIT)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "knowledge search failed");
                return "Search failed, please try again".to_string();
            }
        };

        let titles: Vec<&str> = result
            .entries
            .iter()
            .map(|hit| hit.title.as_str())
            .filter(|t| !t.is_empty())
            .collect();
        let context_text = if titles.is_empty() {
            format!("Here is the context:\n\n{}", result.text)
        } else {
            format!(
                "Found results in {}. Here is the context:\n\n{}",
                titles.join(", "),
                result.text
            )
        };

        let request = CompletionRequest {
            model: None,
            system: Some(SEARCH_INTERPRETER_PROMPT.to_string()),
            messages: vec![ChatMessage::user(format!(
                "User asked: \"{query}\"\n\nSearch results: {context_text}"
            ))],
            max_tokens: self.max_tokens,
            tools: Vec::new(),
        };

        let answer = match self.provider.complete(request).await {
            Ok(response) => response.text(),
            Err(e) => {
                warn!(error = %e, "search interpreter call failed");
                return "Search failed, please try again".to_string();
            }
        };

        if let Err(e) = messages::insert(
            &self.db,
            &StoredMessage {
                id: uuid::Uuid::new_v4().to_string(),
                thread_id: thread_id.to_string(),
                role: "assistant".to_string(),
                content: answer.clone(),
                created_at: String::new(),
            },
        )
        .await
        {
            warn!(error = %e, "failed to persist search answer");
        }

        answer
    }

    async fn set_status(&self, thread_id: &str, status: ConversationStatus) -> String {
        let conversation = match conversations::get_by_thread_id(&self.db, thread_id).await {
            Ok(Some(conversation)) => conversation,
            Ok(None) => return "Conversation not found".to_string(),
            Err(e) => {
                warn!(error = %e, "status tool failed to resolve conversation");
                return "Conversation not found".to_string();
            }
        };

        if let Err(e) = conversations::update_status(&self.db, &conversation.id, status).await {
            warn!(error = %e, "failed to update conversation status");
            return "Failed to update the conversation".to_string();
        }

        info!(
            conversation_id = conversation.id.as_str(),
            status = %status,
            "conversation status changed by agent tool"
        );

        match status {
            ConversationStatus::Escalated => {
                "Conversation escalated to a human operator".to_string()
            }
            ConversationStatus::Resolved => "Conversation marked as resolved".to_string(),
            ConversationStatus::Unresolved => "Conversation reopened".to_string(),
        }
    }
}
