// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message router: decides, per inbound message, whether the AI agent
//! runs, escalates, or yields to passive storage.
//!
//! `post_message` executes its steps strictly in order; steps 1-4 are hard
//! authorization/state failures surfaced verbatim to the caller. The agent
//! is triggered only for an `unresolved` conversation under an `active`
//! subscription; in every other combination the prompt is stored with no
//! agent reply.

use std::sync::Arc;

use supio_core::{
    ChatMessage, CompletionRequest, ContactSessionId, ContentPart, ConversationStatus,
    LlmProvider, Role, SupioError, ThreadId,
};
use supio_knowledge::KnowledgeStore;
use supio_storage::queries::{conversations, messages, subscriptions};
use supio_storage::{Database, StoredMessage};
use tracing::{debug, info, warn};

use crate::contact_sessions::ContactSessionService;
use crate::prompts::SUPPORT_AGENT_PROMPT;
use crate::tools::{tool_specs, AgentTools};

/// Tunables for the agent turn.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Maximum tokens per model response.
    pub max_tokens: u32,
    /// Upper bound on tool-call rounds within one turn.
    pub max_tool_iterations: usize,
    /// Number of prior thread messages replayed to the model.
    pub history_limit: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            max_tool_iterations: 5,
            history_limit: 20,
        }
    }
}

/// Routes inbound widget messages.
#[derive(Clone)]
pub struct MessageRouter {
    db: Database,
    sessions: ContactSessionService,
    provider: Arc<dyn LlmProvider>,
    tools: AgentTools,
    config: RouterConfig,
}

impl MessageRouter {
    pub fn new(
        db: Database,
        knowledge: KnowledgeStore,
        provider: Arc<dyn LlmProvider>,
        config: RouterConfig,
    ) -> Self {
        let sessions = ContactSessionService::new(db.clone());
        let tools = AgentTools::new(
            db.clone(),
            knowledge,
            provider.clone(),
            config.max_tokens,
        );
        Self {
            db,
            sessions,
            provider,
            tools,
            config,
        }
    }

    /// Handles one inbound user message on a thread.
    pub async fn post_message(
        &self,
        prompt: &str,
        thread_id: &ThreadId,
        contact_session_id: &ContactSessionId,
    ) -> Result<(), SupioError> {
        // 1. Valid contact session.
        let session = self.sessions.resolve_valid(contact_session_id).await?;

        // 2. Conversation behind the thread.
        let conversation = conversations::get_by_thread_id(&self.db, thread_id.as_str())
            .await?
            .ok_or_else(|| SupioError::NotFound("Conversation not found".to_string()))?;

        // 3. The session must own the conversation.
        if conversation.contact_session_id != session.id {
            return Err(SupioError::Unauthorized("Incorrect session".to_string()));
        }

        // 4. Resolved is terminal for message acceptance, for everyone.
        if conversation.status == ConversationStatus::Resolved {
            return Err(SupioError::BadRequest(
                "Conversation is resolved".to_string(),
            ));
        }

        // 5. Opportunistic session refresh; never fails the message.
        if let Err(e) = self.sessions.refresh(contact_session_id).await {
            warn!(error = %e, "session refresh failed");
        }

        // 6. Subscription state of the owning organization.
        let subscription =
            subscriptions::get(&self.db, &conversation.organization_id).await?;

        // 7. Gate: agent runs only for unresolved + active.
        let should_trigger_agent = conversation.status == ConversationStatus::Unresolved
            && subscription.as_ref().is_some_and(|s| s.status == "active");

        debug!(
            thread_id = thread_id.as_str(),
            status = %conversation.status,
            subscription = subscription.as_ref().map(|s| s.status.as_str()).unwrap_or("none"),
            should_trigger_agent,
            "routing message"
        );

        // 8. Agent turn, or passive storage.
        if should_trigger_agent {
            self.run_agent_turn(thread_id.as_str(), prompt).await
        } else {
            self.save_message(thread_id.as_str(), "user", prompt).await
        }
    }

    async fn save_message(
        &self,
        thread_id: &str,
        role: &str,
        content: &str,
    ) -> Result<(), SupioError> {
        messages::insert(
            &self.db,
            &StoredMessage {
                id: uuid::Uuid::new_v4().to_string(),
                thread_id: thread_id.to_string(),
                role: role.to_string(),
                content: content.to_string(),
                created_at: String::new(),
            },
        )
        .await
    }

    /// One agent turn: persist the prompt, then run a bounded tool loop
    /// until the model stops requesting tools, and persist its final reply.
    async fn run_agent_turn(&self, thread_id: &str, prompt: &str) -> Result<(), SupioError> {
        self.save_message(thread_id, "user", prompt).await?;

        // The just-persisted prompt is included in the replayed history.
        let history = messages::list_recent(&self.db, thread_id, self.config.history_limit)
            .await?;
        let mut convo: Vec<ChatMessage> = history
            .iter()
            .filter_map(|m| match m.role.as_str() {
                "user" => Some(ChatMessage::user(m.content.clone())),
                "assistant" => Some(ChatMessage::assistant(m.content.clone())),
                _ => None,
            })
            .collect();

        for iteration in 0..self.config.max_tool_iterations {
            let response = self
                .provider
                .complete(CompletionRequest {
                    model: None,
                    system: Some(SUPPORT_AGENT_PROMPT.to_string()),
                    messages: convo.clone(),
                    max_tokens: self.config.max_tokens,
                    tools: tool_specs(),
                })
                .await
                .map_err(|e| SupioError::Agent(e.to_string()))?;

            let tool_uses: Vec<(String, String, serde_json::Value)> = response
                .tool_uses()
                .into_iter()
                .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                .collect();

            if tool_uses.is_empty() {
                let text = response.text();
                if !text.is_empty() {
                    self.save_message(thread_id, "assistant", &text).await?;
                }
                info!(thread_id, iteration, "agent turn complete");
                return Ok(());
            }

            convo.push(ChatMessage {
                role: Role::Assistant,
                content: response.content.clone(),
            });

            let mut results = Vec::with_capacity(tool_uses.len());
            for (id, name, input) in tool_uses {
                debug!(thread_id, tool = name.as_str(), "executing agent tool");
                let output = self.tools.execute(thread_id, &name, &input).await;
                results.push(ContentPart::ToolResult {
                    tool_use_id: id,
                    content: output,
                    is_error: false,
                });
            }
            convo.push(ChatMessage {
                role: Role::User,
                content: results,
            });
        }

        Err(SupioError::Agent(format!(
            "tool loop exceeded {} iterations",
            self.config.max_tool_iterations
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversations::ConversationService;
    use crate::tools::{ESCALATE_TOOL, RESOLVE_TOOL, SEARCH_TOOL};
    use supio_core::now_ms;
    use supio_knowledge::{EntryMetadata, NewEntry};
    use supio_storage::queries::contact_sessions;
    use supio_test_utils::{text_response, tool_use_response, MockProvider};
    use tempfile::tempdir;

    struct Fixture {
        router: MessageRouter,
        provider: Arc<MockProvider>,
        db: Database,
        sessions: ContactSessionService,
        conversations: ConversationService,
        _dir: tempfile::TempDir,
    }

    async fn setup(provider: MockProvider) -> Fixture {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let provider = Arc::new(provider);
        let knowledge = KnowledgeStore::new(db.clone());
        let sessions = ContactSessionService::new(db.clone());
        let conversations = ConversationService::new(
            db.clone(),
            sessions.clone(),
            "Hi! How can I help you today?".to_string(),
        );
        let router = MessageRouter::new(
            db.clone(),
            knowledge.clone(),
            provider.clone(),
            RouterConfig::default(),
        );

        knowledge
            .add(NewEntry {
                namespace: "org_1".to_string(),
                key: "plans.md".to_string(),
                title: "plans.md".to_string(),
                text: "The most popular plan is the Pro plan.".to_string(),
                content_hash: "h1".to_string(),
                metadata: EntryMetadata {
                    storage_id: None,
                    uploaded_by: "org_1".to_string(),
                    filename: "plans.md".to_string(),
                    category: None,
                },
            })
            .await
            .unwrap();

        Fixture {
            router,
            provider,
            db,
            sessions,
            conversations,
            _dir: dir,
        }
    }

    /// Creates a session + conversation and returns (session_id, thread_id,
    /// conversation_id as String).
    async fn start_conversation(f: &Fixture) -> (ContactSessionId, ThreadId, String) {
        let session_id = f
            .sessions
            .create("Ada", "ada@example.com", "org_1", None)
            .await
            .unwrap();
        let conversation_id = f.conversations.create(&session_id, "org_1").await.unwrap();
        let summary = f
            .conversations
            .get_one(&conversation_id, &session_id)
            .await
            .unwrap();
        (session_id, summary.thread_id, conversation_id.as_str().to_string())
    }

    async fn set_subscription(f: &Fixture, status: &str) {
        subscriptions::upsert(&f.db, "org_1", status).await.unwrap();
    }

    async fn set_status(f: &Fixture, conversation_id: &str, status: ConversationStatus) {
        conversations::update_status(&f.db, conversation_id, status)
            .await
            .unwrap();
    }

    async fn thread_messages(f: &Fixture, thread_id: &ThreadId) -> Vec<StoredMessage> {
        messages::list_recent(&f.db, thread_id.as_str(), 50).await.unwrap()
    }

    #[tokio::test]
    async fn invalid_session_is_unauthorized() {
        let f = setup(MockProvider::new()).await;
        let (_session, thread_id, _c) = start_conversation(&f).await;

        let err = f
            .router
            .post_message("hi", &thread_id, &ContactSessionId("ghost".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn expired_session_is_unauthorized() {
        let f = setup(MockProvider::new()).await;
        let (session_id, thread_id, _c) = start_conversation(&f).await;
        contact_sessions::update_expires_at(&f.db, session_id.as_str(), now_ms() - 1)
            .await
            .unwrap();

        let err = f
            .router
            .post_message("hi", &thread_id, &session_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn unknown_thread_is_not_found() {
        let f = setup(MockProvider::new()).await;
        let session_id = f
            .sessions
            .create("Ada", "ada@example.com", "org_1", None)
            .await
            .unwrap();

        let err = f
            .router
            .post_message("hi", &ThreadId("t-ghost".to_string()), &session_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::NotFound(_)));
    }

    #[tokio::test]
    async fn non_owning_session_is_unauthorized() {
        let f = setup(MockProvider::new()).await;
        let (_owner, thread_id, _c) = start_conversation(&f).await;
        let intruder = f
            .sessions
            .create("Eve", "eve@example.com", "org_1", None)
            .await
            .unwrap();

        let err = f
            .router
            .post_message("hi", &thread_id, &intruder)
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn resolved_conversation_rejects_messages_regardless_of_subscription() {
        let f = setup(MockProvider::new()).await;
        let (session_id, thread_id, conversation_id) = start_conversation(&f).await;
        set_subscription(&f, "active").await;
        set_status(&f, &conversation_id, ConversationStatus::Resolved).await;

        let err = f
            .router
            .post_message("hi", &thread_id, &session_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::BadRequest(_)));

        // Terminal: every subsequent call fails the same way.
        let err = f
            .router
            .post_message("hello again", &thread_id, &session_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::BadRequest(_)));

        // No model call, no new message.
        assert_eq!(f.provider.call_count().await, 0);
        assert_eq!(thread_messages(&f, &thread_id).await.len(), 1); // greeting only
    }

    #[tokio::test]
    async fn agent_gating_enumerates_all_status_subscription_combinations() {
        // (status, subscription, expect_agent). Resolved rows are BadRequest.
        let combinations = [
            (ConversationStatus::Unresolved, Some("active"), Some(true)),
            (ConversationStatus::Unresolved, Some("inactive"), Some(false)),
            (ConversationStatus::Unresolved, None, Some(false)),
            (ConversationStatus::Escalated, Some("active"), Some(false)),
            (ConversationStatus::Escalated, Some("inactive"), Some(false)),
            (ConversationStatus::Resolved, Some("active"), None),
        ];

        for (status, subscription, expect_agent) in combinations {
            let f = setup(MockProvider::with_text_responses(vec![
                "Agent reply".to_string(),
            ]))
            .await;
            let (session_id, thread_id, conversation_id) = start_conversation(&f).await;
            if let Some(sub) = subscription {
                set_subscription(&f, sub).await;
            }
            set_status(&f, &conversation_id, status).await;

            let result = f.router.post_message("hi", &thread_id, &session_id).await;

            match expect_agent {
                None => {
                    assert!(
                        matches!(result, Err(SupioError::BadRequest(_))),
                        "{status:?}/{subscription:?} should be rejected"
                    );
                    assert_eq!(f.provider.call_count().await, 0);
                }
                Some(true) => {
                    result.unwrap();
                    assert_eq!(
                        f.provider.call_count().await,
                        1,
                        "{status:?}/{subscription:?} should invoke the agent"
                    );
                    let stored = thread_messages(&f, &thread_id).await;
                    // greeting + user prompt + agent reply
                    assert_eq!(stored.len(), 3);
                    assert_eq!(stored[2].content, "Agent reply");
                }
                Some(false) => {
                    result.unwrap();
                    assert_eq!(
                        f.provider.call_count().await,
                        0,
                        "{status:?}/{subscription:?} must not invoke the agent"
                    );
                    let stored = thread_messages(&f, &thread_id).await;
                    // greeting + user prompt, no agent reply
                    assert_eq!(stored.len(), 2);
                    assert_eq!(stored[1].role, "user");
                    assert_eq!(stored[1].content, "hi");
                }
            }
        }
    }

    #[tokio::test]
    async fn agent_turn_replays_history_and_persists_reply() {
        let f = setup(MockProvider::with_text_responses(vec![
            "Happy to help!".to_string(),
        ]))
        .await;
        let (session_id, thread_id, _c) = start_conversation(&f).await;
        set_subscription(&f, "active").await;

        f.router
            .post_message("I need help", &thread_id, &session_id)
            .await
            .unwrap();

        let request = f.provider.last_request().await.unwrap();
        assert_eq!(request.system.as_deref(), Some(SUPPORT_AGENT_PROMPT));
        assert_eq!(request.tools.len(), 3);
        // Greeting (assistant) then prompt (user).
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::Assistant);
        assert_eq!(request.messages[1].role, Role::User);

        let stored = thread_messages(&f, &thread_id).await;
        assert_eq!(stored.last().unwrap().content, "Happy to help!");
    }

    #[tokio::test]
    async fn escalate_tool_stops_future_agent_replies() {
        let f = setup(MockProvider::with_responses(vec![
            tool_use_response("toolu_1", ESCALATE_TOOL, serde_json::json!({})),
            text_response("A human operator will take over from here."),
        ]))
        .await;
        let (session_id, thread_id, conversation_id) = start_conversation(&f).await;
        set_subscription(&f, "active").await;

        f.router
            .post_message("let me talk to a person", &thread_id, &session_id)
            .await
            .unwrap();

        let conversation = conversations::get(&f.db, &conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.status, ConversationStatus::Escalated);
        assert_eq!(f.provider.call_count().await, 2);

        // Subscription is still active, but the agent stays silent now.
        f.router
            .post_message("anyone there?", &thread_id, &session_id)
            .await
            .unwrap();
        assert_eq!(f.provider.call_count().await, 2, "no further agent calls");

        let stored = thread_messages(&f, &thread_id).await;
        let last = stored.last().unwrap();
        assert_eq!(last.role, "user");
        assert_eq!(last.content, "anyone there?");
    }

    #[tokio::test]
    async fn resolve_tool_makes_the_conversation_terminal() {
        let f = setup(MockProvider::with_responses(vec![
            tool_use_response("toolu_1", RESOLVE_TOOL, serde_json::json!({})),
            text_response("Glad I could help!"),
        ]))
        .await;
        let (session_id, thread_id, conversation_id) = start_conversation(&f).await;
        set_subscription(&f, "active").await;

        f.router
            .post_message("that fixed it, thanks", &thread_id, &session_id)
            .await
            .unwrap();

        let conversation = conversations::get(&f.db, &conversation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.status, ConversationStatus::Resolved);

        let err = f
            .router
            .post_message("one more thing", &thread_id, &session_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::BadRequest(_)));
    }

    #[tokio::test]
    async fn search_tool_round_trips_through_the_loop() {
        let f = setup(MockProvider::with_responses(vec![
            tool_use_response(
                "toolu_1",
                SEARCH_TOOL,
                serde_json::json!({"query": "popular plan"}),
            ),
            // Interpreter answer inside the search tool.
            text_response("The Pro plan is our most popular."),
            // Final agent reply after seeing the tool result.
            text_response("Our most popular plan is Pro. Anything else?"),
        ]))
        .await;
        let (session_id, thread_id, _c) = start_conversation(&f).await;
        set_subscription(&f, "active").await;

        f.router
            .post_message("what's your most popular plan?", &thread_id, &session_id)
            .await
            .unwrap();

        let stored = thread_messages(&f, &thread_id).await;
        let contents: Vec<&str> = stored.iter().map(|m| m.content.as_str()).collect();
        // greeting, prompt, search-tool answer, final reply: no double write.
        assert_eq!(
            contents,
            vec![
                "Hi! How can I help you today?",
                "what's your most popular plan?",
                "The Pro plan is our most popular.",
                "Our most popular plan is Pro. Anything else?",
            ]
        );

        // The third call saw the tool result fed back.
        let requests = f.provider.requests().await;
        assert_eq!(requests.len(), 3);
        let last = &requests[2];
        assert!(last.messages.iter().any(|m| m
            .content
            .iter()
            .any(|p| matches!(p, ContentPart::ToolResult { .. }))));
    }

    #[tokio::test]
    async fn provider_failure_surfaces_as_agent_error() {
        let f = setup(MockProvider::failing("model down")).await;
        let (session_id, thread_id, _c) = start_conversation(&f).await;
        set_subscription(&f, "active").await;

        let err = f
            .router
            .post_message("hi", &thread_id, &session_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::Agent(_)));
    }

    #[tokio::test]
    async fn runaway_tool_loop_is_bounded() {
        // The model asks for escalate forever; the loop must cut it off.
        let responses: Vec<_> = (0..10)
            .map(|i| {
                tool_use_response(format!("toolu_{i}"), ESCALATE_TOOL, serde_json::json!({}))
            })
            .collect();
        let f = setup(MockProvider::with_responses(responses)).await;
        let (session_id, thread_id, _c) = start_conversation(&f).await;
        set_subscription(&f, "active").await;

        let err = f
            .router
            .post_message("hi", &thread_id, &session_id)
            .await
            .unwrap_err();
        assert!(matches!(err, SupioError::Agent(_)));
        assert_eq!(f.provider.call_count().await, 5, "bounded by max_tool_iterations");
    }

    #[tokio::test]
    async fn accepted_message_refreshes_a_near_expiry_session() {
        let f = setup(MockProvider::new()).await;
        let (session_id, thread_id, _c) = start_conversation(&f).await;
        // No subscription: passive path, still an accepted message.
        let near_expiry = now_ms() + 60 * 60 * 1000;
        contact_sessions::update_expires_at(&f.db, session_id.as_str(), near_expiry)
            .await
            .unwrap();

        f.router
            .post_message("hi", &thread_id, &session_id)
            .await
            .unwrap();

        let session = contact_sessions::get(&f.db, session_id.as_str())
            .await
            .unwrap()
            .unwrap();
        assert!(session.expires_at > near_expiry, "session was refreshed");
    }
}
