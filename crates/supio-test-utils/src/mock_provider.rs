// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock LLM provider for deterministic testing.
//!
//! `MockProvider` implements [`LlmProvider`] with pre-configured responses,
//! enabling fast, CI-runnable tests without external API calls. Responses
//! are popped from a FIFO queue; scripted tool-use turns let tests drive
//! the agent's tool loop.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use supio_core::{
    CompletionRequest, CompletionResponse, ContentPart, LlmProvider, SupioError, TokenUsage,
};

/// A plain text completion with `end_turn`.
pub fn text_response(text: impl Into<String>) -> CompletionResponse {
    CompletionResponse {
        content: vec![ContentPart::Text { text: text.into() }],
        stop_reason: Some("end_turn".to_string()),
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 20,
        },
    }
}

/// A completion requesting one tool invocation.
pub fn tool_use_response(
    id: impl Into<String>,
    name: impl Into<String>,
    input: serde_json::Value,
) -> CompletionResponse {
    CompletionResponse {
        content: vec![ContentPart::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }],
        stop_reason: Some("tool_use".to_string()),
        usage: TokenUsage {
            input_tokens: 10,
            output_tokens: 20,
        },
    }
}

/// A mock LLM provider that returns pre-configured responses.
///
/// When the queue is empty, a default "mock response" text is returned.
/// Every request is recorded for later inspection.
pub struct MockProvider {
    responses: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
    failure: Option<String>,
}

impl MockProvider {
    /// Empty response queue; every call returns the default text.
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// Pre-loaded with plain text responses, returned in order.
    pub fn with_text_responses(texts: Vec<String>) -> Self {
        Self::with_responses(texts.into_iter().map(text_response).collect())
    }

    /// Pre-loaded with full responses (e.g. tool-use turns).
    pub fn with_responses(responses: Vec<CompletionResponse>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            requests: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    /// A provider whose every call fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    /// Append a response to the queue.
    pub async fn push_response(&self, response: CompletionResponse) {
        self.responses.lock().await.push_back(response);
    }

    /// Number of completion calls made so far.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    /// The most recent request, if any call was made.
    pub async fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().await.last().cloned()
    }

    /// All recorded requests in call order.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, SupioError> {
        self.requests.lock().await.push(request);

        if let Some(ref message) = self.failure {
            return Err(SupioError::Provider {
                message: message.clone(),
                source: None,
            });
        }

        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| text_response("mock response")))
    }
}
