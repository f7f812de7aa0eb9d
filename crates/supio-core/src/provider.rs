// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider-neutral completion types and the [`LlmProvider`] trait.
//!
//! The agent loop and the content extractor speak these types; the
//! `supio-anthropic` crate maps them onto the vendor wire format.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SupioError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One part of a message's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text { text: String },
    /// Inline base64 image for vision extraction.
    Image { media_type: String, data: String },
    /// Inline base64 document (PDF) for full-text extraction.
    Document { media_type: String, data: String },
    /// A tool invocation requested by the model.
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// The result of executing a requested tool, fed back to the model.
    ToolResult {
        tool_use_id: String,
        content: String,
        is_error: bool,
    },
}

/// A single message in a model conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    /// A plain-text user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }

    /// A plain-text assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }
}

/// A tool the model may invoke during a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name (unique identifier).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema describing the tool's input parameters.
    pub input_schema: serde_json::Value,
}

/// A request for a single model completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model override; `None` uses the provider's default.
    pub model: Option<String>,
    /// System instruction.
    pub system: Option<String>,
    /// Conversation history, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Tools the model may call. Empty means no tool use.
    pub tools: Vec<ToolSpec>,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A completed model turn.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Content blocks: text and any tool invocations, in model order.
    pub content: Vec<ContentPart>,
    /// Why generation stopped (`end_turn`, `tool_use`, ...).
    pub stop_reason: Option<String>,
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Concatenated text of all text blocks.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for part in &self.content {
            if let ContentPart::Text { text } = part {
                out.push_str(text);
            }
        }
        out
    }

    /// All tool invocations requested in this turn, in order.
    pub fn tool_uses(&self) -> Vec<(&str, &str, &serde_json::Value)> {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                _ => None,
            })
            .collect()
    }
}

/// A language model capable of single-shot, optionally tool-using completions.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Runs one completion and returns the full response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, SupioError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_concatenates_text_blocks() {
        let resp = CompletionResponse {
            content: vec![
                ContentPart::Text {
                    text: "Hello".into(),
                },
                ContentPart::ToolUse {
                    id: "t1".into(),
                    name: "search_knowledge".into(),
                    input: serde_json::json!({"query": "plans"}),
                },
                ContentPart::Text {
                    text: " world".into(),
                },
            ],
            stop_reason: Some("tool_use".into()),
            usage: TokenUsage::default(),
        };
        assert_eq!(resp.text(), "Hello world");
        let uses = resp.tool_uses();
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].1, "search_knowledge");
    }

    #[test]
    fn chat_message_constructors() {
        let m = ChatMessage::user("hi");
        assert_eq!(m.role, Role::User);
        assert_eq!(
            m.content,
            vec![ContentPart::Text { text: "hi".into() }]
        );
        assert_eq!(ChatMessage::assistant("yo").role, Role::Assistant);
    }

    #[test]
    fn content_part_serializes_tagged() {
        let part = ContentPart::ToolResult {
            tool_use_id: "t1".into(),
            content: "done".into(),
            is_error: false,
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["type"], "tool_result");
        assert_eq!(json["tool_use_id"], "t1");
    }
}
