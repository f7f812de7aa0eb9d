// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API request/response types and the mapping to the
//! provider-neutral completion types.

use serde::{Deserialize, Serialize};
use supio_core::{
    CompletionRequest, CompletionResponse, ContentPart, Role, TokenUsage, ToolSpec,
};

// --- Tool types ---

/// A tool definition for the Anthropic Messages API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (unique identifier).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema describing the tool's input parameters.
    pub input_schema: serde_json::Value,
}

impl From<ToolSpec> for ToolDefinition {
    fn from(spec: ToolSpec) -> Self {
        Self {
            name: spec.name,
            description: spec.description,
            input_schema: spec.input_schema,
        }
    }
}

// --- Request types ---

/// A request to the Anthropic Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct MessageRequest {
    /// Model identifier.
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<ApiMessage>,

    /// System prompt (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Tool definitions available for the model to use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
}

/// A single message in the Anthropic conversation format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Role: "user" or "assistant".
    pub role: String,

    /// Content -- either a plain string or an array of content blocks.
    pub content: ApiContent,
}

/// Content within an API message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiContent {
    /// Simple text content.
    Text(String),
    /// Array of typed content blocks (text, image, document, tool use).
    Blocks(Vec<ApiContentBlock>),
}

/// A typed content block within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ApiContentBlock {
    /// Text content block.
    #[serde(rename = "text")]
    Text { text: String },
    /// Image content block (base64 encoded).
    #[serde(rename = "image")]
    Image { source: MediaSource },
    /// Document content block (base64 encoded PDF).
    #[serde(rename = "document")]
    Document { source: MediaSource },
    /// Tool use content block (sent by assistant).
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    /// Tool result content block (sent by user in response to tool_use).
    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Base64 source data for an image or document block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSource {
    /// Source type (always "base64" for inline media).
    #[serde(rename = "type")]
    pub source_type: String,
    /// MIME type (e.g., "image/png", "application/pdf").
    pub media_type: String,
    /// Base64-encoded data.
    pub data: String,
}

impl MediaSource {
    pub fn base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            source_type: "base64".to_string(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }
}

// --- Response types ---

/// A full response from the Anthropic Messages API.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    /// Response ID.
    pub id: String,
    /// Response type (always "message").
    #[serde(rename = "type")]
    pub type_: String,
    /// Role (always "assistant").
    pub role: String,
    /// Content blocks in the response.
    pub content: Vec<ResponseContentBlock>,
    /// Model that generated the response.
    pub model: String,
    /// Reason the generation stopped.
    pub stop_reason: Option<String>,
    /// Token usage statistics.
    pub usage: ApiUsage,
}

/// A content block in a response.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum ResponseContentBlock {
    /// Text content block.
    #[serde(rename = "text")]
    Text { text: String },
    /// Tool use content block -- the model is requesting a tool invocation.
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

/// Token usage statistics from the API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiUsage {
    /// Number of input tokens consumed.
    pub input_tokens: u32,
    /// Number of output tokens generated.
    pub output_tokens: u32,
}

/// API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorDetail,
}

/// Error detail within an API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Error type identifier.
    #[serde(rename = "type")]
    pub type_: String,
    /// Human-readable error message.
    pub message: String,
}

// --- Mapping to/from the provider-neutral types ---

fn part_to_block(part: ContentPart) -> ApiContentBlock {
    match part {
        ContentPart::Text { text } => ApiContentBlock::Text { text },
        ContentPart::Image { media_type, data } => ApiContentBlock::Image {
            source: MediaSource::base64(media_type, data),
        },
        ContentPart::Document { media_type, data } => ApiContentBlock::Document {
            source: MediaSource::base64(media_type, data),
        },
        ContentPart::ToolUse { id, name, input } => ApiContentBlock::ToolUse { id, name, input },
        ContentPart::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => ApiContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error: is_error.then_some(true),
        },
    }
}

/// Builds the wire request from a neutral completion request.
///
/// `default_model` applies when the request carries no model override.
pub fn to_message_request(request: CompletionRequest, default_model: &str) -> MessageRequest {
    let messages = request
        .messages
        .into_iter()
        .map(|message| {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            ApiMessage {
                role: role.to_string(),
                content: ApiContent::Blocks(
                    message.content.into_iter().map(part_to_block).collect(),
                ),
            }
        })
        .collect();

    let tools = if request.tools.is_empty() {
        None
    } else {
        Some(request.tools.into_iter().map(ToolDefinition::from).collect())
    };

    MessageRequest {
        model: request.model.unwrap_or_else(|| default_model.to_string()),
        messages,
        system: request.system,
        max_tokens: request.max_tokens,
        tools,
    }
}

/// Maps the wire response back onto the neutral completion response.
pub fn to_completion_response(response: MessageResponse) -> CompletionResponse {
    let content = response
        .content
        .into_iter()
        .map(|block| match block {
            ResponseContentBlock::Text { text } => ContentPart::Text { text },
            ResponseContentBlock::ToolUse { id, name, input } => {
                ContentPart::ToolUse { id, name, input }
            }
        })
        .collect();

    CompletionResponse {
        content,
        stop_reason: response.stop_reason,
        usage: TokenUsage {
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supio_core::ChatMessage;

    #[test]
    fn serialize_message_request_basics() {
        let req = MessageRequest {
            model: "claude-sonnet-4-20250514".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: ApiContent::Text("Hello".into()),
            }],
            system: Some("You are helpful.".into()),
            max_tokens: 4096,
            tools: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["system"], "You are helpful.");
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn serialize_document_content_block() {
        let block = ApiContentBlock::Document {
            source: MediaSource::base64("application/pdf", "JVBERi0="),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "document");
        assert_eq!(json["source"]["type"], "base64");
        assert_eq!(json["source"]["media_type"], "application/pdf");
    }

    #[test]
    fn serialize_tool_result_omits_false_is_error() {
        let block = ApiContentBlock::ToolResult {
            tool_use_id: "toolu_1".into(),
            content: "ok".into(),
            is_error: None,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_result");
        assert!(json.get("is_error").is_none());
    }

    #[test]
    fn to_message_request_uses_default_model_and_maps_parts() {
        let request = CompletionRequest {
            model: None,
            system: Some("system prompt".into()),
            messages: vec![ChatMessage::user("hi")],
            max_tokens: 512,
            tools: vec![ToolSpec {
                name: "search_knowledge".into(),
                description: "Search the knowledge base".into(),
                input_schema: serde_json::json!({"type": "object"}),
            }],
        };
        let wire = to_message_request(request, "claude-sonnet-4-20250514");
        assert_eq!(wire.model, "claude-sonnet-4-20250514");
        assert_eq!(wire.messages.len(), 1);
        assert_eq!(wire.messages[0].role, "user");
        let tools = wire.tools.unwrap();
        assert_eq!(tools[0].name, "search_knowledge");
    }

    #[test]
    fn to_message_request_honors_model_override() {
        let request = CompletionRequest {
            model: Some("claude-haiku-4-5-20250901".into()),
            system: None,
            messages: vec![],
            max_tokens: 100,
            tools: vec![],
        };
        let wire = to_message_request(request, "claude-sonnet-4-20250514");
        assert_eq!(wire.model, "claude-haiku-4-5-20250901");
        assert!(wire.tools.is_none());
    }

    #[test]
    fn deserialize_message_response_with_tool_use() {
        let json = r#"{
            "id": "msg_tool",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "Let me check."},
                {"type": "tool_use", "id": "toolu_123", "name": "search_knowledge",
                 "input": {"query": "plans"}}
            ],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 20, "output_tokens": 15}
        }"#;
        let resp: MessageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.content.len(), 2);
        assert_eq!(resp.stop_reason, Some("tool_use".into()));

        let neutral = to_completion_response(resp);
        assert_eq!(neutral.text(), "Let me check.");
        let uses = neutral.tool_uses();
        assert_eq!(uses.len(), 1);
        assert_eq!(uses[0].1, "search_knowledge");
        assert_eq!(neutral.usage.input_tokens, 20);
    }
}
