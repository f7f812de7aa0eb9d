// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content extraction: uploaded bytes to plain/markdown text.
//!
//! Dispatches by MIME category. Plain text is decoded directly with no
//! model call; images and PDFs go through vision/document model calls;
//! other text-like formats are decoded and normalized into markdown by a
//! lightweight model.

use std::sync::Arc;

use base64::Engine as _;
use supio_core::{
    ChatMessage, CompletionRequest, ContentPart, LlmProvider, Role, SupioError,
};
use tracing::debug;

/// Image types accepted by the vision path.
pub const SUPPORTED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Full extraction allow-list.
pub const ALLOWED_TYPES: [&str; 8] = [
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "application/pdf",
    "text/plain",
    "text/html",
    "text/markdown",
];

const IMAGE_PROMPT: &str = "You turn images into text. If it is a photo of a document, \
     transcribe it. If it is not a document, describe it.";

const PDF_PROMPT: &str = "You transform PDF files into text.";

const MARKDOWN_PROMPT: &str = "You transform content into markdown.";

/// Model identifiers for each extraction path.
#[derive(Debug, Clone)]
pub struct ExtractorModels {
    /// Vision-capable model for image transcription.
    pub vision: String,
    /// Document-capable model for PDF full-text extraction.
    pub document: String,
    /// Lightweight model for markdown normalization of text-like formats.
    pub markdown: String,
}

/// Converts uploaded file bytes into text, dispatching by MIME type.
#[derive(Clone)]
pub struct ContentExtractor {
    provider: Arc<dyn LlmProvider>,
    models: ExtractorModels,
    max_tokens: u32,
}

impl ContentExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>, models: ExtractorModels, max_tokens: u32) -> Self {
        Self {
            provider,
            models,
            max_tokens,
        }
    }

    /// Extracts text from `bytes`.
    ///
    /// Fails with `UnsupportedType` for MIME types outside the allow-list
    /// and `ExtractionFailed` when a model call fails. The caller owns any
    /// raw-storage cleanup on failure.
    pub async fn extract(
        &self,
        filename: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<String, SupioError> {
        let mime = mime_type.to_ascii_lowercase();

        if !ALLOWED_TYPES.iter().any(|t| mime.starts_with(t)) {
            return Err(SupioError::UnsupportedType(format!(
                "MIME type not allowed: {mime_type}"
            )));
        }

        debug!(filename, mime_type = mime.as_str(), size = bytes.len(), "extracting content");

        if SUPPORTED_IMAGE_TYPES.iter().any(|t| *t == mime) {
            return self.extract_image(&mime, bytes).await;
        }

        if mime.contains("pdf") {
            return self.extract_pdf(bytes).await;
        }

        if mime.contains("text") {
            return self.extract_text(&mime, bytes).await;
        }

        Err(SupioError::UnsupportedType(format!(
            "unsupported MIME type: {mime_type}"
        )))
    }

    async fn extract_image(&self, media_type: &str, bytes: &[u8]) -> Result<String, SupioError> {
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        let request = CompletionRequest {
            model: Some(self.models.vision.clone()),
            system: Some(IMAGE_PROMPT.to_string()),
            messages: vec![ChatMessage {
                role: Role::User,
                content: vec![ContentPart::Image {
                    media_type: media_type.to_string(),
                    data,
                }],
            }],
            max_tokens: self.max_tokens,
            tools: Vec::new(),
        };
        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| SupioError::ExtractionFailed(e.to_string()))?;
        Ok(response.text())
    }

    async fn extract_pdf(&self, bytes: &[u8]) -> Result<String, SupioError> {
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        let request = CompletionRequest {
            model: Some(self.models.document.clone()),
            system: Some(PDF_PROMPT.to_string()),
            messages: vec![ChatMessage {
                role: Role::User,
                content: vec![
                    ContentPart::Document {
                        media_type: "application/pdf".to_string(),
                        data,
                    },
                    ContentPart::Text {
                        text: "Extract the text from the PDF and print it without explaining \
                               that you'll do so."
                            .to_string(),
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            tools: Vec::new(),
        };
        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| SupioError::ExtractionFailed(e.to_string()))?;
        Ok(response.text())
    }

    async fn extract_text(&self, mime: &str, bytes: &[u8]) -> Result<String, SupioError> {
        let text = String::from_utf8_lossy(bytes).into_owned();

        // Plain text costs nothing: no model call.
        if mime == "text/plain" {
            return Ok(text);
        }

        let request = CompletionRequest {
            model: Some(self.models.markdown.clone()),
            system: Some(MARKDOWN_PROMPT.to_string()),
            messages: vec![ChatMessage {
                role: Role::User,
                content: vec![
                    ContentPart::Text { text },
                    ContentPart::Text {
                        text: "Extract the text and print it in a markdown format without \
                               explaining that you'll do so."
                            .to_string(),
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            tools: Vec::new(),
        };
        let response = self
            .provider
            .complete(request)
            .await
            .map_err(|e| SupioError::ExtractionFailed(e.to_string()))?;
        Ok(response.text())
    }
}
