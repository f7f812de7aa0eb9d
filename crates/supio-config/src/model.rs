// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Supio support engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Top-level Supio configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SupioConfig {
    /// Gateway bind settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Agent behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Dashboard identity settings.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// Voice provider API settings.
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Gateway bind configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the gateway to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the gateway to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Agent behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Greeting seeded into new conversations when the organization has no
    /// widget-settings greet message.
    #[serde(default = "default_greet_message")]
    pub default_greet_message: String,

    /// Upper bound on tool-call rounds within one agent turn.
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,

    /// Number of prior thread messages replayed to the model per turn.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            default_greet_message: default_greet_message(),
            max_tool_iterations: default_max_tool_iterations(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_greet_message() -> String {
    "Hi! How can I help you today?".to_string()
}

fn default_max_tool_iterations() -> usize {
    5
}

fn default_history_limit() -> usize {
    20
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires the `ANTHROPIC_API_KEY` env var.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Default model for agent turns and PDF extraction.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Lighter model for image transcription and markdown normalization.
    #[serde(default = "default_extraction_model")]
    pub extraction_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            extraction_model: default_extraction_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_extraction_model() -> String {
    "claude-haiku-4-5-20250901".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory for raw uploaded file blobs.
    #[serde(default = "default_blob_dir")]
    pub blob_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            blob_dir: default_blob_dir(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("supio").join("supio.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("supio.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_blob_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("supio").join("blobs"))
        .unwrap_or_else(|| std::path::PathBuf::from("blobs"))
        .to_string_lossy()
        .into_owned()
}

/// Dashboard identity configuration.
///
/// Maps bearer credentials to organization ids. Production deployments
/// plug a real identity provider into the gateway; this table backs the
/// built-in one.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// credential -> organization id.
    #[serde(default)]
    pub tokens: HashMap<String, String>,
}

/// Voice provider API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VoiceConfig {
    /// Base URL of the voice provider REST API.
    #[serde(default = "default_voice_base_url")]
    pub base_url: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_voice_base_url(),
        }
    }
}

fn default_voice_base_url() -> String {
    "https://api.vapi.ai".to_string()
}

/// Background worker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Seconds between task-queue polls when the queue is empty.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    5
}
