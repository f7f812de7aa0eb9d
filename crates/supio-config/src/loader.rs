// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./supio.toml` > `~/.config/supio/supio.toml` >
//! `/etc/supio/supio.toml` with environment variable overrides via the
//! `SUPIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SupioConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/supio/supio.toml` (system-wide)
/// 3. `~/.config/supio/supio.toml` (user XDG config)
/// 4. `./supio.toml` (local directory)
/// 5. `SUPIO_*` environment variables
pub fn load_config() -> Result<SupioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SupioConfig::default()))
        .merge(Toml::file("/etc/supio/supio.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("supio/supio.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("supio.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<SupioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SupioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SupioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SupioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `SUPIO_ANTHROPIC_API_KEY` must map to
/// `anthropic.api_key`, not `anthropic.api.key`.
fn env_provider() -> Env {
    Env::prefixed("SUPIO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("agent_", "agent.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("voice_", "voice.", 1)
            .replacen("worker_", "worker.", 1);
        mapped.into()
    })
}
