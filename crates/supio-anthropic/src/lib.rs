// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API provider for the Supio support engine.

pub mod client;
pub mod types;

pub use client::AnthropicClient;
