// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic test doubles for the Supio support engine.

pub mod mock_provider;

pub use mock_provider::{text_response, tool_use_response, MockProvider};
