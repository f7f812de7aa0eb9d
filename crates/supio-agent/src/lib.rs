// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for the Supio support engine.
//!
//! Owns conversation lifecycle, contact-session identity, and the message
//! router that decides per message whether the AI agent responds,
//! escalates, or yields to passive storage.

pub mod contact_sessions;
pub mod conversations;
pub mod prompts;
pub mod router;
pub mod tools;

pub use contact_sessions::{ContactSessionService, Validation};
pub use conversations::{ConversationService, ConversationSummary};
pub use router::{MessageRouter, RouterConfig};
pub use tools::{AgentTools, ESCALATE_TOOL, RESOLVE_TOOL, SEARCH_TOOL};
