// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Voice provider integration for the Supio support engine.

pub mod client;
pub mod service;

pub use client::{Assistant, PhoneNumber, VoiceClient};
pub use service::{VoiceService, VOICE_SERVICE};
