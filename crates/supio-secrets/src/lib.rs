// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-organization integration credentials for the Supio support engine.
//!
//! A plugin row links `(organization, service)` to a named secret in an
//! external store. The public upsert enqueues a background task; the
//! worker performs the external write and then records the pointer.

pub mod credentials;
pub mod memory;
pub mod plugins;
pub mod worker;

pub use credentials::{resolve_credentials, VoiceCredentials};
pub use memory::MemorySecretStore;
pub use plugins::{secret_name, PluginService, SecretUpsertTask, SECRET_UPSERT_QUEUE};
pub use worker::SecretWorker;
