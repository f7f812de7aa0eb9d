// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Supio support engine.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, typed CRUD
//! operations for conversations, contact sessions, messages, plugins,
//! subscriptions, widget settings, and a crash-safe background task queue.
//! Also ships the filesystem blob store for raw uploaded file bytes.

pub mod blob;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use blob::FsBlobStore;
pub use database::{map_tr_err, Database};
pub use models::*;
