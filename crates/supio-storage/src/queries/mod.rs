// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table.

pub mod contact_sessions;
pub mod conversations;
pub mod messages;
pub mod plugins;
pub mod subscriptions;
pub mod tasks;
pub mod widget_settings;
