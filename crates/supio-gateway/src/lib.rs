// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Supio support engine.
//!
//! Widget routes are scoped by contact session; dashboard routes resolve
//! the caller's organization through an identity provider; the billing
//! webhook feeds the subscription table.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::TokenMapIdentity;
pub use error::ApiError;
pub use server::{build_router, start_server, GatewayState, ServerConfig};
