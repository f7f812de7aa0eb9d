// SPDX-FileCopyrightText: 2026 Supio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits for the external collaborators the core consumes.

pub mod blob;
pub mod identity;
pub mod secrets;

pub use blob::{BlobMetadata, BlobStore};
pub use identity::IdentityProvider;
pub use secrets::{SecretStore, SecretStoreError};
