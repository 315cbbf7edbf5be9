//! Error types for registry operations.
//!
//! Invariants:
//! - Every variant names the full (capability, name) key for diagnostics.
//! - Lookup failures are fatal to the calling operation; nothing retries.

use thiserror::Error;

use crate::capability::Capability;

/// Errors raised by [`crate::PluginRegistry`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("plugin type not found: {capability}/{name}")]
    NotFound { capability: Capability, name: String },

    #[error("plugin already registered: {capability}/{name}")]
    AlreadyRegistered { capability: Capability, name: String },
}
