//! Capability registry for xRPC.
//!
//! This crate provides the process-wide plugin machinery: a registry that
//! maps a (capability, name) pair to a registered implementation constructor
//! and hands out memoized singleton instances.

mod capability;
mod choices;
mod error;
mod registry;

pub use capability::Capability;
pub use choices::{Choice, Choices};
pub use error::RegistryError;
pub use registry::{Constructor, PluginRegistry, PluginSpec, SharedPlugin};
