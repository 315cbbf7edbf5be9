//! Configuration providers.
//!
//! Responsibilities:
//! - Define the provider contract: `set_options` then `load`, where `load`
//!   returns a fresh flat mapping each call and never a live view.
//! - Wire the built-in providers into the process-wide provider registry.
//!
//! Invariants:
//! - `load` has no side effects beyond reading the environment or the
//!   filesystem.
//! - Options missing from `set_options` fall back to documented defaults;
//!   `load` never reads undefined state.

mod env;
mod path;

pub use env::{EnvConfigProvider, load_dotenv};
pub use path::PathConfigProvider;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use xrpc_plugin::{Choice, Choices, PluginRegistry, RegistryError, register_plugin};

use crate::error::ConfigError;
use crate::value::ConfigMap;

/// The built-in provider variants, by registry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ProviderKind {
    Env = 1,
    Path = 2,
}

impl ProviderKind {
    pub const fn id(self) -> i32 {
        self as i32
    }

    /// The name half of the provider's registry key.
    pub const fn name(self) -> &'static str {
        match self {
            ProviderKind::Env => "env",
            ProviderKind::Path => "path",
        }
    }
}

impl Choices for ProviderKind {
    fn choices() -> Vec<Choice> {
        vec![
            Choice::new(ProviderKind::Env.id(), ProviderKind::Env.name()),
            Choice::new(ProviderKind::Path.id(), ProviderKind::Path.name()),
        ]
    }
}

/// A file location, as given by the caller: text, possibly with `${VAR}`
/// placeholders, or raw bytes to be decoded first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Text(String),
    Bytes(Vec<u8>),
}

impl From<&str> for Location {
    fn from(text: &str) -> Self {
        Location::Text(text.to_string())
    }
}

impl From<String> for Location {
    fn from(text: String) -> Self {
        Location::Text(text)
    }
}

impl From<&Path> for Location {
    fn from(path: &Path) -> Self {
        Location::Text(path.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Location {
    fn from(path: PathBuf) -> Self {
        Location::Text(path.to_string_lossy().into_owned())
    }
}

impl From<&[u8]> for Location {
    fn from(bytes: &[u8]) -> Self {
        Location::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Location {
    fn from(bytes: Vec<u8>) -> Self {
        Location::Bytes(bytes)
    }
}

/// Options handed to a provider before `load` is invoked.
///
/// Every field is optional; each provider documents its defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOptions {
    pub prefix: Option<String>,
    pub location: Option<Location>,
    pub encoding: Option<String>,
}

impl ConfigOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<Location>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

/// Capability contract implemented by every configuration provider.
pub trait ConfigProvider: Send {
    /// Store options for subsequent `load` calls. Missing optional keys
    /// fall back to the provider's documented defaults.
    fn set_options(&mut self, options: ConfigOptions);

    /// Produce a fresh mapping from this provider's source.
    fn load(&self) -> Result<ConfigMap, ConfigError>;
}

/// Register both built-in providers into `registry`.
pub fn register_builtin_providers(
    registry: &mut PluginRegistry<dyn ConfigProvider>,
) -> Result<(), RegistryError> {
    register_plugin!(registry, EnvConfigProvider, dyn ConfigProvider)?;
    register_plugin!(registry, PathConfigProvider, dyn ConfigProvider)?;
    Ok(())
}

/// The process-wide provider registry, seeded with the built-in providers.
///
/// Construct a separate [`PluginRegistry`] for anything that must not share
/// memoized provider instances with the rest of the process.
pub fn registry() -> &'static Mutex<PluginRegistry<dyn ConfigProvider>> {
    static REGISTRY: OnceLock<Mutex<PluginRegistry<dyn ConfigProvider>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut registry = PluginRegistry::new();
        if let Err(err) = register_builtin_providers(&mut registry) {
            // Unreachable on a fresh registry; log rather than poison startup.
            tracing::error!(%err, "failed to register built-in providers");
        }
        Mutex::new(registry)
    })
}

/// Lock the process-wide registry, absorbing poisoning.
pub(crate) fn lock_registry() -> MutexGuard<'static, PluginRegistry<dyn ConfigProvider>> {
    registry().lock().unwrap_or_else(PoisonError::into_inner)
}
