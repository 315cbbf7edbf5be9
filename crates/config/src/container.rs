//! The configuration container.
//!
//! Responsibilities:
//! - Hold the fully-merged, flat, upper-case-keyed configuration mapping.
//! - Normalize any accepted source (map, class, instance, namespace, file
//!   location) and merge it in; later merges overwrite earlier values.
//! - Dispatch attribute-style reads and writes through declared computed
//!   properties.
//!
//! Invariants:
//! - Construction always performs exactly one environment-provider merge,
//!   with the caller's prefix or the framework default.
//! - `insert` is the raw mapping write and bypasses property interception;
//!   `set` is the attribute write and honors it.
//! - Merge order is caller-determined: the construction-time environment
//!   merge first, explicit `load_from_*` calls in call order.

use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

use xrpc_plugin::Capability;

use crate::constants::{DEFAULT_ENCODING, XRPC_PREFIX};
use crate::error::ConfigError;
use crate::provider::{ConfigOptions, Location, ProviderKind, lock_registry};
use crate::source::ConfigSource;
use crate::value::{ConfigMap, Value};

struct Property {
    getter: Box<dyn Fn(&Config) -> Option<Value> + Send + Sync>,
    setter: Box<dyn Fn(&mut Config, Value) + Send + Sync>,
}

/// Flat configuration mapping with attribute-style access and computed
/// properties.
pub struct Config {
    entries: ConfigMap,
    properties: HashMap<String, Arc<Property>>,
}

impl Config {
    /// Build an empty container, then merge prefixed environment variables
    /// (default prefix `XRPC_`).
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_defaults(ConfigMap::new(), None)
    }

    /// Build a container seeded from `defaults`, then merge prefixed
    /// environment variables.
    ///
    /// The environment merge always runs: `env_prefix` of `None` or `""`
    /// selects the framework default prefix rather than skipping the seed.
    pub fn with_defaults(
        defaults: ConfigMap,
        env_prefix: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self {
            entries: defaults,
            properties: HashMap::new(),
        };
        let prefix = match env_prefix {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => XRPC_PREFIX,
        };
        config.load_environment_vars(prefix)?;
        Ok(config)
    }

    /// Merge environment variables carrying `prefix` into the container.
    pub fn load_environment_vars(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let provider = lock_registry().get_instance(
            Capability::ConfigProvider,
            ProviderKind::Env.name(),
        )?;
        let mut provider = provider
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        provider.set_options(ConfigOptions::new().with_prefix(prefix));
        let loaded = provider.load()?;
        self.merge(loaded);
        Ok(())
    }

    /// Normalize an object-shaped source and merge it in.
    ///
    /// Only names beginning with an upper-case letter are retained; later
    /// merges overwrite earlier values for the same key.
    pub fn load_from_object(&mut self, source: impl Into<ConfigSource>) {
        self.merge(source.into().into_config());
    }

    /// Alias for [`load_from_object`](Self::load_from_object).
    pub fn update_config(&mut self, source: impl Into<ConfigSource>) {
        self.load_from_object(source);
    }

    /// Resolve a file location (or dotted identifier path) through the path
    /// provider and merge the result.
    pub fn load_from_path(&mut self, location: impl Into<Location>) -> Result<(), ConfigError> {
        let provider = lock_registry().get_instance(
            Capability::ConfigProvider,
            ProviderKind::Path.name(),
        )?;
        let mut provider = provider
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        provider.set_options(
            ConfigOptions::new()
                .with_location(location)
                .with_encoding(DEFAULT_ENCODING),
        );
        let loaded = provider.load()?;
        self.merge(loaded);
        Ok(())
    }

    fn merge(&mut self, other: ConfigMap) {
        tracing::debug!(count = other.len(), "merging configuration values");
        self.entries.extend(other);
    }

    /// Declare a computed property intercepting attribute-style access to
    /// `name`. The setter may transform before writing through.
    pub fn declare_property<G, S>(&mut self, name: impl Into<String>, getter: G, setter: S)
    where
        G: Fn(&Config) -> Option<Value> + Send + Sync + 'static,
        S: Fn(&mut Config, Value) + Send + Sync + 'static,
    {
        self.properties.insert(
            name.into(),
            Arc::new(Property {
                getter: Box::new(getter),
                setter: Box::new(setter),
            }),
        );
    }

    /// Attribute-style read. Dispatches to a declared property's getter,
    /// otherwise reads the backing store. An absent key is a
    /// [`ConfigError::MissingKey`] carrying the key name.
    pub fn get(&self, key: &str) -> Result<Value, ConfigError> {
        self.try_get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }

    pub fn try_get(&self, key: &str) -> Option<Value> {
        if let Some(property) = self.properties.get(key) {
            return (property.getter)(self);
        }
        self.entries.get(key).cloned()
    }

    /// Attribute-style write. Dispatches to a declared property's setter,
    /// otherwise writes the backing store directly.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        if let Some(property) = self.properties.get(key).cloned() {
            (property.setter)(self, value.into());
            return;
        }
        self.entries.insert(key.to_string(), value.into());
    }

    /// Raw mapping write. Never intercepted by properties.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Index<&str> for Config {
    type Output = Value;

    /// Subscript read over the backing store.
    ///
    /// Panics on an absent key, as mapping subscripts do; use
    /// [`get`](Config::get) for a recoverable lookup.
    fn index(&self, key: &str) -> &Value {
        self.entries
            .get(key)
            .unwrap_or_else(|| panic!("config has no '{key}'"))
    }
}

impl<'a> IntoIterator for &'a Config {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::hash_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("entries", &self.entries)
            .field("properties", &self.properties.keys())
            .finish()
    }
}
