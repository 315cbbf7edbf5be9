//! File-location configuration provider.
//!
//! Delegates location resolution to the module loader and extracts the
//! upper-case attributes from the resulting namespace. An unset location
//! yields an empty mapping rather than failing.

use xrpc_plugin::{Capability, PluginSpec};

use super::{ConfigOptions, ConfigProvider, Location, ProviderKind};
use crate::constants::DEFAULT_ENCODING;
use crate::error::ConfigError;
use crate::loader::load_namespace;
use crate::source::ConfigSource;
use crate::value::ConfigMap;

/// Loads configuration from a file location or dotted identifier path.
#[derive(Debug, Default)]
pub struct PathConfigProvider {
    location: Option<Location>,
    encoding: Option<String>,
}

impl PluginSpec for PathConfigProvider {
    const CAPABILITY: Capability = Capability::ConfigProvider;
    const NAME: &'static str = ProviderKind::Path.name();
}

impl ConfigProvider for PathConfigProvider {
    fn set_options(&mut self, options: ConfigOptions) {
        self.location = options.location;
        self.encoding = options.encoding;
    }

    fn load(&self) -> Result<ConfigMap, ConfigError> {
        let Some(location) = self.location.clone() else {
            tracing::debug!("no location set, yielding empty configuration");
            return Ok(ConfigMap::new());
        };
        let encoding = self.encoding.as_deref().unwrap_or(DEFAULT_ENCODING);
        let namespace = load_namespace(location, encoding)?;
        Ok(ConfigSource::from(namespace).into_config())
    }
}
