//! Environment-variable configuration provider.
//!
//! Responsibilities:
//! - Scan the process environment for names starting with the configured
//!   prefix, strip the prefix, and coerce each value through the fixed
//!   coercion chain.
//! - Provide the `.env` bootstrap (`load_dotenv`) that hydrates the process
//!   environment before scanning.
//!
//! Invariants:
//! - The key is the case-preserved remainder after the prefix.
//! - Values hydrate as int, float or bool per the coercion order; anything
//!   else stays a string.
//! - Dotenv failures never expose raw `.env` line contents.

use xrpc_plugin::{Capability, PluginSpec};

use super::{ConfigOptions, ConfigProvider, ProviderKind};
use crate::constants::{DOTENV_DISABLED_VAR, XRPC_PREFIX};
use crate::error::ConfigError;
use crate::value::{ConfigMap, Value};

/// Loads configuration from prefixed environment variables.
#[derive(Debug)]
pub struct EnvConfigProvider {
    prefix: String,
}

impl Default for EnvConfigProvider {
    fn default() -> Self {
        Self {
            prefix: XRPC_PREFIX.to_string(),
        }
    }
}

impl PluginSpec for EnvConfigProvider {
    const CAPABILITY: Capability = Capability::ConfigProvider;
    const NAME: &'static str = ProviderKind::Env.name();
}

impl ConfigProvider for EnvConfigProvider {
    fn set_options(&mut self, options: ConfigOptions) {
        self.prefix = options.prefix.unwrap_or_else(|| XRPC_PREFIX.to_string());
    }

    fn load(&self) -> Result<ConfigMap, ConfigError> {
        let mut config = ConfigMap::new();
        for (key, value) in std::env::vars_os() {
            // Non-unicode entries cannot be configuration input.
            let (Some(key), Some(value)) = (key.to_str(), value.to_str()) else {
                continue;
            };
            let Some(config_key) = key.strip_prefix(&self.prefix) else {
                continue;
            };
            let coerced = Value::coerce(value);
            tracing::trace!(key = config_key, value = %coerced, "environment override");
            config.insert(config_key.to_string(), coerced);
        }
        tracing::debug!(
            prefix = %self.prefix,
            count = config.len(),
            "loaded configuration from environment"
        );
        Ok(config)
    }
}

fn dotenv_disabled() -> bool {
    matches!(
        std::env::var(DOTENV_DISABLED_VAR).ok().as_deref(),
        Some("true") | Some("1")
    )
}

/// Load environment variables from a `.env` file if present.
///
/// Skipped entirely when `DOTENV_DISABLED` is `true`/`1`. A missing `.env`
/// file is silently ignored; syntax and I/O failures surface as
/// [`ConfigError::DotenvParse`] and [`ConfigError::DotenvIo`], carrying no
/// file contents.
pub fn load_dotenv() -> Result<(), ConfigError> {
    if dotenv_disabled() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env file");
            Ok(())
        }
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(dotenvy::Error::LineParse(_, index)) => {
            Err(ConfigError::DotenvParse { error_index: index })
        }
        Err(dotenvy::Error::Io(err)) => Err(ConfigError::DotenvIo { kind: err.kind() }),
        Err(_) => Err(ConfigError::DotenvUnknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_strips_prefix_and_coerces() {
        temp_env::with_vars(
            [
                ("ENVPROV_TEST_ANSWER", Some("42")),
                ("ENVPROV_TEST_ROI", Some("2.3")),
                ("ENVPROV_TEST_FLAG", Some("True")),
                ("ENVPROV_TEST_TOKEN", Some("somerandomtesttoken")),
                ("OTHER_IGNORED", Some("1")),
            ],
            || {
                let mut provider = EnvConfigProvider::default();
                provider.set_options(ConfigOptions::new().with_prefix("ENVPROV_"));
                let config = provider.load().unwrap();
                assert_eq!(config["TEST_ANSWER"], Value::Int(42));
                assert_eq!(config["TEST_ROI"], Value::Float(2.3));
                assert_eq!(config["TEST_FLAG"], Value::Bool(true));
                assert_eq!(
                    config["TEST_TOKEN"],
                    Value::Str("somerandomtesttoken".into())
                );
                assert!(!config.contains_key("IGNORED"));
                assert!(!config.contains_key("OTHER_IGNORED"));
            },
        );
    }

    #[test]
    #[serial]
    fn test_default_prefix_without_options() {
        temp_env::with_vars([("XRPC_DEFAULTED", Some("on"))], || {
            let provider = EnvConfigProvider::default();
            let config = provider.load().unwrap();
            assert_eq!(config["DEFAULTED"], Value::Bool(true));
        });
    }

    #[test]
    #[serial]
    fn test_load_is_idempotent_for_stable_environment() {
        temp_env::with_vars([("ENVPROV_STABLE", Some("7"))], || {
            let mut provider = EnvConfigProvider::default();
            provider.set_options(ConfigOptions::new().with_prefix("ENVPROV_"));
            let first = provider.load().unwrap();
            let second = provider.load().unwrap();
            assert_eq!(first, second);
        });
    }

    #[test]
    #[serial]
    fn test_dotenv_disabled_gate() {
        temp_env::with_vars([(DOTENV_DISABLED_VAR, Some("1"))], || {
            assert!(load_dotenv().is_ok());
        });
    }
}
