//! Configuration management for xRPC.
//!
//! This crate provides the pluggable configuration subsystem: scalar values
//! with automatic type coercion, configuration providers (environment
//! variables, file locations), a module loader that executes config scripts
//! into namespaces, and the [`Config`] container that merges everything into
//! one flat upper-case-keyed mapping.

pub mod constants;
mod container;
mod error;
mod loader;
mod provider;
mod source;
mod value;

pub use container::Config;
pub use error::{ConfigError, ScriptError};
pub use loader::{
    ModuleDef, Namespace, clear_modules, import_string, load_namespace, register_module,
};
pub use provider::{
    ConfigOptions, ConfigProvider, EnvConfigProvider, Location, PathConfigProvider, ProviderKind,
    load_dotenv, register_builtin_providers, registry,
};
pub use source::{ClassDef, ConfigSource, InstanceDef};
pub use value::{ConfigMap, InvalidTruthValue, Value, str_to_bool};
