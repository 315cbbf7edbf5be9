//! Dynamic module loader.
//!
//! Responsibilities:
//! - Resolve `${VAR}` placeholders in a location string against the
//!   environment, failing fast with the complete set of missing names.
//! - Dispatch a concrete location either to config-script execution
//!   (filesystem paths) or to dotted-path resolution (registered modules).
//!
//! Does NOT handle:
//! - Upper-case filtering of namespace attributes (see `source.rs`).
//! - Sandboxing. A config script runs with whatever the dialect allows;
//!   file provenance is the caller's trust boundary.
//!
//! Invariants:
//! - No file I/O happens while any placeholder is unresolved.
//! - Every failure is terminal: exec errors, I/O errors and import errors
//!   are distinct variants, each naming the offending location.

mod import;
mod script;

pub use import::{ModuleDef, clear_modules, import_string, register_module};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex_lite::Regex;

use crate::constants::CONFIG_FILE_SUFFIXES;
use crate::error::ConfigError;
use crate::provider::Location;
use crate::value::{ConfigMap, Value};

/// An executable unit's attribute container: the names assigned at the top
/// level of a config script, or the contents of a registered module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    name: String,
    attrs: ConfigMap,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: HashMap::new(),
        }
    }

    /// Builder-style attribute assignment, for registered modules and tests.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attrs.iter()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // `${NAME}` only; a bare `$NAME` is deliberately not a placeholder.
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"))
}

/// Substitute every `${NAME}` placeholder with its environment value.
///
/// Fails with [`ConfigError::MissingEnvVars`] naming every unresolved
/// variable, sorted, before any substitution takes place.
fn resolve_placeholders(location: &str) -> Result<String, ConfigError> {
    let pattern = placeholder_pattern();
    let referenced: Vec<&str> = pattern
        .captures_iter(location)
        .map(|captures| captures.get(1).expect("group 1 always matches").as_str())
        .collect();

    let mut missing: Vec<String> = referenced
        .iter()
        .filter(|name| std::env::var_os(name).is_none())
        .map(|name| name.to_string())
        .collect();
    missing.sort();
    missing.dedup();
    if !missing.is_empty() {
        return Err(ConfigError::MissingEnvVars(missing));
    }

    let mut resolved = location.to_string();
    for name in referenced {
        let value = std::env::var_os(name)
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_default();
        resolved = resolved.replace(&format!("${{{name}}}"), &value);
    }
    Ok(resolved)
}

fn looks_like_file(location: &str) -> bool {
    location.contains('/')
        || location.contains('\\')
        || location.contains('$')
        || CONFIG_FILE_SUFFIXES
            .iter()
            .any(|suffix| location.ends_with(suffix))
}

fn decode(location: Location, encoding: &str) -> Result<String, ConfigError> {
    match location {
        Location::Text(text) => Ok(text),
        Location::Bytes(bytes) => {
            if !matches!(encoding.to_ascii_lowercase().as_str(), "utf-8" | "utf8") {
                return Err(ConfigError::UnsupportedEncoding(encoding.to_string()));
            }
            String::from_utf8(bytes).map_err(|_| ConfigError::Decode {
                encoding: encoding.to_string(),
            })
        }
    }
}

/// Turn a location into an executable, attribute-bearing namespace.
///
/// A location that contains a path separator or a `$` artifact, or ends in
/// a config-script suffix, is executed from the filesystem; anything else is
/// resolved as a dotted identifier path against the registered modules.
pub fn load_namespace(location: Location, encoding: &str) -> Result<Namespace, ConfigError> {
    let location = decode(location, encoding)?;
    let location = resolve_placeholders(&location)?;

    if looks_like_file(&location) {
        let path = PathBuf::from(&location);
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| location.clone());
        let source = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "executing config file");
        let namespace =
            script::eval_source(&name, &source).map_err(|source| ConfigError::FileExec {
                path: path.clone(),
                source,
            })?;
        Ok(namespace)
    } else {
        tracing::debug!(path = %location, "resolving dotted config location");
        import_string(&location)
    }
}
