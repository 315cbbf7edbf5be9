//! Dotted-path resolution.
//!
//! Rust has no import machinery to probe at runtime, so dotted identifier
//! paths resolve against an explicit module table: callers register a
//! dotted name up front, either as a ready namespace or as zero-argument
//! factories for "config object referenced by dotted path" ergonomics.
//!
//! The table is process-wide; [`clear_modules`] exists so test suites can
//! isolate themselves.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use super::Namespace;
use crate::error::ConfigError;

type Factory = Arc<dyn Fn() -> Namespace + Send + Sync>;

/// A registered module: a namespace of plain attributes plus named
/// zero-argument factories standing in for constructible types.
#[derive(Clone, Default)]
pub struct ModuleDef {
    namespace: Namespace,
    factories: HashMap<String, Factory>,
}

impl ModuleDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing namespace as the module body.
    pub fn from_namespace(namespace: Namespace) -> Self {
        Self {
            namespace,
            factories: HashMap::new(),
        }
    }

    /// Register a constructible type under `name`.
    pub fn factory<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Namespace + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }
}

impl std::fmt::Debug for ModuleDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDef")
            .field("namespace", &self.namespace)
            .field("factories", &self.factories.keys())
            .finish()
    }
}

fn modules() -> &'static RwLock<HashMap<String, ModuleDef>> {
    static MODULES: OnceLock<RwLock<HashMap<String, ModuleDef>>> = OnceLock::new();
    MODULES.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register (or replace) a module under a dotted name.
pub fn register_module(path: impl Into<String>, def: ModuleDef) {
    let path = path.into();
    tracing::debug!(%path, "registered module");
    modules()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(path, def);
}

/// Drop every registered module. For test isolation.
pub fn clear_modules() {
    modules()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

/// Resolve a dotted identifier path to a namespace.
///
/// The path is split on its last `.`: the leading portion must name a
/// registered module, and the trailing name must resolve to a registered
/// sub-module (returned directly) or a factory (freshly constructed).
pub fn import_string(path: &str) -> Result<Namespace, ConfigError> {
    let table = modules().read().unwrap_or_else(PoisonError::into_inner);

    // A fully-qualified module name wins outright.
    if let Some(def) = table.get(path) {
        return Ok(def.namespace.clone());
    }

    let Some((lead, attr)) = path.rsplit_once('.') else {
        return Err(ConfigError::Import {
            path: path.to_string(),
            reason: "not a dotted path".to_string(),
        });
    };
    let Some(module) = table.get(lead) else {
        return Err(ConfigError::Import {
            path: path.to_string(),
            reason: format!("no module named '{lead}'"),
        });
    };
    if let Some(factory) = module.factories.get(attr) {
        return Ok(factory());
    }
    if module.namespace.contains(attr) {
        return Err(ConfigError::Import {
            path: path.to_string(),
            reason: format!("'{attr}' is not a namespace or constructible type"),
        });
    }
    Err(ConfigError::Import {
        path: path.to_string(),
        reason: format!("module '{lead}' has no attribute '{attr}'"),
    })
}
