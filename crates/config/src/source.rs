//! Object-to-mapping normalization.
//!
//! Configuration can come from four source shapes: a plain map, a class-like
//! definition, an instance of one, or a loaded module namespace. Each shape
//! is an explicit variant with its own extraction function; classification
//! happens at construction (via `From`), never by runtime type probing.
//!
//! Extraction applies the filtering contract: only names whose first
//! character is upper-case survive. Lower-case names are deliberately
//! dropped, not lost by accident.

use std::collections::HashMap;
use std::sync::Arc;

use crate::loader::Namespace;
use crate::value::{ConfigMap, Value};

type ComputedAttr = Arc<dyn Fn(&ConfigMap) -> Value + Send + Sync>;

/// A class-like configuration source: declared attributes plus computed
/// attributes evaluated against the attribute view at extraction time.
///
/// Computed members are the descriptor equivalent: a reader sees the
/// computed value, never an underlying storage name.
#[derive(Clone, Default)]
pub struct ClassDef {
    attrs: ConfigMap,
    computed: HashMap<String, ComputedAttr>,
}

impl ClassDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Declare a computed attribute. The closure receives the merged
    /// attribute view (class attributes, overlaid by instance attributes
    /// when extracting an instance).
    pub fn computed<F>(mut self, name: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&ConfigMap) -> Value + Send + Sync + 'static,
    {
        self.computed.insert(name.into(), Arc::new(compute));
        self
    }
}

impl std::fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassDef")
            .field("attrs", &self.attrs)
            .field("computed", &self.computed.keys())
            .finish()
    }
}

/// An instance of a [`ClassDef`]: instance attributes overlay class
/// attributes; computed members still win over both, like data descriptors.
#[derive(Clone)]
pub struct InstanceDef {
    class: ClassDef,
    attrs: ConfigMap,
}

impl InstanceDef {
    pub fn of(class: ClassDef) -> Self {
        Self {
            class,
            attrs: ConfigMap::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }
}

impl std::fmt::Debug for InstanceDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceDef")
            .field("class", &self.class)
            .field("attrs", &self.attrs)
            .finish()
    }
}

/// Tagged union over the accepted configuration source shapes.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    Map(ConfigMap),
    Class(ClassDef),
    Instance(InstanceDef),
    Module(Namespace),
}

fn is_config_key(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn retain_config_keys(map: ConfigMap) -> ConfigMap {
    map.into_iter()
        .filter(|(name, _)| is_config_key(name))
        .collect()
}

fn extract_class_like(class: &ClassDef, instance_attrs: Option<&ConfigMap>) -> ConfigMap {
    let mut view = class.attrs.clone();
    if let Some(attrs) = instance_attrs {
        view.extend(attrs.clone());
    }
    let mut extracted = view.clone();
    for (name, compute) in &class.computed {
        extracted.insert(name.clone(), compute(&view));
    }
    extracted
}

impl ConfigSource {
    /// Normalize this source to a flat mapping, keeping only names whose
    /// first character is upper-case.
    pub fn into_config(self) -> ConfigMap {
        let raw = match self {
            ConfigSource::Map(map) => map,
            ConfigSource::Class(class) => extract_class_like(&class, None),
            ConfigSource::Instance(instance) => {
                extract_class_like(&instance.class, Some(&instance.attrs))
            }
            ConfigSource::Module(namespace) => {
                namespace.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
        };
        retain_config_keys(raw)
    }
}

impl From<ConfigMap> for ConfigSource {
    fn from(map: ConfigMap) -> Self {
        ConfigSource::Map(map)
    }
}

impl From<ClassDef> for ConfigSource {
    fn from(class: ClassDef) -> Self {
        ConfigSource::Class(class)
    }
}

impl From<InstanceDef> for ConfigSource {
    fn from(instance: InstanceDef) -> Self {
        ConfigSource::Instance(instance)
    }
}

impl From<Namespace> for ConfigSource {
    fn from(namespace: Namespace) -> Self {
        ConfigSource::Module(namespace)
    }
}
