//! Plugin registry implementation.
//!
//! Responsibilities:
//! - Map a (capability, name) key to a zero-argument constructor.
//! - Create instances lazily on first lookup and memoize them for the
//!   registry's lifetime (singleton per key).
//! - Provide an explicit `reset` so test suites can isolate themselves.
//!
//! Does NOT handle:
//! - Deciding where the registry lives. A registry is an ordinary value;
//!   callers that want a process-wide one own the global themselves.
//! - Concurrent mutation. Registration and lookup are start-up operations;
//!   callers serialize them.
//!
//! Invariants:
//! - At most one constructor per key; re-registration is an error, never a
//!   silent overwrite.
//! - No unregistration short of `reset`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::capability::Capability;
use crate::error::RegistryError;

/// Zero-argument constructor for a registered plugin. Plugin state is set
/// after construction (for example via `set_options` on a provider).
pub type Constructor<P> = Box<dyn Fn() -> Box<P> + Send + Sync>;

/// A memoized plugin instance, shared between the registry and its callers.
pub type SharedPlugin<P> = Arc<Mutex<Box<P>>>;

/// Registry key declared alongside a plugin type.
///
/// Implementing this trait is the registration annotation: the type carries
/// its own (capability, name) key and, through [`Default`], acts as its own
/// constructor via [`register_plugin!`](crate::register_plugin).
pub trait PluginSpec {
    const CAPABILITY: Capability;
    const NAME: &'static str;
}

/// Registers a [`PluginSpec`] type under its declared key, with the type's
/// `Default` impl as the constructor.
///
/// The third argument is the trait object the registry stores, e.g.
/// `register_plugin!(registry, EnvConfigProvider, dyn ConfigProvider)`.
#[macro_export]
macro_rules! register_plugin {
    ($registry:expr, $ty:ty, $p:ty) => {
        $registry.register(
            <$ty as $crate::PluginSpec>::CAPABILITY,
            <$ty as $crate::PluginSpec>::NAME,
            ::std::boxed::Box::new(|| {
                ::std::boxed::Box::new(<$ty as ::std::default::Default>::default())
                    as ::std::boxed::Box<$p>
            }),
        )
    };
}

struct Entry<P: ?Sized + Send> {
    constructor: Constructor<P>,
    instance: Option<SharedPlugin<P>>,
}

/// Maps (capability, name) keys to constructors and memoized instances.
///
/// Generic over the trait object it stores, so each capability family gets
/// its own typed registry (`PluginRegistry<dyn ConfigProvider>`, ...).
pub struct PluginRegistry<P: ?Sized + Send> {
    entries: HashMap<(Capability, String), Entry<P>>,
}

impl<P: ?Sized + Send> Default for PluginRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized + Send> PluginRegistry<P> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Associate a constructor with a key.
    ///
    /// Fails with [`RegistryError::AlreadyRegistered`] if the key is taken.
    pub fn register(
        &mut self,
        capability: Capability,
        name: impl Into<String>,
        constructor: Constructor<P>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.entries.contains_key(&(capability, name.clone())) {
            return Err(RegistryError::AlreadyRegistered { capability, name });
        }
        tracing::debug!(%capability, %name, "registered plugin");
        self.entries.insert(
            (capability, name),
            Entry {
                constructor,
                instance: None,
            },
        );
        Ok(())
    }

    /// Register a pre-built instance under a key.
    ///
    /// The instance is memoized immediately; the stored constructor is never
    /// invoked. Fails like [`register`](Self::register) on a duplicate key.
    pub fn register_instance(
        &mut self,
        capability: Capability,
        name: impl Into<String>,
        instance: Box<P>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.entries.contains_key(&(capability, name.clone())) {
            return Err(RegistryError::AlreadyRegistered { capability, name });
        }
        tracing::debug!(%capability, %name, "registered plugin instance");
        let shared = Arc::new(Mutex::new(instance));
        // The memoized slot is pre-filled, so this constructor never runs.
        let constructor: Constructor<P> =
            Box::new(|| -> Box<P> { unreachable!("instance registered directly") });
        self.entries.insert(
            (capability, name),
            Entry {
                constructor,
                instance: Some(shared),
            },
        );
        Ok(())
    }

    /// Return the memoized singleton for a key, constructing it on first use.
    ///
    /// Fails with [`RegistryError::NotFound`] for an unregistered key.
    pub fn get_instance(
        &mut self,
        capability: Capability,
        name: &str,
    ) -> Result<SharedPlugin<P>, RegistryError> {
        let entry = self
            .entries
            .get_mut(&(capability, name.to_string()))
            .ok_or_else(|| RegistryError::NotFound {
                capability,
                name: name.to_string(),
            })?;
        if entry.instance.is_none() {
            tracing::debug!(%capability, %name, "instantiating plugin");
            entry.instance = Some(Arc::new(Mutex::new((entry.constructor)())));
        }
        Ok(Arc::clone(entry.instance.as_ref().unwrap()))
    }

    pub fn is_registered(&self, capability: Capability, name: &str) -> bool {
        self.entries.contains_key(&(capability, name.to_string()))
    }

    /// Drop every registration and memoized instance.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
