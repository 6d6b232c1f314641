//! The plugin registry (spec.md §4.1, C4).
//!
//! Process-wide set of loaded plugin descriptors keyed by name, ABI-gated
//! against [`CORE_ABI_VERSION`]. Populated once at startup by the `plugin=`
//! config directives, then only ever read.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::kernel::constants::CORE_ABI_VERSION;
use crate::plugin::descriptor::Plugin;
use crate::plugin::error::PluginError;
use crate::plugin::loader::{DynamicLoader, Loader};

/// Process-wide registry of loaded plugin descriptors.
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn Plugin>>,
    loader: Box<dyn Loader>,
    /// Keeps every dynamically loaded library's backing allocation alive for
    /// the process lifetime — dropping it while a plugin built from it is
    /// still registered would unmap code the descriptor's vtable points into.
    loaded_libraries: Vec<Box<dyn Any + Send + Sync>>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::with_loader(Box::new(DynamicLoader))
    }

    /// Builds a registry that loads plugins via `loader` instead of the real
    /// `dlopen`-backed [`DynamicLoader`] — how tests exercise `load()`
    /// without a cdylib fixture to actually open.
    pub fn with_loader(loader: Box<dyn Loader>) -> Self {
        Self { plugins: HashMap::new(), loader, loaded_libraries: Vec::new() }
    }

    /// Register a plugin descriptor (spec.md §4.1).
    ///
    /// Returns `Err(IncompatibleAbi)` — log at notice and move on — when the
    /// plugin's ABI version doesn't match exactly. Returns
    /// `Err(AlreadyRegistered)` on a duplicate name; callers must treat this
    /// as fatal to the process per spec.md's deliberate asymmetry (§9 open
    /// question): version skew is recoverable, duplicate names are a config
    /// bug.
    pub fn register(&mut self, descriptor: Arc<dyn Plugin>) -> Result<(), PluginError> {
        let name = descriptor.name().to_string();

        if descriptor.version() != CORE_ABI_VERSION {
            log::warn!(
                "plugin '{}' has incompatible ABI version '{}' (core is '{}'), skipping",
                name,
                descriptor.version(),
                CORE_ABI_VERSION
            );
            return Err(PluginError::IncompatibleAbi {
                name,
                found: descriptor.version().to_string(),
                expected: CORE_ABI_VERSION.to_string(),
            });
        }

        if self.plugins.contains_key(&name) {
            return Err(PluginError::AlreadyRegistered { name });
        }

        log::debug!("registered plugin '{}'", name);
        self.plugins.insert(name, descriptor);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Dynamically load a plugin `.so`/`.dylib` from `path` via the
    /// registry's [`Loader`], then register the returned descriptor. The
    /// config parser's `plugin=` directive calls this for each occurrence
    /// (spec.md §6).
    pub fn load(&mut self, path: &str) -> Result<(), PluginError> {
        let loaded = self.loader.load(path)?;
        self.register(loaded.descriptor)?;
        if let Some(keep_alive) = loaded.keep_alive {
            self.loaded_libraries.push(keep_alive);
        }
        Ok(())
    }
}
