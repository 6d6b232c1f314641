//! Turns a `plugin=` path into a loaded descriptor (spec.md §4.1, §9 design
//! note (b)). [`DynamicLoader`] is the real `dlopen`-backed implementation
//! [`crate::plugin::PluginRegistry`] uses by default; tests inject a mock
//! [`Loader`] instead of actually loading a `.so`, since building a cdylib
//! fixture is out of scope here (no toolchain run).

use std::any::Any;
use std::sync::Arc;

use libloading::Library;

use crate::plugin::descriptor::Plugin;
use crate::plugin::error::PluginError;

/// The documented dynamic-load entry point every `.so` plugin must export.
/// Returns a pointer built with `Arc::into_raw`, not `Box::into_raw` — the
/// loader reconstructs it with `Arc::from_raw`, which requires the
/// allocation to actually carry an `Arc`'s control block.
pub type PluginEntryPoint = unsafe extern "C" fn() -> *const dyn Plugin;

/// Symbol name a dynamically-loaded plugin must export.
pub const PLUGIN_ENTRY_SYMBOL: &[u8] = b"netlogd_plugin_entry\0";

/// A descriptor loaded from outside the process image, plus whatever keeps
/// the code backing its vtable mapped for as long as the descriptor stays
/// registered.
pub struct LoadedPlugin {
    pub descriptor: Arc<dyn Plugin>,
    pub keep_alive: Option<Box<dyn Any + Send + Sync>>,
}

/// Abstracts "load the plugin at this path" so the registry doesn't have to
/// `dlopen` anything to be unit-tested.
pub trait Loader: Send + Sync {
    fn load(&self, path: &str) -> Result<LoadedPlugin, PluginError>;
}

/// Loads a plugin via `libloading`, calling the documented
/// `netlogd_plugin_entry` symbol.
#[derive(Default)]
pub struct DynamicLoader;

impl Loader for DynamicLoader {
    fn load(&self, path: &str) -> Result<LoadedPlugin, PluginError> {
        // Safety: `path` is administrator-supplied via the config file, the
        // same trust boundary the original ulogd2 `dlopen()`-based loader
        // assumes. The entry symbol's signature is part of the documented ABI.
        let library = unsafe {
            Library::new(path).map_err(|e| PluginError::LoadError {
                path: path.to_string(),
                message: e.to_string(),
            })?
        };

        let descriptor: Arc<dyn Plugin> = unsafe {
            let entry: libloading::Symbol<PluginEntryPoint> =
                library.get(PLUGIN_ENTRY_SYMBOL).map_err(|e| PluginError::LoadError {
                    path: path.to_string(),
                    message: format!("missing entry symbol: {e}"),
                })?;
            Arc::from_raw(entry())
        };

        Ok(LoadedPlugin { descriptor, keep_alive: Some(Box::new(library)) })
    }
}
