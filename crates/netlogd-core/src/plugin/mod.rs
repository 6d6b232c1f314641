//! Plugin ABI, registry, and pluginstance model (spec.md §3, §4.1, §4.2).

pub mod descriptor;
pub mod error;
pub mod instance;
pub mod key;
pub mod loader;
pub mod registry;

pub use descriptor::{DataType, Plugin, ReturnCode};
pub use error::PluginError;
pub use instance::Pluginstance;
pub use key::{Key, KeyFlags, KeySource, KeyType, Value};
pub use loader::{DynamicLoader, LoadedPlugin, Loader};
pub use registry::PluginRegistry;

/// A registered plugin descriptor, as spec.md §3 defines it: an immutable,
/// process-long-lived declaration. Plain type alias over the trait object
/// the registry stores, rather than a separate struct, since the `Plugin`
/// trait already carries every field the spec's descriptor names (name,
/// version, input/output schema, config schema, hooks).
pub type PluginDescriptor = std::sync::Arc<dyn Plugin>;
