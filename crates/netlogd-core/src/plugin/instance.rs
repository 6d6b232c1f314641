//! Pluginstance: a live placement of a plugin descriptor inside a stack
//! (spec.md §3, §4.2).

use std::any::Any;
use std::sync::Arc;

use crate::config::ConfigData;
use crate::kernel::constants::MAX_INSTANCE_ID_LEN;
use crate::plugin::descriptor::Plugin;
use crate::plugin::key::{Key, Value};

/// A live placement of a plugin inside a stack.
///
/// Each pluginstance owns an independent deep copy of the plugin's config
/// values and key tables — nothing here is shared across instances of the
/// same plugin, which is the whole point of the spec's construction
/// contract (spec.md §4.2).
pub struct Pluginstance {
    id: String,
    descriptor: Arc<dyn Plugin>,
    /// This instance's position within its owning stack's pluginstance
    /// vector. Set once, at construction time, and used by the dispatcher
    /// and by key resolution instead of a raw back-pointer to the stack
    /// (spec.md §9: model the stack back-reference as a handle, not a pointer).
    self_index: usize,
    config: ConfigData,
    input_keys: Vec<Key>,
    output_keys: Vec<Key>,
    /// Opaque, plugin-owned state allocated by `start` and released by `stop`.
    /// Modeled as a boxed `Any` rather than the teacher's contiguous
    /// header+private-state C allocation trick (spec.md §9).
    private_state: Option<Box<dyn Any + Send + Sync>>,
}

impl Pluginstance {
    /// Allocate a new pluginstance from a descriptor. Not yet configured or
    /// started (spec.md §4.2 step 3).
    pub fn instantiate(
        descriptor: Arc<dyn Plugin>,
        instance_id: &str,
        self_index: usize,
        config: ConfigData,
    ) -> Self {
        let mut id = instance_id.to_string();
        id.truncate(MAX_INSTANCE_ID_LEN);
        Self {
            id,
            input_keys: descriptor.input_schema(),
            output_keys: descriptor.output_schema(),
            descriptor,
            self_index,
            config,
            private_state: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn self_index(&self) -> usize {
        self.self_index
    }

    pub fn descriptor(&self) -> &Arc<dyn Plugin> {
        &self.descriptor
    }

    pub fn config(&self) -> &ConfigData {
        &self.config
    }

    pub fn input_keys(&self) -> &[Key] {
        &self.input_keys
    }

    pub fn input_keys_mut(&mut self) -> &mut [Key] {
        &mut self.input_keys
    }

    pub fn output_keys(&self) -> &[Key] {
        &self.output_keys
    }

    pub fn output_keys_mut(&mut self) -> &mut [Key] {
        &mut self.output_keys
    }

    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.input_keys.iter().position(|k| k.name() == name)
    }

    pub fn output_index(&self, name: &str) -> Option<usize> {
        self.output_keys.iter().position(|k| k.name() == name)
    }

    /// Read an already-resolved input value by name. The dispatcher copies
    /// values in from each input's `source` before calling `interpret`, so
    /// plugins only ever see their own local table (spec.md §4.4).
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.input_keys.iter().find(|k| k.name() == name).and_then(|k| k.value())
    }

    /// Write an output value by name. Panics if `name` is not declared in
    /// the plugin's output schema — that is a plugin bug, the same class of
    /// error the original C core would catch at development time via the
    /// static key table.
    pub fn set_output(&mut self, name: &str, value: Value) {
        let key = self
            .output_keys
            .iter_mut()
            .find(|k| k.name() == name)
            .unwrap_or_else(|| panic!("plugin '{}' wrote undeclared output key '{}'", self.descriptor.name(), name));
        key.set_value(value);
    }

    pub fn private_state(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.private_state.as_deref()
    }

    pub fn private_state_mut(&mut self) -> Option<&mut (dyn Any + Send + Sync)> {
        self.private_state.as_deref_mut()
    }

    pub fn set_private_state<T: Any + Send + Sync>(&mut self, state: T) {
        self.private_state = Some(Box::new(state));
    }

    pub fn take_private_state(&mut self) -> Option<Box<dyn Any + Send + Sync>> {
        self.private_state.take()
    }
}
