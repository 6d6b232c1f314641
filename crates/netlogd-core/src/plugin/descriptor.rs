//! The plugin ABI: `DataType` tags, the `Plugin` trait, and the return codes
//! an `interpret` hook may produce (spec.md §3, §4.4).

use std::os::unix::io::RawFd;

use async_trait::async_trait;

use crate::config::ConfigSchema;
use crate::plugin::error::PluginError;
use crate::plugin::instance::Pluginstance;
use crate::plugin::key::Key;

/// Classifies a stage's position/shape in a stack. Adjacent stages must have
/// matching intermediate tags (spec.md §3); `Source` has no input, `Sink` has
/// no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Source,
    Sink,
    /// e.g. "PACKET", "FLOW", "SUM" — any two intermediates with the same
    /// label are considered adjacency-compatible.
    Intermediate(&'static str),
}

/// The outcome of one `interpret` call (spec.md §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnCode {
    /// Continue propagation to the next stage.
    Ok,
    /// Cease propagation silently; this event is done, not an error.
    Stop,
    /// Cease propagation after logging at notice level.
    Err(String),
}

/// The ABI every plugin implements. A registered `Arc<dyn Plugin>` plays the
/// role of spec.md's "plugin descriptor": an immutable, process-long-lived
/// declaration that many pluginstances may reference.
///
/// Hooks take `&Pluginstance` rather than `&self` holding state, so private
/// state lives on the instance (spec.md §3) and one descriptor can back
/// multiple placements in a stack.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Unique plugin name, used as the registry key.
    fn name(&self) -> &str;

    /// ABI version string, compared for exact equality against
    /// [`crate::kernel::constants::CORE_ABI_VERSION`].
    fn version(&self) -> &str;

    /// Declared input key templates (empty for `DataType::Source`).
    fn input_schema(&self) -> Vec<Key>;

    /// Declared output key templates (empty for `DataType::Sink`).
    fn output_schema(&self) -> Vec<Key>;

    fn input_type(&self) -> DataType;
    fn output_type(&self) -> DataType;

    /// Optional per-instance configuration schema.
    fn config_schema(&self) -> Option<ConfigSchema> {
        None
    }

    /// Runs during stack-build pass 2, tail-to-head. May rewrite the
    /// instance's input key flags (e.g. mark a key inactive) based on the
    /// instance's now-populated config. Default: no-op.
    async fn configure(&self, _instance: &mut Pluginstance) -> Result<(), PluginError> {
        Ok(())
    }

    /// Runs during stack-build pass 3, head-to-tail. Acquires external
    /// resources (fds, DB handles) and stashes them in the instance's
    /// private state.
    async fn start(&self, _instance: &mut Pluginstance) -> Result<(), PluginError> {
        Ok(())
    }

    /// Releases resources acquired by `start`. Called in reverse order on
    /// shutdown, and on a failed stack build for every instance that had
    /// `start` already called (spec.md §7, §9).
    async fn stop(&self, _instance: &mut Pluginstance) -> Result<(), PluginError> {
        Ok(())
    }

    /// Consume this stage's resolved input keys and populate its output
    /// keys. Called at most once per event, per spec.md §4.4.
    async fn interpret(&self, instance: &mut Pluginstance) -> ReturnCode;

    /// Delivered on the reactor thread when the process receives a signal
    /// the core fans out to every instance (spec.md §4.6, §9). Default: ignore.
    fn signal(&self, _instance: &mut Pluginstance, _signum: i32) {}

    /// The fd a `Source`-type instance wants the reactor to watch for
    /// readability (spec.md §2, §4.5). Called once after `start`. A source
    /// with no fd of its own (e.g. a timer-driven one) returns `None` and is
    /// never registered with the reactor.
    fn readable_fd(&self, _instance: &Pluginstance) -> Option<RawFd> {
        None
    }
}
