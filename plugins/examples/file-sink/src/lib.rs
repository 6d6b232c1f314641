//! A `SINK` plugin that appends each event's `raw.pkt` bytes to a file, the
//! netlogd analogue of the original's `LOGEMU`/`PCAP` output targets.

use std::fs::{File, OpenOptions};
use std::io::Write;

use async_trait::async_trait;
use netlogd_core::config::ConfigSchema;
use netlogd_core::plugin::error::PluginError;
use netlogd_core::plugin::{DataType, Key, KeyFlags, KeyType, Plugin, Pluginstance, ReturnCode, Value};

pub struct FileSinkPlugin;

#[async_trait]
impl Plugin for FileSinkPlugin {
    fn name(&self) -> &str {
        "FILE_SINK"
    }

    fn version(&self) -> &str {
        netlogd_core::kernel::constants::CORE_ABI_VERSION
    }

    fn input_schema(&self) -> Vec<Key> {
        vec![Key::template("raw.pkt", KeyType::Bytes, KeyFlags::empty())]
    }

    fn output_schema(&self) -> Vec<Key> {
        vec![]
    }

    fn input_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }

    fn output_type(&self) -> DataType {
        DataType::Sink
    }

    fn config_schema(&self) -> Option<ConfigSchema> {
        use netlogd_core::config::{ConfigEntry, ConfigOptions, ConfigValueKind};
        Some(vec![ConfigEntry::new("file", ConfigValueKind::String, ConfigOptions::MANDATORY)])
    }

    async fn start(&self, instance: &mut Pluginstance) -> Result<(), PluginError> {
        let path: String = instance.config().get("file").ok_or_else(|| PluginError::StartError {
            name: self.name().to_string(),
            message: "missing mandatory 'file' config entry".to_string(),
        })?;

        let handle = OpenOptions::new().create(true).append(true).open(&path).map_err(|e| PluginError::StartError {
            name: self.name().to_string(),
            message: format!("open {path}: {e}"),
        })?;

        instance.set_private_state(handle);
        Ok(())
    }

    async fn stop(&self, instance: &mut Pluginstance) -> Result<(), PluginError> {
        instance.take_private_state();
        Ok(())
    }

    async fn interpret(&self, instance: &mut Pluginstance) -> ReturnCode {
        let Some(Value::Bytes(bytes)) = instance.input("raw.pkt").cloned() else {
            return ReturnCode::Err("missing raw.pkt input".to_string());
        };

        let Some(handle) = instance.private_state_mut().and_then(|s| s.downcast_mut::<File>()) else {
            return ReturnCode::Err("file not started".to_string());
        };

        match handle.write_all(&bytes) {
            Ok(()) => ReturnCode::Ok,
            Err(e) => ReturnCode::Err(format!("write: {e}")),
        }
    }
}

/// Documented dynamic-load entry point (spec.md §9).
///
/// Returns a pointer built with `Arc::into_raw`, matching the registry's
/// loader, which reconstructs it with `Arc::from_raw` — never `Box`.
///
/// # Safety
/// Called exactly once by the registry's loader immediately after
/// `dlopen`, per the documented ABI contract.
#[no_mangle]
pub unsafe extern "C" fn netlogd_plugin_entry() -> *const dyn Plugin {
    std::sync::Arc::into_raw(std::sync::Arc::new(FileSinkPlugin) as std::sync::Arc<dyn Plugin>)
}
