//! A `SOURCE` plugin that reads UDP datagrams into `raw.pkt`/`raw.pktlen`
//! keys, the netlogd analogue of the original's `ULOG` kernel-netlink
//! source — here, a plain `UDP` socket standing in for a capture source.

use std::net::UdpSocket;
use std::os::unix::io::{AsRawFd, RawFd};

use async_trait::async_trait;
use netlogd_core::config::ConfigSchema;
use netlogd_core::plugin::error::PluginError;
use netlogd_core::plugin::{DataType, Key, KeyFlags, KeyType, Plugin, Pluginstance, ReturnCode, Value};

pub struct UdpSourcePlugin;

#[async_trait]
impl Plugin for UdpSourcePlugin {
    fn name(&self) -> &str {
        "UDP"
    }

    fn version(&self) -> &str {
        netlogd_core::kernel::constants::CORE_ABI_VERSION
    }

    fn input_schema(&self) -> Vec<Key> {
        vec![]
    }

    fn output_schema(&self) -> Vec<Key> {
        vec![
            Key::template("raw.pkt", KeyType::Bytes, KeyFlags::NEEDS_FREE_ON_RELEASE),
            Key::template("raw.pktlen", KeyType::U32, KeyFlags::empty()),
        ]
    }

    fn input_type(&self) -> DataType {
        DataType::Source
    }

    fn output_type(&self) -> DataType {
        DataType::Intermediate("PACKET")
    }

    fn config_schema(&self) -> Option<ConfigSchema> {
        use netlogd_core::config::{ConfigEntry, ConfigOptions, ConfigValueKind};
        Some(vec![
            ConfigEntry::new("bind", ConfigValueKind::String, ConfigOptions::empty())
                .with_default(netlogd_core::config::ConfigValue::String("0.0.0.0".to_string())),
            ConfigEntry::new("port", ConfigValueKind::Int, ConfigOptions::empty())
                .with_default(netlogd_core::config::ConfigValue::Int(5555)),
        ])
    }

    async fn start(&self, instance: &mut Pluginstance) -> Result<(), PluginError> {
        let bind: String = instance.config().get("bind").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: i64 = instance.config().get("port").unwrap_or(5555);

        let socket = UdpSocket::bind((bind.as_str(), port as u16)).map_err(|e| PluginError::StartError {
            name: self.name().to_string(),
            message: format!("bind {bind}:{port}: {e}"),
        })?;
        socket.set_nonblocking(true).map_err(|e| PluginError::StartError {
            name: self.name().to_string(),
            message: format!("set_nonblocking: {e}"),
        })?;

        instance.set_private_state(socket);
        Ok(())
    }

    async fn stop(&self, instance: &mut Pluginstance) -> Result<(), PluginError> {
        instance.take_private_state();
        Ok(())
    }

    async fn interpret(&self, instance: &mut Pluginstance) -> ReturnCode {
        let mut buf = [0u8; 65536];
        let received = {
            let Some(socket) = instance.private_state().and_then(|s| s.downcast_ref::<UdpSocket>()) else {
                return ReturnCode::Err("socket not started".to_string());
            };
            socket.recv_from(&mut buf)
        };

        match received {
            Ok((n, _from)) => {
                instance.set_output("raw.pkt", Value::Bytes(buf[..n].to_vec()));
                instance.set_output("raw.pktlen", Value::U32(n as u32));
                ReturnCode::Ok
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => ReturnCode::Stop,
            Err(e) => ReturnCode::Err(format!("recv_from: {e}")),
        }
    }

    fn readable_fd(&self, instance: &Pluginstance) -> Option<RawFd> {
        instance.private_state().and_then(|s| s.downcast_ref::<UdpSocket>()).map(|socket| socket.as_raw_fd())
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
    std::sync::Arc::into_raw(std::sync::Arc::new(UdpSourcePlugin) as std::sync::Arc<dyn Plugin>)
}
