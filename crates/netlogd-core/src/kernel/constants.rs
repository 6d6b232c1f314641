//! Core-wide constants.

/// Application name, used in log banners and the default logfile path.
pub const APP_NAME: &str = "netlogd";

/// Crate version, surfaced by `--version`.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// ABI version string plugins must match exactly to be registered.
///
/// Unlike the teacher's `compatible_api_versions` range check, the spec
/// calls for strict equality: a plugin built against a different core
/// ABI is skipped with a warning rather than treated as a range match.
pub const CORE_ABI_VERSION: &str = "1.0.0";

/// Default logfile path when `[global].logfile` is not set.
pub const DEFAULT_LOGFILE: &str = "/var/log/netlogd.log";

/// Default config file path searched by the CLI when `-c` is not given.
pub const DEFAULT_CONFIGFILE: &str = "/etc/netlogd.conf";

/// Maximum length of a pluginstance id (truncated, not rejected, per spec §4.2).
pub const MAX_INSTANCE_ID_LEN: usize = 32;

/// Maximum length of a key name.
pub const MAX_KEY_NAME_LEN: usize = 32;
