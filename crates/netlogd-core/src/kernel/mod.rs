//! Process lifecycle: CLI surface, startup/shutdown sequencing, privilege
//! drop, daemonization, and signal translation (spec.md §4.6, §7, §9).

pub mod bootstrap;
pub mod cli;
pub mod constants;
pub mod error;
pub mod privilege;
pub mod signals;

pub use bootstrap::Application;
pub use cli::Cli;
pub use error::{Error, Result};
