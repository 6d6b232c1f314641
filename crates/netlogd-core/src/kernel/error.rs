//! Kernel-level errors.
//!
//! Aggregates the typed errors of each subsystem behind one `Error` enum,
//! following the teacher's `kernel::error` idiom of `#[from]`-wrapping
//! subsystem errors rather than stringly-typed variants.
use std::path::PathBuf;
use std::result::Result as StdResult;
use thiserror::Error as ThisError;

use crate::config::error::ConfigError;
use crate::logger::error::LoggerError;
use crate::plugin::error::PluginError;
use crate::reactor::error::ReactorError;
use crate::stack::error::StackError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("logger error: {0}")]
    Logger(#[from] LoggerError),

    #[error("plugin system error: {0}")]
    Plugin(#[from] PluginError),

    #[error("stack error: {0}")]
    Stack(#[from] StackError),

    #[error("reactor error: {0}")]
    Reactor(#[from] ReactorError),

    #[error("no stack was built from configuration")]
    NoStackBuilt,

    #[error("failed to drop privileges: {0}")]
    PrivilegeDrop(String),

    #[error("failed to daemonize: {0}")]
    Daemonize(String),

    #[error("I/O error during '{operation}' on '{}': {source}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        operation: String,
    },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::Io { source, operation: operation.into(), path }
    }
}
