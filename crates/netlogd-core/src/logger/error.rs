//! Logger errors.

use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum LoggerError {
    #[error("cannot open logfile '{path}': {source}")]
    OpenLogfile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot connect to syslog: {0}")]
    Syslog(String),

    #[error("logger already installed as the global `log` backend")]
    AlreadyInstalled,
}
