//! Errors surfaced while loading the on-disk config file itself (as opposed
//! to [`crate::config::ConfigParseOutcome`], which is the parser *contract*
//! spec.md §6 defines for per-section results).

use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("cannot open config file '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file '{path}': {message}")]
    Parse { path: PathBuf, message: String },
}
