//! Plugin-system errors (registration, loading, and per-hook failures).

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PluginError {
    #[error("plugin '{name}' already registered")]
    AlreadyRegistered { name: String },

    #[error("plugin '{name}' has ABI version '{found}', core requires '{expected}'")]
    IncompatibleAbi { name: String, found: String, expected: String },

    #[error("failed to load plugin from '{path}': {message}")]
    LoadError { path: String, message: String },

    #[error("plugin '{name}' not found in registry")]
    NotFound { name: String },

    #[error("plugin '{name}' configure hook failed: {message}")]
    ConfigureError { name: String, message: String },

    #[error("plugin '{name}' start hook failed: {message}")]
    StartError { name: String, message: String },

    #[error("plugin '{name}' stop hook failed: {message}")]
    StopError { name: String, message: String },
}
