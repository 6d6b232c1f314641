//! Stack-build and key-resolution errors (spec.md §4.2, §4.3).

use thiserror::Error as ThisError;

use crate::plugin::error::PluginError;

#[derive(Debug, ThisError)]
pub enum StackError {
    #[error("stack spec '{raw}' is malformed: {message}")]
    InvalidSpec { raw: String, message: String },

    #[error("stack references unknown plugin '{name}'")]
    UnknownPlugin { name: String },

    #[error("duplicate pluginstance id '{id}' in stack")]
    DuplicateInstanceId { id: String },

    #[error("a stack must contain at least one stage")]
    Empty,

    #[error(
        "type mismatch between '{producer}' (outputs {produced:?}) and '{consumer}' (expects {expected:?})"
    )]
    TypeMismatch { producer: String, consumer: String, produced: String, expected: String },

    #[error("mandatory input key '{key}' on '{instance}' has no producer earlier in the stack")]
    UnresolvedMandatoryKey { instance: String, key: String },

    #[error("configure() failed on '{instance}': {source}")]
    ConfigureFailed { instance: String, #[source] source: PluginError },

    #[error("start() failed on '{instance}': {source}")]
    StartFailed { instance: String, #[source] source: PluginError },
}
