//! Reactor errors.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ReactorError {
    #[error("fd {fd} is already registered")]
    AlreadyRegistered { fd: std::os::unix::io::RawFd },

    #[error("fd {fd} is not registered")]
    NotRegistered { fd: std::os::unix::io::RawFd },

    #[error("failed to watch fd {fd}: {source}")]
    Watch {
        fd: std::os::unix::io::RawFd,
        #[source]
        source: std::io::Error,
    },
}
