//! The cooperative reactor (spec.md §4.3, §7, C3): a single-threaded event
//! loop that watches a set of file descriptors and turns readiness into
//! events for whoever registered interest in them. Built on
//! [`tokio::io::unix::AsyncFd`] over a current-thread runtime so the whole
//! process stays single-threaded, matching the original's `select(2)` loop
//! without reintroducing a thread pool.

pub mod error;

use std::collections::HashMap;
use std::os::unix::io::RawFd;

use bitflags::bitflags;
use futures::future::{select_all, BoxFuture};
use tokio::io::unix::AsyncFd;
use tokio::sync::{mpsc, watch};

pub use error::ReactorError;

pub type Result<T> = std::result::Result<T, ReactorError>;

bitflags! {
    /// Which readiness conditions a registration cares about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Interest: u8 {
        const READABLE   = 0b001;
        const WRITABLE   = 0b010;
        const EXCEPTIONAL = 0b100;
    }
}

/// One readiness notification, handed to whoever registered `fd`.
#[derive(Debug, Clone, Copy)]
pub struct FdEvent {
    pub fd: RawFd,
    pub interest: Interest,
}

struct Source {
    async_fd: AsyncFd<RawFd>,
    interest: Interest,
    tx: mpsc::UnboundedSender<FdEvent>,
}

/// The event loop itself. Owns no plugin state — it only knows about raw
/// fds and where to send their readiness events. The kernel wires those
/// events into dispatch calls.
pub struct Reactor {
    sources: HashMap<RawFd, Source>,
    shutdown: watch::Receiver<bool>,
}

/// Paired with a [`Reactor`]; holding the sender alive keeps the loop
/// running, dropping it (or sending `true`) requests a stop.
pub struct ShutdownHandle(watch::Sender<bool>);

impl ShutdownHandle {
    pub fn request_stop(&self) {
        let _ = self.0.send(true);
    }
}

impl Reactor {
    pub fn new() -> (Self, ShutdownHandle) {
        let (tx, rx) = watch::channel(false);
        (Self { sources: HashMap::new(), shutdown: rx }, ShutdownHandle(tx))
    }

    /// Start watching `fd` for `interest`. Readiness notifications are
    /// pushed onto `tx` until [`Reactor::unregister_fd`] is called.
    pub fn register_fd(&mut self, fd: RawFd, interest: Interest, tx: mpsc::UnboundedSender<FdEvent>) -> Result<()> {
        if self.sources.contains_key(&fd) {
            return Err(ReactorError::AlreadyRegistered { fd });
        }
        let async_fd = AsyncFd::new(fd).map_err(|source| ReactorError::Watch { fd, source })?;
        self.sources.insert(fd, Source { async_fd, interest, tx });
        Ok(())
    }

    pub fn unregister_fd(&mut self, fd: RawFd) -> Result<()> {
        self.sources.remove(&fd).map(|_| ()).ok_or(ReactorError::NotRegistered { fd })
    }

    pub fn is_registered(&self, fd: RawFd) -> bool {
        self.sources.contains_key(&fd)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Runs until a shutdown is requested. Each iteration waits for the
    /// first fd among all registrations to become ready, dispatches one
    /// [`FdEvent`] for it, and loops. mio/tokio retries on `EINTR`
    /// internally, so a spurious wakeup from a caught signal never escapes
    /// as an error here.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            if *self.shutdown.borrow() {
                return Ok(());
            }

            if self.sources.is_empty() {
                let _ = self.shutdown.changed().await;
                continue;
            }

            let mut waiters: Vec<BoxFuture<'_, Result<FdEvent>>> = Vec::with_capacity(self.sources.len());
            for (&fd, source) in self.sources.iter() {
                waiters.push(Box::pin(wait_one(fd, source)));
            }

            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        return Ok(());
                    }
                }
                (result, _, _) = select_all(waiters) => {
                    let event = result?;
                    if let Some(source) = self.sources.get(&event.fd) {
                        let _ = source.tx.send(event);
                    }
                }
            }
        }
    }
}

async fn wait_one(fd: RawFd, source: &Source) -> Result<FdEvent> {
    let watch_read = source.interest.contains(Interest::READABLE) || source.interest.contains(Interest::EXCEPTIONAL);
    let watch_write = source.interest.contains(Interest::WRITABLE);

    let interest = match (watch_read, watch_write) {
        (true, true) => tokio::select! {
            guard = source.async_fd.readable() => {
                guard.map_err(|source| ReactorError::Watch { fd, source })?.clear_ready();
                Interest::READABLE
            }
            guard = source.async_fd.writable() => {
                guard.map_err(|source| ReactorError::Watch { fd, source })?.clear_ready();
                Interest::WRITABLE
            }
        },
        (true, false) => {
            let guard = source.async_fd.readable().await.map_err(|source| ReactorError::Watch { fd, source })?;
            guard.clear_ready();
            Interest::READABLE
        }
        (false, true) => {
            let guard = source.async_fd.writable().await.map_err(|source| ReactorError::Watch { fd, source })?;
            guard.clear_ready();
            Interest::WRITABLE
        }
        (false, false) => {
            std::future::pending::<()>().await;
            unreachable!()
        }
    };

    Ok(FdEvent { fd, interest })
}

#[cfg(test)]
mod tests;
