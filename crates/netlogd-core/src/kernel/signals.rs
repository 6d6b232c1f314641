//! Translates OS signals into ordinary values consumed on the reactor's own
//! task, instead of running plugin hooks from actual signal-handler context
//! (spec.md §4.6, §9 design note).

use futures::stream::StreamExt;
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio::sync::mpsc;

use crate::kernel::error::{Error, Result};

/// The subset of signals the daemon reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonSignal {
    /// Reopen the logfile and keep running (spec.md §4.6, scenario S6).
    Reload,
    /// Stop every stage and exit cleanly.
    Shutdown,
}

fn classify(signum: i32) -> Option<DaemonSignal> {
    match signum {
        SIGHUP => Some(DaemonSignal::Reload),
        SIGTERM | SIGINT => Some(DaemonSignal::Shutdown),
        _ => None,
    }
}

/// Registers the handled signal set and spawns a task that forwards each
/// one, translated, onto `tx`. Returns a handle whose `Drop` unregisters
/// the underlying `signal_hook` registration.
pub fn spawn_signal_forwarder(tx: mpsc::UnboundedSender<DaemonSignal>) -> Result<signal_hook_tokio::Handle> {
    let signals = Signals::new([SIGHUP, SIGTERM, SIGINT])
        .map_err(|e| Error::Other(format!("failed to register signal handlers: {e}")))?;
    let handle = signals.handle();

    tokio::spawn(async move {
        let mut signals = signals.fuse();
        while let Some(signum) = signals.next().await {
            if let Some(daemon_signal) = classify(signum) {
                if tx.send(daemon_signal).is_err() {
                    break;
                }
            }
        }
    });

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hangup_classifies_as_reload() {
        assert_eq!(classify(SIGHUP), Some(DaemonSignal::Reload));
    }

    #[test]
    fn term_and_int_classify_as_shutdown() {
        assert_eq!(classify(SIGTERM), Some(DaemonSignal::Shutdown));
        assert_eq!(classify(SIGINT), Some(DaemonSignal::Shutdown));
    }

    #[test]
    fn unhandled_signal_is_ignored() {
        assert_eq!(classify(SIGUSR_UNUSED), None);
    }

    const SIGUSR_UNUSED: i32 = signal_hook::consts::SIGUSR2;
}
