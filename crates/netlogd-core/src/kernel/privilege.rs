//! Privilege drop and daemonization (spec.md §4.6), recovered from the
//! original's `drop_priv()`/`daemonize()` in `ulogd.c`. Expressed with
//! `nix::unistd` instead of raw libc calls.

use std::os::fd::AsRawFd;

use nix::sys::stat::Mode;
use nix::unistd::{Gid, Uid, User};

use crate::kernel::error::{Error, Result};

/// Drops privileges to `username`'s uid/gid, in the exact order the
/// original enforces: `setgroups` → `setgid` → `setegid` → `setuid` →
/// `setegid`. Any failed step is fatal — there is no partial-drop state
/// this process is willing to run with.
pub fn drop_privileges(username: &str) -> Result<()> {
    let user = User::from_name(username)
        .map_err(|e| Error::PrivilegeDrop(format!("looking up user '{username}': {e}")))?
        .ok_or_else(|| Error::PrivilegeDrop(format!("no such user '{username}'")))?;

    nix::unistd::setgroups(&[]).map_err(|e| Error::PrivilegeDrop(format!("setgroups: {e}")))?;
    nix::unistd::setgid(user.gid).map_err(|e| Error::PrivilegeDrop(format!("setgid: {e}")))?;
    nix::unistd::setegid(user.gid).map_err(|e| Error::PrivilegeDrop(format!("setegid: {e}")))?;
    nix::unistd::setuid(user.uid).map_err(|e| Error::PrivilegeDrop(format!("setuid: {e}")))?;
    nix::unistd::seteuid(user.uid).map_err(|e| Error::PrivilegeDrop(format!("seteuid: {e}")))?;

    log::warn!("dropped privileges to uid={} gid={}", user.uid, user.gid);
    Ok(())
}

/// Convenience accessor used by tests that only need the resolved ids
/// without actually dropping privileges (which requires root).
pub fn resolve_user(username: &str) -> Result<(Uid, Gid)> {
    let user = User::from_name(username)
        .map_err(|e| Error::PrivilegeDrop(format!("looking up user '{username}': {e}")))?
        .ok_or_else(|| Error::PrivilegeDrop(format!("no such user '{username}'")))?;
    Ok((user.uid, user.gid))
}

/// Forks into the background, detaches from the controlling terminal, and
/// redirects the standard streams to `/dev/null` unless `keep_stdout` is
/// set (the logfile target is `-`, i.e. stdout itself). Matches the
/// original's `daemonize()`.
///
/// # Safety
/// Must be called before the tokio runtime starts any worker threads —
/// `fork()` in a multi-threaded process only preserves the calling thread,
/// which is why the kernel calls this prior to building the reactor's
/// current-thread runtime.
pub unsafe fn daemonize(keep_stdout: bool) -> Result<()> {
    match nix::unistd::fork().map_err(|e| Error::Daemonize(format!("fork: {e}")))? {
        nix::unistd::ForkResult::Parent { .. } => std::process::exit(0),
        nix::unistd::ForkResult::Child => {}
    }

    nix::unistd::setsid().map_err(|e| Error::Daemonize(format!("setsid: {e}")))?;
    std::env::set_current_dir("/").map_err(|e| Error::io(e, "chdir", "/".into()))?;

    if !keep_stdout {
        let devnull = nix::fcntl::open("/dev/null", nix::fcntl::OFlag::O_RDWR, Mode::empty())
            .map_err(|e| Error::Daemonize(format!("open /dev/null: {e}")))?;
        for target_fd in [0, 1, 2] {
            nix::unistd::dup2(devnull.as_raw_fd(), target_fd)
                .map_err(|e| Error::Daemonize(format!("dup2 fd {target_fd}: {e}")))?;
        }
    }

    Ok(())
}
