use super::*;
use std::os::unix::io::AsRawFd;

#[tokio::test]
async fn readable_pipe_produces_one_event() {
    let (read_fd, write_fd) = nix::unistd::pipe().unwrap();
    let (mut reactor, shutdown) = Reactor::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    reactor.register_fd(read_fd.as_raw_fd(), Interest::READABLE, tx).unwrap();

    let run = tokio::spawn(async move {
        reactor.run().await.unwrap();
    });

    nix::unistd::write(&write_fd, b"x").unwrap();

    let event = rx.recv().await.expect("expected a readiness event");
    assert_eq!(event.fd, read_fd.as_raw_fd());
    assert_eq!(event.interest, Interest::READABLE);

    shutdown.request_stop();
    run.await.unwrap();
}

#[tokio::test]
async fn register_twice_on_same_fd_is_rejected() {
    let (read_fd, _write_fd) = nix::unistd::pipe().unwrap();
    let (mut reactor, _shutdown) = Reactor::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();

    reactor.register_fd(read_fd.as_raw_fd(), Interest::READABLE, tx).unwrap();
    let err = reactor.register_fd(read_fd.as_raw_fd(), Interest::READABLE, tx2).unwrap_err();
    assert!(matches!(err, ReactorError::AlreadyRegistered { .. }));
}

#[tokio::test]
async fn unregister_unknown_fd_errors() {
    let (mut reactor, _shutdown) = Reactor::new();
    let err = reactor.unregister_fd(9999).unwrap_err();
    assert!(matches!(err, ReactorError::NotRegistered { .. }));
}

#[tokio::test]
async fn run_exits_immediately_with_no_sources_on_shutdown() {
    let (mut reactor, shutdown) = Reactor::new();
    shutdown.request_stop();
    reactor.run().await.unwrap();
}
