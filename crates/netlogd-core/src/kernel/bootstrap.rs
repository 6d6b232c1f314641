//! Application lifecycle (spec.md §4.6, §7, §9): parse CLI and config,
//! build the plugin registry and stack, drop privileges, daemonize, install
//! signal handling, then enter the reactor loop.

use std::collections::HashMap;
use std::os::unix::io::RawFd;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::{global_schema, ConfigParseOutcome, ConfigParser, ConfigValue, TomlConfigParser};
use crate::kernel::cli::Cli;
use crate::kernel::error::{Error, Result};
use crate::kernel::signals::{spawn_signal_forwarder, DaemonSignal};
use crate::kernel::{constants, privilege};
use crate::logger::{Level, Logger};
use crate::plugin::PluginRegistry;
use crate::reactor::{FdEvent, Interest, Reactor, ShutdownHandle};
use crate::stack::builder::{build_stack, parse_stack_spec};
use crate::stack::dispatch::{clean_results, dispatch_from};
use crate::stack::Stack;

/// Owns everything a running daemon needs past startup: every independently
/// built stack (one per `stack=` directive, spec.md §4.6), the reactor
/// driving them from their head stage's fd, and the signal channel that
/// drives reload/shutdown.
pub struct Application {
    stacks: Vec<Stack>,
    /// Maps a registered head-stage fd back to which stack it feeds, so a
    /// readiness event from the reactor dispatches the right one.
    fd_stack_map: HashMap<RawFd, usize>,
    fd_events: mpsc::UnboundedReceiver<FdEvent>,
    reactor_shutdown: ShutdownHandle,
    _reactor_task: tokio::task::JoinHandle<()>,
    signal_rx: mpsc::UnboundedReceiver<DaemonSignal>,
    _signal_handle: signal_hook_tokio::Handle,
    logger: Arc<Logger>,
    logger_path: String,
}

impl Application {
    /// Runs the full startup sequence described in spec.md §4.6: parse CLI,
    /// read `[global]`, install the logger, load plugins and build the
    /// stack from `stack=` directives, then optionally drop privileges and
    /// daemonize. Returns an `Application` ready to [`run`](Self::run).
    pub async fn bootstrap(cli: Cli) -> Result<Self> {
        let parser = TomlConfigParser::open(&cli.configfile).map_err(Error::Config)?;

        let global = match parser.parse_section("global", &global_schema()) {
            Ok(section) => section,
            Err(ConfigParseOutcome::SectionMissing) => crate::config::ConfigSection::new(),
            Err(outcome) => return Err(Error::Other(format!("invalid [global] section: {outcome}"))),
        };

        let logfile = global.get_str("logfile").unwrap_or(constants::DEFAULT_LOGFILE).to_string();
        let loglevel = global
            .get_int("loglevel")
            .and_then(Level::from_i64)
            .unwrap_or(Level::Notice);

        let logger = Logger::open_file(&logfile, loglevel).map_err(Error::Logger)?;
        let logger = logger.install().map_err(Error::Logger)?;

        let mut registry = PluginRegistry::new();
        for plugin_path in global.get_all("plugin") {
            if let Some(path) = plugin_path.as_str() {
                registry.load(path).map_err(Error::Plugin)?;
            }
        }

        let stack_directives: Vec<&ConfigValue> = global.get_all("stack").iter().collect();
        if stack_directives.is_empty() {
            return Err(Error::NoStackBuilt);
        }

        let mut stacks = Vec::new();
        for directive in stack_directives {
            let Some(raw) = directive.as_str() else { continue };
            let specs = parse_stack_spec(raw).map_err(Error::Stack)?;
            let stack = build_stack(&registry, &specs, &parser).await.map_err(Error::Stack)?;
            stacks.push(stack);
        }
        if stacks.is_empty() {
            return Err(Error::NoStackBuilt);
        }

        if let Some(username) = &cli.uid {
            privilege::drop_privileges(username)?;
        }

        if cli.daemon {
            let keep_stdout = logfile == "-";
            unsafe {
                privilege::daemonize(keep_stdout)?;
            }
        }

        let (mut reactor, reactor_shutdown) = Reactor::new();
        let (fd_tx, fd_events) = mpsc::unbounded_channel();
        let mut fd_stack_map = HashMap::new();
        for (stack_index, stack) in stacks.iter().enumerate() {
            let Some(head) = stack.stages().first() else { continue };
            let Some(fd) = head.descriptor().readable_fd(head) else { continue };
            reactor.register_fd(fd, Interest::READABLE, fd_tx.clone()).map_err(Error::Reactor)?;
            fd_stack_map.insert(fd, stack_index);
        }
        let reactor_task = tokio::spawn(async move {
            if let Err(err) = reactor.run().await {
                log::error!("reactor loop exited with an error: {err}");
            }
        });

        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let signal_handle = spawn_signal_forwarder(signal_tx)?;

        Ok(Self {
            stacks,
            fd_stack_map,
            fd_events,
            reactor_shutdown,
            _reactor_task: reactor_task,
            signal_rx,
            _signal_handle: signal_handle,
            logger,
            logger_path: logfile,
        })
    }

    /// Drives events through every built stack until a shutdown signal
    /// arrives: a readiness event from the reactor dispatches one event
    /// through the stack whose head stage owns that fd; `SIGHUP` reopens the
    /// logfile in place and fans out to every stack, a failed reopen being
    /// treated as fatal (spec.md §7).
    pub async fn run(&mut self) -> Result<()> {
        loop {
            tokio::select! {
                signal = self.signal_rx.recv() => {
                    match signal {
                        Some(DaemonSignal::Reload) => {
                            log::info!("reopening logfile on SIGHUP");
                            self.logger.reopen().map_err(Error::Logger)?;
                            for stack in &mut self.stacks {
                                stack.signal_all(signal_hook::consts::SIGHUP);
                            }
                        }
                        Some(DaemonSignal::Shutdown) | None => {
                            self.shutdown().await;
                            return Ok(());
                        }
                    }
                }
                Some(event) = self.fd_events.recv() => {
                    if let Some(&stack_index) = self.fd_stack_map.get(&event.fd) {
                        self.dispatch_once(stack_index).await;
                    }
                }
            }
        }
    }

    /// Dispatches one event through `stack_index`, starting at its head
    /// stage (index 0) — the stage whose fd the reactor just reported ready.
    /// Also exposed for callers that feed events themselves, such as tests.
    pub async fn dispatch_once(&mut self, stack_index: usize) -> Option<crate::plugin::ReturnCode> {
        let stack = self.stacks.get_mut(stack_index)?;
        let outcome = dispatch_from(stack, 0).await;
        clean_results(stack);
        Some(outcome)
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn stacks_mut(&mut self) -> &mut [Stack] {
        &mut self.stacks
    }

    pub fn logger_path(&self) -> &str {
        &self.logger_path
    }

    async fn shutdown(&mut self) {
        log::info!("shutting down");
        self.reactor_shutdown.request_stop();
        for stack in &mut self.stacks {
            stack.stop_all().await;
        }
    }
}

#[cfg(test)]
mod tests;
