//! The poll loop state machine
//!
//! `Searching -> Attaching -> Polling -> Terminated`, with two extra edges:
//! `Polling -> Attaching` when the pointer chain has failed `stale_after`
//! times in a row, and `Terminated -> Searching` when restarting after the
//! target exits is enabled. Every sleep is raced against the shutdown
//! signal, and the process handle lives only as long as one session, so it
//! is released exactly once whichever way the session ends.

use crate::core::types::{Address, ProbeError, ProcessId, Severity};
use crate::memory::{extract, resolve_chain};
use crate::probe::settings::ProbeSettings;
use crate::probe::shutdown::ShutdownSignal;
use crate::probe::sink::{SnapshotSink, StaleSignal};
use crate::probe::state::ProbeState;
use crate::process::{Platform, TargetProcess};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Why [`PollLoop::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    TargetExited,
    Cancelled,
}

enum AttachOutcome {
    Resolved(Address),
    Exited,
    Cancelled,
}

enum PollOutcome {
    Stale,
    Exited,
    Cancelled,
}

pub struct PollLoop<P: Platform> {
    platform: P,
    settings: ProbeSettings,
    state: ProbeState,
    sequence: u64,
}

impl<P: Platform> PollLoop<P> {
    pub fn new(platform: P, settings: ProbeSettings) -> Self {
        PollLoop {
            platform,
            settings,
            state: ProbeState::Searching,
            sequence: 0,
        }
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Number of snapshots delivered so far
    pub fn snapshots_taken(&self) -> u64 {
        self.sequence
    }

    /// Runs sessions until the target exits (without restart) or shutdown
    /// is requested. Ends in `Terminated` either way.
    pub async fn run<S>(&mut self, sink: &mut S, shutdown: &mut ShutdownSignal) -> ProbeOutcome
    where
        S: SnapshotSink + ?Sized,
    {
        if self.state.is_terminal() {
            self.transition(ProbeState::Searching, sink);
        }

        loop {
            let outcome = self.run_session(sink, shutdown).await;
            self.transition(ProbeState::Terminated, sink);

            match outcome {
                ProbeOutcome::TargetExited
                    if self.settings.restart_on_exit && !shutdown.is_shutdown() =>
                {
                    info!("target exited, searching again");
                    self.transition(ProbeState::Searching, sink);
                }
                outcome => return outcome,
            }
        }
    }

    /// One locate-attach-poll cycle. The process is dropped on return.
    async fn run_session<S>(&mut self, sink: &mut S, shutdown: &mut ShutdownSignal) -> ProbeOutcome
    where
        S: SnapshotSink + ?Sized,
    {
        let process = match self.search(shutdown).await {
            Some(process) => process,
            None => return ProbeOutcome::Cancelled,
        };
        info!(pid = process.pid(), window = %self.settings.identity, "opened target process");
        self.transition(ProbeState::Attaching, sink);

        loop {
            let base = match self.attach(&process, shutdown).await {
                AttachOutcome::Resolved(base) => base,
                AttachOutcome::Exited => return ProbeOutcome::TargetExited,
                AttachOutcome::Cancelled => return ProbeOutcome::Cancelled,
            };
            self.transition(ProbeState::Polling, sink);

            match self.poll(&process, base, sink, shutdown).await {
                PollOutcome::Stale => self.transition(ProbeState::Attaching, sink),
                PollOutcome::Exited => return ProbeOutcome::TargetExited,
                PollOutcome::Cancelled => return ProbeOutcome::Cancelled,
            }
        }
    }

    async fn search(&mut self, shutdown: &mut ShutdownSignal) -> Option<P::Process> {
        loop {
            if shutdown.is_shutdown() {
                return None;
            }

            match self.platform.locate(&self.settings.identity) {
                Ok(process) => return Some(process),
                Err(error) => {
                    let delay = self.search_retry_delay(&error);
                    if shutdown.wait(delay).await {
                        return None;
                    }
                }
            }
        }
    }

    /// Logs a failed locate and picks how long to wait before the next one
    fn search_retry_delay(&self, error: &ProbeError) -> Duration {
        let timing = &self.settings.timing;
        if !error.is_transient() {
            warn!(%error, severity = ?error.severity(), "unexpected error while searching");
            return timing.search_interval;
        }

        match error {
            ProbeError::WindowNotFound { .. } => {
                debug!(window = %self.settings.identity, "target window not found");
                timing.search_interval
            }
            ProbeError::ProcessIdUnresolved { .. } => {
                warn!(%error, "window found but process id unavailable");
                timing.pid_retry
            }
            _ => match error.os_error() {
                Some(os) if os.is_access_denied() => {
                    warn!(code = os.code, "access denied opening target; try running elevated");
                    timing.search_interval
                }
                os => {
                    warn!(%error, os_code = ?os.map(|os| os.code), "failed to open target");
                    timing.search_interval
                }
            },
        }
    }

    /// Logs a failed liveness check; true when the session has to end
    fn ends_session(pid: ProcessId, error: &ProbeError) -> bool {
        match error.severity() {
            Severity::Transient => {
                warn!(pid, %error, "liveness check failed; retrying");
                false
            }
            Severity::SessionFatal | Severity::Configuration => {
                match error {
                    ProbeError::ProcessExited(_) => info!(pid, "target exited"),
                    _ => warn!(pid, %error, "lost access to target; ending session"),
                }
                true
            }
        }
    }

    async fn attach(
        &mut self,
        process: &P::Process,
        shutdown: &mut ShutdownSignal,
    ) -> AttachOutcome {
        let pid = process.pid();
        let module = self.settings.module.as_str();
        let timing = self.settings.timing;

        loop {
            if shutdown.is_shutdown() {
                return AttachOutcome::Cancelled;
            }

            match self.platform.resolve_module_base(pid, module) {
                Ok(Some(base)) => {
                    info!(pid, module, %base, "module base resolved");
                    if shutdown.wait(timing.settle_delay).await {
                        return AttachOutcome::Cancelled;
                    }
                    return AttachOutcome::Resolved(base);
                }
                Ok(None) => debug!(pid, module, "module not loaded yet"),
                Err(error) if !error.is_transient() => {
                    warn!(pid, module, %error, "module resolution cannot continue");
                    return AttachOutcome::Exited;
                }
                Err(error) => warn!(
                    pid,
                    module,
                    %error,
                    os_code = ?error.os_error().map(|os| os.code),
                    "module resolution failed"
                ),
            }

            if let Err(error) = process.ensure_alive() {
                if Self::ends_session(pid, &error) {
                    return AttachOutcome::Exited;
                }
            }

            if shutdown.wait(timing.attach_interval).await {
                return AttachOutcome::Cancelled;
            }
        }
    }

    async fn poll<S>(
        &mut self,
        process: &P::Process,
        module_base: Address,
        sink: &mut S,
        shutdown: &mut ShutdownSignal,
    ) -> PollOutcome
    where
        S: SnapshotSink + ?Sized,
    {
        let pid = process.pid();
        let mut consecutive_failures = 0u32;

        loop {
            if shutdown.is_shutdown() {
                return PollOutcome::Cancelled;
            }
            let cycle_start = Instant::now();

            if let Err(error) = process.ensure_alive() {
                if Self::ends_session(pid, &error) {
                    return PollOutcome::Exited;
                }
            }

            match resolve_chain(process, module_base, &self.settings.chain) {
                Ok(final_base) => {
                    consecutive_failures = 0;
                    let snapshot = extract(process, final_base, &self.settings.fields)
                        .with_sequence(self.sequence);
                    self.sequence += 1;
                    debug!(
                        sequence = snapshot.sequence,
                        complete = snapshot.complete,
                        "snapshot taken"
                    );
                    sink.on_snapshot(snapshot);
                }
                Err(error) => {
                    consecutive_failures += 1;
                    warn!(
                        step = ?error.chain_step(),
                        failures = consecutive_failures,
                        os_code = ?error.os_error().map(|os| os.code),
                        %error,
                        "pointer chain broken"
                    );
                    sink.on_chain_failure(&error);

                    if consecutive_failures >= self.settings.stale_after {
                        let signal = StaleSignal {
                            consecutive_failures,
                            step: error.chain_step(),
                            last_error: error.to_string(),
                        };
                        warn!(
                            failures = consecutive_failures,
                            chain = %self.settings.chain,
                            "layout may be stale; re-resolving module base"
                        );
                        sink.on_stale_configuration(&signal);
                        return PollOutcome::Stale;
                    }
                }
            }

            let remaining = self
                .settings
                .timing
                .poll_interval
                .saturating_sub(cycle_start.elapsed());
            if shutdown.wait(remaining).await {
                return PollOutcome::Cancelled;
            }
        }
    }

    fn transition<S>(&mut self, next: ProbeState, sink: &mut S)
    where
        S: SnapshotSink + ?Sized,
    {
        let from = self.state;
        debug_assert!(
            from.can_transition_to(next),
            "illegal transition {from} -> {next}"
        );
        info!(%from, to = %next, "state transition");
        self.state = next;
        sink.on_state(from, next);
    }
}
