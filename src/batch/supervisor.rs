//! Fail-fast supervision of a batch of child builds.
//!
//! The supervisor launches every child up front, then polls them from a
//! single thread. The first failure cancels the batch: every child that is
//! still running gets SIGTERM, and SIGKILL if it outlives the grace period.

use super::child::RunningChild;
use super::outcome::{BatchOutcome, CancelCause, ChildState, OutcomeLedger};
use super::signals::TerminationReason;
use super::spec::ChildSpec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Configuration for the supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Delay between two polling passes.
    pub poll_interval: Duration,
    /// Time cancelled children get to exit before SIGKILL.
    pub kill_grace: Duration,
    /// Time allowed for forwarding threads to flush after the batch ends.
    pub output_drain: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(50),
            kill_grace: Duration::from_secs(5),
            output_drain: Duration::from_secs(1),
        }
    }
}

/// Launches and supervises one batch of children.
pub struct Supervisor {
    config: SupervisorConfig,
    shutdown: Arc<AtomicBool>,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that cancels the batch when set (e.g. from a Ctrl+C handler).
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Request cancellation of the running batch.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Run every spec to completion and return the aggregate outcome.
    ///
    /// Never retries. Spawn failures count as child failures.
    #[instrument(level = "debug", skip_all, fields(children = specs.len()))]
    pub fn run(&self, specs: &[ChildSpec]) -> BatchOutcome {
        let mut ledger = OutcomeLedger::new(specs.iter().map(|s| s.name.clone()).collect());
        let mut children: Vec<Option<RunningChild>> = Vec::with_capacity(specs.len());

        for spec in specs {
            match RunningChild::spawn(spec) {
                Ok(child) => {
                    info!(child = %spec.name, pid = child.pid(), "Started build");
                    children.push(Some(child));
                }
                Err(e) => {
                    warn!(child = %spec.name, error = %e, "Failed to start build");
                    ledger.record(spec.index, ChildState::SpawnFailed(e.to_string()));
                    children.push(None);
                }
            }
        }

        let mut cancelled_at: Option<(Instant, CancelCause)> = None;
        let mut escalated = false;

        loop {
            // Any batch that saw an interrupt fails, even if every child exits 0.
            if self.is_shutdown_requested() {
                ledger.mark_interrupted();
            }

            let cause = cancelled_at.map(|(_, cause)| cause);
            self.poll_children(&mut children, &mut ledger, cause);

            if ledger.is_complete() {
                break;
            }

            if cancelled_at.is_none() {
                let cause = if ledger.has_failure() {
                    Some(CancelCause::ChildFailed)
                } else if self.is_shutdown_requested() {
                    Some(CancelCause::Interrupted)
                } else {
                    None
                };
                if let Some(cause) = cause {
                    self.cancel(&mut children, &mut ledger, cause);
                    cancelled_at = Some((Instant::now(), cause));
                }
            }

            if let Some((at, _)) = cancelled_at
                && !escalated
                && at.elapsed() >= self.config.kill_grace
            {
                warn!(
                    remaining = ledger.pending(),
                    grace_ms = self.config.kill_grace.as_millis(),
                    "Builds ignored SIGTERM, sending SIGKILL"
                );
                for child in children.iter_mut().flatten() {
                    if !child.is_reaped()
                        && let Err(e) = child.kill()
                    {
                        warn!(child = %child.name(), error = %e, "Failed to kill build");
                    }
                }
                escalated = true;
            }

            std::thread::sleep(self.config.poll_interval);
        }

        let deadline = Instant::now() + self.config.output_drain;
        for child in children.iter_mut().flatten() {
            child.drain_output(deadline);
        }

        let outcome = ledger.finish();
        debug!(
            success = outcome.is_success(),
            failed = outcome.failed().count(),
            killed = outcome.killed().count(),
            "Batch finished"
        );
        outcome
    }

    /// One polling pass: reap every child that has exited since the last pass.
    ///
    /// `cause` is the reason the batch is being cancelled, if it is. It only
    /// applies to children the supervisor actually signalled.
    fn poll_children(
        &self,
        children: &mut [Option<RunningChild>],
        ledger: &mut OutcomeLedger,
        cause: Option<CancelCause>,
    ) {
        for (index, slot) in children.iter_mut().enumerate() {
            let Some(child) = slot.as_mut() else {
                continue;
            };
            if ledger.is_terminal(index) {
                continue;
            }

            match child.try_wait() {
                Ok(Some(reason)) => {
                    let cancelled = if child.was_cancelled() { cause } else { None };
                    let state = ChildState::from_exit(reason, cancelled);
                    match &state {
                        ChildState::Succeeded => info!(child = %child.name(), "Build succeeded"),
                        ChildState::Killed(..) => {
                            debug!(child = %child.name(), reason = %reason, "Build stopped")
                        }
                        _ => warn!(child = %child.name(), reason = %reason, "Build failed"),
                    }
                    ledger.record(index, state);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(child = %child.name(), error = %e, "Lost track of build");
                    let _ = child.kill();
                    ledger.record(index, ChildState::Failed(TerminationReason::Unknown));
                }
            }
        }
    }

    /// Ask every child without a terminal state to stop.
    ///
    /// Children that already exited on their own are reaped first so they keep
    /// their own result. A child that exits between that pass and the signal
    /// is still recorded as stopped.
    fn cancel(
        &self,
        children: &mut [Option<RunningChild>],
        ledger: &mut OutcomeLedger,
        cause: CancelCause,
    ) {
        self.poll_children(children, ledger, None);

        let running = ledger.pending();
        match cause {
            CancelCause::ChildFailed => warn!(running, "A build failed, stopping the others"),
            CancelCause::Interrupted => warn!(running, "Interrupted, stopping all builds"),
        }

        for (index, slot) in children.iter_mut().enumerate() {
            let Some(child) = slot.as_mut() else {
                continue;
            };
            if ledger.is_terminal(index) {
                continue;
            }
            if let Err(e) = child.terminate() {
                warn!(child = %child.name(), error = %e, "Failed to stop build");
            }
        }
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(SupervisorConfig::default())
    }
}
