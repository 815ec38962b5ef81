//! Terminal states of child builds and the batch-wide result.

use super::signals::TerminationReason;
use std::fmt;

/// Why the supervisor stopped the remaining children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelCause {
    /// A sibling build failed.
    ChildFailed,
    /// The orchestrator itself was interrupted (Ctrl+C).
    Interrupted,
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChildFailed => write!(f, "after another build failed"),
            Self::Interrupted => write!(f, "by interrupt"),
        }
    }
}

/// Terminal state of one child build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildState {
    /// Exited with status 0.
    Succeeded,
    /// Failed on its own: non-zero exit, or a signal the supervisor did not send.
    Failed(TerminationReason),
    /// Stopped by the supervisor.
    Killed(TerminationReason, CancelCause),
    /// The build command could not be started.
    SpawnFailed(String),
}

impl ChildState {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// True for states that should cancel the rest of the batch.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::SpawnFailed(_))
    }

    /// Classify a finished child.
    ///
    /// `cancelled` is the cause under which the supervisor asked this child
    /// to stop before it was reaped, if it did. A child stopped after a
    /// sibling failed keeps its success if it still exited 0. An interrupted
    /// child never counts as a success.
    pub fn from_exit(reason: TerminationReason, cancelled: Option<CancelCause>) -> Self {
        match cancelled {
            Some(CancelCause::Interrupted) => Self::Killed(reason, CancelCause::Interrupted),
            _ if reason.is_success() => Self::Succeeded,
            Some(cause) => Self::Killed(reason, cause),
            None => Self::Failed(reason),
        }
    }
}

impl fmt::Display for ChildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed(reason) => write!(f, "failed ({})", reason),
            Self::Killed(reason, cause) => write!(f, "killed {} ({})", cause, reason),
            Self::SpawnFailed(msg) => write!(f, "could not start: {}", msg),
        }
    }
}

/// Terminal state of one named child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildOutcome {
    pub name: String,
    pub state: ChildState,
}

/// Collects terminal states as children finish.
///
/// Each slot is written at most once; repeated reports for a child that is
/// already terminal are ignored, so simultaneous failures cannot overwrite
/// or double-count each other.
#[derive(Debug)]
pub struct OutcomeLedger {
    names: Vec<String>,
    states: Vec<Option<ChildState>>,
    interrupted: bool,
}

impl OutcomeLedger {
    /// One slot per child, in launch order.
    pub fn new(names: Vec<String>) -> Self {
        let states = vec![None; names.len()];
        Self {
            names,
            states,
            interrupted: false,
        }
    }

    /// Record the terminal state of child `index`.
    ///
    /// Returns `true` if this call recorded the state, `false` if the child
    /// was already terminal.
    pub fn record(&mut self, index: usize, state: ChildState) -> bool {
        match self.states.get_mut(index) {
            Some(slot) if slot.is_none() => {
                *slot = Some(state);
                true
            }
            _ => false,
        }
    }

    pub fn is_terminal(&self, index: usize) -> bool {
        self.states.get(index).is_some_and(Option::is_some)
    }

    /// True once every child has a terminal state.
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(Option::is_some)
    }

    /// Mark the batch as interrupted. An interrupted batch never succeeds.
    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    /// True once any child has failed on its own.
    pub fn has_failure(&self) -> bool {
        self.states.iter().flatten().any(ChildState::is_failure)
    }

    /// Number of children still without a terminal state.
    pub fn pending(&self) -> usize {
        self.states.iter().filter(|s| s.is_none()).count()
    }

    /// Freeze the ledger into the batch result.
    ///
    /// Children that never reported are treated as failed with an unknown
    /// reason; the supervisor only calls this once the ledger is complete.
    pub fn finish(self) -> BatchOutcome {
        let children = self
            .names
            .into_iter()
            .zip(self.states)
            .map(|(name, state)| ChildOutcome {
                name,
                state: state.unwrap_or(ChildState::Failed(TerminationReason::Unknown)),
            })
            .collect();
        BatchOutcome {
            children,
            interrupted: self.interrupted,
        }
    }
}

/// Aggregate result of one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    children: Vec<ChildOutcome>,
    interrupted: bool,
}

impl BatchOutcome {
    /// All children in launch order.
    pub fn children(&self) -> &[ChildOutcome] {
        &self.children
    }

    /// True only if every child succeeded and the batch was not interrupted.
    /// An empty batch is a success.
    pub fn is_success(&self) -> bool {
        !self.interrupted && self.children.iter().all(|c| c.state.is_success())
    }

    pub fn was_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Children that failed on their own (including spawn failures).
    pub fn failed(&self) -> impl Iterator<Item = &ChildOutcome> {
        self.children.iter().filter(|c| c.state.is_failure())
    }

    /// Children stopped by the supervisor.
    pub fn killed(&self) -> impl Iterator<Item = &ChildOutcome> {
        self.children
            .iter()
            .filter(|c| matches!(c.state, ChildState::Killed(..)))
    }

    pub fn succeeded_count(&self) -> usize {
        self.children.iter().filter(|c| c.state.is_success()).count()
    }

    /// One-line summary of the batch.
    pub fn summary(&self) -> String {
        if self.is_success() {
            format!(
                "Parallel build completed successfully ({} variants)",
                self.children.len()
            )
        } else {
            let verdict = if self.interrupted { "interrupted" } else { "failed" };
            format!(
                "Parallel build {}: {} failed, {} killed, {} succeeded",
                verdict,
                self.failed().count(),
                self.killed().count(),
                self.succeeded_count()
            )
        }
    }
}
