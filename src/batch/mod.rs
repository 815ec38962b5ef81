//! Parallel build orchestration.
//!
//! One child process is launched per variant of the configured matrix. The
//! children run concurrently and their output is interleaved on the
//! orchestrator's own streams, each line tagged with the child's name.
//!
//! # Architecture
//!
//! ```text
//!                     ┌──────────────────┐
//!                     │   Supervisor     │
//!                     │ (launch + poll)  │
//!                     └────────┬─────────┘
//!                              │
//!               ┌──────────────┼──────────────┐
//!               │              │              │
//!         ┌─────▼─────┐  ┌─────▼─────┐  ┌─────▼─────┐
//!         │ Variant 1 │  │ Variant 2 │  │ Variant N │
//!         │ (process  │  │ (process  │  │ (process  │
//!         │  group)   │  │  group)   │  │  group)   │
//!         └───────────┘  └───────────┘  └───────────┘
//! ```
//!
//! # Features
//!
//! - **Fail fast**: the first failure stops every sibling still running
//! - **Escalation**: SIGTERM first, SIGKILL after a grace period
//! - **Interrupts**: a shared shutdown flag cancels the batch the same way

mod child;
mod outcome;
mod signals;
mod spec;
mod supervisor;

pub use outcome::{BatchOutcome, CancelCause, ChildOutcome, ChildState, OutcomeLedger};
pub use signals::TerminationReason;
pub use spec::{BuildCommand, ChildSpec, build_specs};
pub use supervisor::{Supervisor, SupervisorConfig};

use crate::error::Result;
use crate::matrix;
use crate::settings::AxisSet;
use tracing::debug;

/// Validate the axes and turn them into launch specs.
///
/// Fails before anything is launched if an axis name is reserved, an axis has
/// no values or repeats one, or two variants would share one name.
pub fn prepare(axes: &AxisSet, command: &BuildCommand, pad: bool) -> Result<Vec<ChildSpec>> {
    axes.validate()?;
    let variants = matrix::expand(axes);
    matrix::ensure_unique_identities(&variants)?;

    let specs = build_specs(&variants, command, pad);
    debug!(
        axes = axes.len(),
        variants = specs.len(),
        command = %command.display(),
        "Prepared build batch"
    );
    Ok(specs)
}

/// Prepare and run a whole batch with `supervisor`.
pub fn run(
    axes: &AxisSet,
    command: &BuildCommand,
    pad: bool,
    supervisor: &Supervisor,
) -> Result<BatchOutcome> {
    let specs = prepare(axes, command, pad)?;
    Ok(supervisor.run(&specs))
}
