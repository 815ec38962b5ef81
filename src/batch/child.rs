//! Process handle for a running child build.
//!
//! Wraps a spawned build with its output-forwarding threads. Every line the
//! child writes is re-emitted on the orchestrator's own stdout/stderr behind
//! the child's `[name]` prefix.

use super::signals::{TerminationReason, analyze_exit_status};
use super::spec::ChildSpec;
use crate::error::{Result, VarbuildError};
use crate::theme;
use owo_colors::Stream;
use std::io::{BufRead, BufReader, Read, Write};
use std::process::Child;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Which orchestrator stream a child stream is forwarded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Stdout,
    Stderr,
}

impl Sink {
    fn stream(self) -> Stream {
        match self {
            Self::Stdout => Stream::Stdout,
            Self::Stderr => Stream::Stderr,
        }
    }
}

/// Copy `reader` line by line to `sink`, prefixing every line.
fn forward_lines<R: Read>(reader: R, prefix: &str, sink: Sink) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                // A closed pipe on our side is not the child's failure.
                let _ = match sink {
                    Sink::Stdout => writeln!(std::io::stdout().lock(), "{} {}", prefix, line),
                    Sink::Stderr => writeln!(std::io::stderr().lock(), "{} {}", prefix, line),
                };
            }
            Err(e) => {
                tracing::debug!(prefix = %prefix, error = %e, "Stopped forwarding child output");
                break;
            }
        }
    }
}

fn spawn_forwarder<R>(name: &str, reader: R, prefix: String, sink: Sink) -> Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    let thread_name = match sink {
        Sink::Stdout => format!("{}-stdout", name),
        Sink::Stderr => format!("{}-stderr", name),
    };
    std::thread::Builder::new()
        .name(thread_name)
        .spawn(move || forward_lines(reader, &prefix, sink))
        .map_err(VarbuildError::Io)
}

/// Handle to one running child build.
pub struct RunningChild {
    name: String,
    child: Child,
    forwarders: Vec<JoinHandle<()>>,
    /// Whether the process has been reaped
    reaped: bool,
    /// Whether the supervisor asked this child to stop
    cancelled: bool,
}

impl RunningChild {
    /// Launch the child described by `spec` and start forwarding its output.
    pub fn spawn(spec: &ChildSpec) -> Result<Self> {
        let child = spec
            .to_command()
            .spawn()
            .map_err(|source| VarbuildError::Spawn {
                name: spec.name.clone(),
                source,
            })?;

        // From here on, an early return drops `running`, which reaps the child.
        let mut running = Self {
            name: spec.name.clone(),
            child,
            forwarders: Vec::with_capacity(2),
            reaped: false,
            cancelled: false,
        };

        let prefix =
            |sink: Sink| theme::child_prefix(&spec.display_name, spec.index, sink.stream());
        if let Some(stdout) = running.child.stdout.take() {
            let handle = spawn_forwarder(&spec.name, stdout, prefix(Sink::Stdout), Sink::Stdout)?;
            running.forwarders.push(handle);
        }
        if let Some(stderr) = running.child.stderr.take() {
            let handle = spawn_forwarder(&spec.name, stderr, prefix(Sink::Stderr), Sink::Stderr)?;
            running.forwarders.push(handle);
        }

        Ok(running)
    }

    /// Variant name of this child.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the process ID.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Whether [`terminate`](Self::terminate) was called before the child was reaped.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_reaped(&self) -> bool {
        self.reaped
    }

    /// Try to reap the child (non-blocking).
    ///
    /// Returns `None` while it is still running.
    pub fn try_wait(&mut self) -> Result<Option<TerminationReason>> {
        if self.reaped {
            return Err(VarbuildError::Io(std::io::Error::other(format!(
                "child '{}' already reaped",
                self.name
            ))));
        }
        match self.child.try_wait()? {
            Some(status) => {
                self.reaped = true;
                Ok(Some(analyze_exit_status(status)))
            }
            None => Ok(None),
        }
    }

    /// Ask the child (and everything in its process group) to stop.
    pub fn terminate(&mut self) -> Result<()> {
        if self.reaped {
            return Ok(());
        }
        self.cancelled = true;
        self.signal_group(GroupSignal::Terminate)
    }

    /// Forcefully stop the child and its process group.
    pub fn kill(&mut self) -> Result<()> {
        if self.reaped {
            return Ok(());
        }
        self.cancelled = true;
        self.signal_group(GroupSignal::Kill)
    }

    #[cfg(unix)]
    fn signal_group(&mut self, which: GroupSignal) -> Result<()> {
        use nix::errno::Errno;
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        let signal = match which {
            GroupSignal::Terminate => Signal::SIGTERM,
            GroupSignal::Kill => Signal::SIGKILL,
        };
        // The child was spawned as its own group leader, so pgid == pid.
        match killpg(Pid::from_raw(self.child.id() as i32), signal) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(VarbuildError::Io(std::io::Error::from(e))),
        }
    }

    #[cfg(not(unix))]
    fn signal_group(&mut self, _which: GroupSignal) -> Result<()> {
        match self.child.kill() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(VarbuildError::Io(e)),
        }
    }

    /// Wait until the forwarding threads have flushed the child's output.
    ///
    /// Threads still running at `deadline` (for example because a detached
    /// grandchild holds the pipe open) are left behind.
    pub fn drain_output(&mut self, deadline: Instant) {
        for handle in std::mem::take(&mut self.forwarders) {
            while !handle.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(5));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                tracing::debug!(child = %self.name, "Output still open at drain deadline");
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum GroupSignal {
    Terminate,
    Kill,
}

impl Drop for RunningChild {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.kill();
            let _ = self.child.wait();
            self.reaped = true;
        }
    }
}
