//! Trial Runner
//!
//! Executes one work item as a child process and turns the outcome into a
//! [`Sample`]. Nothing escapes this boundary as an error: a command that
//! cannot start, exits non-zero, or times out becomes a failure marker so
//! sibling trials keep running.
//!
//! ## Trial lifecycle
//!
//! ```text
//! guard(destination) ─► start timer ─► spawn ─► wait ─► stop timer
//!         │                                                │
//!         └──────────── drop: remove destination ◄─────────┘
//! ```
//!
//! Cleanup runs on every exit path, including unwinding, and is not part of
//! the measured time.

use crate::WorkItem;
use crate::measure::Timer;
use copybench_stats::{FailureKind, Sample};
use std::io;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Poll interval while waiting on a child under a timeout
const TIMEOUT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Runs a single work item and reports its sample
///
/// Implementations are shared across dispatcher threads.
pub trait TrialRunner: Sync {
    /// Execute the item; must never panic on command failure
    fn run(&self, item: &WorkItem) -> Sample;
}

impl<F> TrialRunner for F
where
    F: Fn(&WorkItem) -> Sample + Sync,
{
    fn run(&self, item: &WorkItem) -> Sample {
        self(item)
    }
}

/// Trial runner that launches the item's command as a child process
#[derive(Debug, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    cleanup_failures: AtomicUsize,
}

enum Exit {
    Finished(ExitStatus),
    TimedOut,
}

impl ProcessRunner {
    /// Runner without a per-trial timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that kills trials exceeding `timeout`
    ///
    /// With a timeout the child is polled every millisecond, which bounds
    /// the measurement resolution to that interval. On Unix each trial then
    /// runs in its own process group and the whole group is killed, so
    /// helpers started by a wrapper script cannot outlive the trial and
    /// recreate its destination after cleanup.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            cleanup_failures: AtomicUsize::new(0),
        }
    }

    /// Configured per-trial timeout
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Number of destination files that could not be removed
    pub fn cleanup_failures(&self) -> usize {
        self.cleanup_failures.load(Ordering::Relaxed)
    }

    fn wait(&self, mut child: Child) -> io::Result<Exit> {
        let Some(timeout) = self.timeout else {
            return child.wait().map(Exit::Finished);
        };

        let deadline = Instant::now() + timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(Exit::Finished(status)),
                Ok(None) => {}
                Err(e) => {
                    kill_trial(&mut child);
                    let _ = child.wait();
                    return Err(e);
                }
            }

            if Instant::now() >= deadline {
                // Kill fails only if the child already exited; reap either way
                kill_trial(&mut child);
                let _ = child.wait();
                return Ok(Exit::TimedOut);
            }

            std::thread::sleep(TIMEOUT_POLL_INTERVAL);
        }
    }
}

impl TrialRunner for ProcessRunner {
    fn run(&self, item: &WorkItem) -> Sample {
        let _artifact = ArtifactGuard {
            path: &item.destination,
            failures: &self.cleanup_failures,
        };

        let mut command = Command::new(&item.program);
        command
            .args(&item.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        if self.timeout.is_some() {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let timer = Timer::start();
        let outcome = command.spawn().and_then(|child| self.wait(child));
        let elapsed = timer.stop();

        let sample = match outcome {
            Ok(Exit::Finished(status)) if status.success() => Sample::from_duration(elapsed),
            Ok(Exit::Finished(status)) => Sample::Failed(FailureKind::ExitStatus(status.code())),
            Ok(Exit::TimedOut) => Sample::Failed(FailureKind::TimedOut),
            Err(e) => Sample::Failed(FailureKind::Launch(e.to_string())),
        };

        match sample.failure() {
            Some(reason) => warn!(
                coordinate = %item.coordinate,
                "Command failed: {} ({})",
                item.command_line(),
                reason
            ),
            None => debug!(
                coordinate = %item.coordinate,
                seconds = sample.as_f64(),
                "trial complete"
            ),
        }

        sample
    }
}

/// Kill a timed-out trial together with everything in its process group
fn kill_trial(child: &mut Child) {
    #[cfg(unix)]
    {
        // The child leads its own group, so its pid is the group id
        let ret = unsafe { libc::killpg(child.id() as libc::pid_t, libc::SIGKILL) };
        if ret == 0 {
            return;
        }
    }
    let _ = child.kill();
}

/// Removes a trial's destination file when dropped
struct ArtifactGuard<'a> {
    path: &'a Path,
    failures: &'a AtomicUsize,
}

impl Drop for ArtifactGuard<'_> {
    fn drop(&mut self) {
        match std::fs::remove_file(self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(path = %self.path.display(), "Failed to remove trial artifact: {}", e);
            }
        }
    }
}
