//! Runner process lifecycle.
//!
//! Launches the runner with both output pipes attached, drains them
//! concurrently with the wait, and only reports the exit once the drain
//! has finished. Every output line is therefore shown before the
//! "Process finished" notice. Helpers the runner leaves behind cannot keep
//! the drain open: they are killed with the runner's process group after
//! [`DRAIN_GRACE`].

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Duration;

use llpull_core::{ExitOutcome, ModelIdentifier, PullConfig, PullError, PullReporter, PullResult};
use tokio::process::Child;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::runner::RunnerInvocation;
use crate::shutdown::{kill_process_group, shutdown_child};
use crate::stream::{DrainStats, drain, merge_streams};

/// How long the drain may outlive the runner before leftovers are killed.
pub const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Exit code used when the OS reports neither a code nor a signal.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// Decode a process exit status into a single integer.
///
/// Normal exits keep their code. On Unix a signal termination becomes
/// `128 + signal`, matching shell conventions. Anything else maps to
/// [`UNKNOWN_EXIT_CODE`].
pub fn exit_code_from_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            warn!(signal, "runner terminated by signal");
            return 128 + signal;
        }
    }

    warn!(?status, "runner exit status could not be decoded");
    UNKNOWN_EXIT_CODE
}

/// What a finished run produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisedExit {
    pub outcome: ExitOutcome,
    pub stats: DrainStats,
}

/// Owns one runner invocation from launch to exit.
#[derive(Debug)]
pub struct Supervisor {
    invocation: RunnerInvocation,
    chunk_size: usize,
}

enum Waited {
    Exited(io::Result<ExitStatus>),
    Cancelled(io::Result<ExitStatus>),
}

impl Supervisor {
    pub fn new(runner: impl Into<PathBuf>, model: &ModelIdentifier, config: &PullConfig) -> Self {
        let invocation = RunnerInvocation::new(runner, model).with_work_dir(config.work_dir());
        Self {
            invocation,
            chunk_size: config.chunk_size,
        }
    }

    pub const fn invocation(&self) -> &RunnerInvocation {
        &self.invocation
    }

    /// Run the invocation to completion.
    ///
    /// Returns the decoded outcome for any normal or signalled exit; a
    /// non-zero code is not an error at this level. Errors are reserved
    /// for launch failures, wait failures and cancellation.
    pub async fn run(
        self,
        reporter: Arc<dyn PullReporter>,
        cancel: Option<CancellationToken>,
    ) -> PullResult<SupervisedExit> {
        let mut child = self
            .invocation
            .command()
            .spawn()
            .map_err(|source| PullError::LaunchFailed {
                runner: self.invocation.program().to_path_buf(),
                source,
            })?;
        let pgid = child.id();
        debug!(pid = ?pgid, "runner started");

        let stdout = child.stdout.take().ok_or(PullError::MissingStream("stdout"))?;
        let stderr = child.stderr.take().ok_or(PullError::MissingStream("stderr"))?;
        let chunks = merge_streams(stdout, stderr, self.chunk_size);
        let drain_task = tokio::spawn(drain(chunks, Arc::clone(&reporter)));

        let waited = wait_or_cancel(&mut child, cancel.as_ref()).await;

        if let Waited::Exited(Err(e)) = &waited {
            warn!(error = %e, "waiting on runner failed, killing it");
            if let Err(e) = child.start_kill() {
                debug!(error = %e, "runner already gone");
            }
            if let Some(pgid) = pgid {
                kill_process_group(pgid);
            }
        }

        let stats = join_drain(drain_task, pgid, DRAIN_GRACE).await;
        reporter.finish();

        let status = match waited {
            Waited::Exited(Ok(status)) => status,
            Waited::Exited(Err(e)) => return Err(PullError::WaitFailed(e)),
            Waited::Cancelled(result) => {
                if let Err(e) = result {
                    warn!(error = %e, "failed to stop cancelled runner");
                }
                return Err(PullError::Cancelled);
            }
        };

        let code = exit_code_from_status(status);
        debug!(code, lines = stats.lines, "runner exited");
        reporter.notice(&format!("Process finished with exit code: {code}"));

        Ok(SupervisedExit {
            outcome: ExitOutcome::from_code(code),
            stats,
        })
    }
}

/// Wait for the drain to see end-of-stream on both pipes.
///
/// Output the runner wrote before exiting is already buffered in the pipes,
/// so the drain normally ends right away. If something else still holds
/// the pipes after `grace`, the runner's process group is killed; after a
/// second `grace` the drain is abandoned.
async fn join_drain(
    mut task: JoinHandle<DrainStats>,
    pgid: Option<u32>,
    grace: Duration,
) -> DrainStats {
    if let Ok(joined) = tokio::time::timeout(grace, &mut task).await {
        return drain_result(joined);
    }

    warn!(?pgid, "runner output still open after exit, killing leftover processes");
    if let Some(pgid) = pgid {
        kill_process_group(pgid);
    }

    match tokio::time::timeout(grace, &mut task).await {
        Ok(joined) => drain_result(joined),
        Err(_) => {
            warn!("runner output never closed, abandoning drain");
            task.abort();
            DrainStats::default()
        }
    }
}

fn drain_result(joined: Result<DrainStats, JoinError>) -> DrainStats {
    joined.unwrap_or_else(|e| {
        warn!(error = %e, "output drain task failed");
        DrainStats::default()
    })
}

async fn wait_or_cancel(child: &mut Child, cancel: Option<&CancellationToken>) -> Waited {
    let Some(token) = cancel else {
        return Waited::Exited(child.wait().await);
    };

    tokio::select! {
        status = child.wait() => return Waited::Exited(status),
        () = token.cancelled() => {}
    }

    debug!("pull cancelled, stopping runner");
    Waited::Cancelled(shutdown_child(child).await)
}
