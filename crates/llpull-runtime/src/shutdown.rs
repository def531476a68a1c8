//! Stopping a cancelled runner: SIGTERM to its process group, grace
//! period, then kill.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tracing::debug;
#[cfg(unix)]
use tracing::warn;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// How long the runner gets to exit after SIGTERM.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Stop `child` and reap it.
///
/// On Unix the runner's process group first receives SIGTERM and is
/// killed only if the runner is still alive after [`SHUTDOWN_GRACE`].
/// Elsewhere the runner is killed directly. Always waits for the process
/// so no zombie is left behind.
pub async fn shutdown_child(child: &mut Child) -> io::Result<ExitStatus> {
    shutdown_with_grace(child, SHUTDOWN_GRACE).await
}

/// SIGKILL whatever is left of the process group led by `pgid`.
///
/// Used once the runner itself has exited but helpers it started still
/// hold its output pipes. Missing groups are ignored.
#[cfg(unix)]
pub fn kill_process_group(pgid: u32) {
    let Ok(raw) = i32::try_from(pgid) else {
        return;
    };
    match signal::killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => debug!(pgid, "killed leftover runner processes"),
        Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => warn!(pgid, error = %e, "failed to kill runner process group"),
    }
}

#[cfg(not(unix))]
pub fn kill_process_group(_pgid: u32) {}

/// Signal the runner's group, or the runner alone when it does not lead
/// a group of its own.
#[cfg(unix)]
fn signal_runner(pid: Pid, sig: Signal) -> nix::Result<()> {
    match signal::killpg(pid, sig) {
        Err(nix::errno::Errno::ESRCH) => signal::kill(pid, sig),
        other => other,
    }
}

#[cfg(unix)]
async fn shutdown_with_grace(child: &mut Child, grace: Duration) -> io::Result<ExitStatus> {
    let Some(pid) = child.id() else {
        // Already reaped.
        return child.wait().await;
    };
    let pid = i32::try_from(pid).map_err(|_| io::Error::other("child pid out of range"))?;
    let pid = Pid::from_raw(pid);

    debug!(%pid, "sending SIGTERM to runner process group");
    if let Err(e) = signal_runner(pid, Signal::SIGTERM) {
        if e == nix::errno::Errno::ESRCH {
            return child.wait().await;
        }
        return Err(io::Error::other(e));
    }

    if let Ok(result) = tokio::time::timeout(grace, child.wait()).await {
        return result;
    }

    debug!(%pid, "runner ignored SIGTERM, killing process group");
    if let Err(e) = signal_runner(pid, Signal::SIGKILL) {
        if e != nix::errno::Errno::ESRCH {
            return Err(io::Error::other(e));
        }
    }
    child.wait().await
}

#[cfg(not(unix))]
async fn shutdown_with_grace(child: &mut Child, _grace: Duration) -> io::Result<ExitStatus> {
    debug!("killing runner");
    child.kill().await?;
    child.wait().await
}
