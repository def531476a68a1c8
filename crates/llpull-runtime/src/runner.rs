//! Runner binary resolution and the fixed smoke-test invocation.
//!
//! The runner downloads the model as a side effect of running it once,
//! so the arguments never change: offload 16 layers and ask a trivial
//! question.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use llpull_core::ModelIdentifier;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Value passed to `-ngl`.
pub const GPU_LAYERS: &str = "16";

/// Prompt sent to the runner once the model is loaded.
pub const SMOKE_TEST_PROMPT: &str = "1+1=?";

/// Errors that can occur when resolving the runner binary.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// No file exists at the configured path.
    #[error("runner binary not found at: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The file exists but has no execute bit.
    #[error("runner binary exists but is not executable: {}", .path.display())]
    NotExecutable { path: PathBuf },

    /// Reading the file metadata was refused.
    #[error("permission denied accessing runner binary: {}", .path.display())]
    PermissionDenied { path: PathBuf },

    /// A bare runner name was not found on `PATH`.
    #[error("runner '{name}' not found on PATH: {source}")]
    NotOnPath {
        name: String,
        #[source]
        source: which::Error,
    },

    /// Any other metadata failure.
    #[error("failed to inspect runner binary {}: {source}", .path.display())]
    Inspect {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for runner resolution.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Resolve the configured runner to an executable path.
///
/// A value with a directory component is validated in place. A bare name
/// is looked up on `PATH`.
pub fn resolve_runner(runner: &Path) -> RunnerResult<PathBuf> {
    if runner.components().count() > 1 || runner.is_absolute() {
        return validate_binary(runner);
    }

    which::which(runner).map_err(|source| RunnerError::NotOnPath {
        name: runner.display().to_string(),
        source,
    })
}

fn validate_binary(path: &Path) -> RunnerResult<PathBuf> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(RunnerError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err(RunnerError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(RunnerError::Inspect {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    if !metadata.is_file() {
        return Err(RunnerError::NotExecutable {
            path: path.to_path_buf(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(RunnerError::NotExecutable {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(path.to_path_buf())
}

/// The exact command line used to pull a model.
#[derive(Debug, Clone)]
pub struct RunnerInvocation {
    program: PathBuf,
    args: Vec<String>,
    work_dir: Option<PathBuf>,
}

impl RunnerInvocation {
    /// `<program> <model> -ngl 16 1+1=?`
    pub fn new(program: impl Into<PathBuf>, model: &ModelIdentifier) -> Self {
        Self {
            program: program.into(),
            args: vec![
                model.as_str().to_string(),
                "-ngl".to_string(),
                GPU_LAYERS.to_string(),
                SMOKE_TEST_PROMPT.to_string(),
            ],
            work_dir: None,
        }
    }

    /// Run the process in `dir` instead of the current directory.
    #[must_use]
    pub fn with_work_dir(mut self, dir: Option<&Path>) -> Self {
        self.work_dir = dir.map(Path::to_path_buf);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// Build the command with both output streams piped.
    ///
    /// Stdin is closed so the runner never waits on the terminal, and the
    /// child is killed if the handle is dropped early. On Unix the runner
    /// leads its own process group, so helpers it starts can be signalled
    /// together with it.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args.iter().map(OsStr::new))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }

        debug!(
            program = %self.program.display(),
            args = ?self.args,
            work_dir = ?self.work_dir,
            "built runner command"
        );
        cmd
    }
}
