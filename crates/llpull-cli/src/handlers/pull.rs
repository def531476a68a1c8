//! `llpull pull`.

use std::sync::Arc;

use llpull_core::{NoopReporter, PullConfig, PullError, PullReport, PullReporter};
use llpull_runtime::{ConsoleReporter, PullOptions, download_model};
use serde_json::json;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CliError;
use crate::parser::Cli;

/// Usage error shown when `--model` is missing or empty.
pub const MISSING_MODEL: &str = "model flag is required";

/// Load configuration from the environment and apply command-line
/// overrides on top.
pub fn resolve_config(cli: &Cli) -> Result<PullConfig, CliError> {
    let config = PullConfig::from_env()?;
    Ok(apply_overrides(config, cli))
}

/// Apply `--runner` and `--work-dir` to `config`.
pub fn apply_overrides(mut config: PullConfig, cli: &Cli) -> PullConfig {
    if let Some(runner) = &cli.runner {
        config = config.with_runner(runner);
    }
    if let Some(dir) = &cli.work_dir {
        config = config.with_work_dir(dir);
    }
    config
}

/// Run a pull and print its result.
///
/// With `json` set, progress output is suppressed and a single JSON line
/// describing the result is printed to stdout instead.
pub async fn execute(
    config: &PullConfig,
    model: Option<&str>,
    json: bool,
) -> Result<PullReport, CliError> {
    let model = model
        .filter(|m| !m.is_empty())
        .ok_or_else(|| CliError::Usage(MISSING_MODEL.to_string()))?;

    let reporter: Arc<dyn PullReporter> = if json {
        Arc::new(NoopReporter)
    } else {
        Arc::new(ConsoleReporter::new(config.bar_width))
    };

    let token = CancellationToken::new();
    let interrupt = cancel_on_interrupt(token.clone());
    let result = download_model(
        model,
        config,
        PullOptions::default().with_cancel_token(token),
        reporter,
    )
    .await;
    interrupt.abort();

    match result {
        Ok(report) => {
            if json {
                let line = serde_json::to_string(&report)
                    .map_err(|e| CliError::Io(format!("failed to serialize report: {e}")))?;
                println!("{line}");
            }
            Ok(report)
        }
        Err(err) => {
            if json {
                println!("{}", failure_json(model, &err));
            }
            Err(err.into())
        }
    }
}

/// JSON line printed for a failed pull.
///
/// `exit_code` is only set when the runner actually ran to exit.
pub fn failure_json(model: &str, err: &PullError) -> serde_json::Value {
    json!({
        "model": model,
        "exit_code": err.exit_code(),
        "error": err.to_string(),
    })
}

fn cancel_on_interrupt(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("interrupt received, stopping runner");
                token.cancel();
            }
            Err(e) => debug!(error = %e, "ctrl-c handler unavailable"),
        }
    })
}
