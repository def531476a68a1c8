//! `download_model`: the one call adapters make.

use std::sync::Arc;

use chrono::Utc;
use llpull_core::{ModelIdentifier, PullConfig, PullError, PullReport, PullReporter, PullResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::detect::detect_partial_download;
use crate::runner::resolve_runner;
use crate::supervisor::Supervisor;

/// Notice shown once the runner exited with code 0.
pub const SUCCESS_NOTICE: &str = "Model pulled successfully";

/// Per-call options that are not part of the persistent configuration.
#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    /// Cancels the pull when triggered. Without a token a pull waits for
    /// the runner indefinitely.
    pub cancel_token: Option<CancellationToken>,
}

impl PullOptions {
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }
}

/// Pull `model` by running it once through the configured runner.
///
/// 1. Rejects an empty identifier before anything else happens.
/// 2. Announces the pull and checks for a resume marker.
/// 3. Launches the runner, shows its progress and waits for it.
/// 4. Reports success for exit code 0; any other code is
///    [`PullError::NonZeroExit`].
///
/// # Errors
///
/// [`PullError::InvalidModel`], [`PullError::LaunchFailed`],
/// [`PullError::WaitFailed`], [`PullError::NonZeroExit`] or
/// [`PullError::Cancelled`].
pub async fn download_model(
    model: &str,
    config: &PullConfig,
    options: PullOptions,
    reporter: Arc<dyn PullReporter>,
) -> PullResult<PullReport> {
    let model = ModelIdentifier::new(model)?;

    reporter.notice(&format!("Pulling model: {model}"));
    let resumed = detect_partial_download(&config.resume_marker(&model), reporter.as_ref());

    let runner = match resolve_runner(&config.runner) {
        Ok(path) => path,
        Err(e) => {
            // Spawning reports the definitive error.
            warn!(error = %e, "runner resolution failed, launching as configured");
            config.runner.clone()
        }
    };

    if options
        .cancel_token
        .as_ref()
        .is_some_and(CancellationToken::is_cancelled)
    {
        return Err(PullError::Cancelled);
    }

    info!(model = %model, runner = %runner.display(), resumed, "starting pull");
    let started_at = Utc::now();
    let exit = Supervisor::new(runner, &model, config)
        .run(Arc::clone(&reporter), options.cancel_token)
        .await?;
    let finished_at = Utc::now();

    let code = exit.outcome.code();
    if !exit.outcome.is_success() {
        debug!(code, "pull failed");
        return Err(PullError::NonZeroExit { code });
    }

    reporter.notice(SUCCESS_NOTICE);

    Ok(PullReport {
        model: model.to_string(),
        exit_code: code,
        resumed,
        started_at,
        finished_at,
        lines: exit.stats.lines,
        samples: exit.stats.samples,
        last_sample: exit.stats.last_sample,
    })
}
