//! End-to-end pulls against fake runner scripts.
//!
//! Each test writes a small `sh` script that stands in for the real runner
//! and drives it through `download_model`.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use llpull_core::test_utils::{RecordingReporter, ReportEvent};
use llpull_core::{PullConfig, PullError};
use llpull_runtime::{PullOptions, download_model};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Serializes script creation and spawning. A script still open for
/// writing in one test can make a concurrent exec fail with ETXTBSY.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SPAWN_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

fn fake_runner(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-runner");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn config_for(runner: &Path, work_dir: &Path) -> PullConfig {
    PullConfig::default()
        .with_runner(runner)
        .with_work_dir(work_dir)
}

#[tokio::test]
async fn test_successful_pull_reports_progress_then_completion() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let runner = fake_runner(
        dir.path(),
        "printf 'loading 10%%\\n'\nprintf 'loading 55%%\\n'\necho done\nexit 0",
    );
    let reporter = Arc::new(RecordingReporter::new());

    let report = download_model(
        "gemma3:1b",
        &config_for(&runner, dir.path()),
        PullOptions::default(),
        reporter.clone(),
    )
    .await
    .unwrap();

    assert_eq!(
        reporter.events(),
        vec![
            ReportEvent::Notice("Pulling model: gemma3:1b".into()),
            ReportEvent::Progress(10),
            ReportEvent::Progress(55),
            ReportEvent::Line("done".into()),
            ReportEvent::Finish,
            ReportEvent::Notice("Process finished with exit code: 0".into()),
            ReportEvent::Notice("Model pulled successfully".into()),
        ]
    );
    assert_eq!(report.model, "gemma3:1b");
    assert_eq!(report.exit_code, 0);
    assert!(!report.resumed);
    assert_eq!(report.lines, 3);
    assert_eq!(report.samples, 2);
    assert_eq!(report.last_sample, Some(55));
    assert!(report.finished_at >= report.started_at);
}

#[tokio::test]
async fn test_empty_model_never_launches() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("launched");
    let runner = fake_runner(dir.path(), &format!("touch '{}'", marker.display()));
    let reporter = Arc::new(RecordingReporter::new());

    let err = download_model(
        "",
        &config_for(&runner, dir.path()),
        PullOptions::default(),
        reporter.clone(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PullError::InvalidModel));
    assert!(reporter.events().is_empty());
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_missing_runner_fails_to_start() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let reporter = Arc::new(RecordingReporter::new());

    let err = download_model(
        "gemma3:1b",
        &config_for(&dir.path().join("no-such-runner"), dir.path()),
        PullOptions::default(),
        reporter.clone(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, PullError::LaunchFailed { .. }));
    assert_eq!(err.exit_code(), None);
    assert!(err.to_string().starts_with("failed to start"));
    assert!(!reporter.events().contains(&ReportEvent::Finish));
}

#[tokio::test]
async fn test_non_zero_exit_is_reported_verbatim() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let runner = fake_runner(dir.path(), "echo 'model not found'\nexit 1");
    let reporter = Arc::new(RecordingReporter::new());

    let err = download_model(
        "gemma3:1b",
        &config_for(&runner, dir.path()),
        PullOptions::default(),
        reporter.clone(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.exit_code(), Some(1));
    assert_eq!(err.to_string(), "failed to pull model, exit code: 1");
    assert_eq!(reporter.lines(), vec!["model not found"]);
    assert_eq!(
        reporter.notices(),
        vec![
            "Pulling model: gemma3:1b",
            "Process finished with exit code: 1",
        ]
    );
}

#[tokio::test]
async fn test_partial_download_announced_before_launch() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("gemma3:1b.partial"), b"partial bytes").unwrap();
    let runner = fake_runner(dir.path(), "echo \"args $1 $2 $3 $4 ($#)\"");
    let reporter = Arc::new(RecordingReporter::new());

    let report = download_model(
        "gemma3:1b",
        &config_for(&runner, dir.path()),
        PullOptions::default(),
        reporter.clone(),
    )
    .await
    .unwrap();

    assert!(report.resumed);
    let events = reporter.events();
    assert_eq!(
        events[..3],
        [
            ReportEvent::Notice("Pulling model: gemma3:1b".into()),
            ReportEvent::Notice("Resuming partial download...".into()),
            ReportEvent::Line("args gemma3:1b -ngl 16 1+1=? (4)".into()),
        ]
    );
}

#[tokio::test]
async fn test_empty_partial_file_is_ignored() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("gemma3:1b.partial"), b"").unwrap();
    let runner = fake_runner(dir.path(), "exit 0");
    let reporter = Arc::new(RecordingReporter::new());

    let report = download_model(
        "gemma3:1b",
        &config_for(&runner, dir.path()),
        PullOptions::default(),
        reporter.clone(),
    )
    .await
    .unwrap();

    assert!(!report.resumed);
    assert!(
        !reporter
            .notices()
            .contains(&"Resuming partial download...".to_string())
    );
}

#[tokio::test]
async fn test_runner_runs_in_work_dir() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let runner = fake_runner(dir.path(), "touch ran-here");
    let reporter = Arc::new(RecordingReporter::new());

    download_model(
        "gemma3:1b",
        &config_for(&runner, dir.path()),
        PullOptions::default(),
        reporter,
    )
    .await
    .unwrap();

    assert!(dir.path().join("ran-here").exists());
}

#[tokio::test]
async fn test_stderr_is_merged_into_output() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let runner = fake_runner(
        dir.path(),
        "echo 'on stdout'\necho 'on stderr' >&2\nprintf 'loading 80%%\\n' >&2",
    );
    let reporter = Arc::new(RecordingReporter::new());

    download_model(
        "gemma3:1b",
        &config_for(&runner, dir.path()),
        PullOptions::default(),
        reporter.clone(),
    )
    .await
    .unwrap();

    let lines = reporter.lines();
    assert!(lines.contains(&"on stdout".to_string()));
    assert!(lines.contains(&"on stderr".to_string()));
    assert_eq!(reporter.samples(), vec![80]);
}

#[tokio::test]
async fn test_carriage_return_redraws_and_glyphs() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let runner = fake_runner(
        dir.path(),
        "printf 'loading 1%%\\rloading 2%%\\rloading 3%%\\n'\n\
         printf '\\342\\226\\210\\342\\226\\210 loading 40%%\\n'\n\
         printf 'loading   | 4.5%%\\n'",
    );
    let reporter = Arc::new(RecordingReporter::new());

    download_model(
        "gemma3:1b",
        &config_for(&runner, dir.path()),
        PullOptions::default(),
        reporter.clone(),
    )
    .await
    .unwrap();

    assert_eq!(reporter.samples(), vec![1, 2, 3, 40]);
    assert!(
        reporter
            .events()
            .contains(&ReportEvent::RawProgress("loading 4.5".into()))
    );
}

#[tokio::test]
async fn test_signal_termination_maps_to_shell_code() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let runner = fake_runner(dir.path(), "echo 'last words'\nkill -9 $$");
    let reporter = Arc::new(RecordingReporter::new());

    let err = download_model(
        "gemma3:1b",
        &config_for(&runner, dir.path()),
        PullOptions::default(),
        reporter.clone(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.exit_code(), Some(137));
    assert_eq!(reporter.lines(), vec!["last words"]);
}

#[tokio::test]
async fn test_cancellation_stops_runner() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let runner = fake_runner(dir.path(), "echo started\nexec sleep 30");
    let reporter = Arc::new(RecordingReporter::new());
    let token = CancellationToken::new();

    let pull = tokio::spawn({
        let config = config_for(&runner, dir.path());
        let options = PullOptions::default().with_cancel_token(token.clone());
        let reporter = reporter.clone();
        async move { download_model("gemma3:1b", &config, options, reporter).await }
    });

    for _ in 0..100 {
        if reporter.lines().contains(&"started".to_string()) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    token.cancel();

    let result = tokio::time::timeout(Duration::from_secs(10), pull)
        .await
        .expect("cancelled pull should stop promptly")
        .unwrap();

    assert!(matches!(result, Err(PullError::Cancelled)));
    assert!(reporter.events().contains(&ReportEvent::Finish));
    assert!(
        !reporter
            .notices()
            .iter()
            .any(|n| n.starts_with("Process finished"))
    );
}

#[tokio::test]
async fn test_cancellation_stops_helpers_started_by_runner() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    // `sleep` is a separate process that shares the output pipes.
    let runner = fake_runner(dir.path(), "echo started\nsleep 30\necho never");
    let reporter = Arc::new(RecordingReporter::new());
    let token = CancellationToken::new();

    let pull = tokio::spawn({
        let config = config_for(&runner, dir.path());
        let options = PullOptions::default().with_cancel_token(token.clone());
        let reporter = reporter.clone();
        async move { download_model("gemma3:1b", &config, options, reporter).await }
    });

    for _ in 0..100 {
        if reporter.lines().contains(&"started".to_string()) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    token.cancel();

    let result = tokio::time::timeout(Duration::from_secs(10), pull)
        .await
        .expect("cancelled pull should stop promptly")
        .unwrap();

    assert!(matches!(result, Err(PullError::Cancelled)));
    assert!(!reporter.lines().contains(&"never".to_string()));
}

#[tokio::test]
async fn test_background_helper_does_not_hold_up_completion() {
    let _guard = serial();
    let dir = TempDir::new().unwrap();
    let runner = fake_runner(dir.path(), "sleep 30 &\nprintf 'loading 100%%\\n'\necho done\nexit 0");
    let reporter = Arc::new(RecordingReporter::new());

    let report = tokio::time::timeout(
        Duration::from_secs(15),
        download_model(
            "gemma3:1b",
            &config_for(&runner, dir.path()),
            PullOptions::default(),
            reporter.clone(),
        ),
    )
    .await
    .expect("pull should finish once the runner exits")
    .unwrap();

    assert_eq!(report.exit_code, 0);
    assert_eq!(reporter.samples(), vec![100]);
    assert_eq!(reporter.lines(), vec!["done"]);
    assert_eq!(
        reporter.notices().last().map(String::as_str),
        Some("Model pulled successfully")
    );
}
