//! Partial-download detection.
//!
//! The runner leaves `<model>.partial` behind when a download is
//! interrupted and resumes from it on its own. All llpull does is tell the
//! operator that a resume is about to happen.

use llpull_core::{PullReporter, ResumeMarker};
use tracing::debug;

/// Notice shown when a non-empty resume marker is found.
pub const RESUME_NOTICE: &str = "Resuming partial download...";

/// Check for a non-empty resume marker and report it.
///
/// Returns `true` when the notice was emitted. A missing file, an empty
/// file and a metadata error all return `false` without reporting.
pub fn detect_partial_download(marker: &ResumeMarker, reporter: &dyn PullReporter) -> bool {
    match std::fs::metadata(marker.path()) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => {
            debug!(path = %marker.path().display(), size = meta.len(), "found resume marker");
            reporter.notice(RESUME_NOTICE);
            true
        }
        Ok(_) => false,
        Err(e) => {
            debug!(path = %marker.path().display(), error = %e, "no usable resume marker");
            false
        }
    }
}
