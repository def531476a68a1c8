//! Test helpers shared with downstream crates.

use std::sync::Mutex;

use crate::ports::PullReporter;

/// One call received by a [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Notice(String),
    Progress(u8),
    RawProgress(String),
    Line(String),
    Finish,
}

/// Reporter that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<ReportEvent> {
        self.lock().clone()
    }

    /// Progress samples in the order they arrived.
    pub fn samples(&self) -> Vec<u8> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Informational lines in the order they arrived.
    pub fn lines(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Line(l) => Some(l.clone()),
                _ => None,
            })
            .collect()
    }

    /// Notices in the order they arrived.
    pub fn notices(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Notice(n) => Some(n.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ReportEvent>> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn push(&self, event: ReportEvent) {
        self.lock().push(event);
    }
}

impl PullReporter for RecordingReporter {
    fn notice(&self, message: &str) {
        self.push(ReportEvent::Notice(message.to_string()));
    }

    fn progress(&self, percent: u8) {
        self.push(ReportEvent::Progress(percent));
    }

    fn raw_progress(&self, text: &str) {
        self.push(ReportEvent::RawProgress(text.to_string()));
    }

    fn line(&self, text: &str) {
        self.push(ReportEvent::Line(text.to_string()));
    }

    fn finish(&self) {
        self.push(ReportEvent::Finish);
    }
}
