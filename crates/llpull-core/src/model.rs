//! Model identifiers and the resume marker derived from them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PullError;

/// Opaque name of the model to fetch (e.g. `gemma3:1b`).
///
/// The only invariant is that the identifier is non-empty; everything else
/// is interpreted by the runner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModelIdentifier(String);

impl ModelIdentifier {
    /// Validate and wrap a model identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, PullError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(PullError::InvalidModel);
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier as passed to the runner.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resume marker for this model, resolved against `base` when given.
    pub fn resume_marker(&self, base: Option<&Path>) -> ResumeMarker {
        ResumeMarker::for_model(self, base)
    }
}

impl fmt::Display for ModelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModelIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ModelIdentifier {
    type Err = PullError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ModelIdentifier {
    type Error = PullError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModelIdentifier> for String {
    fn from(value: ModelIdentifier) -> Self {
        value.0
    }
}

/// Sentinel file the runner leaves behind for an interrupted download.
///
/// The runner owns this file; llpull only ever reads its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeMarker {
    path: PathBuf,
}

impl ResumeMarker {
    /// Suffix appended to the model identifier.
    pub const SUFFIX: &'static str = ".partial";

    /// Derive the marker path for `model`, relative to `base` if provided.
    pub fn for_model(model: &ModelIdentifier, base: Option<&Path>) -> Self {
        let file_name = format!("{}{}", model.as_str(), Self::SUFFIX);
        let path = base.map_or_else(|| PathBuf::from(&file_name), |dir| dir.join(&file_name));
        Self { path }
    }

    /// Path of the marker file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
