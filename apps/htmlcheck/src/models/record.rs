//! File record flowing through the pipeline.
//!
//! The host owns each record; stages take it by value and hand it back, so a
//! record is emitted exactly once and never copied by the stages.

use super::Outcome;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Record payload.
pub enum Contents {
    /// No contents (directories, `read: false` sources).
    Null,
    /// Materialized bytes.
    Buffer(Vec<u8>),
    /// Contents still arriving through a live stream; the stages do not
    /// support these.
    Stream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One source file in the pipeline.
pub struct FileRecord {
    pub path: PathBuf,
    /// Directory that `relative_path` is computed against.
    pub base: PathBuf,
    pub contents: Contents,
    outcome: Option<Outcome>,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, base: impl Into<PathBuf>, contents: Contents) -> Self {
        Self {
            path: path.into(),
            base: base.into(),
            contents,
            outcome: None,
        }
    }

    /// Record with materialized contents.
    pub fn buffer(path: impl Into<PathBuf>, base: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(path, base, Contents::Buffer(bytes.into()))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.contents, Contents::Null)
    }

    pub fn is_stream_backed(&self) -> bool {
        matches!(self.contents, Contents::Stream)
    }

    /// Path relative to `base`, falling back to the full path.
    pub fn relative_path(&self) -> PathBuf {
        pathdiff::diff_paths(&self.path, &self.base)
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| self.path.clone())
    }

    pub fn display_relative(&self) -> String {
        self.relative_path().to_string_lossy().to_string()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Text view of the contents (lossy for invalid UTF-8).
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match &self.contents {
            Contents::Buffer(b) => Some(String::from_utf8_lossy(b)),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Attach the analyzer's result. Only the analyzer calls this.
    pub(crate) fn attach_outcome(&mut self, outcome: Outcome) {
        self.outcome = Some(outcome);
    }

    /// Build a record that already carries an outcome, for hosts that
    /// replay stored results into the reporter.
    pub fn with_outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }
}
