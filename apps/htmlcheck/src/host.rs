//! Minimal pipeline host used by the binary.
//!
//! Reads the files matched by the given patterns into records, feeds them
//! through the analyzer and (in human mode) the reporter, and collects what
//! comes out the other end.

use crate::analyzer::Analyzer;
use crate::error::{ConfigError, PluginError};
use crate::models::{Contents, FileRecord};
use crate::reporter::{Console, Reporter};
use crate::validator::Validator;
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::pin::pin;
use tracing::{debug, warn};

#[derive(Debug, Default)]
/// Records that left the pipeline and the errors it signalled, in arrival order.
pub struct RunReport {
    pub records: Vec<FileRecord>,
    pub errors: Vec<PluginError>,
}

impl RunReport {
    pub fn halted(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn failed_files(&self) -> usize {
        self.records
            .iter()
            .filter_map(FileRecord::outcome)
            .filter(|o| !o.success)
            .count()
    }
}

/// Expand `patterns` under `root` and load each match as a record.
///
/// Directories become records without contents; unreadable files are logged
/// and skipped. Matches are de-duplicated and sorted.
pub fn collect_records(root: &Path, patterns: &[String]) -> Result<Vec<FileRecord>, ConfigError> {
    let mut paths: BTreeSet<PathBuf> = BTreeSet::new();
    for pat in patterns {
        let abs = if Path::new(pat).is_absolute() {
            PathBuf::from(pat)
        } else {
            root.join(pat)
        };
        let pattern = abs.to_string_lossy().to_string();
        let entries = glob::glob(&pattern).map_err(|e| ConfigError::InvalidValue {
            key: "patterns",
            reason: format!("`{}`: {}", pat, e),
        })?;
        let matched: Vec<PathBuf> = entries.flatten().collect();
        if matched.is_empty() {
            warn!(pattern = %pat, "pattern matched no files");
        }
        paths.extend(matched);
    }
    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        if path.is_dir() {
            records.push(FileRecord::new(path, root, Contents::Null));
            continue;
        }
        match fs::read(&path) {
            Ok(bytes) => records.push(FileRecord::buffer(path, root, bytes)),
            Err(e) => warn!(file = %path.display(), error = %e, "skipping unreadable file"),
        }
    }
    debug!(count = records.len(), "collected records");
    Ok(records)
}

/// Analyze and report every record. Failures signalled by either stage are
/// collected; the run never stops early.
pub async fn run_pipeline<V: Validator, C: Console>(
    analyzer: &Analyzer<V>,
    reporter: &Reporter<C>,
    records: Vec<FileRecord>,
    concurrency: usize,
) -> RunReport {
    let analyzed = analyzer.analyze_stream(stream::iter(records), concurrency);
    let mut out = pin!(reporter.report_stream(analyzed));
    let mut report = RunReport::default();
    while let Some(item) = out.next().await {
        match item {
            Ok(file) => report.records.push(file),
            Err(e) => report.errors.push(e),
        }
    }
    report
}

/// Analyze every record without printing; `throw_errors` turns failed
/// outcomes into errors the same way the reporter does.
pub async fn run_analysis<V: Validator>(
    analyzer: &Analyzer<V>,
    records: Vec<FileRecord>,
    concurrency: usize,
    throw_errors: bool,
) -> RunReport {
    let mut out = pin!(analyzer.analyze_stream(stream::iter(records), concurrency));
    let mut report = RunReport::default();
    while let Some(item) = out.next().await {
        match item {
            Ok(file) => {
                let failed = file.outcome().map_or(false, |o| !o.success);
                report.records.push(file);
                if throw_errors && failed {
                    report.errors.push(PluginError::validation_failed());
                }
            }
            Err(e) => report.errors.push(e),
        }
    }
    report
}
