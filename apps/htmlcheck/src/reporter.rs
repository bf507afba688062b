//! Reporter stage: prints attached outcomes and optionally halts the run.
//!
//! The record is always handed downstream before any failure is raised, so
//! a halting error never swallows the record that caused it.

use crate::config::ReporterOptions;
use crate::error::PluginError;
use crate::format::{format_outcome, Palette};
use crate::models::FileRecord;
use futures::stream::{self, Stream, StreamExt};
use std::sync::Mutex;

/// Line-oriented console sink.
pub trait Console: Send + Sync {
    fn line(&self, text: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn line(&self, text: &str) {
        println!("{}", text);
    }
}

#[derive(Debug, Default)]
/// Collects lines in memory.
pub struct MemoryConsole {
    lines: Mutex<Vec<String>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Console for MemoryConsole {
    fn line(&self, text: &str) {
        if let Ok(mut l) = self.lines.lock() {
            l.push(text.to_string());
        }
    }
}

pub struct Reporter<C> {
    options: ReporterOptions,
    console: C,
    palette: Palette,
}

impl<C: Console> Reporter<C> {
    pub fn new(options: ReporterOptions, console: C, palette: Palette) -> Self {
        Self {
            options,
            console,
            palette,
        }
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Print the record's outcome (if any), hand the record to `downstream`,
    /// then signal failure when `throw_errors` is set and validation failed.
    pub fn report<F>(&self, file: FileRecord, downstream: F) -> Result<(), PluginError>
    where
        F: FnOnce(FileRecord),
    {
        let failed = match file.outcome() {
            Some(outcome) => {
                for line in format_outcome(&file, outcome, self.options.max_message_len, self.palette)
                {
                    self.console.line(&line);
                }
                !outcome.success
            }
            None => false,
        };
        downstream(file);
        if self.options.throw_errors && failed {
            return Err(PluginError::validation_failed());
        }
        Ok(())
    }

    /// Stream adapter over [`Reporter::report`]. Every record is yielded as
    /// `Ok`; a failing record under `throw_errors` is followed by an `Err`.
    /// Upstream errors pass through untouched.
    pub fn report_stream<'a, S>(
        &'a self,
        results: S,
    ) -> impl Stream<Item = Result<FileRecord, PluginError>> + 'a
    where
        S: Stream<Item = Result<FileRecord, PluginError>> + 'a,
    {
        results.flat_map(move |item| {
            let mut out = Vec::with_capacity(2);
            match item {
                Ok(file) => {
                    if let Err(e) = self.report(file, |f| out.push(Ok(f))) {
                        out.push(Err(e));
                    }
                }
                Err(e) => out.push(Err(e)),
            }
            stream::iter(out)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, MessageKind, Outcome};

    fn failing_record() -> FileRecord {
        let msgs = vec![Message::new(MessageKind::Error, "Stray end tag “div”.").at(1, 1)];
        FileRecord::buffer("invalid.html", ".", "</div>")
            .with_outcome(Outcome::from_messages(msgs.clone(), msgs))
    }

    fn reporter(throw_errors: bool) -> Reporter<MemoryConsole> {
        Reporter::new(
            ReporterOptions {
                max_message_len: None,
                throw_errors,
            },
            MemoryConsole::new(),
            Palette::plain(),
        )
    }

    #[test]
    fn test_record_without_outcome_is_silent() {
        let r = reporter(true);
        let mut emitted = Vec::new();
        let res = r.report(FileRecord::buffer("a.html", ".", "<p>"), |f| emitted.push(f));
        assert!(res.is_ok());
        assert_eq!(emitted.len(), 1);
        assert!(r.console().lines().is_empty());
    }

    #[test]
    fn test_throw_errors_raises_after_emission() {
        let r = reporter(true);
        let mut emitted = Vec::new();
        let err = r.report(failing_record(), |f| emitted.push(f)).unwrap_err();
        assert_eq!(emitted.len(), 1);
        assert_eq!(err.plugin, "w3c-html-validator");
        assert!(err.message.contains("validation failed"));
        assert_eq!(
            r.console().lines(),
            vec![
                "invalid.html ✘ fail (1 message)",
                "HTML Error: invalid.html Line 1, Column 1: Stray end tag “div”.",
                "</div>",
            ]
        );
    }

    #[test]
    fn test_failure_without_throw_errors_is_reported_only() {
        let r = reporter(false);
        let mut emitted = 0;
        assert!(r.report(failing_record(), |_| emitted += 1).is_ok());
        assert_eq!(emitted, 1);
        assert_eq!(r.console().lines().len(), 3);
    }

    #[tokio::test]
    async fn test_stream_yields_record_then_error() {
        let r = reporter(true);
        let passed = FileRecord::buffer("ok.html", ".", "<p>")
            .with_outcome(Outcome::from_messages(vec![], vec![]));
        let input = stream::iter(vec![
            Ok(passed),
            Ok(failing_record()),
            Err(PluginError::streaming_not_supported()),
        ]);
        let out: Vec<_> = r.report_stream(input).collect().await;
        assert_eq!(out.len(), 4);
        assert!(out[0].is_ok());
        assert_eq!(
            out[1].as_ref().map(|f| f.display_relative()),
            Ok("invalid.html".to_string())
        );
        assert_eq!(out[2], Err(PluginError::validation_failed()));
        assert_eq!(out[3], Err(PluginError::streaming_not_supported()));
    }
}
