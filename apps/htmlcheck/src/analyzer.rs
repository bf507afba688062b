//! Analyzer stage: one checker call per non-empty record.
//!
//! The record comes back annotated with an [`Outcome`] holding the filtered
//! messages, the checker's unfiltered list, and `success` (nothing left after
//! filtering). Checker failures are logged and produce an outcome without a
//! message list; they never drop the record.

use crate::config::{AnalyzerOptions, VerifyMessage};
use crate::error::{ConfigError, PluginError};
use crate::models::{FileRecord, Message, Outcome};
use crate::validator::Validator;
use futures::stream::{Stream, StreamExt};
use regex::Regex;
use tracing::{debug, warn};

/// Compiled message filters, applied in checker order.
pub struct MessageFilter {
    skip_warnings: bool,
    verify: Option<VerifyMessage>,
    ignore: Vec<Regex>,
}

impl MessageFilter {
    pub fn from_options(options: &AnalyzerOptions) -> Result<Self, ConfigError> {
        let ignore = options
            .ignore_messages
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| ConfigError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            skip_warnings: options.skip_warnings,
            verify: options.verify_message.clone(),
            ignore,
        })
    }

    pub fn keep(&self, message: &Message) -> bool {
        if self.skip_warnings && message.is_info() {
            return false;
        }
        if self.ignore.iter().any(|re| re.is_match(&message.text)) {
            return false;
        }
        match &self.verify {
            Some(verify) => verify(&message.kind, &message.text),
            None => true,
        }
    }

    pub fn apply(&self, messages: &[Message]) -> Vec<Message> {
        messages.iter().filter(|m| self.keep(m)).cloned().collect()
    }
}

pub struct Analyzer<V> {
    validator: V,
    url: Option<String>,
    filter: MessageFilter,
}

impl<V: Validator> Analyzer<V> {
    /// Build the stage. Unsupported options and bad ignore patterns fail here,
    /// before any record is processed.
    pub fn new(validator: V, options: AnalyzerOptions) -> Result<Self, ConfigError> {
        if options.proxy.is_some() {
            return Err(ConfigError::UnsupportedOption("proxy"));
        }
        let filter = MessageFilter::from_options(&options)?;
        Ok(Self {
            validator,
            url: options.url,
            filter,
        })
    }

    /// Validate one record and hand it back.
    ///
    /// - Null contents: returned unchanged, without an outcome.
    /// - Stream-backed contents: `Streaming not supported`.
    /// - Otherwise: annotated with exactly one outcome.
    pub async fn analyze(&self, mut file: FileRecord) -> Result<FileRecord, PluginError> {
        if file.is_empty() {
            return Ok(file);
        }
        if file.is_stream_backed() {
            return Err(PluginError::streaming_not_supported());
        }
        let outcome = match file.text() {
            Some(html) => {
                debug!(file = %file.path.display(), bytes = html.len(), "validating");
                match self.validator.validate(&html, self.url.as_deref()).await {
                    Ok(resp) => {
                        let kept = self.filter.apply(&resp.messages);
                        Outcome::from_messages(resp.messages, kept)
                    }
                    Err(e) => {
                        warn!(file = %file.path.display(), error = %e, "validation could not be run");
                        Outcome::unavailable()
                    }
                }
            }
            None => Outcome::unavailable(),
        };
        debug!(
            file = %file.path.display(),
            success = outcome.success,
            messages = outcome.message_count(),
            "validated"
        );
        file.attach_outcome(outcome);
        Ok(file)
    }

    /// Run [`Analyzer::analyze`] over a stream of records with up to
    /// `concurrency` checker calls in flight. Results arrive in completion
    /// order, which may differ from input order.
    pub fn analyze_stream<'a, S>(
        &'a self,
        records: S,
        concurrency: usize,
    ) -> impl Stream<Item = Result<FileRecord, PluginError>> + 'a
    where
        S: Stream<Item = FileRecord> + 'a,
    {
        records
            .map(move |file| self.analyze(file))
            .buffer_unordered(concurrency.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FailingValidator, StaticValidator};
    use crate::models::{Contents, MessageKind};
    use std::sync::Arc;

    const VALID: &str = "<!doctype html><html lang=en><title>ok</title></html>";
    const INVALID: &str = "<!doctype html>\n<html lang=en>\n<body>\n   <h1>Specification\n</body>\n</html>";

    fn invalid_messages() -> Vec<Message> {
        vec![
            Message::new(MessageKind::Info, "Trailing slash on void elements has no effect.").at(2, 14),
            Message::new(MessageKind::Error, "Unclosed element “h1”.").at(4, 7),
        ]
    }

    fn validator() -> StaticValidator {
        StaticValidator::new()
            .answer(VALID, vec![])
            .answer(INVALID, invalid_messages())
    }

    #[tokio::test]
    async fn test_valid_file_passes() {
        let an = Analyzer::new(validator(), AnalyzerOptions::default()).unwrap();
        let f = an
            .analyze(FileRecord::buffer("site/valid.html", "site", VALID))
            .await
            .unwrap();
        let o = f.outcome().unwrap();
        assert!(o.success);
        assert_eq!(o.messages.as_deref(), Some(&[][..]));
        assert_eq!(o.unfiltered_count(), 0);
        assert_eq!(f.display_relative(), "valid.html");
    }

    #[tokio::test]
    async fn test_invalid_file_keeps_checker_order() {
        let an = Analyzer::new(validator(), AnalyzerOptions::default()).unwrap();
        let f = an
            .analyze(FileRecord::buffer("site/invalid.html", "site", INVALID))
            .await
            .unwrap();
        let o = f.outcome().unwrap();
        assert!(!o.success);
        let kinds: Vec<_> = o.messages.as_ref().unwrap().iter().map(|m| m.kind.clone()).collect();
        assert_eq!(kinds, vec![MessageKind::Info, MessageKind::Error]);
        assert_eq!(o.unfiltered_count(), 2);
    }

    #[tokio::test]
    async fn test_verify_and_skip_warnings_leave_unfiltered_intact() {
        let opts = AnalyzerOptions::default()
            .skip_warnings(true)
            .verify_message(|_, text| !text.starts_with("Unclosed element"));
        let an = Analyzer::new(validator(), opts).unwrap();
        let f = an
            .analyze(FileRecord::buffer("invalid.html", ".", INVALID))
            .await
            .unwrap();
        let o = f.outcome().unwrap();
        assert_eq!(o.message_count(), 0);
        assert!(o.success);
        assert_eq!(o.unfiltered_count(), 2);
    }

    #[tokio::test]
    async fn test_skip_warnings_only_drops_info() {
        let an = Analyzer::new(validator(), AnalyzerOptions::default().skip_warnings(true)).unwrap();
        let f = an
            .analyze(FileRecord::buffer("invalid.html", ".", INVALID))
            .await
            .unwrap();
        let o = f.outcome().unwrap();
        let msgs = o.messages.as_ref().unwrap();
        assert!(msgs.iter().all(|m| !m.is_info()));
        assert_eq!(msgs.len(), 1);
        assert!(o.unfiltered.as_ref().unwrap().iter().any(|m| m.is_info()));
        assert!(o.unfiltered_count() >= o.message_count());
    }

    #[tokio::test]
    async fn test_ignore_patterns_filter_by_text() {
        let opts = AnalyzerOptions::default().ignore_message("^Unclosed element");
        let an = Analyzer::new(validator(), opts).unwrap();
        let f = an
            .analyze(FileRecord::buffer("invalid.html", ".", INVALID))
            .await
            .unwrap();
        let o = f.outcome().unwrap();
        assert_eq!(o.message_count(), 1);
        assert!(!o.success);
    }

    #[tokio::test]
    async fn test_null_record_passes_unannotated() {
        let v = Arc::new(validator());
        let an = Analyzer::new(Arc::clone(&v), AnalyzerOptions::default()).unwrap();
        let f = an
            .analyze(FileRecord::new("dir", ".", Contents::Null))
            .await
            .unwrap();
        assert!(f.outcome().is_none());
        assert_eq!(f.contents, Contents::Null);
        assert!(v.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stream_record_is_rejected() {
        let an = Analyzer::new(validator(), AnalyzerOptions::default()).unwrap();
        let err = an
            .analyze(FileRecord::new("s.html", ".", Contents::Stream))
            .await
            .unwrap_err();
        assert_eq!(err, PluginError::streaming_not_supported());
    }

    #[tokio::test]
    async fn test_checker_failure_is_soft() {
        let an = Analyzer::new(FailingValidator, AnalyzerOptions::default()).unwrap();
        let f = an
            .analyze(FileRecord::buffer("a.html", ".", VALID))
            .await
            .unwrap();
        let o = f.outcome().unwrap();
        assert!(o.success);
        assert!(o.messages.is_none());
        assert!(o.unfiltered.is_none());
    }

    #[tokio::test]
    async fn test_url_is_forwarded() {
        let v = Arc::new(validator());
        let an = Analyzer::new(
            Arc::clone(&v),
            AnalyzerOptions::default().url("http://localhost:8888/"),
        )
        .unwrap();
        an.analyze(FileRecord::buffer("a.html", ".", VALID)).await.unwrap();
        assert_eq!(
            v.calls(),
            vec![(VALID.to_string(), Some("http://localhost:8888/".to_string()))]
        );
    }

    #[test]
    fn test_setup_errors_fail_fast() {
        assert!(matches!(
            Analyzer::new(validator(), AnalyzerOptions::default().proxy("http://proxy:3128")),
            Err(ConfigError::UnsupportedOption("proxy"))
        ));
        assert!(matches!(
            Analyzer::new(validator(), AnalyzerOptions::default().ignore_message("(")),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[tokio::test]
    async fn test_stream_emits_each_record_once() {
        let an = Analyzer::new(validator(), AnalyzerOptions::default()).unwrap();
        let input = futures::stream::iter(vec![
            FileRecord::buffer("valid.html", ".", VALID),
            FileRecord::new("empty.html", ".", Contents::Null),
            FileRecord::new("live.html", ".", Contents::Stream),
            FileRecord::buffer("invalid.html", ".", INVALID),
        ]);
        let results: Vec<_> = an.analyze_stream(input, 2).collect().await;
        assert_eq!(results.len(), 4);
        let errors = results.iter().filter(|r| r.is_err()).count();
        assert_eq!(errors, 1);
        let annotated = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .filter(|f| f.outcome().is_some())
            .count();
        assert_eq!(annotated, 2);
    }
}
