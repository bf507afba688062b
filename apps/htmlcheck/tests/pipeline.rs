use std::sync::Arc;

use htmlcheck::fakes::StaticValidator;
use htmlcheck::format::Palette;
use htmlcheck::host::{run_analysis, run_pipeline};
use htmlcheck::{
    Analyzer, AnalyzerOptions, Contents, FileRecord, MemoryConsole, Message, MessageKind,
    PluginError, Reporter, ReporterOptions,
};

const VALID: &str = "<!doctype html>\n<html lang=en>\n<title>Valid</title>\n<p>Hello</p>\n</html>\n";
const INVALID: &str = "<!doctype html>\n<html lang=en>\n<title>Invalid</title>\n<body>\n   <h1>Specification\n</body>\n</html>\n";

fn checker() -> StaticValidator {
    StaticValidator::new().answer(VALID, vec![]).answer(
        INVALID,
        vec![
            Message::new(MessageKind::Info, "Trailing slash on void elements has no effect.")
                .with_sub_type("warning")
                .at(2, 14),
            Message::new(MessageKind::Error, "Unclosed element “h1”.").at(5, 7),
        ],
    )
}

fn records() -> Vec<FileRecord> {
    vec![
        FileRecord::buffer("site/valid.html", "site", VALID),
        FileRecord::buffer("site/invalid.html", "site", INVALID),
    ]
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

#[tokio::test]
async fn analyzer_then_reporter_prints_every_message() {
    let analyzer = Analyzer::new(checker(), AnalyzerOptions::default()).unwrap();
    let reporter = reporter(false);
    let report = run_pipeline(&analyzer, &reporter, records(), 1).await;

    assert!(!report.halted());
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.failed_files(), 1);
    let lines = reporter.console().lines();
    assert_eq!(
        lines,
        vec![
            "site/valid.html ✔ pass",
            "site/invalid.html ✘ fail (2 messages)",
            "HTML Warning: invalid.html Line 2, Column 14: Trailing slash on void elements has no effect.",
            "<html lang=en>",
            "HTML Error: invalid.html Line 5, Column 7: Unclosed element “h1”.",
            "   <h1>Specification",
        ]
    );
}

#[tokio::test]
async fn throw_errors_halts_after_the_failing_record() {
    let analyzer = Analyzer::new(checker(), AnalyzerOptions::default()).unwrap();
    let reporter = reporter(true);
    let report = run_pipeline(&analyzer, &reporter, records(), 1).await;

    assert!(report.halted());
    assert_eq!(report.errors, vec![PluginError::validation_failed()]);
    // both records still left the pipeline
    assert_eq!(report.records.len(), 2);
}

#[tokio::test]
async fn filters_can_turn_a_failure_into_a_pass() {
    let opts = AnalyzerOptions::default()
        .skip_warnings(true)
        .verify_message(|kind, text| {
            !(*kind == MessageKind::Error && text.starts_with("Unclosed element"))
        });
    let analyzer = Analyzer::new(checker(), opts).unwrap();
    let report = run_analysis(&analyzer, records(), 2, true).await;

    assert!(!report.halted());
    for rec in &report.records {
        let o = rec.outcome().unwrap();
        assert!(o.success);
        assert_eq!(o.message_count(), 0);
        assert!(o.unfiltered_count() >= o.message_count());
    }
    let invalid = report
        .records
        .iter()
        .find(|r| r.display_relative() == "invalid.html")
        .unwrap();
    assert_eq!(invalid.outcome().unwrap().unfiltered_count(), 2);
}

#[tokio::test]
async fn mixed_inputs_each_leave_once() {
    let v = Arc::new(checker());
    let analyzer = Analyzer::new(Arc::clone(&v), AnalyzerOptions::default()).unwrap();
    let reporter = reporter(false);
    let mut input = records();
    input.push(FileRecord::new("site", ".", Contents::Null));
    input.push(FileRecord::new("site/live.html", "site", Contents::Stream));
    let report = run_pipeline(&analyzer, &reporter, input, 4).await;

    assert_eq!(report.records.len(), 3);
    assert_eq!(report.errors, vec![PluginError::streaming_not_supported()]);
    assert_eq!(v.calls().len(), 2);
    let null = report.records.iter().find(|r| r.is_empty()).unwrap();
    assert!(null.outcome().is_none());
}
