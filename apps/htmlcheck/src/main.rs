//! htmlcheck CLI binary entry point.
//! Resolves configuration, runs the analyzer/reporter pipeline, and maps the
//! result to an exit code.

use clap::Parser;
use htmlcheck::analyzer::Analyzer;
use htmlcheck::cli::{Cli, Commands};
use htmlcheck::config::{self, Effective};
use htmlcheck::host::{self, RunReport};
use htmlcheck::output::{self, error_prefix, note_prefix};
use htmlcheck::reporter::{Reporter, StdoutConsole};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "htmlcheck=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let overrides = cli.cmd.overrides();
    match (cli.cmd, overrides) {
        (Commands::Version, _) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        (Commands::Check { patterns, .. }, Some(ov)) => {
            let eff = match config::resolve_effective(&ov) {
                Ok(eff) => eff,
                Err(e) => {
                    eprintln!("{} {}", error_prefix(), e);
                    return ExitCode::from(2);
                }
            };
            match check(&eff, &patterns).await {
                Ok(report) => finish(&eff, &report),
                Err(e) => {
                    eprintln!("{} {:#}", error_prefix(), e);
                    ExitCode::from(2)
                }
            }
        }
        (Commands::Check { .. }, None) => ExitCode::from(2),
    }
}

async fn check(eff: &Effective, patterns: &[String]) -> anyhow::Result<RunReport> {
    if !eff.config_found && eff.output != "json" {
        eprintln!("{} No htmlcheck.toml found; using defaults.", note_prefix());
    }
    let records = host::collect_records(&eff.root, patterns)?;
    if records.is_empty() {
        anyhow::bail!("no files matched {}", patterns.join(", "));
    }
    let analyzer = Analyzer::new(eff.validator.clone(), eff.analyzer.clone())?;
    if eff.analyzer.url.is_some() && eff.validator.is_stock_checker() {
        tracing::warn!(
            "url is only seen by wrapper commands via {}; `{}` ignores it",
            htmlcheck::validator::ENDPOINT_ENV,
            eff.validator.command_line()
        );
    }
    tracing::debug!(
        validator = %eff.validator.command_line(),
        files = records.len(),
        concurrency = eff.concurrency,
        "starting run"
    );
    let report = if eff.output == "json" {
        let report =
            host::run_analysis(&analyzer, records, eff.concurrency, eff.reporter.throw_errors).await;
        output::print_json(&report.records)?;
        report
    } else {
        let reporter = Reporter::new(eff.reporter, StdoutConsole, output::palette_for(&eff.output));
        host::run_pipeline(&analyzer, &reporter, records, eff.concurrency).await
    };
    Ok(report)
}

/// Surface the run's errors once at the end and pick the exit code.
fn finish(eff: &Effective, report: &RunReport) -> ExitCode {
    if !report.halted() {
        return ExitCode::SUCCESS;
    }
    let mut reasons: Vec<String> = report.errors.iter().map(|e| e.to_string()).collect();
    reasons.sort();
    reasons.dedup();
    for reason in reasons {
        eprintln!("{} {}", error_prefix(), reason);
    }
    if eff.reporter.throw_errors {
        eprintln!(
            "{} {} of {} file(s) failed validation",
            note_prefix(),
            report.failed_files(),
            report.records.len()
        );
    }
    ExitCode::from(1)
}
