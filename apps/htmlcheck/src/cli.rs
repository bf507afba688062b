//! CLI argument parsing via `clap`.

use crate::config::Overrides;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "htmlcheck",
    version,
    about = "Validate HTML files with an external conformance checker",
    long_about = "htmlcheck: run HTML files through the Nu HTML Checker (or any checker speaking its JSON format) and report the findings.\n\nConfiguration precedence: CLI > htmlcheck.toml > defaults.",
    after_help = "Examples:\n  htmlcheck check 'dist/**/*.html'\n  htmlcheck check site/index.html --skip-warnings --throw-errors\n  htmlcheck check 'dist/*.html' --output json --validator 'java -jar vnu.jar --format json --stdout -'",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable debug logging (RUST_LOG overrides)")]
    pub verbose: bool,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current htmlcheck version.")]
    Version,
    /// Validate files and report the findings
    #[command(
        about = "Validate HTML files",
        long_about = "Validate every file matched by the given patterns and print the checker's messages. With --throw-errors the run exits non-zero when any file fails.",
        after_help = "Examples:\n  htmlcheck check 'dist/**/*.html'\n  htmlcheck check index.html --ignore '^Trailing slash'"
    )]
    Check {
        #[arg(help = "Files or glob patterns, relative to the root", required = true)]
        patterns: Vec<String>,
        #[arg(long, help = "Root directory (default: current dir)")]
        root: Option<String>,
        #[arg(long, help = "Checker endpoint, exported as HTML_VALIDATOR_URL (read by wrapper commands, not by vnu itself)")]
        url: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Drop informational messages before deciding success")]
        skip_warnings: bool,
        #[arg(long = "ignore", value_name = "REGEX", help = "Drop messages whose text matches (repeatable)")]
        ignore: Vec<String>,
        #[arg(long, help = "Truncate message text in report lines")]
        max_message_len: Option<usize>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Exit non-zero if any file fails validation")]
        throw_errors: bool,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Maximum concurrent checker calls (default: 4)")]
        concurrency: Option<usize>,
        #[arg(long, help = "Checker command line (default: vnu --format json --stdout -)")]
        validator: Option<String>,
    },
}

impl Commands {
    /// Overrides for config resolution; unset flags stay `None`.
    pub fn overrides(&self) -> Option<Overrides> {
        match self {
            Commands::Version => None,
            Commands::Check {
                patterns: _,
                root,
                url,
                skip_warnings,
                ignore,
                max_message_len,
                throw_errors,
                output,
                concurrency,
                validator,
            } => Some(Overrides {
                root: root.clone(),
                output: output.clone(),
                url: url.clone(),
                skip_warnings: skip_warnings.then_some(true),
                ignore_messages: ignore.clone(),
                max_message_len: *max_message_len,
                throw_errors: throw_errors.then_some(true),
                concurrency: *concurrency,
                validator: validator.clone(),
            }),
        }
    }
}
