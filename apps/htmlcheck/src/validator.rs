//! Seam to the external HTML conformance checker.
//!
//! The stages only see the [`Validator`] trait. [`CommandValidator`] runs a
//! local checker process (the Nu HTML Checker CLI by default) and decodes its
//! JSON report.

use crate::error::ValidatorError;
use crate::models::Message;
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Environment variable used to hand the endpoint override to a checker process.
pub const ENDPOINT_ENV: &str = "HTML_VALIDATOR_URL";

/// Default checker invocation: `vnu --format json --stdout -`.
pub const DEFAULT_COMMAND: &str = "vnu";
pub const DEFAULT_ARGS: [&str; 4] = ["--format", "json", "--stdout", "-"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// Checker report for one document, in checker order.
pub struct ValidatorResponse {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// External validation capability. One call per document.
#[async_trait]
pub trait Validator: Send + Sync {
    /// Validate `html`, optionally against a non-default checker endpoint.
    async fn validate(
        &self,
        html: &str,
        endpoint: Option<&str>,
    ) -> Result<ValidatorResponse, ValidatorError>;
}

#[async_trait]
impl<V: Validator + ?Sized> Validator for std::sync::Arc<V> {
    async fn validate(
        &self,
        html: &str,
        endpoint: Option<&str>,
    ) -> Result<ValidatorResponse, ValidatorError> {
        (**self).validate(html, endpoint).await
    }
}

#[derive(Debug, Clone)]
/// Runs a checker process, writing the document to stdin and reading a JSON
/// report (`{"messages": [...]}`) from stdout.
pub struct CommandValidator {
    program: String,
    args: Vec<String>,
}

impl Default for CommandValidator {
    fn default() -> Self {
        Self::new(
            DEFAULT_COMMAND,
            DEFAULT_ARGS.iter().map(|s| s.to_string()).collect(),
        )
    }
}

impl CommandValidator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse a whitespace-separated command line such as `vnu --format json -`.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    /// True when this runs the stock `vnu` CLI, which ignores [`ENDPOINT_ENV`].
    pub fn is_stock_checker(&self) -> bool {
        Path::new(&self.program)
            .file_stem()
            .is_some_and(|stem| stem == DEFAULT_COMMAND)
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl Validator for CommandValidator {
    async fn validate(
        &self,
        html: &str,
        endpoint: Option<&str>,
    ) -> Result<ValidatorResponse, ValidatorError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(url) = endpoint {
            if self.is_stock_checker() {
                debug!(endpoint = url, "stock checker ignores {}", ENDPOINT_ENV);
            }
            cmd.env(ENDPOINT_ENV, url);
        }
        let mut child = cmd.spawn().map_err(|source| ValidatorError::Spawn {
            command: self.command_line(),
            source,
        })?;

        // Feed stdin while draining stdout so large documents cannot deadlock.
        let mut stdin = child.stdin.take();
        let feed = async move {
            if let Some(pipe) = stdin.as_mut() {
                pipe.write_all(html.as_bytes()).await?;
                pipe.shutdown().await?;
            }
            drop(stdin);
            Ok::<(), std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        // A checker may answer before reading all of stdin; its report wins.
        if let Some(report) = parse_report(&output.stdout) {
            return report;
        }
        match fed {
            Err(e) if e.kind() != ErrorKind::BrokenPipe => return Err(e.into()),
            _ => {}
        }
        // The checker exits non-zero when the document has errors, so the
        // exit status only matters when nothing was reported.
        if output.status.success() {
            Ok(ValidatorResponse::default())
        } else {
            Err(ValidatorError::Exit {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

/// Decode a checker report; `None` when the output is blank.
fn parse_report(stdout: &[u8]) -> Option<Result<ValidatorResponse, ValidatorError>> {
    let text = String::from_utf8_lossy(stdout);
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(&text).map_err(ValidatorError::from))
}
