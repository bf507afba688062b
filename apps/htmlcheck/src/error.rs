//! Error types shared by the stages, the validator, and configuration.

use std::path::PathBuf;

/// Identifier carried by every pipeline error raised by the stages.
pub const PLUGIN_NAME: &str = "w3c-html-validator";

/// Errors raised while resolving stage options. Fatal before any record flows.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("option `{0}` is not supported")]
    UnsupportedOption(&'static str),

    #[error("invalid ignore pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Per-record pipeline signal naming the plugin and a short reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{plugin}] {message}")]
pub struct PluginError {
    pub plugin: &'static str,
    pub message: String,
}

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            plugin: PLUGIN_NAME,
            message: message.into(),
        }
    }

    pub fn streaming_not_supported() -> Self {
        Self::new("Streaming not supported")
    }

    pub fn validation_failed() -> Self {
        Self::new("HTML validation failed")
    }
}

/// Failures talking to the external checker. The analyzer recovers from these.
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error while talking to the checker: {0}")]
    Io(#[from] std::io::Error),

    #[error("checker exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },

    #[error("checker output is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
