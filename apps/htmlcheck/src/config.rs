//! Stage options and configuration discovery.
//!
//! htmlcheck reads `htmlcheck.toml|yaml|yml` from the working root (or the
//! closest ancestor) and merges it with CLI flags into an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `validator`: `vnu --format json --stdout -`
//! - `analyzer.concurrency`: 4
//! - `analyzer.skipWarnings`, `reporter.throwErrors`: false
//! - `reporter.maxMessageLen`: unlimited
//!
//! Overrides precedence: CLI > config file > defaults. Unknown keys are ignored.

use crate::error::ConfigError;
use crate::models::MessageKind;
use crate::validator::CommandValidator;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Caller-supplied message predicate: `(kind, text) -> keep?`.
pub type VerifyMessage = Arc<dyn Fn(&MessageKind, &str) -> bool + Send + Sync>;

pub const DEFAULT_CONCURRENCY: usize = 4;
const CONFIG_NAMES: [&str; 3] = ["htmlcheck.toml", "htmlcheck.yaml", "htmlcheck.yml"];

#[derive(Clone, Default)]
/// Options recognized by the analyzer stage.
pub struct AnalyzerOptions {
    /// Checker endpoint override, forwarded on every call.
    pub url: Option<String>,
    /// Drop `info` messages before success is computed.
    pub skip_warnings: bool,
    pub verify_message: Option<VerifyMessage>,
    /// Regular expressions; matching message texts are dropped.
    pub ignore_messages: Vec<String>,
    /// Not supported; a configured proxy is rejected when the stage is built.
    pub proxy: Option<String>,
}

impl AnalyzerOptions {
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn skip_warnings(mut self, skip: bool) -> Self {
        self.skip_warnings = skip;
        self
    }

    pub fn verify_message<F>(mut self, f: F) -> Self
    where
        F: Fn(&MessageKind, &str) -> bool + Send + Sync + 'static,
    {
        self.verify_message = Some(Arc::new(f));
        self
    }

    pub fn ignore_message(mut self, pattern: impl Into<String>) -> Self {
        self.ignore_messages.push(pattern.into());
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

impl fmt::Debug for AnalyzerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerOptions")
            .field("url", &self.url)
            .field("skip_warnings", &self.skip_warnings)
            .field("verify_message", &self.verify_message.as_ref().map(|_| "<fn>"))
            .field("ignore_messages", &self.ignore_messages)
            .field("proxy", &self.proxy)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Options recognized by the reporter stage.
pub struct ReporterOptions {
    /// Truncate message text in summary lines; `None` keeps it whole.
    pub max_message_len: Option<usize>,
    /// Raise a pipeline error after emitting a record whose validation failed.
    pub throw_errors: bool,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[validator]` section: checker process to run.
pub struct ValidatorCfg {
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[analyzer]` section.
pub struct AnalyzerCfg {
    pub url: Option<String>,
    /// Legacy spelling of `url`.
    pub uri: Option<String>,
    #[serde(rename = "skipWarnings")]
    pub skip_warnings: Option<bool>,
    #[serde(rename = "ignoreMessages", default)]
    pub ignore_messages: Vec<String>,
    pub proxy: Option<String>,
    pub concurrency: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// `[reporter]` section.
pub struct ReporterCfg {
    #[serde(rename = "maxMessageLen")]
    pub max_message_len: Option<usize>,
    #[serde(rename = "throwErrors")]
    pub throw_errors: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `htmlcheck.toml|yaml`.
pub struct FileConfig {
    pub output: Option<String>,
    #[serde(default)]
    pub validator: Option<ValidatorCfg>,
    #[serde(default)]
    pub analyzer: Option<AnalyzerCfg>,
    #[serde(default)]
    pub reporter: Option<ReporterCfg>,
}

#[derive(Debug, Default, Clone)]
/// Values given on the command line; `None`/empty means "not given".
pub struct Overrides {
    pub root: Option<String>,
    pub output: Option<String>,
    pub url: Option<String>,
    pub skip_warnings: Option<bool>,
    pub ignore_messages: Vec<String>,
    pub max_message_len: Option<usize>,
    pub throw_errors: Option<bool>,
    pub concurrency: Option<usize>,
    pub validator: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the binary after applying precedence.
pub struct Effective {
    pub root: PathBuf,
    pub config_found: bool,
    pub output: String,
    pub validator: CommandValidator,
    pub analyzer: AnalyzerOptions,
    pub concurrency: usize,
    pub reporter: ReporterOptions,
}

/// Walk upward from `start` to the directory holding the config file or `.git`.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `FileConfig` from the first config file present under `root`.
pub fn load_config(root: &Path) -> Result<Option<FileConfig>, ConfigError> {
    for name in CONFIG_NAMES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let parsed = if name.ends_with(".toml") {
            toml::from_str::<FileConfig>(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str::<FileConfig>(&s).map_err(|e| e.to_string())
        };
        return parsed
            .map(Some)
            .map_err(|reason| ConfigError::Parse { path, reason });
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI overrides, discovered config, and defaults.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli.root.as_deref().unwrap_or("."));
    let root = detect_root(&start);
    let loaded = load_config(&root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();
    let an = cfg.analyzer.unwrap_or_default();
    let rep = cfg.reporter.unwrap_or_default();

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(ConfigError::InvalidValue {
            key: "output",
            reason: format!("expected human|json, got `{}`", output),
        });
    }

    let validator = match cli.validator.as_deref() {
        Some(line) => CommandValidator::from_command_line(line).ok_or(ConfigError::InvalidValue {
            key: "validator",
            reason: "empty command".into(),
        })?,
        None => match cfg.validator {
            Some(ValidatorCfg {
                command: Some(cmd),
                args,
            }) => CommandValidator::new(cmd, args.unwrap_or_default()),
            _ => CommandValidator::default(),
        },
    };

    let concurrency = cli
        .concurrency
        .or(an.concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY);
    if concurrency == 0 {
        return Err(ConfigError::InvalidValue {
            key: "concurrency",
            reason: "must be at least 1".into(),
        });
    }

    // `uri` is the legacy spelling; `url` wins when both are present.
    let url = cli.url.clone().or(an.url).or(an.uri);
    let mut ignore_messages = an.ignore_messages;
    ignore_messages.extend(cli.ignore_messages.iter().cloned());
    let analyzer = AnalyzerOptions {
        url,
        skip_warnings: cli.skip_warnings.or(an.skip_warnings).unwrap_or(false),
        verify_message: None,
        ignore_messages,
        proxy: an.proxy,
    };

    let reporter = ReporterOptions {
        max_message_len: cli.max_message_len.or(rep.max_message_len),
        throw_errors: cli.throw_errors.or(rep.throw_errors).unwrap_or(false),
    };

    Ok(Effective {
        root,
        config_found,
        output,
        validator,
        analyzer,
        concurrency,
        reporter,
    })
}
