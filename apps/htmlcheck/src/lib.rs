//! htmlcheck core library.
//!
//! Two pipeline stages around an external HTML conformance checker: the
//! analyzer attaches the checker's findings to each file record, and the
//! reporter prints them and can halt the run when a file fails.
//!
//! High-level modules:
//! - `analyzer`: Per-record checker calls, message filtering, outcomes.
//! - `reporter`: Console rendering of outcomes and the fail-the-run switch.
//! - `format`: Message labels, locations, and highlighted excerpts.
//! - `validator`: The checker seam and the process-backed checker.
//! - `config`: Stage options, config discovery, and precedence.
//! - `models`: Messages, outcomes, and file records.
//! - `host`: File collection and the pipeline driver used by the binary.
//! - `output`: JSON report and color handling.
//! - `cli`: CLI argument parsing (binary uses this).
//! - `fakes`: In-memory validators for tests.
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod fakes;
pub mod format;
pub mod host;
pub mod models;
pub mod output;
pub mod reporter;
pub mod validator;

pub use analyzer::{Analyzer, MessageFilter};
pub use config::{AnalyzerOptions, ReporterOptions};
pub use error::{ConfigError, PluginError, ValidatorError, PLUGIN_NAME};
pub use models::{Contents, FileRecord, Message, MessageKind, Outcome};
pub use reporter::{Console, MemoryConsole, Reporter, StdoutConsole};
pub use validator::{CommandValidator, Validator, ValidatorResponse};
