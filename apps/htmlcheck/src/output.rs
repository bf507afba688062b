//! Output mode handling for the binary.
//!
//! `human` (default) streams reporter lines to the console. `json` collects
//! the analyzed records and prints one document with per-file outcomes and a
//! top-level summary.

use crate::format::Palette;
use crate::models::FileRecord;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

pub fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

pub fn palette_for(output: &str) -> Palette {
    Palette::new(use_colors(output))
}

/// Prefix for fatal messages on stderr.
pub fn error_prefix() -> String {
    if std::env::var_os("NO_COLOR").is_none() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

/// Prefix for informational notes on stderr.
pub fn note_prefix() -> String {
    if std::env::var_os("NO_COLOR").is_none() {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

/// Compose the JSON report (pure) for the given records.
pub fn compose_json(records: &[FileRecord]) -> JsonVal {
    let items: Vec<_> = records
        .iter()
        .map(|f| {
            json!({
                "file": f.path.to_string_lossy(),
                "relative": f.display_relative(),
                "outcome": f.outcome(),
            })
        })
        .collect();
    let annotated = || records.iter().filter_map(FileRecord::outcome);
    let summary = json!({
        "files": records.len(),
        "passed": annotated().filter(|o| o.success && o.messages.is_some()).count(),
        "failed": annotated().filter(|o| !o.success).count(),
        "unavailable": annotated().filter(|o| o.messages.is_none()).count(),
        "messages": annotated().map(|o| o.message_count()).sum::<usize>(),
    });
    json!({"results": items, "summary": summary})
}

/// Print the JSON report.
pub fn print_json(records: &[FileRecord]) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(&compose_json(records))?);
    Ok(())
}
