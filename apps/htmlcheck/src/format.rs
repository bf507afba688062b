//! Console formatting for checker messages.
//!
//! Each message becomes a summary line (label, file, location, text) and,
//! when the reported line still exists in the file, an excerpt with the
//! offending character highlighted.
//!
//! Excerpt windowing:
//! - The excerpt never exceeds `EXCERPT_WIDTH` characters.
//! - When the column lies past `EXCERPT_WIDTH`, the line is re-windowed to
//!   start `EXCERPT_LEAD` characters before it, so the highlighted character
//!   lands at column `EXCERPT_LEAD`.
//! - Columns are 1-based character positions. Column 0, or a column past
//!   the end of the excerpt, highlights nothing.
//!
//! Every function here is pure: the same message and text always produce
//! the same lines.

use crate::models::{FileRecord, Message, MessageKind, Outcome};
use owo_colors::OwoColorize;
use regex::Regex;
use std::sync::OnceLock;

pub const EXCERPT_WIDTH: usize = 60;
pub const EXCERPT_LEAD: usize = 50;

fn line_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r\n|\r|\n").expect("valid line-break pattern"))
}

/// Split text into physical lines on `\r\n`, `\r`, or `\n`.
pub fn split_lines(text: &str) -> Vec<&str> {
    line_break().split(text).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Display category of a message.
pub enum Label {
    Error,
    Warning,
    Comment,
}

impl Label {
    pub fn for_message(message: &Message) -> Self {
        match &message.kind {
            MessageKind::Error => Label::Error,
            MessageKind::Info if message.sub_type.as_deref() == Some("warning") => Label::Warning,
            MessageKind::Info => Label::Comment,
            MessageKind::Other(_) => Label::Warning,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Label::Error => "HTML Error:",
            Label::Warning => "HTML Warning:",
            Label::Comment => "HTML Comment:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether ANSI styling is applied.
pub struct Palette {
    pub color: bool,
}

impl Palette {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    fn label(&self, label: Label) -> String {
        let t = label.text();
        if !self.color {
            return t.to_string();
        }
        match label {
            Label::Error => t.red().bold().to_string(),
            Label::Warning => t.yellow().bold().to_string(),
            Label::Comment => t.green().bold().to_string(),
        }
    }

    fn muted(&self, s: &str) -> String {
        if self.color && !s.is_empty() {
            s.bright_black().to_string()
        } else {
            s.to_string()
        }
    }

    fn alert(&self, s: &str) -> String {
        if self.color {
            s.red().bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn strong(&self, s: &str) -> String {
        if self.color {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn pass(&self, s: &str) -> String {
        if self.color {
            s.green().bold().to_string()
        } else {
            s.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Console lines for one message.
pub struct FormattedMessage {
    pub summary: String,
    pub excerpt: Option<String>,
}

impl FormattedMessage {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.summary.as_str()).chain(self.excerpt.as_deref())
    }
}

/// `Line <line>, Column <column>:` with missing values shown as 0.
pub fn location(message: &Message) -> String {
    format!(
        "Line {}, Column {}:",
        message.last_line.unwrap_or(0),
        message.last_column.unwrap_or(0)
    )
}

/// Cut `text` to at most `max` characters.
pub fn truncate_chars(text: &str, max: Option<usize>) -> &str {
    match max.and_then(|m| text.char_indices().nth(m)) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Highlight the 1-based `column` of `line` inside a fixed-width window.
pub fn highlight(line: &str, column: usize, palette: Palette) -> String {
    let mut chars: Vec<char> = line.chars().collect();
    let mut col = column;
    if col > EXCERPT_WIDTH {
        let start = (col - EXCERPT_LEAD).min(chars.len());
        chars.drain(..start);
        col = EXCERPT_LEAD;
    }
    chars.truncate(EXCERPT_WIDTH);
    if col == 0 || col > chars.len() {
        let whole: String = chars.into_iter().collect();
        return palette.muted(&whole);
    }
    let before: String = chars[..col - 1].iter().collect();
    let target: String = chars[col - 1].to_string();
    let after: String = chars[col..].iter().collect();
    format!(
        "{}{}{}",
        palette.muted(&before),
        palette.alert(&target),
        palette.muted(&after)
    )
}

/// Format one message against the file's physical lines.
pub fn format_message(
    file_label: &str,
    message: &Message,
    lines: &[&str],
    max_message_len: Option<usize>,
    palette: Palette,
) -> FormattedMessage {
    let label = palette.label(Label::for_message(message));
    let text = truncate_chars(&message.text, max_message_len);
    let summary = if message.has_position() {
        format!("{} {} {} {}", label, file_label, location(message), text)
    } else {
        format!("{} {} {}", label, file_label, text)
    };
    // A missing line means the file changed since validation or the checker
    // gave no position.
    let excerpt = message
        .last_line
        .and_then(|n| n.checked_sub(1))
        .and_then(|idx| lines.get(idx))
        .map(|l| highlight(l, message.last_column.unwrap_or(0), palette))
        // Empty lines, and windows that start past the end of a short line.
        .filter(|e| !e.is_empty());
    FormattedMessage { summary, excerpt }
}

/// Line printed instead of per-message output when the checker could not run.
pub fn format_unavailable(file_label: &str, palette: Palette) -> String {
    format!(
        "{} Failed to run validation on {}",
        palette.label(Label::Warning),
        file_label
    )
}

/// Header line: `<path> ✔ pass` or `<path> ✘ fail (<n> messages)`.
pub fn format_header(title: &str, outcome: &Outcome, palette: Palette) -> String {
    if outcome.success {
        return format!("{} {}", palette.strong(title), palette.pass("✔ pass"));
    }
    let n = outcome.message_count();
    let noun = if n == 1 { "message" } else { "messages" };
    format!(
        "{} {}",
        palette.strong(title),
        palette.alert(&format!("✘ fail ({} {})", n, noun))
    )
}

/// All console lines for one annotated record.
pub fn format_outcome(
    file: &FileRecord,
    outcome: &Outcome,
    max_message_len: Option<usize>,
    palette: Palette,
) -> Vec<String> {
    let rel = file.display_relative();
    let messages = match outcome.messages.as_ref() {
        Some(m) => m,
        None => return vec![format_unavailable(&rel, palette)],
    };
    let title = file.path.to_string_lossy();
    let mut out = vec![format_header(&title, outcome, palette)];
    let text = file.text().unwrap_or_default();
    let lines = split_lines(&text);
    for m in messages {
        let f = format_message(&rel, m, &lines, max_message_len, palette);
        out.extend(f.lines().map(str::to_string));
    }
    out
}
