//! Shared data models: checker messages, per-file outcomes, and file records.

pub mod record;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use record::{Contents, FileRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
/// Message category as reported by the checker (`type` on the wire).
pub enum MessageKind {
    Error,
    Info,
    /// Anything the checker sends that is not `error` or `info`
    /// (e.g. `non-document-error`).
    Other(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::Error => "error",
            MessageKind::Info => "info",
            MessageKind::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for MessageKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "error" => MessageKind::Error,
            "info" => MessageKind::Info,
            _ => MessageKind::Other(s),
        }
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Other(s) => s,
            k => k.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One diagnostic returned by the checker.
///
/// Example wire object:
/// `{"type":"error","message":"Unclosed element “h1”.","lastLine":8,"firstColumn":4,"lastColumn":7}`
pub struct Message {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Refines `info`; the checker reports warnings as `info` + `warning`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
    #[serde(rename = "message", default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_column: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,
}

impl Message {
    /// Build a message with only kind and text set.
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            sub_type: None,
            text: text.into(),
            last_line: None,
            last_column: None,
            first_column: None,
            extract: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.last_line = Some(line);
        self.last_column = Some(column);
        self
    }

    pub fn with_sub_type(mut self, sub_type: impl Into<String>) -> Self {
        self.sub_type = Some(sub_type.into());
        self
    }

    pub fn is_info(&self) -> bool {
        self.kind == MessageKind::Info
    }

    /// True when the message carries any position information.
    pub fn has_position(&self) -> bool {
        self.last_line.is_some() || self.last_column.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Validation result attached to a file record by the analyzer.
///
/// `messages`/`unfiltered` are `None` when the checker could not be run;
/// such an outcome counts as a success (no remaining messages).
pub struct Outcome {
    pub success: bool,
    pub messages: Option<Vec<Message>>,
    pub unfiltered: Option<Vec<Message>>,
}

impl Outcome {
    /// Outcome from the checker's full message list and the retained subset.
    pub fn from_messages(unfiltered: Vec<Message>, messages: Vec<Message>) -> Self {
        Self {
            success: messages.is_empty(),
            messages: Some(messages),
            unfiltered: Some(unfiltered),
        }
    }

    /// Outcome for a record whose validation could not be run.
    pub fn unavailable() -> Self {
        Self {
            success: true,
            messages: None,
            unfiltered: None,
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.as_ref().map_or(0, Vec::len)
    }

    pub fn unfiltered_count(&self) -> usize {
        self.unfiltered.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_decodes_checker_json() {
        let raw = r#"{"type":"info","subType":"warning","message":"Consider adding a lang attribute.","lastLine":2,"lastColumn":6,"firstColumn":1,"extract":"<html>"}"#;
        let m: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(m.kind, MessageKind::Info);
        assert_eq!(m.sub_type.as_deref(), Some("warning"));
        assert_eq!(m.last_line, Some(2));
        assert_eq!(m.last_column, Some(6));
        assert!(m.has_position());
    }

    #[test]
    fn test_unknown_kind_is_kept_verbatim() {
        let m: Message =
            serde_json::from_str(r#"{"type":"non-document-error","message":"IO"}"#).unwrap();
        assert_eq!(m.kind, MessageKind::Other("non-document-error".into()));
        assert!(!m.has_position());
        let back = serde_json::to_value(&m).unwrap();
        assert_eq!(back["type"], "non-document-error");
    }

    #[test]
    fn test_outcome_success_tracks_filtered_messages() {
        let all = vec![
            Message::new(MessageKind::Info, "note"),
            Message::new(MessageKind::Error, "bad"),
        ];
        let o = Outcome::from_messages(all.clone(), vec![]);
        assert!(o.success);
        assert_eq!(o.unfiltered_count(), 2);
        let o = Outcome::from_messages(all.clone(), all);
        assert!(!o.success);
        assert_eq!(o.message_count(), 2);
        let u = Outcome::unavailable();
        assert!(u.success);
        assert_eq!(u.message_count(), 0);
    }
}
