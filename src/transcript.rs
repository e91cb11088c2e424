//! Transcript data model and parsing
//!
//! A transcript file is a JSON document with a top-level `transcript` array
//! whose items are either a plain string (speech), `{"break_sec": n}` (a
//! pause), or `{"repeat": n, "transcript": [...]}` (a repeated
//! sub-sequence). Parsing is an explicit validation step over raw JSON so
//! the shape rules live in one place instead of being implied by dispatch.

use std::path::Path;

use serde_json::Value;

use crate::{Error, Result};

/// One unit of a transcript description
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptNode {
    /// Literal speech text
    Text(String),

    /// A pause of the given duration in seconds
    Break {
        /// Pause length, seconds (non-negative)
        seconds: f64,
    },

    /// A sub-sequence repeated a fixed number of times
    Repeat {
        /// Number of repetitions (zero yields no audio)
        count: u32,
        /// Nodes making up one repetition
        children: Vec<TranscriptNode>,
    },
}

/// A parsed transcript document
#[derive(Debug, Clone)]
pub struct TranscriptFile {
    /// Root node sequence, in document order
    pub transcript: Vec<TranscriptNode>,

    /// Optional display title; informational only, it does not affect the
    /// rendered audio
    pub title: Option<String>,
}

impl TranscriptFile {
    /// Read and parse a transcript file from disk
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transcript`] if the file is not valid JSON, lacks a
    /// top-level `transcript` array, or contains invalid node values.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Transcript(format!("{}: {e}", path.display())))?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| Error::Transcript(format!("{}: {e}", path.display())))?;
        Self::from_json(&value)
    }

    /// Parse a transcript document from raw JSON
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transcript`] if the root is not an object with a
    /// `transcript` array, or if a node carries an invalid value (negative
    /// pause, negative or non-integer repeat count).
    pub fn from_json(value: &Value) -> Result<Self> {
        let items = value
            .get("transcript")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                Error::Transcript("document has no top-level \"transcript\" array".to_string())
            })?;

        Ok(Self {
            transcript: parse_nodes(items)?,
            title: value
                .get("title")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }
}

/// Parse a node sequence, preserving document order
///
/// Unrecognized shapes are skipped with a warning rather than rejected:
/// transcripts come from hand-edited files and an unknown key should not
/// sink the whole document. Recognized shapes with invalid values are hard
/// errors.
fn parse_nodes(items: &[Value]) -> Result<Vec<TranscriptNode>> {
    let mut nodes = Vec::with_capacity(items.len());

    for item in items {
        match item {
            Value::String(text) => nodes.push(TranscriptNode::Text(text.clone())),
            Value::Object(map) => {
                if let Some(raw) = map.get("break_sec") {
                    let seconds = raw.as_f64().ok_or_else(|| {
                        Error::Transcript(format!("break_sec is not a number: {raw}"))
                    })?;
                    if seconds < 0.0 {
                        return Err(Error::Transcript(format!(
                            "break_sec must be non-negative, got {seconds}"
                        )));
                    }
                    nodes.push(TranscriptNode::Break { seconds });
                } else if let Some(raw) = map.get("repeat") {
                    let count = raw.as_u64().ok_or_else(|| {
                        Error::Transcript(format!(
                            "repeat must be a non-negative integer, got {raw}"
                        ))
                    })?;
                    let count = u32::try_from(count).map_err(|_| {
                        Error::Transcript(format!("repeat count too large: {count}"))
                    })?;
                    let children = map
                        .get("transcript")
                        .and_then(Value::as_array)
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    nodes.push(TranscriptNode::Repeat {
                        count,
                        children: parse_nodes(children)?,
                    });
                } else {
                    tracing::warn!(node = %item, "skipping unrecognized transcript node shape");
                }
            }
            other => {
                tracing::warn!(node = %other, "skipping unrecognized transcript node shape");
            }
        }
    }

    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_all_node_shapes() {
        let doc = json!({
            "transcript": [
                "Welcome.",
                { "break_sec": 1.5 },
                { "repeat": 2, "transcript": ["Go.", { "break_sec": 0.5 }] }
            ]
        });

        let parsed = TranscriptFile::from_json(&doc).unwrap();
        assert_eq!(parsed.transcript.len(), 3);
        assert_eq!(
            parsed.transcript[0],
            TranscriptNode::Text("Welcome.".to_string())
        );
        assert_eq!(parsed.transcript[1], TranscriptNode::Break { seconds: 1.5 });

        let TranscriptNode::Repeat { count, children } = &parsed.transcript[2] else {
            panic!("expected repeat node");
        };
        assert_eq!(*count, 2);
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn integer_break_sec_is_accepted() {
        let doc = json!({ "transcript": [{ "break_sec": 2 }] });
        let parsed = TranscriptFile::from_json(&doc).unwrap();
        assert_eq!(parsed.transcript[0], TranscriptNode::Break { seconds: 2.0 });
    }

    #[test]
    fn unknown_shapes_are_skipped() {
        let doc = json!({
            "transcript": ["Hello.", { "volume": 3 }, 42, ["nested"], "Bye."]
        });

        let parsed = TranscriptFile::from_json(&doc).unwrap();
        assert_eq!(parsed.transcript.len(), 2);
        assert_eq!(
            parsed.transcript[1],
            TranscriptNode::Text("Bye.".to_string())
        );
    }

    #[test]
    fn negative_break_is_rejected() {
        let doc = json!({ "transcript": [{ "break_sec": -1 }] });
        assert!(TranscriptFile::from_json(&doc).is_err());
    }

    #[test]
    fn negative_repeat_is_rejected() {
        let doc = json!({ "transcript": [{ "repeat": -2, "transcript": [] }] });
        assert!(TranscriptFile::from_json(&doc).is_err());
    }

    #[test]
    fn repeat_without_children_defaults_to_empty() {
        let doc = json!({ "transcript": [{ "repeat": 3 }] });
        let parsed = TranscriptFile::from_json(&doc).unwrap();
        assert_eq!(
            parsed.transcript[0],
            TranscriptNode::Repeat {
                count: 3,
                children: vec![]
            }
        );
    }

    #[test]
    fn title_is_optional_and_carried_through() {
        let doc = json!({ "title": "Morning session", "transcript": ["Hi."] });
        let parsed = TranscriptFile::from_json(&doc).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Morning session"));

        let doc = json!({ "transcript": ["Hi."] });
        assert_eq!(TranscriptFile::from_json(&doc).unwrap().title, None);
    }

    #[test]
    fn missing_transcript_array_is_an_error() {
        let doc = json!({ "title": "no body" });
        assert!(TranscriptFile::from_json(&doc).is_err());
    }
}
