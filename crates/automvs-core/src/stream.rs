//! Output streams of the supervised emulator and the lines read from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the two text streams produced by the emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    /// Console and log output (stdout)
    Primary,
    /// Diagnostic and performance chatter (stderr)
    Diagnostic,
}

impl StreamKind {
    /// Short lowercase name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Primary => "primary",
            StreamKind::Diagnostic => "diagnostic",
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single decoded line of emulator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    /// Stream the line was read from
    pub stream: StreamKind,
    /// Arrival order within the stream, starting at 0 for each process
    pub seq: u64,
    /// Line text without the line terminator
    pub text: String,
    /// Time the reader received the line
    pub received_at: DateTime<Utc>,
}

impl OutputLine {
    /// Create a line stamped with the current time.
    pub fn new(stream: StreamKind, seq: u64, text: impl Into<String>) -> Self {
        Self {
            stream,
            seq,
            text: text.into(),
            received_at: Utc::now(),
        }
    }

    /// Return the first target contained in this line, in target order.
    pub fn find_match<'t, S: AsRef<str>>(&self, targets: &'t [S]) -> Option<&'t str> {
        targets
            .iter()
            .map(|target| target.as_ref())
            .find(|target| self.text.contains(*target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_kind_display() {
        assert_eq!(StreamKind::Primary.to_string(), "primary");
        assert_eq!(StreamKind::Diagnostic.to_string(), "diagnostic");
    }

    #[test]
    fn test_find_match_is_substring_containment() {
        let line = OutputLine::new(StreamKind::Primary, 0, "bar baz");
        assert_eq!(line.find_match(&["baz"]), Some("baz"));
        assert_eq!(line.find_match(&["bar baz qux"]), None);
    }

    #[test]
    fn test_find_match_is_case_sensitive() {
        let line = OutputLine::new(StreamKind::Primary, 0, "IKT005I TCAS IS INITIALIZED");
        assert_eq!(line.find_match(&["tcas is initialized"]), None);
    }

    #[test]
    fn test_find_match_returns_first_target_in_order() {
        let line = OutputLine::new(StreamKind::Diagnostic, 3, "HHC01603I quit done");
        let targets = vec!["done".to_string(), "quit".to_string()];
        assert_eq!(line.find_match(&targets), Some("done"));
    }

    #[test]
    fn test_output_line_serialization() {
        let line = OutputLine::new(StreamKind::Diagnostic, 7, "HHC00100I thread started");
        let json = serde_json::to_string(&line).unwrap();
        assert!(json.contains("\"stream\":\"diagnostic\""));

        let back: OutputLine = serde_json::from_str(&json).unwrap();
        assert_eq!(back, line);
    }
}
