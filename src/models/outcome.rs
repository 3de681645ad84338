//! Outcome and status classification
//!
//! Normalizes raw check results into a display string and a coarse status.

use serde::{Serialize, Serializer};
use std::fmt;

/// Raw result of evaluating one check against one response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Boolean check held
    Pass,
    /// Boolean check did not hold
    Fail,
    /// Pattern matched; captured groups in match order (may be empty)
    Match(Vec<String>),
    /// No result: the value the check looked at was absent
    Missing,
    /// A failure captured anywhere in open/run/evaluate
    Error { kind: String, message: String },
    /// Anything else, carried as its string form
    Value(String),
}

impl Outcome {
    /// Short display string for a matrix cell
    pub fn display(&self) -> String {
        match self {
            Outcome::Pass => "\u{2713}".to_string(),
            Outcome::Match(captures) if captures.is_empty() => "\u{2713}".to_string(),
            Outcome::Match(captures) => captures.join(" "),
            Outcome::Fail => "\u{2717}".to_string(),
            Outcome::Missing => "nil".to_string(),
            Outcome::Error { kind, message } => format!("{kind}: {message}"),
            Outcome::Value(value) => value.clone(),
        }
    }

    /// Default status when no custom status is attached
    pub fn status(&self) -> Status {
        match self {
            Outcome::Pass | Outcome::Match(_) | Outcome::Value(_) => Status::Ok,
            Outcome::Fail | Outcome::Missing => Status::Error,
            Outcome::Error { .. } => Status::Exception,
        }
    }
}

/// Coarse health classification attached to every result entry
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
    Exception,
    Custom(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Ok => "ok",
            Status::Error => "error",
            Status::Exception => "exception",
            Status::Custom(value) => value,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One check evaluation: the raw outcome plus an optional custom status
/// attached by the check itself
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub outcome: Outcome,
    pub custom_status: Option<String>,
}

impl Evaluation {
    pub fn of(outcome: Outcome) -> Self {
        Self {
            outcome,
            custom_status: None,
        }
    }

    pub fn with_status(outcome: Outcome, status: impl Into<String>) -> Self {
        Self {
            outcome,
            custom_status: Some(status.into()),
        }
    }

    /// Collapse into the (display, status) pair used by the matrix.
    /// A custom status wins over the outcome's own classification; the
    /// display string always comes from the outcome.
    pub fn classify(&self) -> (String, Status) {
        let status = match &self.custom_status {
            Some(value) => Status::Custom(value.clone()),
            None => self.outcome.status(),
        };
        (self.outcome.display(), status)
    }
}

/// A classified result for one (test, server) cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultEntry {
    pub test_id: usize,
    pub outcome: String,
    pub status: Status,
    pub elapsed_ms: u64,
}

impl ResultEntry {
    pub fn new(test_id: usize, evaluation: Evaluation, elapsed_ms: u64) -> Self {
        let (outcome, status) = evaluation.classify();
        Self {
            test_id,
            outcome,
            status,
            elapsed_ms,
        }
    }

    /// Entry for a failure captured at the request or connection level
    pub fn from_error(
        test_id: usize,
        kind: impl Into<String>,
        message: impl Into<String>,
        elapsed_ms: u64,
    ) -> Self {
        Self::new(
            test_id,
            Evaluation::of(Outcome::Error {
                kind: kind.into(),
                message: message.into(),
            }),
            elapsed_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_formats_to_check_mark() {
        let (display, status) = Evaluation::of(Outcome::Pass).classify();
        assert_eq!(display, "✓");
        assert_eq!(status, Status::Ok);
    }

    #[test]
    fn test_fail_formats_to_cross() {
        let (display, status) = Evaluation::of(Outcome::Fail).classify();
        assert_eq!(display, "✗");
        assert_eq!(status, Status::Error);
    }

    #[test]
    fn test_match_without_captures_is_a_pass() {
        let (display, status) = Evaluation::of(Outcome::Match(Vec::new())).classify();
        assert_eq!(display, "✓");
        assert_eq!(status, Status::Ok);
    }

    #[test]
    fn test_match_captures_join_with_spaces() {
        let outcome = Outcome::Match(vec!["GET".to_string(), "200".to_string()]);
        let (display, status) = Evaluation::of(outcome).classify();
        assert_eq!(display, "GET 200");
        assert_eq!(status, Status::Ok);
    }

    #[test]
    fn test_missing_displays_nil() {
        let (display, status) = Evaluation::of(Outcome::Missing).classify();
        assert_eq!(display, "nil");
        assert_eq!(status, Status::Error);
    }

    #[test]
    fn test_error_displays_kind_and_message() {
        let entry = ResultEntry::from_error(3, "Timeout", "timed out after 1s", 42);
        assert_eq!(entry.outcome, "Timeout: timed out after 1s");
        assert_eq!(entry.status, Status::Exception);
        assert_eq!(entry.elapsed_ms, 42);
    }

    #[test]
    fn test_custom_status_wins_over_outcome() {
        let evaluation = Evaluation::with_status(Outcome::Value("123 ms".to_string()), "warn");
        let (display, status) = evaluation.classify();
        assert_eq!(display, "123 ms");
        assert_eq!(status, Status::Custom("warn".to_string()));
    }

    #[test]
    fn test_raw_value_passes_through() {
        let (display, status) = Evaluation::of(Outcome::Value("5 users".to_string())).classify();
        assert_eq!(display, "5 users");
        assert_eq!(status, Status::Ok);
    }

    #[test]
    fn test_status_serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&Status::Ok).unwrap(), "\"ok\"");
        assert_eq!(
            serde_json::to_string(&Status::Custom("warn".to_string())).unwrap(),
            "\"warn\""
        );
    }
}
