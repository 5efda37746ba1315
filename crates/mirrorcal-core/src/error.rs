//! Error types for per-event failures.
//!
//! A single corrupt event must never take down a whole view. Batch operations
//! collect failures as [`EventDiagnostic`] values next to their results instead
//! of returning early.

use std::fmt;

use thiserror::Error;

/// The category of an [`EventError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventErrorKind {
    /// No usable event component, or no start time.
    MalformedEvent,
    /// A referenced event could not be retrieved.
    FetchError,
    /// The recurrence rule could not be parsed or expanded.
    RecurrenceRuleError,
}

impl EventErrorKind {
    /// Returns a stable name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedEvent => "malformed_event",
            Self::FetchError => "fetch_error",
            Self::RecurrenceRuleError => "recurrence_rule_error",
        }
    }
}

impl fmt::Display for EventErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure tied to one calendar event.
#[derive(Debug, Error)]
pub enum EventError {
    /// The raw event has no extractable component or start time.
    #[error("malformed event: {reason}")]
    Malformed {
        /// What was missing or unparsable.
        reason: String,
    },

    /// The event reference could not be fetched.
    #[error("failed to fetch event from {locator}: {message}")]
    Fetch {
        /// The locator that was requested.
        locator: String,
        /// A human-readable description of the failure.
        message: String,
        /// The underlying transport error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The recurrence rule failed to parse or expand.
    #[error("invalid recurrence rule {rule:?}: {message}")]
    RecurrenceRule {
        /// The rule text as found on the event.
        rule: String,
        /// The parser's complaint.
        message: String,
    },
}

impl EventError {
    /// Creates a malformed-event error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Creates a fetch error without an underlying source.
    pub fn fetch(locator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            locator: locator.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a recurrence-rule error.
    pub fn recurrence_rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecurrenceRule {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> EventErrorKind {
        match self {
            Self::Malformed { .. } => EventErrorKind::MalformedEvent,
            Self::Fetch { .. } => EventErrorKind::FetchError,
            Self::RecurrenceRule { .. } => EventErrorKind::RecurrenceRuleError,
        }
    }
}

/// A skipped event in a batch operation.
#[derive(Debug)]
pub struct EventDiagnostic {
    /// Position of the event in the batch input.
    pub index: usize,
    /// Summary of the event, when it got far enough to have one.
    pub summary: Option<String>,
    /// Why the event was skipped.
    pub error: EventError,
}

impl EventDiagnostic {
    /// Creates a diagnostic for the event at `index`.
    pub fn new(index: usize, error: EventError) -> Self {
        Self {
            index,
            summary: None,
            error,
        }
    }

    /// Builder method to attach the event summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Returns the category of the underlying error.
    pub fn kind(&self) -> EventErrorKind {
        self.error.kind()
    }
}

impl fmt::Display for EventDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event #{}", self.index)?;
        if let Some(ref summary) = self.summary {
            write!(f, " ({})", summary)?;
        }
        write!(f, ": {}", self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(EventErrorKind::MalformedEvent.as_str(), "malformed_event");
        assert_eq!(EventErrorKind::FetchError.as_str(), "fetch_error");
        assert_eq!(
            EventErrorKind::RecurrenceRuleError.to_string(),
            "recurrence_rule_error"
        );
    }

    #[test]
    fn constructors_map_to_kinds() {
        assert_eq!(
            EventError::malformed("no DTSTART").kind(),
            EventErrorKind::MalformedEvent
        );
        assert_eq!(
            EventError::fetch("https://example.com/a.ics", "timeout").kind(),
            EventErrorKind::FetchError
        );
        assert_eq!(
            EventError::recurrence_rule("FREQ=NOPE", "unknown frequency").kind(),
            EventErrorKind::RecurrenceRuleError
        );
    }

    #[test]
    fn error_display() {
        let err = EventError::malformed("no DTSTART");
        assert_eq!(err.to_string(), "malformed event: no DTSTART");

        let err = EventError::recurrence_rule("FREQ=NOPE", "unknown frequency");
        assert!(err.to_string().contains("\"FREQ=NOPE\""));
    }

    #[test]
    fn fetch_error_keeps_source() {
        use std::error::Error;
        let err = EventError::Fetch {
            locator: "https://example.com/a.ics".to_string(),
            message: "connection refused".to_string(),
            source: Some(Box::new(std::io::Error::other("refused"))),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn diagnostic_display() {
        let diag = EventDiagnostic::new(3, EventError::malformed("no DTSTART")).with_summary("Lunch");
        assert_eq!(diag.to_string(), "event #3 (Lunch): malformed event: no DTSTART");
        assert_eq!(diag.kind(), EventErrorKind::MalformedEvent);
    }
}
