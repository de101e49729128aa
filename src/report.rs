//! Failure-reporting sinks.
//!
//! Stub operations that fail report a `mocka: <error>` message here and also
//! return the error. A reporter must not panic; collecting or printing is
//! its whole job.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::config::Config;
use crate::logger::{EventType, Journal, LogEntry, Severity};

/// Receives failure messages from stubs and sandboxes.
pub trait Reporter: Send + Sync {
    fn report_failure(&self, message: &str);
}

/// Collects messages in memory for later assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.messages.lock().is_empty()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }

    /// Panics with every collected message when anything was reported.
    #[track_caller]
    pub fn assert_no_failures(&self) {
        let messages = self.messages.lock();
        assert!(
            messages.is_empty(),
            "unexpected stub failures:\n{}",
            messages.join("\n")
        );
    }
}

impl Reporter for RecordingReporter {
    fn report_failure(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

/// Prints `[MOCKA] <message>` to stderr, optionally forwarding.
#[derive(Default)]
pub struct StderrReporter {
    forward: Option<Arc<dyn Reporter>>,
}

impl StderrReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn forwarding(inner: Arc<dyn Reporter>) -> Self {
        Self {
            forward: Some(inner),
        }
    }
}

impl Reporter for StderrReporter {
    fn report_failure(&self, message: &str) {
        let _ = writeln!(io::stderr(), "[MOCKA] {message}");
        if let Some(inner) = &self.forward {
            inner.report_failure(message);
        }
    }
}

/// Journals a `validation_failure` entry, then forwards.
pub struct JournalReporter {
    journal: Arc<Journal>,
    forward: Arc<dyn Reporter>,
}

impl JournalReporter {
    pub fn new(journal: Arc<Journal>, forward: Arc<dyn Reporter>) -> Self {
        Self { journal, forward }
    }
}

impl Reporter for JournalReporter {
    fn report_failure(&self, message: &str) {
        let mut entry = LogEntry::new(EventType::ValidationFailure, Severity::Warning);
        entry.error_code = error_code_of(message);
        entry.error_message = Some(message.to_string());
        self.journal.record(&entry);
        self.forward.report_failure(message);
    }
}

/// `"mocka: [MOCKA-1004] ..."` -> `MOCKA-1004`.
fn error_code_of(message: &str) -> Option<String> {
    let start = message.find("[MOCKA-")? + 1;
    let len = message[start..].find(']')?;
    Some(message[start..start + len].to_string())
}

/// Wrap `base` with the sinks `config` asks for.
pub fn layered(
    base: Arc<dyn Reporter>,
    config: &Config,
    journal: Option<&Arc<Journal>>,
) -> Arc<dyn Reporter> {
    let mut reporter = base;
    if config.reporter.echo_stderr {
        reporter = Arc::new(StderrReporter::forwarding(reporter));
    }
    if let Some(journal) = journal {
        reporter = Arc::new(JournalReporter::new(Arc::clone(journal), reporter));
    }
    reporter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::MockaError;
    use crate::core::config::JournalConfig;

    #[test]
    fn recording_reporter_collects_in_order() {
        let reporter = RecordingReporter::new();
        assert!(!reporter.has_failures());
        reporter.assert_no_failures();

        reporter.report_failure("first");
        reporter.report_failure("second");
        assert!(reporter.has_failures());
        assert_eq!(reporter.messages(), vec!["first", "second"]);

        reporter.clear();
        assert!(!reporter.has_failures());
    }

    #[test]
    #[should_panic(expected = "unexpected stub failures")]
    fn assert_no_failures_panics_with_messages() {
        let reporter = RecordingReporter::new();
        reporter.report_failure("mocka: boom");
        reporter.assert_no_failures();
    }

    #[test]
    fn stderr_reporter_forwards() {
        let inner = Arc::new(RecordingReporter::new());
        let reporter = StderrReporter::forwarding(inner.clone());
        reporter.report_failure("mocka: forwarded");
        assert_eq!(inner.messages(), vec!["mocka: forwarded"]);
    }

    #[test]
    fn error_code_is_extracted() {
        let err = MockaError::AlreadyRestored {
            name: "len".to_string(),
        };
        assert_eq!(
            error_code_of(&err.report_message()).as_deref(),
            Some("MOCKA-2001")
        );
        assert_eq!(error_code_of("mocka: no code here"), None);
    }

    #[test]
    fn journal_reporter_writes_then_forwards() {
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig {
            enabled: true,
            path: dir.path().join("activity.jsonl"),
            ..JournalConfig::default()
        };
        let journal = Arc::new(Journal::from_config(&config).expect("enabled"));
        let inner = Arc::new(RecordingReporter::new());
        let reporter = JournalReporter::new(journal, inner.clone());

        let message = MockaError::ReturnValidation {
            expected: "(i64)".to_string(),
            received: "(str)".to_string(),
        }
        .report_message();
        reporter.report_failure(&message);

        assert_eq!(inner.messages(), vec![message.clone()]);
        let line = std::fs::read_to_string(&config.path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(parsed["event"], "validation_failure");
        assert_eq!(parsed["severity"], "warning");
        assert_eq!(parsed["error_code"], "MOCKA-1004");
        assert_eq!(parsed["error_message"], message);
    }

    #[test]
    fn layered_without_options_is_the_base() {
        let base: Arc<dyn Reporter> = Arc::new(RecordingReporter::new());
        let reporter = layered(Arc::clone(&base), &Config::default(), None);
        assert!(Arc::ptr_eq(&reporter, &base));
    }
}
