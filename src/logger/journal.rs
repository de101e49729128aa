//! Shared handle to the activity journal.
//!
//! Stubs, sandboxes and the journal reporter all write through one
//! [`Journal`]; the writer sits behind its own mutex so entries from
//! concurrent stubs never interleave.

use std::fmt;

use parking_lot::Mutex;

use super::jsonl::{JsonlConfig, JsonlWriter, LogEntry};
use crate::core::config::JournalConfig;

pub struct Journal {
    writer: Mutex<JsonlWriter>,
}

impl Journal {
    /// Open the journal. Never fails: an unusable path degrades the writer.
    pub fn open(config: JsonlConfig) -> Self {
        Self {
            writer: Mutex::new(JsonlWriter::open(config)),
        }
    }

    /// `None` when the journal is disabled.
    pub fn from_config(config: &JournalConfig) -> Option<Self> {
        config.enabled.then(|| Self::open(config.writer_config()))
    }

    pub fn record(&self, entry: &LogEntry) {
        self.writer.lock().write_entry(entry);
    }

    /// Degradation state of the underlying writer.
    pub fn state(&self) -> &'static str {
        self.writer.lock().state()
    }
}

impl fmt::Debug for Journal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Journal")
            .field("state", &self.state())
            .finish()
    }
}
