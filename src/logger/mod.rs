//! Activity journal: JSONL append-only log with graceful degradation.

pub mod journal;
pub mod jsonl;

pub use journal::Journal;
pub use jsonl::{EventType, JsonlConfig, JsonlWriter, LogEntry, Severity};
