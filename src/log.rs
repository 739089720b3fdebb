//! Per-log append sequence (C5).
//!
//! One append-only sequence of [`LogEntry`] values, owned by
//! [`crate::storage::Storage`] and shared out to callers as `Arc<Log>`.
//! Appends take the write side of a `std::sync::RwLock`; reads take the read
//! side, so concurrent `read_from` calls never block each other, only a
//! concurrent append (§5).
//!
//! The spec's asynchronous append-completion callback is rendered here as a
//! plain `async fn` return value: the `Future` resolving *is* the
//! completion notification, so no separate callback trait exists.

use std::sync::RwLock;

use tracing::debug;

use crate::entry::LogEntry;

pub struct Log {
    id: u64,
    entries: RwLock<Vec<LogEntry>>,
}

impl Log {
    pub(crate) fn new(id: u64) -> Self {
        Log {
            id,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The highest assigned entry ID, or `None` if the log is empty — the
    /// idiomatic Rust spelling of the spec's `NONE` sentinel.
    pub fn get_last_id(&self) -> Option<u64> {
        let entries = self.entries.read().expect("log entries lock poisoned");
        entries.last().map(|e| e.entry_id)
    }

    /// Appends a copy of `entry`, assigning this log's ID and the next dense
    /// entry ID, and returns that assigned copy once the append is durable.
    pub async fn append(&self, entry: LogEntry) -> LogEntry {
        let mut entries = self.entries.write().expect("log entries lock poisoned");
        let entry_id = entries.last().map(|e| e.entry_id + 1).unwrap_or(0);
        let assigned = LogEntry {
            log_id: self.id,
            entry_id,
            created_term: entry.created_term,
            created_sec: entry.created_sec,
            created_nsec: entry.created_nsec,
            payload: entry.payload,
            invalidations: entry.invalidations,
        };
        entries.push(assigned.clone());
        debug!(log_id = self.id, entry_id, "appended log entry");
        assigned
    }

    /// A snapshot of every entry with `entry_id >= first_id`, in ascending
    /// order. Empty if `first_id` exceeds the last assigned entry ID.
    pub fn read_from(&self, first_id: u64) -> Vec<LogEntry> {
        let entries = self.entries.read().expect("log entries lock poisoned");
        entries
            .iter()
            .filter(|e| e.entry_id >= first_id)
            .cloned()
            .collect()
    }
}
