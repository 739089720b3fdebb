//! Storage module directory (C6).
//!
//! A directory of [`Log`]s keyed by log ID, guarded by a single
//! `std::sync::Mutex` for the mutating operations (`create_log`,
//! `delete_log`); `get_logs` takes a consistent snapshot under that same
//! lock. Each `Log` then has its own lock for entry access (C5), so reads
//! from different logs never contend with each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::log::Log;

pub struct Storage {
    logs: Mutex<HashMap<u64, Arc<Log>>>,
}

impl Storage {
    pub fn new() -> Self {
        Storage {
            logs: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a log with the given ID, or returns the existing handle if
    /// one is already present — idempotent with respect to directory
    /// cardinality.
    pub fn create_log(&self, log_id: u64) -> Arc<Log> {
        let mut logs = self.logs.lock().expect("storage directory lock poisoned");
        let log = logs
            .entry(log_id)
            .or_insert_with(|| {
                info!(log_id, "created log");
                Arc::new(Log::new(log_id))
            })
            .clone();
        log
    }

    /// A snapshot of every log currently in the directory, in unspecified
    /// order.
    pub fn get_logs(&self) -> Vec<Arc<Log>> {
        let logs = self.logs.lock().expect("storage directory lock poisoned");
        logs.values().cloned().collect()
    }

    /// Removes the log with `log_id` if present and returns that ID. Legal
    /// to call on an absent ID — still returns `log_id`, just a no-op on the
    /// directory. Entries already read out through an existing `Arc<Log>`
    /// handle remain valid; only the directory's own reference is dropped.
    pub async fn delete_log(&self, log_id: u64) -> u64 {
        let mut logs = self.logs.lock().expect("storage directory lock poisoned");
        if logs.remove(&log_id).is_some() {
            info!(log_id, "deleted log");
        }
        log_id
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}
