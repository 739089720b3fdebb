//! Log entry model (C4).
//!
//! An immutable record of one entry in one [`crate::log::Log`]. The RPC
//! engine never looks inside a payload; only the storage layer and whatever
//! consensus module eventually sits on top of it care what the bytes mean.

use std::fmt;

/// One entry. `log_id` and `entry_id` are assigned by the owning
/// [`crate::log::Log`] on append and never change afterward. `created_term`,
/// `created_sec`, and `created_nsec` are a caller-supplied creation
/// timestamp / term tag triple — opaque to the log, which only stores and
/// returns them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub log_id: u64,
    pub entry_id: u64,
    pub created_term: u32,
    pub created_sec: u32,
    pub created_nsec: u32,
    pub payload: Vec<u8>,
    pub invalidations: Vec<u64>,
}

impl LogEntry {
    /// Builds an entry not yet assigned to a log — `log_id` and `entry_id`
    /// are placeholders until [`crate::log::Log::append`] fills them in.
    pub fn new(
        created_term: u32,
        created_sec: u32,
        created_nsec: u32,
        payload: impl Into<Vec<u8>>,
        invalidations: Vec<u64>,
    ) -> Self {
        LogEntry {
            log_id: 0,
            entry_id: 0,
            created_term,
            created_sec,
            created_nsec,
            payload: payload.into(),
            invalidations,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) '{}'",
            self.log_id,
            self.entry_id,
            String::from_utf8_lossy(&self.payload)
        )?;
        if !self.invalidations.is_empty() {
            write!(f, " [inv")?;
            for id in &self.invalidations {
                write!(f, " {id}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
