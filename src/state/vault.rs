//! Accumulator for discovered secret flags
//!
//! Append-only: flags are never removed or deduplicated. The count doubles
//! as the crawl's termination signal, so append-plus-count is a single
//! critical section and `append` hands back the count observed at insert
//! time for race-free progress reporting.

use std::sync::Mutex;

/// Thread-safe append-only collection of discovered flags
pub struct FlagVault {
    flags: Mutex<Vec<String>>,
}

impl FlagVault {
    pub fn new() -> Self {
        Self {
            flags: Mutex::new(Vec::new()),
        }
    }

    /// Appends a flag and returns the count including it
    pub fn append(&self, flag: String) -> usize {
        let mut flags = self.flags.lock().unwrap();
        flags.push(flag);
        flags.len()
    }

    /// Current number of collected flags
    pub fn count(&self) -> usize {
        self.flags.lock().unwrap().len()
    }

    /// Snapshot of all collected flags, in discovery order
    pub fn flags(&self) -> Vec<String> {
        self.flags.lock().unwrap().clone()
    }
}

impl Default for FlagVault {
    fn default() -> Self {
        Self::new()
    }
}
