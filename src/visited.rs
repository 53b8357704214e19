// src/visited.rs
// =============================================================================
// The set of addresses already dispatched for download.
//
// One registry belongs to one crawl session. It only ever grows, and it is
// keyed by the canonical absolute form of an address, so "/a", "a" and
// "http://host/a" reported from different pages all count as one visit.
//
// The set sits behind a Mutex so branches crawled in parallel can share it;
// `claim` does the check and the insert under one lock.
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use crate::address::Address;

#[derive(Debug, Default)]
pub struct VisitedRegistry {
    keys: Mutex<HashSet<String>>,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visited(&self, address: &Address) -> bool {
        self.lock().contains(address.key())
    }

    /// Records the address. Reporting it again is a no-op.
    pub fn report(&self, address: &Address) {
        self.claim(address);
    }

    /// Records the address and returns `true` only for the first caller.
    pub fn claim(&self, address: &Address) -> bool {
        self.lock().insert(address.key().to_string())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Inserts never leave the set half-written, so a poisoned lock is fine.
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
