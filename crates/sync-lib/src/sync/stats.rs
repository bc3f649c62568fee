//! Counters reported by a synchronization pass

use serde::Serialize;
use std::fmt;

/// Outcome counts for one reconciled resource pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceStats {
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
    pub unchanged: u64,
}

/// Aggregate counts for a whole synchronization run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
    pub unchanged: u64,
    /// Resource pairs whose reconciliation failed and was skipped
    pub errors: u64,
}

impl SyncStats {
    /// Fold one resource pair's counts into the run totals
    pub fn absorb(&mut self, stats: ResourceStats) {
        self.created += stats.created;
        self.updated += stats.updated;
        self.deleted += stats.deleted;
        self.unchanged += stats.unchanged;
    }
}

impl fmt::Display for SyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} updated={} deleted={} unchanged={} errors={}",
            self.created, self.updated, self.deleted, self.unchanged, self.errors
        )
    }
}
