//! Per-cycle outcome accounting.

use serde::{Deserialize, Serialize};

/// A failure confined to a single object within a cycle.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ObjectError {
    /// Key of the object that failed.
    pub key: String,

    /// Human-readable cause.
    pub cause: String,
}

/// Counters for one complete sync cycle.
///
/// Built while a cycle runs, reported through logging at cycle end, then
/// discarded. Nothing here survives into the next cycle.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CycleReport {
    /// Every descriptor observed across all listing pages, placeholders
    /// included.
    pub objects_listed: u64,

    /// Objects whose bytes were transferred this cycle.
    pub files_downloaded: u64,

    /// Objects left untouched because the local copy already matched by size.
    pub files_skipped: u64,

    /// Object-local failures, in the order they occurred.
    pub errors: Vec<ObjectError>,
}

impl CycleReport {
    /// True when the listing produced no descriptors at all. Reported
    /// distinctly from "every object already synced".
    pub fn is_empty_bucket(&self) -> bool {
        self.objects_listed == 0
    }

    pub fn record_error(&mut self, key: &str, cause: impl std::fmt::Display) {
        self.errors.push(ObjectError {
            key: key.to_string(),
            cause: cause.to_string(),
        });
    }
}
