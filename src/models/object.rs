//! Represents a single remote object as observed in a bucket listing.

use serde::{Deserialize, Serialize};

/// One entry from a bucket listing page.
///
/// Descriptors are produced fresh on every listing and never persisted; the
/// local directory tree alone records what has already been mirrored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// Object key within the bucket. May contain `/`-separated segments
    /// that map to directory levels locally.
    pub key: String,

    /// Size in bytes as reported by the listing.
    pub size: i64,
}

impl ObjectDescriptor {
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size,
        }
    }

    /// True for keys that carry no downloadable content: empty keys and
    /// pseudo-directory markers (keys ending in `/`).
    pub fn is_placeholder(&self) -> bool {
        self.key.is_empty() || self.key.ends_with('/')
    }
}
