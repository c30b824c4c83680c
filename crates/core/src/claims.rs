//! Claim set preventing duplicate processing
//!
//! Paths are claimed immediately before a print attempt and released on
//! failure, so a second arrival event for the same path can neither
//! double-print it nor lose the retry.

use dashmap::DashSet;
use std::path::{Path, PathBuf};

/// Concurrent check-and-claim set over absolute file paths.
///
/// `claim` is atomic: when two tasks race on the same path, exactly one
/// wins. Claims live only for the process lifetime; across restarts the
/// post-print move/delete is what prevents duplicates.
#[derive(Debug, Default)]
pub struct ClaimSet {
    inner: DashSet<PathBuf>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a path. Returns `false` if it was already claimed.
    pub fn claim(&self, path: &Path) -> bool {
        self.inner.insert(path.to_path_buf())
    }

    /// Release a claim so a later arrival or rescan can retry the path.
    pub fn release(&self, path: &Path) {
        self.inner.remove(path);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.inner.contains(path)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
