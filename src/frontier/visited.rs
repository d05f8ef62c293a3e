//! Visited Index (C2): a set of 32-bit URL hashes, opaque behind
//! `contains`/`insert` so the backing representation (exact set today, a
//! counting Bloom filter at larger scale per spec §9) can change without
//! touching callers.

use std::collections::HashSet;

#[derive(Debug, Default, Clone)]
pub struct VisitedIndex {
    hashes: HashSet<u32>,
}

impl VisitedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_hashes(hashes: HashSet<u32>) -> Self {
        Self { hashes }
    }

    pub fn contains(&self, hash: u32) -> bool {
        self.hashes.contains(&hash)
    }

    /// Returns `true` if this hash was not already present.
    pub fn insert(&mut self, hash: u32) -> bool {
        self.hashes.insert(hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Clears the index. Used only by `reset` (spec §4.4), which is the one
    /// operation allowed to un-monotonically shrink the Visited Index.
    pub fn clear(&mut self) {
        self.hashes.clear();
    }

    pub fn as_hashes(&self) -> &HashSet<u32> {
        &self.hashes
    }
}
