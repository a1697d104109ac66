//! Pending expansion work, ordered best-first by estimated yield.

use std::collections::BinaryHeap;
use std::sync::Mutex;

use followscout_common::{AccountId, Cursor};

/// One unit of pending expansion: continue listing `identity`'s neighbors
/// at `cursor`, prioritized by the yield rate estimated for it.
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    /// Estimated yield in [0,1]. Higher pops first.
    pub yield_rate: f64,
    pub identity: AccountId,
    pub cursor: Cursor,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.yield_rate.total_cmp(&other.yield_rate).is_eq()
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Yields are ratios in [0,1]; total_cmp gives a total order and
        // the max-heap pops the highest estimate first. Ties arbitrary.
        self.yield_rate.total_cmp(&other.yield_rate)
    }
}

/// Priority queue of pending expansions. Safe for concurrent insertion
/// from sibling exploration tasks; the lock is never held across an await.
#[derive(Default)]
pub struct Frontier {
    heap: Mutex<BinaryHeap<FrontierEntry>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: FrontierEntry) {
        self.heap.lock().unwrap().push(entry);
    }

    pub fn pop(&self) -> Option<FrontierEntry> {
        self.heap.lock().unwrap().pop()
    }

    /// Whether `identity` already has a pending entry. Linear scan over
    /// the live queue; fine at the frontier sizes this crawl reaches.
    pub fn contains(&self, identity: &AccountId) -> bool {
        self.heap
            .lock()
            .unwrap()
            .iter()
            .any(|entry| &entry.identity == identity)
    }

    pub fn len(&self) -> usize {
        self.heap.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
