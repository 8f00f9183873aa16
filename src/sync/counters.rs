//! Unread badge bookkeeping.
//!
//! One counter per feed plus the "All Feeds" aggregate. The aggregate is
//! derived from the per-feed counters on every read, so it cannot drift from
//! their sum no matter how decrements are clamped.

use crate::page::FeedId;
use std::collections::BTreeMap;

/// How a badge is displayed: the number, and whether it is shown at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterDisplay {
    pub value: u64,
    pub visible: bool,
}

impl CounterDisplay {
    fn of(value: u64) -> Self {
        Self {
            value,
            visible: value > 0,
        }
    }
}

/// Per-feed unread counters. Values are never negative.
#[derive(Debug, Clone, Default)]
pub struct UnreadCounterStore {
    counts: BTreeMap<FeedId, u32>,
}

impl UnreadCounterStore {
    pub fn new(counts: impl IntoIterator<Item = (FeedId, u32)>) -> Self {
        Self {
            counts: counts.into_iter().collect(),
        }
    }

    pub fn contains(&self, feed_id: FeedId) -> bool {
        self.counts.contains_key(&feed_id)
    }

    pub fn get(&self, feed_id: FeedId) -> Option<u32> {
        self.counts.get(&feed_id).copied()
    }

    /// The "All Feeds" badge.
    pub fn aggregate(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    pub fn display(&self, feed_id: FeedId) -> Option<CounterDisplay> {
        self.get(feed_id).map(|c| CounterDisplay::of(u64::from(c)))
    }

    pub fn aggregate_display(&self) -> CounterDisplay {
        CounterDisplay::of(self.aggregate())
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeedId, u32)> + '_ {
        self.counts.iter().map(|(&id, &c)| (id, c))
    }

    /// Apply `delta` to a feed's counter, clamping at zero. Returns the new
    /// value, or `None` for an unknown feed (nothing changes).
    pub fn adjust(&mut self, feed_id: FeedId, delta: i64) -> Option<u32> {
        let count = self.counts.get_mut(&feed_id)?;
        let updated = (i64::from(*count) + delta).clamp(0, i64::from(u32::MAX));
        // Clamped into u32 range above.
        *count = updated as u32;
        tracing::trace!(feed_id = %feed_id, delta, count = *count, "Unread counter adjusted");
        Some(*count)
    }

    pub fn decrement(&mut self, feed_id: FeedId) -> Option<u32> {
        self.adjust(feed_id, -1)
    }

    pub fn increment(&mut self, feed_id: FeedId) -> Option<u32> {
        self.adjust(feed_id, 1)
    }

    /// Zero a feed's counter. Returns the previous value.
    pub fn clear(&mut self, feed_id: FeedId) -> Option<u32> {
        self.counts.get_mut(&feed_id).map(std::mem::take)
    }

    pub fn clear_all(&mut self) {
        for count in self.counts.values_mut() {
            *count = 0;
        }
    }

    /// Drop a feed's counter entirely (feed deleted).
    pub fn remove(&mut self, feed_id: FeedId) -> Option<u32> {
        self.counts.remove(&feed_id)
    }
}
