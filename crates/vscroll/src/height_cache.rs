//! Key-addressed cache of measured item heights.
//!
//! Heights are keyed by item key rather than index so that inserting or
//! removing items does not shift measurements onto the wrong rows. Entries are
//! never evicted: scrolling back to an item that was rendered long ago reuses
//! its last measurement instead of snapping to the estimate.

use std::collections::HashMap;
use std::hash::Hash;

/// One cached height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightEntry {
    /// Last known height in pixels (the estimate until measured).
    pub height: f64,
    /// Whether `height` came from a real measurement.
    pub measured: bool,
}

/// Append/update cache of item heights.
#[derive(Debug, Clone)]
pub struct HeightCache<K> {
    entries: HashMap<K, HeightEntry>,
    /// Height used for unmeasured items.
    estimate: f64,
}

impl<K: Eq + Hash + Clone> HeightCache<K> {
    /// Create an empty cache using `estimate` for unmeasured items.
    #[must_use]
    pub fn new(estimate: f64) -> Self {
        Self {
            entries: HashMap::new(),
            estimate,
        }
    }

    /// Height to lay out `key` with: the cached value, or the estimate.
    #[must_use]
    pub fn height_of(&self, key: &K) -> f64 {
        self.entries.get(key).map_or(self.estimate, |e| e.height)
    }

    /// Full entry for `key`, if it has ever been rendered.
    #[must_use]
    pub fn entry(&self, key: &K) -> Option<&HeightEntry> {
        self.entries.get(key)
    }

    /// Whether `key` has a real measurement.
    #[must_use]
    pub fn is_measured(&self, key: &K) -> bool {
        self.entries.get(key).is_some_and(|e| e.measured)
    }

    /// Record that `key` was rendered. Creates an unmeasured entry on first sight.
    pub fn touch(&mut self, key: &K) {
        if !self.entries.contains_key(key) {
            self.entries.insert(
                key.clone(),
                HeightEntry {
                    height: self.estimate,
                    measured: false,
                },
            );
        }
    }

    /// Store a measurement.
    ///
    /// Returns the previous *measured* height, or `None` the first time `key`
    /// is measured. Use [`HeightCache::would_change`] first to skip no-op writes.
    pub fn record(&mut self, key: &K, height: f64) -> Option<f64> {
        let previous = self
            .entries
            .get(key)
            .filter(|e| e.measured)
            .map(|e| e.height);
        self.entries.insert(
            key.clone(),
            HeightEntry {
                height,
                measured: true,
            },
        );
        previous
    }

    /// Whether recording `height` for `key` would alter the cache.
    #[must_use]
    pub fn would_change(&self, key: &K, height: f64) -> bool {
        match self.entries.get(key) {
            Some(e) => !e.measured || e.height != height,
            None => true,
        }
    }

    /// Forget measurements of zero (or negative) height.
    ///
    /// A hidden container reports 0 for children that are not really empty.
    /// Affected entries fall back to the estimate until measured again.
    /// Returns the number of entries reset.
    pub fn invalidate_zero_heights(&mut self) -> usize {
        let estimate = self.estimate;
        let mut reset = 0;
        for entry in self.entries.values_mut() {
            if entry.measured && entry.height <= 0.0 {
                *entry = HeightEntry {
                    height: estimate,
                    measured: false,
                };
                reset += 1;
            }
        }
        reset
    }

    /// Estimated height for unmeasured items.
    #[must_use]
    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    /// Number of keys ever rendered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key has been rendered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries holding a real measurement.
    #[must_use]
    pub fn measured_count(&self) -> usize {
        self.entries.values().filter(|e| e.measured).count()
    }

    /// Whether `key` has ever been rendered.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_use_estimate() {
        let cache: HeightCache<u32> = HeightCache::new(24.0);
        assert_eq!(cache.height_of(&7), 24.0);
        assert!(cache.is_empty());
        assert!(!cache.contains(&7));
    }

    #[test]
    fn touch_creates_unmeasured_entry_once() {
        let mut cache = HeightCache::new(24.0);
        cache.touch(&"a");
        cache.record(&"a", 40.0);
        cache.touch(&"a");
        assert_eq!(cache.height_of(&"a"), 40.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn record_reports_previous_measurement() {
        let mut cache = HeightCache::new(24.0);
        cache.touch(&1u64);
        assert_eq!(cache.record(&1, 30.0), None);
        assert_eq!(cache.record(&1, 45.0), Some(30.0));
        assert!(cache.is_measured(&1));
        assert_eq!(cache.measured_count(), 1);
    }

    #[test]
    fn would_change_detects_noop() {
        let mut cache = HeightCache::new(24.0);
        assert!(cache.would_change(&1u8, 24.0));
        cache.touch(&1);
        // Unmeasured entry with equal estimate still counts as a change.
        assert!(cache.would_change(&1, 24.0));
        cache.record(&1, 24.0);
        assert!(!cache.would_change(&1, 24.0));
        assert!(cache.would_change(&1, 25.0));
    }

    #[test]
    fn entries_survive_without_eviction() {
        let mut cache = HeightCache::new(10.0);
        for k in 0..10_000u32 {
            cache.touch(&k);
            cache.record(&k, 12.0);
        }
        assert_eq!(cache.len(), 10_000);
        assert_eq!(cache.height_of(&0), 12.0);
    }

    #[test]
    fn invalidate_zero_heights_resets_to_estimate() {
        let mut cache = HeightCache::new(24.0);
        cache.record(&"hidden", 0.0);
        cache.record(&"real", 50.0);
        assert_eq!(cache.invalidate_zero_heights(), 1);
        assert_eq!(cache.height_of(&"hidden"), 24.0);
        assert!(!cache.is_measured(&"hidden"));
        assert_eq!(cache.height_of(&"real"), 50.0);
    }
}
