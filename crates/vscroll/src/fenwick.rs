//! Fenwick tree (Binary Indexed Tree) over pixel heights.
//!
//! Provides O(log n) point update, prefix query, and offset search over a
//! contiguous `Vec<f64>`, so that "pixel offset of index I" and "index at
//! pixel offset Y" never need a full rescan on a scroll event.
//!
//! # Layout
//!
//! The tree is stored 1-indexed in a contiguous `Vec<f64>` of length `n + 1`
//! (index 0 unused). A shadow copy of the raw values is kept alongside so that
//! [`HeightTree::get`] is exact and [`HeightTree::set`] computes its delta
//! without accumulating floating-point drift through prefix differences.
//!
//! # Operations
//!
//! | Operation | Time | Allocations |
//! |-----------|------|-------------|
//! | `new(n)` | O(n) | 2 Vec |
//! | `set(i, value)` | O(log n) | 0 |
//! | `prefix(i)` | O(log n) | 0 |
//! | `offset_of(i)` | O(log n) | 0 |
//! | `rebuild(values)` | O(n) | 0 |
//! | `find_prefix(target)` | O(log n) | 0 |
//!
//! # Invariants
//!
//! 1. `tree[i]` stores the sum of elements in a range determined by `lowbit(i)`.
//! 2. `prefix(n - 1) == total()`.
//! 3. After `rebuild`, the tree exactly represents the given values.
//! 4. `values[i] == get(i)` at all times.

/// Prefix-sum tree over item heights.
///
/// Entry `i` stores the height of item `i`; `offset_of(i)` is the y-offset of
/// the top edge of item `i`.
#[derive(Debug, Clone, Default)]
pub struct HeightTree {
    /// 1-indexed tree storage. `tree[0]` is unused.
    tree: Vec<f64>,
    /// Raw per-index values.
    values: Vec<f64>,
}

impl HeightTree {
    /// Create a tree of size `n` initialised to all zeros.
    pub fn new(n: usize) -> Self {
        Self {
            tree: vec![0.0; n + 1],
            values: vec![0.0; n],
        }
    }

    /// Create a tree from an initial array of values in O(n).
    pub fn from_values(values: &[f64]) -> Self {
        let mut tree = Self::new(values.len());
        tree.rebuild(values);
        tree
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the tree is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at position `i`.
    ///
    /// # Panics
    /// Panics if `i >= n`.
    #[inline]
    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// Set element at position `i` to `value`. O(log n).
    ///
    /// # Panics
    /// Panics if `i >= n`.
    pub fn set(&mut self, i: usize, value: f64) {
        let n = self.len();
        assert!(i < n, "index {i} out of bounds (n={n})");
        let delta = value - self.values[i];
        self.values[i] = value;
        if delta == 0.0 {
            return;
        }
        let mut idx = i + 1;
        while idx <= n {
            self.tree[idx] += delta;
            idx += lowbit(idx);
        }
    }

    /// Prefix sum of elements `[0..=i]`. O(log n), zero alloc.
    ///
    /// # Panics
    /// Panics if `i >= n`.
    pub fn prefix(&self, i: usize) -> f64 {
        let n = self.len();
        assert!(i < n, "index {i} out of bounds (n={n})");
        let mut sum = 0.0;
        let mut idx = i + 1;
        while idx > 0 {
            sum += self.tree[idx];
            idx -= lowbit(idx);
        }
        sum
    }

    /// Y-offset of the top edge of item `i`, i.e. the sum of `[0..i)`.
    ///
    /// `offset_of(len())` is the total height. Indices past the end clamp to it.
    pub fn offset_of(&self, i: usize) -> f64 {
        if i == 0 || self.is_empty() {
            0.0
        } else {
            self.prefix(i.min(self.len()) - 1)
        }
    }

    /// Total sum of all elements. O(log n).
    pub fn total(&self) -> f64 {
        self.offset_of(self.len())
    }

    /// Rebuild the tree from a fresh array of values in O(n), resizing as needed.
    pub fn rebuild(&mut self, values: &[f64]) {
        let n = values.len();
        self.values.clear();
        self.values.extend_from_slice(values);
        self.tree.clear();
        self.tree.resize(n + 1, 0.0);
        self.tree[1..].copy_from_slice(values);

        // Parent propagation in O(n).
        for i in 1..=n {
            let parent = i + lowbit(i);
            if parent <= n {
                self.tree[parent] += self.tree[i];
            }
        }
    }

    /// Find the largest index `i` such that `prefix(i) <= target`.
    ///
    /// Returns `None` if every prefix sum exceeds `target`. O(log n).
    pub fn find_prefix(&self, target: f64) -> Option<usize> {
        self.descend(target, |partial, remaining| partial <= remaining)
    }

    /// Find the largest index `i` such that `prefix(i) < target`.
    pub fn find_prefix_below(&self, target: f64) -> Option<usize> {
        self.descend(target, |partial, remaining| partial < remaining)
    }

    /// Binary-lifting descent shared by the prefix searches. Relies on all
    /// values being non-negative so prefix sums are monotonic.
    fn descend(&self, target: f64, fits: impl Fn(f64, f64) -> bool) -> Option<usize> {
        let n = self.len();
        let mut pos = 0usize;
        let mut remaining = target;
        let mut bit_mask = most_significant_bit(n);

        while bit_mask > 0 {
            let next = pos + bit_mask;
            if next <= n && fits(self.tree[next], remaining) {
                remaining -= self.tree[next];
                pos = next;
            }
            bit_mask >>= 1;
        }

        // `pos` is the count of leading elements whose sum fits.
        pos.checked_sub(1)
    }

    /// Index of the item whose span `[offset, offset + height)` contains `y`.
    ///
    /// Zero-height items are skipped. Offsets past the end map to `len()`.
    pub fn index_at(&self, y: f64) -> usize {
        match self.find_prefix(y) {
            Some(i) => i + 1,
            None => 0,
        }
    }
}

/// Lowest set bit of `x`. E.g., `lowbit(6) = 2`, `lowbit(4) = 4`.
#[inline]
fn lowbit(x: usize) -> usize {
    x & x.wrapping_neg()
}

/// Most significant bit that fits within `n`.
#[inline]
fn most_significant_bit(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    1 << (usize::BITS - 1 - n.leading_zeros())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─── Construction ─────────────────────────────────────────────

    #[test]
    fn new_creates_zeroed_tree() {
        let ft = HeightTree::new(10);
        assert_eq!(ft.len(), 10);
        assert!(!ft.is_empty());
        assert_eq!(ft.total(), 0.0);
    }

    #[test]
    fn empty_tree() {
        let ft = HeightTree::new(0);
        assert!(ft.is_empty());
        assert_eq!(ft.total(), 0.0);
        assert_eq!(ft.offset_of(0), 0.0);
        assert_eq!(ft.offset_of(5), 0.0);
        assert_eq!(ft.find_prefix(10.0), None);
        assert_eq!(ft.index_at(10.0), 0);
    }

    #[test]
    fn from_values_prefix_sums() {
        let ft = HeightTree::from_values(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        assert_eq!(ft.prefix(0), 3.0);
        assert_eq!(ft.prefix(1), 4.0);
        assert_eq!(ft.prefix(2), 8.0);
        assert_eq!(ft.prefix(7), 31.0);
        assert_eq!(ft.total(), 31.0);
    }

    // ─── Point operations ─────────────────────────────────────────

    #[test]
    fn set_overwrites_value() {
        let mut ft = HeightTree::from_values(&[5.0, 10.0, 15.0]);
        ft.set(1, 20.0);
        assert_eq!(ft.get(0), 5.0);
        assert_eq!(ft.get(1), 20.0);
        assert_eq!(ft.get(2), 15.0);
        assert_eq!(ft.total(), 40.0);
        assert_eq!(ft.offset_of(2), 25.0);
    }

    #[test]
    fn set_same_value_is_noop() {
        let mut ft = HeightTree::from_values(&[10.0, 20.0, 30.0]);
        ft.set(1, 20.0);
        assert_eq!(ft.total(), 60.0);
    }

    #[test]
    fn offset_of_matches_running_sum() {
        let values = [7.0, 3.5, 8.0, 2.25, 6.0];
        let ft = HeightTree::from_values(&values);
        let mut running = 0.0;
        for (i, v) in values.iter().enumerate() {
            assert_eq!(ft.offset_of(i), running, "offset mismatch at {i}");
            running += v;
        }
        assert_eq!(ft.offset_of(values.len()), running);
        assert_eq!(ft.offset_of(values.len() + 10), running);
    }

    // ─── Rebuild ──────────────────────────────────────────────────

    #[test]
    fn rebuild_resizes() {
        let mut ft = HeightTree::from_values(&[1.0, 2.0, 3.0]);
        ft.rebuild(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(ft.len(), 5);
        assert_eq!(ft.total(), 150.0);
        assert_eq!(ft.get(4), 50.0);

        ft.rebuild(&[]);
        assert!(ft.is_empty());
        assert_eq!(ft.total(), 0.0);
    }

    // ─── Offset search ────────────────────────────────────────────

    #[test]
    fn find_prefix_scroll_offset() {
        // Prefix sums: [20, 50, 60, 100, 125]
        let ft = HeightTree::from_values(&[20.0, 30.0, 10.0, 40.0, 25.0]);
        assert_eq!(ft.find_prefix(0.0), None);
        assert_eq!(ft.find_prefix(20.0), Some(0));
        assert_eq!(ft.find_prefix(50.0), Some(1));
        assert_eq!(ft.find_prefix(99.0), Some(2));
        assert_eq!(ft.find_prefix(125.0), Some(4));
        assert_eq!(ft.find_prefix(1000.0), Some(4));
    }

    #[test]
    fn find_prefix_below_is_strict() {
        let ft = HeightTree::from_values(&[10.0, 10.0, 10.0]);
        assert_eq!(ft.find_prefix_below(10.0), None);
        assert_eq!(ft.find_prefix_below(10.5), Some(0));
        assert_eq!(ft.find_prefix_below(20.0), Some(0));
        assert_eq!(ft.find_prefix_below(30.0), Some(1));
        assert_eq!(ft.find_prefix_below(31.0), Some(2));
    }

    #[test]
    fn index_at_boundaries() {
        let ft = HeightTree::from_values(&[10.0, 10.0, 10.0]);
        assert_eq!(ft.index_at(0.0), 0);
        assert_eq!(ft.index_at(9.9), 0);
        assert_eq!(ft.index_at(10.0), 1);
        assert_eq!(ft.index_at(29.0), 2);
        assert_eq!(ft.index_at(30.0), 3);
    }

    #[test]
    fn index_at_skips_zero_height() {
        let ft = HeightTree::from_values(&[10.0, 0.0, 10.0]);
        assert_eq!(ft.index_at(10.0), 2);
    }

    // ─── Property: prefix sum correctness ─────────────────────────

    #[test]
    fn property_prefix_sum_correct() {
        // Deterministic PRNG for random updates.
        let mut seed: u64 = 0xCAFE_BABE_0000_0001;
        let n = 100;
        let mut naive = vec![0.0f64; n];
        let mut ft = HeightTree::new(n);

        for _ in 0..500 {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let idx = (seed >> 33) as usize % n;
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let height = ((seed >> 33) % 100) as f64;

            naive[idx] = height;
            ft.set(idx, height);
        }

        let mut naive_prefix = 0.0;
        for (i, value) in naive.iter().enumerate() {
            naive_prefix += value;
            assert_eq!(ft.prefix(i), naive_prefix, "prefix mismatch at index {i}");
        }
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn set_out_of_bounds_panics() {
        let mut ft = HeightTree::new(3);
        ft.set(3, 1.0);
    }

    #[test]
    fn lowbit_correctness() {
        assert_eq!(lowbit(1), 1);
        assert_eq!(lowbit(6), 2);
        assert_eq!(lowbit(8), 8);
        assert_eq!(lowbit(12), 4);
    }

    #[test]
    fn msb_correctness() {
        assert_eq!(most_significant_bit(0), 0);
        assert_eq!(most_significant_bit(1), 1);
        assert_eq!(most_significant_bit(5), 4);
        assert_eq!(most_significant_bit(1000), 512);
    }
}
