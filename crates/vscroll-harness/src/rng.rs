#![forbid(unsafe_code)]

//! Deterministic workload generation.
//!
//! Randomized scenarios take their seed from `VSCROLL_SEED` when set, so a
//! failing run can be replayed exactly.

use crate::host::Row;

/// Seed override environment variable.
pub const SEED_ENV: &str = "VSCROLL_SEED";

/// Seed from `VSCROLL_SEED`, or `default` when unset or unparsable.
pub fn seed_from_env(default: u64) -> u64 {
    std::env::var(SEED_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Simple LCG PRNG for deterministic generation.
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        // LCG parameters from Numerical Recipes
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform in `[min, max)`; `min` when the range is empty.
    pub fn next_range(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            return min;
        }
        min + (self.next_u64() % (max - min))
    }

    /// Uniform in `[0, 1]`.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// `count` rows with ids starting at `first_id` and whole-pixel heights in
/// `[min_height, max_height)`.
pub fn random_rows(
    rng: &mut SeededRng,
    first_id: u64,
    count: usize,
    min_height: u64,
    max_height: u64,
) -> Vec<Row> {
    (0..count as u64)
        .map(|i| Row::new(first_id + i, rng.next_range(min_height, max_height) as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn range_is_respected() {
        let mut rng = SeededRng::new(7);
        for _ in 0..200 {
            let v = rng.next_range(10, 20);
            assert!((10..20).contains(&v));
        }
        assert_eq!(rng.next_range(5, 5), 5);
    }

    #[test]
    fn random_rows_are_sequential() {
        let mut rng = SeededRng::new(1);
        let rows = random_rows(&mut rng, 100, 5, 20, 60);
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![100, 101, 102, 103, 104]);
        assert!(rows.iter().all(|r| (20.0..60.0).contains(&r.height)));
    }
}
