//! Reseed scheduling.
//!
//! A reseed happens when pool 0 holds enough material and the previous
//! reseed is old enough. Pool `i` is folded only when the reseed counter is
//! divisible by `2^i`.

use super::pool::NUM_POOLS;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Thresholds gating a reseed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReseedPolicy {
    /// Bytes pool 0 must hold before a reseed.
    pub min_pool_size: usize,
    /// Minimum time between reseeds in milliseconds.
    pub min_interval_ms: u64,
}

impl Default for ReseedPolicy {
    fn default() -> Self {
        Self {
            min_pool_size: 64,
            min_interval_ms: 100,
        }
    }
}

impl ReseedPolicy {
    /// Returns the throttle interval.
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Decides whether a reseed is due.
    ///
    /// `last_reseed` is `None` before the first reseed, which always counts
    /// as long enough ago.
    pub fn is_due(&self, pool0_len: usize, last_reseed: Option<Instant>, now: Instant) -> bool {
        if pool0_len < self.min_pool_size {
            return false;
        }
        match last_reseed {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.min_interval(),
        }
    }
}

/// Number of pools folded at reseed number `reseed_count`.
///
/// Pool `i` participates iff `2^i` divides `reseed_count`. Divisibility by
/// `2^(i+1)` implies divisibility by `2^i`, so the folded set is always the
/// prefix `0..n`.
pub fn pools_to_fold(reseed_count: u64) -> usize {
    let mut folded = 0;
    for i in 0..NUM_POOLS {
        if reseed_count % (1u64 << i) != 0 {
            break;
        }
        folded += 1;
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_schedule() {
        assert_eq!(pools_to_fold(1), 1);
        assert_eq!(pools_to_fold(2), 2);
        assert_eq!(pools_to_fold(3), 1);
        assert_eq!(pools_to_fold(4), 3);
        assert_eq!(pools_to_fold(12), 3);
        assert_eq!(pools_to_fold(1 << 31), 32);
        // never more than the pools that exist
        assert_eq!(pools_to_fold(1 << 40), NUM_POOLS);
    }

    #[test]
    fn test_pool_size_threshold() {
        let policy = ReseedPolicy::default();
        let now = Instant::now();
        assert!(!policy.is_due(63, None, now));
        assert!(policy.is_due(64, None, now));
    }

    #[test]
    fn test_interval_is_strict() {
        let policy = ReseedPolicy::default();
        let last = Instant::now();

        assert!(!policy.is_due(64, Some(last), last + Duration::from_millis(100)));
        assert!(policy.is_due(64, Some(last), last + Duration::from_millis(101)));
    }

    #[test]
    fn test_clock_going_backwards_delays_reseed() {
        let policy = ReseedPolicy::default();
        let now = Instant::now();
        let last = now + Duration::from_secs(5);
        assert!(!policy.is_due(1000, Some(last), now));
    }

    #[test]
    fn test_policy_from_partial_toml() {
        let policy: ReseedPolicy = toml::from_str("min_interval_ms = 250").unwrap();
        assert_eq!(policy.min_pool_size, 64);
        assert_eq!(policy.min_interval(), Duration::from_millis(250));
    }
}
