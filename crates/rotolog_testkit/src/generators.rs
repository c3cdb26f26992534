//! Property-based test generators using proptest.

use proptest::prelude::*;

/// Strategy for retention counts, including 0.
pub fn retain_strategy() -> impl Strategy<Value = usize> {
    0usize..6
}

/// Strategy for size thresholds small enough to rotate often.
pub fn threshold_strategy() -> impl Strategy<Value = u64> {
    1u64..256
}

/// Strategy for a sequence of record lengths.
pub fn record_lengths_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..64, 1..200)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn record_lengths_are_positive(lengths in record_lengths_strategy()) {
            prop_assert!(!lengths.is_empty());
            prop_assert!(lengths.iter().all(|&len| len > 0));
        }

        #[test]
        fn thresholds_are_enabled(threshold in threshold_strategy()) {
            prop_assert!(threshold > 0);
        }
    }
}
