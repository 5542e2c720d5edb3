//! Grid and evaluation constants.
//!
//! These values define the R-MAC tiling and the default extraction settings.
//! They are shared by the library, the CLI, and the benchmarks so every entry
//! point plans identical grids.
//!
//! # Usage
//!
//! ```
//! use rmac_eval_core::config::{DEFAULT_LEVELS, DEFAULT_SCALES};
//! use rmac_eval_core::regions::multi_scale_regions;
//!
//! let plans = multi_scale_regions(768, 1024, &DEFAULT_SCALES, DEFAULT_LEVELS).unwrap();
//! assert_eq!(plans.len(), DEFAULT_SCALES.len());
//! ```

use serde::{Deserialize, Serialize};

// =============================================================================
// R-MAC Grid
// =============================================================================

/// Desired overlap between neighbouring regions along the long side.
pub const TARGET_OVERLAP: f64 = 0.4;

/// [`TARGET_OVERLAP`] as an exact `(numerator, denominator)` fraction.
///
/// The step search compares overlaps with integer arithmetic so that exact
/// ties resolve to the first candidate.
pub const TARGET_OVERLAP_RATIO: (u64, u64) = (2, 5);

/// Candidate region counts for the long side of the image at level 1.
///
/// Searched in order; the first candidate whose overlap is closest to
/// [`TARGET_OVERLAP`] wins.
pub const LONG_SIDE_STEPS: [u32; 6] = [2, 3, 4, 5, 6, 7];

/// Spatial levels used when none are requested.
pub const DEFAULT_LEVELS: u32 = 2;

// =============================================================================
// Image Scales
// =============================================================================

/// Longer-side size used for single-scale extraction.
pub const DEFAULT_MAX_SIDE: u32 = 512;

/// Longer-side sizes used for multi-resolution extraction.
///
/// Descriptors from each scale are summed before computing similarities.
pub const DEFAULT_SCALES: [u32; 3] = [248, 496, 744];

// =============================================================================
// Descriptors
// =============================================================================

/// Added to the L2 norm before dividing, so all-zero descriptors stay zero.
pub const DESCRIPTOR_EPS: f32 = 1e-8;

// =============================================================================
// Evaluation
// =============================================================================

/// What to do with a query whose relevance set is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyRelevancePolicy {
    /// Return [`EvaluationError::UndefinedMetric`](crate::error::EvaluationError::UndefinedMetric)
    #[default]
    Fail,
    /// Leave the query unscored and out of the mean
    Skip,
    /// Score the query as 0
    Zero,
}

/// Settings for the ranking evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Handling of queries with no relevant items
    pub empty_relevance: EmptyRelevancePolicy,
    /// Score queries on the rayon thread pool
    pub parallel: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            empty_relevance: EmptyRelevancePolicy::Fail,
            parallel: true,
        }
    }
}

impl EvaluatorConfig {
    /// Returns a copy with the given empty-relevance policy.
    pub fn with_empty_relevance(mut self, policy: EmptyRelevancePolicy) -> Self {
        self.empty_relevance = policy;
        self
    }

    /// Returns a copy that scores queries sequentially.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_are_ascending() {
        assert!(LONG_SIDE_STEPS.windows(2).all(|w| w[0] < w[1]));
        let (num, den) = TARGET_OVERLAP_RATIO;
        assert!((num as f64 / den as f64 - TARGET_OVERLAP).abs() < 1e-12);
    }

    #[test]
    fn test_default_config_fails_on_empty() {
        let config = EvaluatorConfig::default();
        assert_eq!(config.empty_relevance, EmptyRelevancePolicy::Fail);
        assert!(config.parallel);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: EvaluatorConfig = serde_json::from_str(r#"{"empty_relevance": "skip"}"#).unwrap();
        assert_eq!(config.empty_relevance, EmptyRelevancePolicy::Skip);
        assert!(config.parallel);
    }
}
