//! Evaluation framework for measuring image-retrieval quality.
//!
//! Given a query × dataset similarity matrix and, per query, the set of
//! dataset items that are correct matches, this module ranks the dataset for
//! every query and scores the rankings.
//!
//! # Overview
//!
//! - **Stable ranking**: items are ordered by descending similarity; equal
//!   scores keep ascending index order, so repeated runs are bit-identical
//! - **Interpolated AP**: VOC2010-style, precision at each recall level is
//!   replaced by the best precision reachable at that recall or higher
//! - **Descriptor aggregation**: region, scale, and layer descriptors are
//!   combined into one vector per image before similarities are taken
//! - **Explicit boundary cases**: a query with no relevant items is an error
//!   unless the caller opts into skipping or zero-scoring it
//!
//! # Example
//!
//! ```
//! use rmac_eval_core::config::EvaluatorConfig;
//! use rmac_eval_core::evaluation::{evaluate, RelevanceSet, SimilarityMatrix};
//!
//! let sim = SimilarityMatrix::from_rows(vec![
//!     vec![0.3, 0.8, 0.1, 0.9],
//!     vec![0.5, 0.2, 0.7, 0.1],
//! ])
//! .unwrap();
//! let relevance = vec![RelevanceSet::new([1, 3]), RelevanceSet::new([0])];
//!
//! let report = evaluate(&sim, &relevance, &EvaluatorConfig::default()).unwrap();
//! assert_eq!(report.precision.mean, 0.5);
//! ```
//!
//! # Metrics Reference
//!
//! | Metric | Description |
//! |--------|-------------|
//! | P@k | Fraction of the top-k that are relevant, k = number of relevant items |
//! | AP | Mean over recall levels of the max precision at that recall or higher |
//! | mAP | Mean of AP across queries |

pub mod descriptors;
pub mod evaluator;
pub mod metrics;
pub mod ranking;
pub mod relevance;
pub mod similarity;

pub use descriptors::{aggregate_regions, concat_layers, l2_normalize, sum_scales};
pub use evaluator::{
    evaluate, mean_average_precision, precision_at_k, EvaluationReport, RankingResult,
};
pub use metrics::{query_average_precision, query_precision};
pub use ranking::rank_descending;
pub use relevance::RelevanceSet;
pub use similarity::SimilarityMatrix;
