//! Corpus-level evaluation over a full similarity matrix.
//!
//! Each query is ranked and scored independently, optionally on the rayon
//! pool. Scores are collected in query order and averaged sequentially, so
//! parallel and sequential runs produce bit-identical results.

use super::metrics::{query_average_precision, query_precision};
use super::ranking::rank_descending;
use super::relevance::{validate, RelevanceSet};
use super::similarity::SimilarityMatrix;
use crate::config::{EmptyRelevancePolicy, EvaluatorConfig};
use crate::error::EvaluationError;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Per-query scores for one metric and their mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingResult {
    /// One entry per query; `None` for queries skipped by policy
    pub per_query: Vec<Option<f64>>,
    /// Mean over the scored queries
    pub mean: f64,
}

impl RankingResult {
    /// The mean as a percentage, the form results are usually reported in.
    pub fn mean_percent(&self) -> f64 {
        self.mean * 100.0
    }

    /// Number of queries that contributed to the mean.
    pub fn scored(&self) -> usize {
        self.per_query.iter().filter(|s| s.is_some()).count()
    }
}

/// Precision and mAP computed from one pass over the rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub precision: RankingResult,
    pub map: RankingResult,
}

/// Mean precision at k, with k set per query to its number of relevant items.
///
/// # Errors
///
/// - [`EvaluationError::ShapeMismatch`] if there is not one relevance set per
///   matrix row, or a set names a column that does not exist
/// - [`EvaluationError::UndefinedMetric`] for an empty relevance set under
///   [`EmptyRelevancePolicy::Fail`]
/// - [`EvaluationError::EmptyMean`] if no query ends up scored
#[instrument(skip_all, fields(num_queries = sim.num_queries(), num_dataset = sim.num_dataset()))]
pub fn precision_at_k(
    sim: &SimilarityMatrix,
    relevance: &[RelevanceSet],
    config: &EvaluatorConfig,
) -> Result<RankingResult, EvaluationError> {
    validate(sim, relevance)?;
    let scores = score_queries(sim, relevance, config, query_precision);
    aggregate(scores, config.empty_relevance)
}

/// Mean interpolated Average Precision over all queries.
///
/// Errors as for [`precision_at_k`].
#[instrument(skip_all, fields(num_queries = sim.num_queries(), num_dataset = sim.num_dataset()))]
pub fn mean_average_precision(
    sim: &SimilarityMatrix,
    relevance: &[RelevanceSet],
    config: &EvaluatorConfig,
) -> Result<RankingResult, EvaluationError> {
    validate(sim, relevance)?;
    let scores = score_queries(sim, relevance, config, query_average_precision);
    aggregate(scores, config.empty_relevance)
}

/// Computes precision and mAP, ranking each query once.
///
/// Errors as for [`precision_at_k`].
#[instrument(skip_all, fields(num_queries = sim.num_queries(), num_dataset = sim.num_dataset()))]
pub fn evaluate(
    sim: &SimilarityMatrix,
    relevance: &[RelevanceSet],
    config: &EvaluatorConfig,
) -> Result<EvaluationReport, EvaluationError> {
    validate(sim, relevance)?;
    let pairs = score_queries(sim, relevance, config, |ranking, set| {
        (
            query_precision(ranking, set),
            query_average_precision(ranking, set),
        )
    });
    let (precision, map): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();

    let report = EvaluationReport {
        precision: aggregate(precision, config.empty_relevance)?,
        map: aggregate(map, config.empty_relevance)?,
    };
    info!(
        precision = report.precision.mean_percent(),
        map = report.map.mean_percent(),
        "evaluation complete"
    );
    Ok(report)
}

/// Ranks every query and applies `metric`, keeping query order.
fn score_queries<T, F>(
    sim: &SimilarityMatrix,
    relevance: &[RelevanceSet],
    config: &EvaluatorConfig,
    metric: F,
) -> Vec<T>
where
    T: Send,
    F: Fn(&[usize], &RelevanceSet) -> T + Sync,
{
    let score = |q: usize| {
        let ranking = rank_descending(sim.row(q));
        metric(ranking.as_slice(), &relevance[q])
    };

    if config.parallel {
        (0..sim.num_queries()).into_par_iter().map(score).collect()
    } else {
        (0..sim.num_queries()).map(score).collect()
    }
}

/// Applies the empty-relevance policy and averages what is left.
fn aggregate(
    scores: Vec<Option<f64>>,
    policy: EmptyRelevancePolicy,
) -> Result<RankingResult, EvaluationError> {
    let mut per_query = Vec::with_capacity(scores.len());
    for (query, score) in scores.into_iter().enumerate() {
        let resolved = match (score, policy) {
            (Some(value), _) => Some(value),
            (None, EmptyRelevancePolicy::Fail) => {
                return Err(EvaluationError::UndefinedMetric { query })
            }
            (None, EmptyRelevancePolicy::Skip) => {
                warn!(query, "skipping query with no relevant items");
                None
            }
            (None, EmptyRelevancePolicy::Zero) => Some(0.0),
        };
        per_query.push(resolved);
    }

    let scored: Vec<f64> = per_query.iter().flatten().copied().collect();
    if scored.is_empty() {
        return Err(EvaluationError::EmptyMean);
    }
    let mean = scored.iter().sum::<f64>() / scored.len() as f64;

    Ok(RankingResult { per_query, mean })
}
