//! Per-query ranking metrics.
//!
//! Both metrics take a full ranking (every dataset index, best first) and one
//! relevance set. They return `None` when the set has no relevant items,
//! since both are undefined there; the corpus layer decides what that means.
//!
//! # References
//!
//! - Everingham et al. (2010). "The PASCAL Visual Object Classes (VOC) Challenge"

use super::relevance::RelevanceSet;

/// Ranking with the query's ignored items removed.
fn judged<'a>(ranking: &'a [usize], relevance: &'a RelevanceSet) -> impl Iterator<Item = usize> + 'a {
    ranking
        .iter()
        .copied()
        .filter(move |&i| !relevance.is_ignored(i))
}

/// Computes precision at k, with k fixed to the number of relevant items.
///
/// # Formula
///
/// ```text
/// P = |relevant ∩ top_k| / k,   k = |relevant|
/// ```
///
/// # Returns
///
/// Precision between 0.0 and 1.0, or `None` if nothing is relevant.
pub fn query_precision(ranking: &[usize], relevance: &RelevanceSet) -> Option<f64> {
    let k = relevance.len();
    if k == 0 {
        return None;
    }

    let hits = judged(ranking, relevance)
        .take(k)
        .filter(|&i| relevance.is_relevant(i))
        .count();

    Some(hits as f64 / k as f64)
}

/// Computes interpolated Average Precision (VOC2010 and later).
///
/// Walks the ranking and records, for the r-th relevant item found, the
/// precision at the rank where it appeared. Each recorded value is then
/// replaced by the maximum over itself and all later ones (the precision
/// envelope), and the envelope is averaged.
///
/// # Formula
///
/// ```text
/// p_r    = r / rank_of_rth_hit
/// AP     = (1 / |relevant|) * Σ_r max_{r' >= r} p_r'
/// ```
///
/// Recall levels never reached contribute 0.
///
/// # Returns
///
/// AP between 0.0 and 1.0, or `None` if nothing is relevant.
pub fn query_average_precision(ranking: &[usize], relevance: &RelevanceSet) -> Option<f64> {
    let total = relevance.len();
    if total == 0 {
        return None;
    }

    let mut precision_at_recall = vec![0.0f64; total];
    let mut found = 0;
    for (rank, index) in judged(ranking, relevance).enumerate() {
        if !relevance.is_relevant(index) {
            continue;
        }
        found += 1;
        precision_at_recall[found - 1] = found as f64 / (rank + 1) as f64;
        if found == total {
            break;
        }
    }

    // Suffix maximum, in place.
    for r in (0..total.saturating_sub(1)).rev() {
        precision_at_recall[r] = precision_at_recall[r].max(precision_at_recall[r + 1]);
    }

    Some(precision_at_recall.iter().sum::<f64>() / total as f64)
}
