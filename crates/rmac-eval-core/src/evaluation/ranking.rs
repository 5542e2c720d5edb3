//! Deterministic ranking of dataset items by similarity.

/// Dataset indices sorted by descending score.
///
/// The sort is stable, so items with equal scores keep ascending index
/// order. Scores are compared with [`f32::total_cmp`], which also gives NaN
/// a fixed place instead of an arbitrary one.
pub fn rank_descending(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Ranking is a permutation ordered by score
        #[test]
        fn ranking_is_sorted_permutation(
            scores in proptest::collection::vec((0u8..20).prop_map(|v| f32::from(v) * 0.5), 0..50)
        ) {
            let order = rank_descending(&scores);
            let mut seen = order.clone();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..scores.len()).collect::<Vec<_>>());
            for pair in order.windows(2) {
                prop_assert!(scores[pair[0]] >= scores[pair[1]]);
                if scores[pair[0]] == scores[pair[1]] {
                    prop_assert!(pair[0] < pair[1]);
                }
            }
        }
    }
}
