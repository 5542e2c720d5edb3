//! Dense query × dataset similarity matrices.

use crate::error::EvaluationError;

/// Row-major similarity scores, one row per query and one column per
/// dataset item. Higher means more similar; no range is assumed.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    num_queries: usize,
    num_dataset: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    /// Wraps a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// [`EvaluationError::ShapeMismatch`] if `values.len()` is not
    /// `num_queries * num_dataset`.
    pub fn new(
        num_queries: usize,
        num_dataset: usize,
        values: Vec<f32>,
    ) -> Result<Self, EvaluationError> {
        let expected = num_queries.checked_mul(num_dataset).ok_or_else(|| {
            EvaluationError::ShapeMismatch(format!(
                "{num_queries} x {num_dataset} matrix is too large"
            ))
        })?;
        if values.len() != expected {
            return Err(EvaluationError::ShapeMismatch(format!(
                "expected {num_queries} x {num_dataset} = {expected} values, got {}",
                values.len()
            )));
        }
        Ok(Self {
            num_queries,
            num_dataset,
            values,
        })
    }

    /// Builds a matrix from per-query rows, which must all be the same length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, EvaluationError> {
        let num_queries = rows.len();
        let num_dataset = rows.first().map_or(0, Vec::len);

        let mut values = Vec::with_capacity(num_queries * num_dataset);
        for (q, row) in rows.into_iter().enumerate() {
            if row.len() != num_dataset {
                return Err(EvaluationError::ShapeMismatch(format!(
                    "row {q} has {} columns, expected {num_dataset}",
                    row.len()
                )));
            }
            values.extend(row);
        }

        Self::new(num_queries, num_dataset, values)
    }

    /// Computes `Q · Dᵀ` from query and dataset descriptors.
    ///
    /// With L2-normalized descriptors this is cosine similarity.
    pub fn from_features(
        queries: &[Vec<f32>],
        dataset: &[Vec<f32>],
    ) -> Result<Self, EvaluationError> {
        let dim = queries
            .first()
            .or_else(|| dataset.first())
            .map_or(0, Vec::len);

        let check = |kind: &str, i: usize, v: &[f32]| {
            if v.len() == dim {
                Ok(())
            } else {
                Err(EvaluationError::ShapeMismatch(format!(
                    "{kind} descriptor {i} has length {}, expected {dim}",
                    v.len()
                )))
            }
        };
        for (i, q) in queries.iter().enumerate() {
            check("query", i, q.as_slice())?;
        }
        for (i, d) in dataset.iter().enumerate() {
            check("dataset", i, d.as_slice())?;
        }

        let values = queries
            .iter()
            .flat_map(|q| dataset.iter().map(move |d| dot_product(q, d)))
            .collect();

        Self::new(queries.len(), dataset.len(), values)
    }

    pub fn num_queries(&self) -> usize {
        self.num_queries
    }

    pub fn num_dataset(&self) -> usize {
        self.num_dataset
    }

    /// Similarities of one query against every dataset item.
    ///
    /// # Panics
    ///
    /// Panics if `query >= num_queries()`.
    pub fn row(&self, query: usize) -> &[f32] {
        let start = query * self.num_dataset;
        &self.values[start..start + self.num_dataset]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.num_queries).map(move |q| self.row(q))
    }

    /// Checks the matrix against declared query and dataset counts.
    pub fn ensure_shape(
        &self,
        num_queries: usize,
        num_dataset: usize,
    ) -> Result<(), EvaluationError> {
        if self.num_queries != num_queries || self.num_dataset != num_dataset {
            return Err(EvaluationError::ShapeMismatch(format!(
                "matrix is {} x {}, expected {num_queries} x {num_dataset}",
                self.num_queries, self.num_dataset
            )));
        }
        Ok(())
    }
}

fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let sim = SimilarityMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(sim.num_queries(), 2);
        assert_eq!(sim.num_dataset(), 2);
        assert_eq!(sim.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = SimilarityMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, EvaluationError::ShapeMismatch(_)));
    }

    #[test]
    fn test_new_checks_length() {
        assert!(SimilarityMatrix::new(2, 3, vec![0.0; 6]).is_ok());
        assert!(matches!(
            SimilarityMatrix::new(2, 3, vec![0.0; 5]),
            Err(EvaluationError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_from_features_is_dot_product() {
        let queries = vec![vec![1.0, 0.0], vec![0.6, 0.8]];
        let dataset = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.6, 0.8]];
        let sim = SimilarityMatrix::from_features(&queries, &dataset).unwrap();

        assert_eq!(sim.num_queries(), 2);
        assert_eq!(sim.num_dataset(), 3);
        assert_eq!(sim.row(0), &[1.0, 0.0, 0.6]);
        assert!((sim.row(1)[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_from_features_rejects_mixed_dims() {
        let err = SimilarityMatrix::from_features(&[vec![1.0, 0.0]], &[vec![1.0]]).unwrap_err();
        assert!(matches!(err, EvaluationError::ShapeMismatch(_)));
    }

    #[test]
    fn test_ensure_shape() {
        let sim = SimilarityMatrix::new(2, 4, vec![0.0; 8]).unwrap();
        assert!(sim.ensure_shape(2, 4).is_ok());
        assert!(sim.ensure_shape(4, 2).is_err());
    }
}
