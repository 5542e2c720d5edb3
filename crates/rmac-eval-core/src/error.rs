//! Error types for rmac-eval-core.
//!
//! Every error here is a local precondition failure reported to the immediate
//! caller. The computations are deterministic, so none of them are worth
//! retrying.

use crate::regions::Region;
use thiserror::Error;

/// Errors that can occur while generating or packing regions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// Height, width, or level count was zero
    #[error("Invalid dimension: {name} must be positive (got {value})")]
    InvalidDimension {
        /// Which argument was rejected
        name: &'static str,
        /// The rejected value
        value: u64,
    },
    /// Packed row count disagrees with the sum of input region counts
    #[error("Packed {packed} rows but inputs hold {expected} regions")]
    SizeMismatch {
        /// Rows actually written
        packed: usize,
        /// Sum of the input list lengths
        expected: usize,
    },
    /// A region's far edge does not fit the coordinate type
    #[error("Malformed region {region:?} for image {image}")]
    MalformedRegion {
        /// Index of the owning image in the batch
        image: usize,
        /// The offending region
        region: Region,
    },
    /// A query box is malformed or leaves no pixels once cropped
    #[error("Invalid query box: {0}")]
    InvalidRoi(String),
}

/// Errors that can occur while scoring a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    /// Matrix shape, descriptor length, or relevance index out of range
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    /// The query has no relevant items, so precision and AP are undefined
    #[error("Metric undefined for query {query}: relevance set is empty")]
    UndefinedMetric {
        /// Index of the offending query
        query: usize,
    },
    /// No query produced a score to average
    #[error("No scored queries to average")]
    EmptyMean,
}

impl From<EvaluationError> for String {
    fn from(err: EvaluationError) -> String {
        err.to_string()
    }
}

impl From<RegionError> for String {
    fn from(err: RegionError) -> String {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_culprit() {
        let err = RegionError::InvalidDimension {
            name: "height",
            value: 0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid dimension: height must be positive (got 0)"
        );

        let err = EvaluationError::UndefinedMetric { query: 3 };
        assert!(err.to_string().contains("query 3"));
    }
}
