//! Descriptor aggregation ahead of similarity computation.
//!
//! Region-pooled features become one global descriptor per image in up to
//! three steps:
//!
//! 1. [`aggregate_regions`] - sum the pooled vectors of every region, then
//!    L2-normalize (the R-MAC descriptor of one image at one scale)
//! 2. [`sum_scales`] - add the descriptors extracted at each resolution
//! 3. [`concat_layers`] - join descriptors taken from several layers and
//!    renormalize the result
//!
//! Blocks are `Vec<Vec<f32>>`, one row per image, the same layout
//! [`SimilarityMatrix::from_features`](super::SimilarityMatrix::from_features)
//! takes.

use crate::config::DESCRIPTOR_EPS;
use crate::error::EvaluationError;

/// Divides `v` by `eps + ‖v‖₂`, so an all-zero vector stays zero.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = DESCRIPTOR_EPS + norm;
    for x in v.iter_mut() {
        *x /= denom;
    }
}

/// Sums region-pooled vectors into one normalized descriptor.
///
/// # Errors
///
/// [`EvaluationError::ShapeMismatch`] if there are no regions or their
/// lengths differ.
pub fn aggregate_regions(pooled: &[Vec<f32>]) -> Result<Vec<f32>, EvaluationError> {
    let first = pooled
        .first()
        .ok_or_else(|| EvaluationError::ShapeMismatch("no pooled regions".to_string()))?;

    let mut descriptor = vec![0.0f32; first.len()];
    for (r, region) in pooled.iter().enumerate() {
        if region.len() != descriptor.len() {
            return Err(EvaluationError::ShapeMismatch(format!(
                "region {r} has length {}, expected {}",
                region.len(),
                descriptor.len()
            )));
        }
        for (acc, x) in descriptor.iter_mut().zip(region) {
            *acc += x;
        }
    }

    l2_normalize(&mut descriptor);
    Ok(descriptor)
}

/// Adds per-scale descriptor blocks element-wise.
///
/// Every block must hold the same number of rows of the same length. The sum
/// is not renormalized; cosine ranking is unaffected by the common scale.
pub fn sum_scales(blocks: &[Vec<Vec<f32>>]) -> Result<Vec<Vec<f32>>, EvaluationError> {
    let first = blocks
        .first()
        .ok_or_else(|| EvaluationError::ShapeMismatch("no scales to sum".to_string()))?;

    let mut sum = first.clone();
    for (s, block) in blocks.iter().enumerate().skip(1) {
        if block.len() != sum.len() {
            return Err(EvaluationError::ShapeMismatch(format!(
                "scale {s} has {} descriptors, expected {}",
                block.len(),
                sum.len()
            )));
        }
        for (i, (acc, row)) in sum.iter_mut().zip(block).enumerate() {
            if row.len() != acc.len() {
                return Err(EvaluationError::ShapeMismatch(format!(
                    "scale {s} descriptor {i} has length {}, expected {}",
                    row.len(),
                    acc.len()
                )));
            }
            for (a, x) in acc.iter_mut().zip(row) {
                *a += x;
            }
        }
    }

    Ok(sum)
}

/// Concatenates per-layer descriptor blocks row by row and renormalizes.
///
/// Layers may differ in dimension but must describe the same images.
pub fn concat_layers(blocks: &[Vec<Vec<f32>>]) -> Result<Vec<Vec<f32>>, EvaluationError> {
    let rows = blocks
        .first()
        .ok_or_else(|| EvaluationError::ShapeMismatch("no layers to concatenate".to_string()))?
        .len();

    if let Some((l, block)) = blocks.iter().enumerate().find(|(_, b)| b.len() != rows) {
        return Err(EvaluationError::ShapeMismatch(format!(
            "layer {l} has {} descriptors, expected {rows}",
            block.len()
        )));
    }

    Ok((0..rows)
        .map(|i| {
            let mut row: Vec<f32> = blocks.iter().flat_map(|b| b[i].iter().copied()).collect();
            l2_normalize(&mut row);
            row
        })
        .collect())
}
