//! Query bounding boxes.
//!
//! Oxford-style ground truth gives every query a box in original image
//! pixels. The query descriptor is extracted from that box alone, so its grid
//! is planned over the cropped region of the resized image, not over the
//! whole image.

use super::scale::{network_regions, plan_scale, scaled_dimensions, ScalePlan};
use super::types::PackedRegionTable;
use crate::error::RegionError;
use serde::{Deserialize, Serialize};

/// Query box `[x0, x1) × [y0, y1)` in original image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryRoi {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl QueryRoi {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Checks that every corner is finite, non-negative, and that the box has
    /// positive area.
    pub fn validate(&self) -> Result<(), RegionError> {
        let corners = [self.x0, self.y0, self.x1, self.y1];
        if corners.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(RegionError::InvalidRoi(format!(
                "{:?} has a negative or non-finite corner",
                self
            )));
        }
        if self.x1 <= self.x0 || self.y1 <= self.y0 {
            return Err(RegionError::InvalidRoi(format!("{:?} is empty", self)));
        }
        Ok(())
    }
}

/// Height and width of the box crop once the image is resized so its longer
/// side equals `max_side`.
///
/// Corners are scaled by the resize ratio, rounded half to even, and clamped
/// to the resized image.
///
/// # Errors
///
/// - [`RegionError::InvalidDimension`] if any size is zero
/// - [`RegionError::InvalidRoi`] if the box is malformed or the crop is empty
pub fn cropped_dimensions(
    height: u32,
    width: u32,
    max_side: u32,
    roi: &QueryRoi,
) -> Result<(u32, u32), RegionError> {
    roi.validate()?;
    let (resized_h, resized_w) = scaled_dimensions(height, width, max_side)?;

    let ratio = f64::from(max_side) / f64::from(height.max(width));
    let scale = |corner: f32, limit: u32| {
        (f64::from(corner) * ratio)
            .round_ties_even()
            .clamp(0.0, f64::from(limit)) as u32
    };
    let (x0, x1) = (scale(roi.x0, resized_w), scale(roi.x1, resized_w));
    let (y0, y1) = (scale(roi.y0, resized_h), scale(roi.y1, resized_h));

    if x1 <= x0 || y1 <= y0 {
        return Err(RegionError::InvalidRoi(format!(
            "{roi:?} leaves no pixels in the {resized_h}x{resized_w} resized image"
        )));
    }
    Ok((y1 - y0, x1 - x0))
}

/// RoI table for a query image cropped to its box.
pub fn query_regions(
    height: u32,
    width: u32,
    max_side: u32,
    levels: u32,
    roi: &QueryRoi,
) -> Result<PackedRegionTable, RegionError> {
    let (h, w) = cropped_dimensions(height, width, max_side, roi)?;
    network_regions(h, w, levels)
}

/// Plans one grid per extraction scale over the box crop.
pub fn multi_scale_query_regions(
    height: u32,
    width: u32,
    roi: &QueryRoi,
    scales: &[u32],
    levels: u32,
) -> Result<Vec<ScalePlan>, RegionError> {
    scales
        .iter()
        .map(|&max_side| {
            let (h, w) = cropped_dimensions(height, width, max_side, roi)?;
            plan_scale(max_side, h, w, levels)
        })
        .collect()
}
