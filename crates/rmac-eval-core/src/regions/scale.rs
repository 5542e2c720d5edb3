//! Whole-image regions and multi-resolution grid planning.
//!
//! Descriptors are usually extracted at several image sizes and summed. The
//! grid depends on the resized dimensions, so each scale gets its own plan.

use super::grid::generate_regions;
use super::pack::pack_regions;
use super::types::{PackedRegionTable, Region};
use crate::error::RegionError;
use serde::Serialize;

/// Region plan for one extraction scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalePlan {
    /// Requested longer-side size
    pub max_side: u32,
    /// Height after resizing
    pub height: u32,
    /// Width after resizing
    pub width: u32,
    /// Regions over the resized image
    pub regions: Vec<Region>,
}

/// Dimensions of an image resized so its longer side equals `max_side`.
///
/// Each side is scaled by the same ratio and rounded half to even, never
/// below one pixel.
///
/// # Errors
///
/// [`RegionError::InvalidDimension`] if any argument is zero.
pub fn scaled_dimensions(height: u32, width: u32, max_side: u32) -> Result<(u32, u32), RegionError> {
    for (name, value) in [("height", height), ("width", width), ("max_side", max_side)] {
        if value == 0 {
            return Err(RegionError::InvalidDimension {
                name,
                value: u64::from(value),
            });
        }
    }

    let ratio = f64::from(max_side) / f64::from(height.max(width));
    let scale = |dim: u32| (f64::from(dim) * ratio).round_ties_even().max(1.0) as u32;
    Ok((scale(height), scale(width)))
}

/// The single region covering the whole image (MAC pooling).
pub fn full_image_region(height: u32, width: u32) -> Region {
    Region::new(0, 0, width, height)
}

/// Regions of one image: the whole image when `levels == 0`, else the R-MAC
/// grid.
pub fn image_regions(height: u32, width: u32, levels: u32) -> Result<Vec<Region>, RegionError> {
    if levels == 0 {
        for (name, value) in [("height", height), ("width", width)] {
            if value == 0 {
                return Err(RegionError::InvalidDimension {
                    name,
                    value: u64::from(value),
                });
            }
        }
        return Ok(vec![full_image_region(height, width)]);
    }
    generate_regions(height, width, levels)
}

/// RoI table for one image, as [`image_regions`] lays it out.
pub fn network_regions(
    height: u32,
    width: u32,
    levels: u32,
) -> Result<PackedRegionTable, RegionError> {
    pack_regions(&[image_regions(height, width, levels)?])
}

/// Plans one grid per extraction scale.
///
/// A level count of 0 plans the single whole-image region at every scale.
pub fn multi_scale_regions(
    height: u32,
    width: u32,
    scales: &[u32],
    levels: u32,
) -> Result<Vec<ScalePlan>, RegionError> {
    scales
        .iter()
        .map(|&max_side| {
            let (h, w) = scaled_dimensions(height, width, max_side)?;
            plan_scale(max_side, h, w, levels)
        })
        .collect()
}

pub(crate) fn plan_scale(
    max_side: u32,
    height: u32,
    width: u32,
    levels: u32,
) -> Result<ScalePlan, RegionError> {
    Ok(ScalePlan {
        max_side,
        height,
        width,
        regions: image_regions(height, width, levels)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_SCALES;

    #[test]
    fn test_scaled_dimensions() {
        assert_eq!(scaled_dimensions(768, 1024, 512).unwrap(), (384, 512));
        assert_eq!(scaled_dimensions(1024, 768, 512).unwrap(), (512, 384));
        assert_eq!(scaled_dimensions(100, 100, 248).unwrap(), (248, 248));
    }

    #[test]
    fn test_scaled_dimensions_rounds_half_to_even() {
        // ratio 2.5: 1 -> 2.5 -> 2, 3 -> 7.5 -> 8
        assert_eq!(scaled_dimensions(4, 1, 10).unwrap(), (10, 2));
        assert_eq!(scaled_dimensions(4, 3, 10).unwrap(), (10, 8));
    }

    #[test]
    fn test_scaled_dimensions_never_zero() {
        assert_eq!(scaled_dimensions(1, 1000, 10).unwrap(), (1, 10));
    }

    #[test]
    fn test_mac_region_when_no_levels() {
        let table = network_regions(384, 512, 0).unwrap();
        assert_eq!(table.to_network_rows(), vec![[0.0, 0.0, 0.0, 511.0, 383.0]]);
    }

    #[test]
    fn test_mac_region_rejects_empty_image() {
        assert!(matches!(
            network_regions(0, 512, 0),
            Err(RegionError::InvalidDimension { name: "height", .. })
        ));
    }

    #[test]
    fn test_multi_scale_mac_plans() {
        let plans = multi_scale_regions(768, 1024, &DEFAULT_SCALES, 0).unwrap();
        let regions: Vec<_> = plans.iter().map(|p| p.regions.clone()).collect();
        assert_eq!(
            regions,
            vec![
                vec![Region::new(0, 0, 248, 186)],
                vec![Region::new(0, 0, 496, 372)],
                vec![Region::new(0, 0, 744, 558)],
            ]
        );
    }

    #[test]
    fn test_rmac_regions_when_levels_given() {
        let table = network_regions(384, 512, 2).unwrap();
        assert_eq!(table.len(), 8);
    }

    #[test]
    fn test_multi_scale_plans() {
        let plans = multi_scale_regions(768, 1024, &DEFAULT_SCALES, 2).unwrap();
        let dims: Vec<_> = plans.iter().map(|p| (p.height, p.width)).collect();
        assert_eq!(dims, vec![(186, 248), (372, 496), (558, 744)]);
        for plan in &plans {
            assert!(plan
                .regions
                .iter()
                .all(|r| r.fits_within(plan.height, plan.width)));
        }
    }
}
