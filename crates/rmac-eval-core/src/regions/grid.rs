//! Multi-scale R-MAC grid generation.
//!
//! The grid follows the regional MAC scheme of Tolias et al.: at level `l`
//! square regions of side `floor(2w / (l + 1))` (with `w` the short side) are
//! laid out uniformly, `l` per short side and `l + extra` per long side. The
//! number of extra regions along the long side is chosen once per image so
//! that neighbouring level-1 regions overlap by roughly
//! [`TARGET_OVERLAP`](crate::config::TARGET_OVERLAP).
//!
//! # Rounding
//!
//! Centers are synthesised with `floor`, then every coordinate is rounded to
//! the nearest integer and shifted back inside the image. Swapping either
//! rule moves region borders by a pixel, so both are kept exactly.

use super::types::Region;
use crate::config::{LONG_SIDE_STEPS, TARGET_OVERLAP_RATIO};
use crate::error::RegionError;
use std::cmp::Ordering;
use tracing::debug;

/// Generates the R-MAC regions of an image, level by level.
///
/// Regions are returned level 1 first; within a level, row-major (top to
/// bottom, then left to right).
///
/// # Arguments
///
/// * `height` - Image height in pixels
/// * `width` - Image width in pixels
/// * `levels` - Number of spatial levels (`L`)
///
/// # Errors
///
/// [`RegionError::InvalidDimension`] if any argument is zero.
///
/// # Example
///
/// ```
/// use rmac_eval_core::regions::generate_regions;
///
/// let regions = generate_regions(384, 512, 1).unwrap();
/// // Two 384px squares along the long side, the second flush right.
/// assert_eq!(regions.len(), 2);
/// assert_eq!((regions[1].x, regions[1].width), (128, 384));
/// ```
pub fn generate_regions(height: u32, width: u32, levels: u32) -> Result<Vec<Region>, RegionError> {
    require_positive("height", height)?;
    require_positive("width", width)?;
    require_positive("levels", levels)?;

    let short_side = f64::from(height.min(width));
    let extra = long_side_extra_regions(height, width);
    let (extra_w, extra_h) = match width.cmp(&height) {
        Ordering::Greater => (extra, 0),
        Ordering::Less => (0, extra),
        Ordering::Equal => (0, 0),
    };
    debug!(height, width, extra, "chosen long-side region count");

    let mut regions = Vec::new();
    for level in 1..=levels {
        let side = (2.0 * short_side / f64::from(level + 1)).floor();
        let half = (side / 2.0).floor() - 1.0;

        let xs = centers(f64::from(width), side, half, level, extra_w);
        let ys = centers(f64::from(height), side, half, level, extra_h);

        for &y in &ys {
            for &x in &xs {
                regions.push(snap_inside(x, y, side, height, width));
            }
        }
        debug!(level, side, count = xs.len() * ys.len(), "generated level");
    }

    Ok(regions)
}

fn require_positive(name: &'static str, value: u32) -> Result<(), RegionError> {
    if value == 0 {
        return Err(RegionError::InvalidDimension {
            name,
            value: u64::from(value),
        });
    }
    Ok(())
}

/// Number of regions beyond one that level 1 places along the long side.
///
/// Returns the 1-based position of the step candidate whose overlap is
/// closest to the target; the first candidate wins ties.
///
/// With `w` the short side, `d = long - w` and `s` steps, the overlap is
/// `1 - d / (w (s - 1))`. Its distance to `p / q` is the fraction
/// `|(q - p) w (s - 1) - q d| / (q w (s - 1))`, compared exactly by
/// cross-multiplication so equal distances are never split by rounding.
fn long_side_extra_regions(height: u32, width: u32) -> u32 {
    let short = u128::from(height.min(width));
    let excess = u128::from(height.max(width)) - short;
    let (num, den) = TARGET_OVERLAP_RATIO;
    let (num, den) = (u128::from(num), u128::from(den));

    let mut best_pos = 0;
    let mut best: Option<(u128, u128)> = None;
    for (pos, &steps) in LONG_SIDE_STEPS.iter().enumerate() {
        let span = short * u128::from(steps - 1);
        let err = ((den - num) * span).abs_diff(den * excess);
        let scale = den * span;
        let closer = match best {
            None => true,
            Some((best_err, best_scale)) => err * best_scale < best_err * scale,
        };
        if closer {
            best = Some((err, scale));
            best_pos = pos;
        }
    }

    best_pos as u32 + 1
}

/// Top-left offsets of the `level + extra` regions along one axis.
fn centers(axis_len: f64, side: f64, half: f64, level: u32, extra: u32) -> Vec<f64> {
    let intervals = level + extra - 1;
    let step = if intervals > 0 {
        (axis_len - side) / f64::from(intervals)
    } else {
        0.0
    };

    (0..=intervals)
        .map(|i| (half + step * f64::from(i)).floor() - half)
        .collect()
}

/// Rounds a region to whole pixels and shifts it back inside the image.
fn snap_inside(x: f64, y: f64, side: f64, height: u32, width: u32) -> Region {
    let side = side.round().max(0.0) as u64;
    let mut x = x.round().max(0.0) as u64;
    let mut y = y.round().max(0.0) as u64;

    let (width, height) = (u64::from(width), u64::from(height));
    if x + side > width {
        x -= x + side - width;
    }
    if y + side > height {
        y -= y + side - height;
    }

    // side <= short side, so every value fits back into u32.
    Region::new(x as u32, y as u32, side as u32, side as u32)
}
