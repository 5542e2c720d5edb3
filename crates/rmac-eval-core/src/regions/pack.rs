//! Packing per-image region lists into one RoI pooling table.

use super::types::{PackedRegion, PackedRegionTable, Region};
use crate::error::RegionError;

/// Flattens the regions of a batch of images into one table.
///
/// Image `i` contributes one row per region, in list order, tagged with
/// `image_index = i`. Coordinates are converted from `(x, y, width, height)`
/// to inclusive `(x0, y0, x1, y1)`.
///
/// # Errors
///
/// - [`RegionError::MalformedRegion`] if a region's far edge overflows `u32`
/// - [`RegionError::SizeMismatch`] if the row count does not match the input
///
/// # Example
///
/// ```
/// use rmac_eval_core::regions::{pack_regions, Region};
///
/// let table = pack_regions(&[vec![Region::new(0, 0, 10, 10)]]).unwrap();
/// assert_eq!((table.rows()[0].x1, table.rows()[0].y1), (9, 9));
/// ```
pub fn pack_regions<R>(image_regions: &[R]) -> Result<PackedRegionTable, RegionError>
where
    R: AsRef<[Region]>,
{
    let expected: usize = image_regions.iter().map(|r| r.as_ref().len()).sum();
    let mut rows = Vec::with_capacity(expected);

    for (image, regions) in image_regions.iter().enumerate() {
        for region in regions.as_ref() {
            rows.push(pack_one(image, region)?);
        }
    }

    if rows.len() != expected {
        return Err(RegionError::SizeMismatch {
            packed: rows.len(),
            expected,
        });
    }

    Ok(PackedRegionTable::from_rows(rows))
}

fn pack_one(image: usize, region: &Region) -> Result<PackedRegion, RegionError> {
    let malformed = || RegionError::MalformedRegion {
        image,
        region: *region,
    };
    let right = region.x.checked_add(region.width).ok_or_else(malformed)?;
    let bottom = region.y.checked_add(region.height).ok_or_else(malformed)?;

    Ok(PackedRegion {
        image_index: image,
        x0: i64::from(region.x),
        y0: i64::from(region.y),
        x1: i64::from(right) - 1,
        y1: i64::from(bottom) - 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::generate_regions;

    #[test]
    fn test_image_index_column() {
        let first = generate_regions(300, 300, 2).unwrap();
        let second = generate_regions(384, 512, 2).unwrap();
        let table = pack_regions(&[first.clone(), second.clone()]).unwrap();

        let mut expected = vec![0; first.len()];
        expected.extend(vec![1; second.len()]);
        assert_eq!(table.image_indices(), expected);

        for (row, region) in table.iter().zip(first.iter().chain(second.iter())) {
            assert_eq!(row.x0, i64::from(region.x));
            assert_eq!(row.y0, i64::from(region.y));
            assert_eq!(row.x1, i64::from(region.x + region.width) - 1);
            assert_eq!(row.y1, i64::from(region.y + region.height) - 1);
        }
    }

    #[test]
    fn test_empty_image_keeps_index_alignment() {
        let regions = vec![Region::new(0, 0, 4, 4)];
        let table = pack_regions(&[Vec::new(), regions]).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].image_index, 1);
    }

    #[test]
    fn test_empty_batch() {
        let table = pack_regions::<Vec<Region>>(&[]).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_zero_sized_region_packs_to_negative_extent() {
        let table = pack_regions(&[[Region::new(0, 0, 0, 0)]]).unwrap();
        assert_eq!(table.rows()[0].x1, -1);
        assert_eq!(table.rows()[0].width(), 0);
    }

    #[test]
    fn test_overflowing_region_reported() {
        let bad = Region::new(u32::MAX, 0, 2, 2);
        let err = pack_regions(&[vec![Region::new(0, 0, 1, 1)], vec![bad]]).unwrap_err();
        assert_eq!(
            err,
            RegionError::MalformedRegion {
                image: 1,
                region: bad
            }
        );
    }
}
