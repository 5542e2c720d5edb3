use serde::{Deserialize, Serialize};

/// Axis-aligned pooling window in pixel coordinates.
///
/// Regions produced by [`generate_regions`](super::generate_regions) are
/// square and lie fully inside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Extent along x
    pub width: u32,
    /// Extent along y
    pub height: u32,
}

impl Region {
    /// Creates a region from its top-left corner and size.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns true if the region lies inside an image of the given size.
    pub fn fits_within(&self, height: u32, width: u32) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }

    /// Returns true if width and height are equal.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

/// One row of a RoI pooling table.
///
/// Bounds are inclusive: `x1 = x + width - 1`, `y1 = y + height - 1`.
/// They are signed because a zero-sized region packs to `x1 = x0 - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackedRegion {
    /// Position of the owning image in the batch
    pub image_index: usize,
    /// Left edge, inclusive
    pub x0: i64,
    /// Top edge, inclusive
    pub y0: i64,
    /// Right edge, inclusive
    pub x1: i64,
    /// Bottom edge, inclusive
    pub y1: i64,
}

impl PackedRegion {
    /// Width recovered from the inclusive bounds.
    pub fn width(&self) -> i64 {
        self.x1 - self.x0 + 1
    }

    /// Height recovered from the inclusive bounds.
    pub fn height(&self) -> i64 {
        self.y1 - self.y0 + 1
    }

    /// The `[image_index, x0, y0, x1, y1]` float layout RoI pooling layers take.
    pub fn to_network_row(&self) -> [f32; 5] {
        [
            self.image_index as f32,
            self.x0 as f32,
            self.y0 as f32,
            self.x1 as f32,
            self.y1 as f32,
        ]
    }
}

/// Regions of a batch of images, flattened in image order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedRegionTable {
    rows: Vec<PackedRegion>,
}

impl PackedRegionTable {
    pub(crate) fn from_rows(rows: Vec<PackedRegion>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[PackedRegion] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PackedRegion> {
        self.rows.iter()
    }

    /// The owning-image column, one entry per row.
    pub fn image_indices(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.image_index).collect()
    }

    /// All rows in the network float layout.
    pub fn to_network_rows(&self) -> Vec<[f32; 5]> {
        self.rows.iter().map(PackedRegion::to_network_row).collect()
    }
}

impl<'a> IntoIterator for &'a PackedRegionTable {
    type Item = &'a PackedRegion;
    type IntoIter = std::slice::Iter<'a, PackedRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_within() {
        let region = Region::new(100, 0, 200, 200);
        assert!(region.fits_within(200, 300));
        assert!(!region.fits_within(200, 299));
        assert!(!region.fits_within(199, 300));
    }

    #[test]
    fn test_network_row_layout() {
        let row = PackedRegion {
            image_index: 2,
            x0: 10,
            y0: 20,
            x1: 109,
            y1: 119,
        };
        assert_eq!(row.to_network_row(), [2.0, 10.0, 20.0, 109.0, 119.0]);
        assert_eq!(row.width(), 100);
        assert_eq!(row.height(), 100);
    }
}
