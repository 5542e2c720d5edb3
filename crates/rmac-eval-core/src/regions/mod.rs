//! R-MAC region grids for regional max-pooling.
//!
//! A regional descriptor is built by max-pooling a convolutional feature map
//! over a fixed set of square windows and aggregating the results. This module
//! plans those windows in image pixel space:
//!
//! - [`grid`] - The multi-scale overlapping grid (`generate_regions`)
//! - [`pack`] - Flattening per-image grids into one RoI table (`pack_regions`)
//! - [`scale`] - Whole-image (MAC) regions and multi-resolution planning
//! - [`roi`] - Grids over a query's bounding-box crop
//! - [`types`] - `Region`, `PackedRegion`, `PackedRegionTable`
//!
//! # Example
//!
//! ```
//! use rmac_eval_core::regions::{generate_regions, pack_regions};
//!
//! let query = generate_regions(300, 300, 2).unwrap();
//! let reference = generate_regions(384, 512, 2).unwrap();
//! let table = pack_regions(&[query, reference]).unwrap();
//! assert_eq!(table.len(), 5 + 8);
//! ```

pub mod grid;
pub mod pack;
pub mod roi;
pub mod scale;
pub mod types;

pub use grid::generate_regions;
pub use pack::pack_regions;
pub use roi::{cropped_dimensions, multi_scale_query_regions, query_regions, QueryRoi};
pub use scale::{
    full_image_region, image_regions, multi_scale_regions, network_regions, scaled_dimensions,
    ScalePlan,
};
pub use types::{PackedRegion, PackedRegionTable, Region};
