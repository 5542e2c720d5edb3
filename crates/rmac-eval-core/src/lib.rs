//! # rmac-eval core
//!
//! Platform-independent library for R-MAC region grids and retrieval-quality
//! metrics.
//!
//! This crate holds the pure algorithms behind the `rmac-eval` tool so they can
//! be reused by anything that extracts regional descriptors or scores rankings.
//! Nothing here touches images, networks, or the filesystem: callers hand in
//! image dimensions and similarity matrices and get back regions and metrics.
//!
//! ## Modules
//!
//! - [`regions`] - Multi-scale R-MAC grid generation and packing for RoI pooling
//! - [`evaluation`] - Descriptor aggregation, precision-at-k, and interpolated mAP
//! - [`config`] - Grid and evaluation constants
//! - [`error`] - Error types for region and evaluation operations

pub mod config;
pub mod error;
pub mod evaluation;
pub mod regions;

pub use error::{EvaluationError, RegionError};
