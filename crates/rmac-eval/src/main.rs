//! rmac-eval - R-MAC region grids and retrieval evaluation.
//!
//! # Usage
//!
//! ```bash
//! # Score a similarity matrix against a cover-style ground truth
//! rmac-eval score --sim sim.json --dataset data/cover/test
//! rmac-eval score --sim sim.json --per-query --json
//!
//! # Score raw descriptors against Oxford buildings, junk images ignored
//! rmac-eval score --features features.json --combine concat \
//!     --format oxford --dataset data/oxford5k
//!
//! # Print the region grid for a 768x1024 image at every default scale
//! rmac-eval regions --height 768 --width 1024 --levels 2
//!
//! # MAC (whole image) region of a query cropped to its box
//! rmac-eval regions --height 768 --width 1024 --levels 0 --roi 100,50,500,450
//! ```
//!
//! The similarity matrix is a JSON array of rows, one row per query and one
//! column per dataset image, in the ground truth's order. A features file is
//! `{"queries": [block, ...], "dataset": [block, ...]}`, each block holding
//! one descriptor row per image for one scale or layer.

mod config;
mod dataset;
mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use config::GroundTruthFormat;
use rmac_eval_core::config::{
    EmptyRelevancePolicy, EvaluatorConfig, DEFAULT_LEVELS, DEFAULT_MAX_SIDE, DEFAULT_SCALES,
};
use rmac_eval_core::evaluation::{concat_layers, evaluate, sum_scales, SimilarityMatrix};
use rmac_eval_core::regions::{
    multi_scale_query_regions, multi_scale_regions, pack_regions, QueryRoi, Region,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

// =============================================================================
// CLI
// =============================================================================

/// R-MAC region grids and retrieval evaluation.
#[derive(Parser)]
#[command(name = "rmac-eval", version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute precision and mAP for a similarity matrix
    Score {
        /// JSON file holding the query x dataset similarity matrix
        #[arg(long, required_unless_present = "features", conflicts_with = "features")]
        sim: Option<PathBuf>,

        /// JSON file holding query and dataset descriptor blocks
        #[arg(long)]
        features: Option<PathBuf>,

        /// How descriptor blocks are combined before similarities are taken
        #[arg(long, value_enum, default_value_t = Combine::Sum)]
        combine: Combine,

        /// Ground-truth directory (default: $RMAC_EVAL_DATASET_DIR or cwd)
        #[arg(long)]
        dataset: Option<PathBuf>,

        /// Ground-truth layout
        #[arg(long, value_enum, default_value_t = GroundTruthFormat::Cover)]
        format: GroundTruthFormat,

        /// Leave queries without answers out of the means instead of failing
        #[arg(long)]
        skip_empty: bool,

        /// Score queries on a single thread
        #[arg(long)]
        sequential: bool,

        /// Show per-query breakdown
        #[arg(long)]
        per_query: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the R-MAC regions of an image
    Regions {
        /// Image height in pixels
        #[arg(long)]
        height: u32,

        /// Image width in pixels
        #[arg(long)]
        width: u32,

        /// Spatial levels (0 for a single whole-image region)
        #[arg(short = 'l', long, default_value_t = DEFAULT_LEVELS)]
        levels: u32,

        /// Query box x0,y0,x1,y1 in original pixels; plans over the crop
        #[arg(long, value_delimiter = ',')]
        roi: Option<Vec<f32>>,

        /// Longer-side sizes to plan for (comma-separated)
        #[arg(long, value_delimiter = ',')]
        scales: Option<Vec<u32>>,

        /// Plan for the default single scale instead of the multi-scale set
        #[arg(long, conflicts_with = "scales")]
        single_scale: bool,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Descriptor combination for `score --features`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Combine {
    /// Element-wise sum of per-scale blocks
    Sum,
    /// Row-wise concatenation of per-layer blocks, renormalized
    Concat,
}

/// Descriptor blocks for `score --features`.
#[derive(Deserialize)]
struct FeatureFile {
    queries: Vec<Vec<Vec<f32>>>,
    dataset: Vec<Vec<Vec<f32>>>,
}

/// Where `score` takes its similarities from.
enum SimilaritySource {
    Matrix(PathBuf),
    Features(PathBuf, Combine),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let output = match cli.command {
        Command::Score {
            sim,
            features,
            combine,
            dataset,
            format,
            skip_empty,
            sequential,
            per_query,
            json,
        } => {
            let mut config = EvaluatorConfig::default();
            if skip_empty {
                config = config.with_empty_relevance(EmptyRelevancePolicy::Skip);
            }
            if sequential {
                config = config.sequential();
            }
            let source = match (sim, features) {
                (Some(path), _) => SimilaritySource::Matrix(path),
                (None, Some(path)) => SimilaritySource::Features(path, combine),
                (None, None) => bail!("Pass --sim or --features"),
            };
            run_score(&source, dataset.as_ref(), format, &config, per_query, json)?
        }
        Command::Regions {
            height,
            width,
            levels,
            roi,
            scales,
            single_scale,
            json,
        } => {
            let scales = if single_scale {
                vec![DEFAULT_MAX_SIDE]
            } else {
                scales.unwrap_or_else(|| DEFAULT_SCALES.to_vec())
            };
            let roi = roi.as_deref().map(parse_roi).transpose()?;
            run_regions(height, width, levels, roi.as_ref(), &scales, json)?
        }
    };

    println!("{}", output);
    Ok(())
}

// =============================================================================
// Commands
// =============================================================================

fn run_score(
    source: &SimilaritySource,
    dataset_dir: Option<&PathBuf>,
    format: GroundTruthFormat,
    config: &EvaluatorConfig,
    per_query: bool,
    json: bool,
) -> Result<String> {
    let dir = config::find_dataset_dir(dataset_dir, format)?;
    let truth = dataset::load(&dir, format)?;
    info!(
        dir = %dir.display(),
        queries = truth.num_queries(),
        dataset = truth.num_dataset(),
        "loaded ground truth"
    );

    let sim = match source {
        SimilaritySource::Matrix(path) => load_similarity(path)?,
        SimilaritySource::Features(path, combine) => load_features(path, *combine)?,
    };
    sim.ensure_shape(truth.num_queries(), truth.num_dataset())
        .context("Similarity matrix does not match the ground truth")?;

    let report = evaluate(&sim, &truth.relevance, config).context("Evaluation failed")?;

    Ok(if json {
        output::format_report_json(&truth.queries, truth.num_dataset(), &report, per_query)
    } else {
        output::format_report_human(&truth.queries, &report, per_query)
    })
}

fn run_regions(
    height: u32,
    width: u32,
    levels: u32,
    roi: Option<&QueryRoi>,
    scales: &[u32],
    json: bool,
) -> Result<String> {
    let plans = match roi {
        Some(roi) => multi_scale_query_regions(height, width, roi, scales, levels),
        None => multi_scale_regions(height, width, scales, levels),
    }
    .context("Failed to plan region grids")?;

    Ok(if json {
        let grids: Vec<&[Region]> = plans.iter().map(|p| p.regions.as_slice()).collect();
        let table = pack_regions(&grids).context("Failed to pack regions")?;
        output::format_regions_json(&plans, &table)
    } else {
        output::format_regions_human(&plans)
    })
}

fn load_similarity(path: &Path) -> Result<SimilarityMatrix> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read similarity matrix: {}", path.display()))?;
    let rows: Vec<Vec<f32>> = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse similarity matrix: {}", path.display()))?;
    Ok(SimilarityMatrix::from_rows(rows)?)
}

fn load_features(path: &Path, combine: Combine) -> Result<SimilarityMatrix> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read features: {}", path.display()))?;
    let file: FeatureFile = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse features: {}", path.display()))?;

    let merge = |blocks: &[Vec<Vec<f32>>]| match combine {
        Combine::Sum => sum_scales(blocks),
        Combine::Concat => concat_layers(blocks),
    };
    let queries = merge(&file.queries).context("Failed to combine query descriptors")?;
    let dataset = merge(&file.dataset).context("Failed to combine dataset descriptors")?;
    info!(
        blocks = file.queries.len(),
        dim = queries.first().map_or(0, Vec::len),
        "combined descriptors"
    );

    Ok(SimilarityMatrix::from_features(&queries, &dataset)?)
}

fn parse_roi(corners: &[f32]) -> Result<QueryRoi> {
    let &[x0, y0, x1, y1] = corners else {
        bail!("--roi takes 4 values (x0,y0,x1,y1), got {}", corners.len());
    };
    Ok(QueryRoi::new(x0, y0, x1, y1))
}
