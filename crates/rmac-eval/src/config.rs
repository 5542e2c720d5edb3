//! Configuration and path resolution for the CLI.
//!
//! Handles finding the ground-truth directory:
//! - Explicit: `--dataset`
//! - Custom: environment variable
//! - Fallback: the working directory

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

/// Query names, one per line.
pub const QUERY_FILENAME: &str = "query.txt";

/// Relevant dataset file names per query, space-separated, one query per line.
pub const ANSWER_FILENAME: &str = "answer.txt";

/// Directory whose sorted entries define the dataset column order.
pub const DATASET_DIRNAME: &str = "dataset";

/// Oxford label directory (`<query>_query.txt`, `_good`, `_ok`, `_junk`).
pub const LAB_DIRNAME: &str = "lab";

/// Oxford image directory; sorted file stems define the column order.
pub const IMAGE_DIRNAME: &str = "jpg";

/// Environment variable for a default ground-truth directory.
const DATASET_DIR_ENV: &str = "RMAC_EVAL_DATASET_DIR";

/// On-disk ground-truth layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GroundTruthFormat {
    /// `query.txt`, `answer.txt` and a `dataset/` directory
    #[default]
    Cover,
    /// Oxford/Paris buildings: `lab/` label files and a `jpg/` directory
    Oxford,
}

impl GroundTruthFormat {
    fn matches(self, dir: &Path) -> bool {
        match self {
            Self::Cover => dir.join(QUERY_FILENAME).is_file() && dir.join(ANSWER_FILENAME).is_file(),
            Self::Oxford => dir.join(LAB_DIRNAME).is_dir() && dir.join(IMAGE_DIRNAME).is_dir(),
        }
    }

    fn expected_contents(self) -> String {
        match self {
            Self::Cover => format!(
                "{}, {} and a {}/ directory",
                QUERY_FILENAME, ANSWER_FILENAME, DATASET_DIRNAME
            ),
            Self::Oxford => format!("{}/ and {}/ directories", LAB_DIRNAME, IMAGE_DIRNAME),
        }
    }
}

/// Finds the ground-truth directory.
///
/// Search order:
/// 1. `custom_dir` (the `--dataset` flag)
/// 2. `$RMAC_EVAL_DATASET_DIR` environment variable
/// 3. The current working directory
///
/// The first candidate laid out as `format` expects wins.
pub fn find_dataset_dir(custom_dir: Option<&PathBuf>, format: GroundTruthFormat) -> Result<PathBuf> {
    if let Some(dir) = custom_dir {
        return if format.matches(dir) {
            Ok(dir.clone())
        } else {
            Err(anyhow!(
                "{} does not contain {}",
                dir.display(),
                format.expected_contents()
            ))
        };
    }

    if let Ok(dir) = std::env::var(DATASET_DIR_ENV) {
        let path = PathBuf::from(dir);
        if format.matches(&path) {
            return Ok(path);
        }
    }

    let cwd = std::env::current_dir()?;
    if format.matches(&cwd) {
        return Ok(cwd);
    }

    Err(anyhow!(
        "Ground truth not found. Pass --dataset or set ${}.\n\
         A dataset directory holds {}.",
        DATASET_DIR_ENV,
        format.expected_contents()
    ))
}
