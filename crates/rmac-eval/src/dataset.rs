//! Ground-truth loading for retrieval datasets.
//!
//! # Cover Format
//!
//! ```text
//! <dir>/
//! ├── query.txt     # one query name per line
//! ├── answer.txt    # per query: relevant dataset file names, space-separated
//! └── dataset/      # reference images; sorted names give the column order
//! ```
//!
//! Line `i` of `answer.txt` belongs to line `i` of `query.txt`.
//!
//! # Oxford Format
//!
//! ```text
//! <dir>/
//! ├── lab/
//! │   ├── <q>_query.txt   # "[oxc1_]<image> x0 y0 x1 y1"
//! │   ├── <q>_good.txt    # relevant image stems, one per line
//! │   ├── <q>_ok.txt      # also relevant
//! │   └── <q>_junk.txt    # ignored: neither hit nor miss
//! └── jpg/                # images; sorted file stems give the column order
//! ```
//!
//! Queries are taken in sorted `lab/` order. Listed images that are not in
//! `jpg/` are left out of the sets.

use crate::config::{
    GroundTruthFormat, ANSWER_FILENAME, DATASET_DIRNAME, IMAGE_DIRNAME, LAB_DIRNAME,
    QUERY_FILENAME,
};
use anyhow::{bail, Context, Result};
use rmac_eval_core::evaluation::RelevanceSet;
use rmac_eval_core::regions::QueryRoi;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

const QUERY_SUFFIX: &str = "_query.txt";
const QUERY_IMAGE_PREFIX: &str = "oxc1_";

/// A loaded ground truth ready for scoring.
#[derive(Debug)]
pub struct GroundTruth {
    /// Query names, in matrix row order
    pub queries: Vec<String>,
    /// Dataset file names, in matrix column order
    pub dataset: Vec<String>,
    /// One relevance set per query
    pub relevance: Vec<RelevanceSet>,
}

impl GroundTruth {
    pub fn num_queries(&self) -> usize {
        self.queries.len()
    }

    pub fn num_dataset(&self) -> usize {
        self.dataset.len()
    }
}

/// Loads the ground truth stored in `dir` in the given layout.
pub fn load(dir: &Path, format: GroundTruthFormat) -> Result<GroundTruth> {
    match format {
        GroundTruthFormat::Cover => load_ground_truth(dir),
        GroundTruthFormat::Oxford => load_oxford_ground_truth(dir),
    }
}

/// Loads a cover-style ground truth.
pub fn load_ground_truth(dir: &Path) -> Result<GroundTruth> {
    let dataset = list_files(&dir.join(DATASET_DIRNAME))?;
    let queries = read_lines(&dir.join(QUERY_FILENAME))?;
    let answers = read_lines(&dir.join(ANSWER_FILENAME))?;

    if answers.len() != queries.len() {
        bail!(
            "{} has {} lines but {} has {}",
            ANSWER_FILENAME,
            answers.len(),
            QUERY_FILENAME,
            queries.len()
        );
    }

    let relevance = relevance_from_answers(&answers, &dataset)?;
    Ok(GroundTruth {
        queries,
        dataset,
        relevance,
    })
}

/// Maps each answer line's file names to dataset column indices.
pub fn relevance_from_answers(answers: &[String], dataset: &[String]) -> Result<Vec<RelevanceSet>> {
    let index = column_index(dataset);

    answers
        .iter()
        .enumerate()
        .map(|(q, line)| {
            line.split_whitespace()
                .map(|name| {
                    index
                        .get(name)
                        .copied()
                        .with_context(|| format!("query {q}: {name} is not in the dataset"))
                })
                .collect::<Result<RelevanceSet>>()
        })
        .collect()
}

/// Loads an Oxford-style ground truth.
pub fn load_oxford_ground_truth(dir: &Path) -> Result<GroundTruth> {
    let dataset: Vec<String> = list_files(&dir.join(IMAGE_DIRNAME))?
        .iter()
        .filter_map(|name| Path::new(name).file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .collect();
    let index = column_index(&dataset);

    let lab = dir.join(LAB_DIRNAME);
    let mut queries = Vec::new();
    let mut relevance = Vec::new();
    let mut unknown = 0;

    for file in list_files(&lab)? {
        let Some(name) = file.strip_suffix(QUERY_SUFFIX) else {
            continue;
        };

        let lines = read_lines(&lab.join(&file))?;
        let first = lines.first().map_or("", String::as_str);
        let (image, _roi) =
            parse_query_line(first).with_context(|| format!("Malformed {}", file))?;
        if !index.contains_key(image) {
            bail!("{}: query image {} is not in {}/", file, image, IMAGE_DIRNAME);
        }

        let mut lookup = |suffix: &str| -> Result<Vec<usize>> {
            let path = lab.join(format!("{name}_{suffix}.txt"));
            Ok(read_lines(&path)?
                .iter()
                .filter(|l| !l.is_empty())
                .filter_map(|l| {
                    let found = index.get(l.as_str()).copied();
                    unknown += usize::from(found.is_none());
                    found
                })
                .collect())
        };
        let mut relevant = lookup("good")?;
        relevant.extend(lookup("ok")?);
        let junk = lookup("junk")?;

        queries.push(name.to_string());
        relevance.push(RelevanceSet::new(relevant).with_ignored(junk));
    }

    if unknown > 0 {
        warn!(unknown, "label entries name images missing from the dataset");
    }

    Ok(GroundTruth {
        queries,
        dataset,
        relevance,
    })
}

/// Splits a query label line into the query image stem and its box.
///
/// The box is only checked here; extraction crops to it.
fn parse_query_line(line: &str) -> Result<(&str, QueryRoi)> {
    let mut fields = line.split_whitespace();
    let image = fields.next().context("missing query image")?;
    let image = image.strip_prefix(QUERY_IMAGE_PREFIX).unwrap_or(image);

    let corners = fields
        .map(|f| f.parse::<f32>().with_context(|| format!("bad coordinate {f}")))
        .collect::<Result<Vec<_>>>()?;
    let &[x0, y0, x1, y1] = corners.as_slice() else {
        bail!("expected 4 box coordinates, got {}", corners.len());
    };

    let roi = QueryRoi::new(x0, y0, x1, y1);
    roi.validate()?;
    Ok((image, roi))
}

fn column_index(dataset: &[String]) -> HashMap<&str, usize> {
    dataset
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect()
}

fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Lines with surrounding whitespace trimmed.
///
/// Blank lines inside the file are kept (an empty `answer.txt` line is a
/// query with no answers); trailing blank lines are dropped.
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mut lines: Vec<String> = text.lines().map(|l| l.trim().to_string()).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dataset() -> TempDir {
        let dir = TempDir::new().unwrap();
        let images = dir.path().join(DATASET_DIRNAME);
        fs::create_dir(&images).unwrap();
        for name in ["c.jpg", "a.jpg", "b.jpg"] {
            fs::write(images.join(name), b"").unwrap();
        }
        fs::write(dir.path().join(QUERY_FILENAME), "q0\nq1\n").unwrap();
        fs::write(dir.path().join(ANSWER_FILENAME), "c.jpg a.jpg\nb.jpg\n\n").unwrap();
        dir
    }

    #[test]
    fn test_load_ground_truth() {
        let dir = create_test_dataset();
        let truth = load_ground_truth(dir.path()).unwrap();

        assert_eq!(truth.dataset, vec!["a.jpg", "b.jpg", "c.jpg"]);
        assert_eq!(truth.queries, vec!["q0", "q1"]);
        assert_eq!(truth.relevance[0], RelevanceSet::new([0, 2]));
        assert_eq!(truth.relevance[1], RelevanceSet::new([1]));
    }

    #[test]
    fn test_empty_answer_line_is_empty_set() {
        let dataset = vec!["a.jpg".to_string()];
        let sets = relevance_from_answers(&["".to_string()], &dataset).unwrap();
        assert!(sets[0].is_empty());
    }

    #[test]
    fn test_unknown_answer_rejected() {
        let dataset = vec!["a.jpg".to_string()];
        let err = relevance_from_answers(&["z.jpg".to_string()], &dataset).unwrap_err();
        assert!(err.to_string().contains("z.jpg"));
    }

    fn create_oxford_dataset() -> TempDir {
        let dir = TempDir::new().unwrap();
        let images = dir.path().join(IMAGE_DIRNAME);
        let lab = dir.path().join(LAB_DIRNAME);
        fs::create_dir(&images).unwrap();
        fs::create_dir(&lab).unwrap();
        for name in ["all_souls_3.jpg", "all_souls_1.jpg", "radcliffe_2.jpg", "magdalen_9.jpg"] {
            fs::write(images.join(name), b"").unwrap();
        }

        let labels = [
            ("all_souls_1_query.txt", "oxc1_all_souls_1 136.5 34.1 648.5 955.7\n"),
            ("all_souls_1_good.txt", "all_souls_3\n"),
            ("all_souls_1_ok.txt", "all_souls_1\nchrist_church_4\n"),
            ("all_souls_1_junk.txt", "magdalen_9\n"),
            ("radcliffe_1_query.txt", "radcliffe_2 0 0 10 10\n"),
            ("radcliffe_1_good.txt", "radcliffe_2\n"),
            ("radcliffe_1_ok.txt", ""),
            ("radcliffe_1_junk.txt", ""),
        ];
        for (name, contents) in labels {
            fs::write(lab.join(name), contents).unwrap();
        }
        dir
    }

    #[test]
    fn test_load_oxford_ground_truth() {
        let dir = create_oxford_dataset();
        let truth = load(dir.path(), GroundTruthFormat::Oxford).unwrap();

        assert_eq!(
            truth.dataset,
            vec!["all_souls_1", "all_souls_3", "magdalen_9", "radcliffe_2"]
        );
        assert_eq!(truth.queries, vec!["all_souls_1", "radcliffe_1"]);
        // good and ok are relevant, junk is ignored, unknown names drop out
        assert_eq!(
            truth.relevance[0],
            RelevanceSet::new([0, 1]).with_ignored([2])
        );
        assert_eq!(truth.relevance[1], RelevanceSet::new([3]));
    }

    #[test]
    fn test_oxford_junk_reaches_the_score() {
        use rmac_eval_core::config::EvaluatorConfig;
        use rmac_eval_core::evaluation::{mean_average_precision, SimilarityMatrix};

        let dir = create_oxford_dataset();
        let truth = load_oxford_ground_truth(dir.path()).unwrap();
        // all_souls_1 ranks the junk image first: dropping it leaves a perfect ranking.
        let sim = SimilarityMatrix::from_rows(vec![
            vec![0.8, 0.7, 0.9, 0.1],
            vec![0.0, 0.0, 0.0, 1.0],
        ])
        .unwrap();
        let map = mean_average_precision(&sim, &truth.relevance, &EvaluatorConfig::default())
            .unwrap();
        assert_eq!(map.per_query, vec![Some(1.0), Some(1.0)]);
    }

    #[test]
    fn test_oxford_query_image_must_exist() {
        let dir = create_oxford_dataset();
        let lab = dir.path().join(LAB_DIRNAME);
        fs::write(lab.join("radcliffe_1_query.txt"), "bodleian_1 0 0 10 10\n").unwrap();
        let err = load_oxford_ground_truth(dir.path()).unwrap_err();
        assert!(err.to_string().contains("bodleian_1"));
    }

    #[test]
    fn test_parse_query_line() {
        let (image, roi) = parse_query_line("oxc1_all_souls_000013 136.5 34.1 648.5 955.7").unwrap();
        assert_eq!(image, "all_souls_000013");
        assert_eq!(roi, QueryRoi::new(136.5, 34.1, 648.5, 955.7));

        assert!(parse_query_line("all_souls_000013 1 2 3").is_err());
        assert!(parse_query_line("all_souls_000013 1 2 x 4").is_err());
        assert!(parse_query_line("all_souls_000013 5 5 1 1").is_err());
        assert!(parse_query_line("").is_err());
    }

    #[test]
    fn test_line_count_mismatch() {
        let dir = create_test_dataset();
        fs::write(dir.path().join(ANSWER_FILENAME), "a.jpg\n").unwrap();
        assert!(load_ground_truth(dir.path()).is_err());
    }
}
