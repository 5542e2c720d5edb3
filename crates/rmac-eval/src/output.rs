//! Output formatting for evaluation reports and region grids.
//!
//! Supports both human-readable terminal output and JSON for scripting.

use rmac_eval_core::evaluation::EvaluationReport;
use rmac_eval_core::regions::{PackedRegionTable, ScalePlan};
use serde::Serialize;

/// JSON output structure for an evaluation run
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub num_queries: usize,
    pub num_dataset: usize,
    /// Mean precision at k, as a percentage
    pub precision: f64,
    /// Mean average precision, as a percentage
    pub map: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_query: Option<Vec<JsonQuery<'a>>>,
}

/// Per-query scores in JSON format
#[derive(Serialize)]
pub struct JsonQuery<'a> {
    pub query: &'a str,
    pub precision: Option<f64>,
    pub average_precision: Option<f64>,
}

/// Formats an evaluation report as JSON.
pub fn format_report_json(
    queries: &[String],
    num_dataset: usize,
    report: &EvaluationReport,
    per_query: bool,
) -> String {
    let per_query: Option<Vec<JsonQuery>> = per_query.then(|| {
        queries
            .iter()
            .enumerate()
            .map(|(q, name)| JsonQuery {
                query: name,
                precision: report.precision.per_query[q],
                average_precision: report.map.per_query[q],
            })
            .collect()
    });

    let output = JsonReport {
        num_queries: queries.len(),
        num_dataset,
        precision: report.precision.mean_percent(),
        map: report.map.mean_percent(),
        per_query,
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats an evaluation report for the terminal.
///
/// With `per_query`, lists each query's AP as `name: xx.xx` before the means.
pub fn format_report_human(queries: &[String], report: &EvaluationReport, per_query: bool) -> String {
    let mut output = String::new();

    if per_query {
        for (name, ap) in queries.iter().zip(&report.map.per_query) {
            match ap {
                Some(ap) => output.push_str(&format!("{}: {:.2}\n", name, 100.0 * ap)),
                None => output.push_str(&format!("{}: skipped\n", name)),
            }
        }
        output.push_str(&"-".repeat(20));
        output.push('\n');
    }

    output.push_str(&format!(
        "precision: {:.2}\n",
        report.precision.mean_percent()
    ));
    output.push_str(&format!("mAP: {:.2}", report.map.mean_percent()));

    let skipped = queries.len().saturating_sub(report.map.scored());
    if skipped > 0 {
        output.push_str(&format!("\n({} of {} queries skipped)", skipped, queries.len()));
    }

    output
}

/// JSON output structure for region plans
#[derive(Serialize)]
struct JsonRegions<'a> {
    scales: &'a [ScalePlan],
    packed: Vec<[f32; 5]>,
}

/// Formats region plans and their packed table as JSON.
pub fn format_regions_json(plans: &[ScalePlan], table: &PackedRegionTable) -> String {
    let output = JsonRegions {
        scales: plans,
        packed: table.to_network_rows(),
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats region plans for the terminal, one `x y w h` line per region.
pub fn format_regions_human(plans: &[ScalePlan]) -> String {
    let mut output = String::new();
    for plan in plans {
        output.push_str(&format!(
            "scale {} ({}x{}): {} regions\n",
            plan.max_side,
            plan.height,
            plan.width,
            plan.regions.len()
        ));
        for r in &plan.regions {
            output.push_str(&format!("  {:>5} {:>5} {:>5} {:>5}\n", r.x, r.y, r.width, r.height));
        }
    }
    output.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmac_eval_core::evaluation::RankingResult;

    fn report() -> EvaluationReport {
        EvaluationReport {
            precision: RankingResult {
                per_query: vec![Some(1.0), Some(0.0)],
                mean: 0.5,
            },
            map: RankingResult {
                per_query: vec![Some(1.0), Some(0.5)],
                mean: 0.75,
            },
        }
    }

    #[test]
    fn test_human_report() {
        let queries = vec!["all_souls_1".to_string(), "radcliffe_2".to_string()];
        let text = format_report_human(&queries, &report(), true);
        assert_eq!(
            text,
            "all_souls_1: 100.00\nradcliffe_2: 50.00\n--------------------\nprecision: 50.00\nmAP: 75.00"
        );
    }

    #[test]
    fn test_json_report() {
        let queries = vec!["a".to_string(), "b".to_string()];
        let json = format_report_json(&queries, 4, &report(), true);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["map"], 75.0);
        assert_eq!(value["per_query"][1]["average_precision"], 0.5);
    }
}
