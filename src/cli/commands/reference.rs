//! `backcheck reference` command - commonly quoted zero-defect sample sizes

use miette::Result;
use serde::Serialize;

use crate::cli::commands::utils::format_aql;
use crate::cli::output::{emit, Report, Table};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::sampling::zero_defect::{reference_table, ReferenceRow};
use crate::sampling::ConfidenceLevel;

#[derive(clap::Args, Debug)]
pub struct ReferenceArgs {}

/// Confidence implied by AQLs up to `max_aql` (unbounded when `None`)
#[derive(Debug, Serialize)]
pub struct ConfidenceBand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_aql: Option<f64>,
    pub confidence: ConfidenceLevel,
}

#[derive(Debug, Serialize)]
pub struct ReferenceReport {
    pub rows: Vec<ReferenceRow>,
    pub confidence_bands: Vec<ConfidenceBand>,
}

impl ReferenceReport {
    pub fn build() -> Self {
        let confidence_bands = [Some(1.0), Some(4.0), None]
            .into_iter()
            .map(|max_aql| ConfidenceBand {
                max_aql,
                confidence: ConfidenceLevel::for_aql(max_aql.unwrap_or(f64::INFINITY)),
            })
            .collect();
        Self {
            rows: reference_table(),
            confidence_bands,
        }
    }
}

pub fn run(_args: ReferenceArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    emit(&ReferenceReport::build(), global, &config)
}

impl Report for ReferenceReport {
    fn title(&self) -> String {
        "Zero-defect sample size reference".to_string()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        self.confidence_bands
            .iter()
            .map(|band| {
                let key = match band.max_aql {
                    Some(max) if max <= 1.0 => "aql_up_to_1",
                    Some(_) => "aql_up_to_4",
                    None => "aql_above_4",
                };
                (key, band.confidence.to_string())
            })
            .collect()
    }

    fn table(&self) -> Option<Table> {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                vec![
                    format_aql(row.aql),
                    row.confidence.to_string(),
                    row.sample_size.to_string(),
                ]
            })
            .collect();
        Some(Table {
            headers: vec!["aql", "confidence", "sample_size"],
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands() {
        let report = ReferenceReport::build();
        let confidences: Vec<ConfidenceLevel> =
            report.confidence_bands.iter().map(|b| b.confidence).collect();
        assert_eq!(
            confidences,
            vec![
                ConfidenceLevel::NinetyNine,
                ConfidenceLevel::NinetyFive,
                ConfidenceLevel::Ninety
            ]
        );
        assert_eq!(
            report.fields(),
            vec![
                ("aql_up_to_1", "99%".to_string()),
                ("aql_up_to_4", "95%".to_string()),
                ("aql_above_4", "90%".to_string()),
            ]
        );
    }

    #[test]
    fn test_table_has_every_reference_row() {
        let table = ReferenceReport::build().table().unwrap();
        assert_eq!(table.rows.len(), 9);
        assert_eq!(table.rows[0], vec!["0.1%", "99%", "4603"]);
    }
}
