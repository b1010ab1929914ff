//! `backcheck stratify` command - split a sample budget over intervals by severity

use clap::ValueEnum;
use miette::Result;

use crate::cli::commands::utils::{domain_error, format_aql};
use crate::cli::output::{emit, Report, Table};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::sampling::stratified::{self, StratifiedInput, StratifiedPlan};
use crate::sampling::SeverityClass;

/// Defect severity class
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum SeverityArg {
    /// Steep decay: most samples near the detection point
    #[default]
    Critical,
    Major,
    /// Shallow decay: samples spread over the window
    Minor,
}

impl From<SeverityArg> for SeverityClass {
    fn from(arg: SeverityArg) -> Self {
        match arg {
            SeverityArg::Critical => SeverityClass::Critical,
            SeverityArg::Major => SeverityClass::Major,
            SeverityArg::Minor => SeverityClass::Minor,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct StratifyArgs {
    /// Total samples to allocate
    #[arg(long)]
    pub budget: u64,

    /// Number of intervals (2-8)
    #[arg(long, short = 'n', default_value_t = 4)]
    pub intervals: usize,

    /// Defect severity class
    #[arg(long, short = 's', default_value = "critical")]
    pub severity: SeverityArg,

    /// AQL in percent for the interval nearest the detection point
    #[arg(long)]
    pub aql: f64,
}

pub fn run(args: StratifyArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let input = StratifiedInput {
        interval_count: args.intervals,
        budget: args.budget,
        severity: args.severity.into(),
        base_aql: args.aql,
    };
    let plan = stratified::stratify(&input).map_err(domain_error)?;
    emit(&plan, global, &config)
}

impl Report for StratifiedPlan {
    fn title(&self) -> String {
        format!("Risk-stratified allocation ({})", self.severity)
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("severity", self.severity.to_string()),
            ("decay", self.decay.to_string()),
            ("budget", self.budget.to_string()),
            ("intervals", self.rows.len().to_string()),
        ]
    }

    fn table(&self) -> Option<Table> {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                vec![
                    (row.interval_index + 1).to_string(),
                    format!("{:.3}", row.weight),
                    row.sample_size.to_string(),
                    format!("{}%", row.share_percent),
                    format_aql(row.aql),
                    row.acceptance_number.to_string(),
                ]
            })
            .collect();
        Some(Table {
            headers: vec!["interval", "weight", "sample_size", "share", "aql", "ac"],
            rows,
        })
    }
}
