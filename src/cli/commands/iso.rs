//! `backcheck iso` command - per-interval plans from the lot-size code table

use clap::ValueEnum;
use miette::{miette, Result};
use serde::Serialize;

use crate::cli::commands::utils::{approximation_notes, domain_error, format_aql};
use crate::cli::helpers::format_percent;
use crate::cli::output::{emit, Report, Table};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::sampling::iso::{self, Disposition, IsoPlan, IsoPlanInput, LotSource};
use crate::sampling::{ColorTag, InspectionLevel};

/// Inspection severity switch
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LevelArg {
    Normal,
    /// Sample sizes raised by 20%
    Tightened,
    /// Sample sizes cut by 20% (never below 5)
    Reduced,
}

impl From<LevelArg> for InspectionLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Normal => InspectionLevel::Normal,
            LevelArg::Tightened => InspectionLevel::Tightened,
            LevelArg::Reduced => InspectionLevel::Reduced,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct IsoArgs {
    /// Units produced per hour [config: production_rate]
    #[arg(long, conflicts_with = "lot_size")]
    pub rate: Option<f64>,

    /// Known lot size, split evenly over the intervals
    #[arg(long)]
    pub lot_size: Option<u64>,

    /// Production window in minutes [config: window_minutes, default: 120]
    #[arg(long)]
    pub window: Option<f64>,

    /// Number of intervals (2-8)
    #[arg(long, short = 'n', default_value_t = 4)]
    pub intervals: usize,

    /// AQL in percent for the interval nearest the detection point
    #[arg(long)]
    pub aql: f64,

    /// Allowed AQLs in percent; the loosest caps the escalation
    #[arg(long, value_delimiter = ',')]
    pub aql_options: Vec<f64>,

    /// Inspection level [config: inspection_level, default: normal]
    #[arg(long, short = 'l')]
    pub level: Option<LevelArg>,

    /// Defects found per interval, nearest first (e.g. 0,2,0)
    #[arg(long, value_delimiter = ',')]
    pub defects: Vec<u32>,
}

/// An interval plan with the dispositions of intervals already inspected
#[derive(Debug, Serialize)]
pub struct IsoReport {
    #[serde(flatten)]
    pub plan: IsoPlan,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dispositions: Vec<Disposition>,
}

impl IsoReport {
    pub fn new(plan: IsoPlan, defects: &[u32]) -> Result<Self> {
        if defects.len() > plan.intervals.len() {
            return Err(miette!(
                "{} defect counts given for {} intervals",
                defects.len(),
                plan.intervals.len()
            ));
        }
        let dispositions = plan
            .intervals
            .iter()
            .zip(defects)
            .map(|(interval, &found)| interval.disposition(found))
            .collect();
        Ok(Self { plan, dispositions })
    }
}

pub fn run(args: IsoArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let source = match (args.lot_size, args.rate.or(config.production_rate)) {
        (Some(lot), _) => LotSource::LotSize(lot),
        (None, Some(rate)) => LotSource::ProductionRate(rate),
        (None, None) => {
            return Err(miette!(
                "Either --rate or --lot-size is required (or set production_rate in config)"
            ))
        }
    };

    let input = IsoPlanInput {
        source,
        window_minutes: args.window.unwrap_or_else(|| config.window_minutes()),
        interval_count: args.intervals,
        base_aql: args.aql,
        aql_options: args.aql_options,
        inspection_level: args
            .level
            .map(Into::into)
            .unwrap_or_else(|| config.inspection_level()),
    };
    let plan = iso::plan(&input).map_err(domain_error)?;
    let report = IsoReport::new(plan, &args.defects)?;
    emit(&report, global, &config)
}

impl Report for IsoReport {
    fn title(&self) -> String {
        format!("Interval sampling plan ({} inspection)", self.plan.inspection_level)
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let source = match self.plan.source {
            LotSource::ProductionRate(rate) => format!("{} units/h", rate),
            LotSource::LotSize(lot) => format!("lot of {}", lot),
        };
        vec![
            ("source", source),
            ("inspection_level", self.plan.inspection_level.to_string()),
            ("slice_minutes", self.plan.slice_minutes.to_string()),
            ("products_per_interval", self.plan.products_per_interval.to_string()),
            ("total_products", self.plan.total_products.to_string()),
            ("total_samples", self.plan.total_samples.to_string()),
        ]
    }

    fn table(&self) -> Option<Table> {
        let mut headers = vec![
            "interval", "time_range", "lot_code", "aql", "sample_size", "ac", "re",
            "inspected", "p_accept",
        ];
        if !self.dispositions.is_empty() {
            headers.push("disposition");
        }

        let rows = self
            .plan
            .intervals
            .iter()
            .enumerate()
            .map(|(i, interval)| {
                let mut row = vec![
                    (interval.interval_index + 1).to_string(),
                    interval.time_range.to_string(),
                    interval.lot_code.to_string(),
                    format_aql(interval.aql),
                    interval.sample_size.to_string(),
                    interval.acceptance_number.to_string(),
                    interval.rejection_number.to_string(),
                    format!("{}%", interval.inspection_percentage),
                    format_percent(interval.acceptance_probability),
                ];
                if !self.dispositions.is_empty() {
                    row.push(
                        self.dispositions
                            .get(i)
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "-".to_string()),
                    );
                }
                row
            })
            .collect();

        Some(Table { headers, rows })
    }

    fn highlight(&self) -> Option<(String, ColorTag)> {
        if self.dispositions.is_empty() {
            return None;
        }
        let held: Vec<String> = self
            .dispositions
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == Disposition::Hold)
            .map(|(i, _)| (i + 1).to_string())
            .collect();
        if held.is_empty() {
            Some((
                format!("Release all {} inspected intervals", self.dispositions.len()),
                ColorTag::Green,
            ))
        } else {
            Some((format!("Hold interval(s) {}", held.join(", ")), ColorTag::Red))
        }
    }

    fn notes(&self) -> Vec<String> {
        approximation_notes(&self.plan.approximations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::iso::DEFAULT_WINDOW_MINUTES;

    fn plan() -> IsoPlan {
        iso::plan(&IsoPlanInput {
            source: LotSource::ProductionRate(500.0),
            window_minutes: DEFAULT_WINDOW_MINUTES,
            interval_count: 4,
            base_aql: 1.0,
            aql_options: Vec::new(),
            inspection_level: InspectionLevel::Normal,
        })
        .unwrap()
    }

    #[test]
    fn test_dispositions_follow_acceptance_numbers() {
        let report = IsoReport::new(plan(), &[0, 2, 0]).unwrap();
        assert_eq!(
            report.dispositions,
            vec![Disposition::Release, Disposition::Hold, Disposition::Release]
        );

        let (verdict, color) = report.highlight().unwrap();
        assert_eq!(verdict, "Hold interval(s) 2");
        assert_eq!(color, ColorTag::Red);
    }

    #[test]
    fn test_too_many_defect_counts() {
        assert!(IsoReport::new(plan(), &[0, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_table_rows() {
        let report = IsoReport::new(plan(), &[]).unwrap();
        assert!(report.highlight().is_none());

        let table = report.table().unwrap();
        assert_eq!(table.rows.len(), 4);
        assert_eq!(table.headers.len(), 9);
        assert_eq!(table.rows[0][0], "1");
        assert_eq!(table.rows[0][1], "0-30 min");
        assert_eq!(table.rows[0][2], "G");
        assert_eq!(table.rows[0][4], "32");
    }

    #[test]
    fn test_partial_dispositions_pad_table() {
        let report = IsoReport::new(plan(), &[0]).unwrap();
        let table = report.table().unwrap();
        assert_eq!(table.rows[0][9], "release");
        assert_eq!(table.rows[3][9], "-");
    }

    #[test]
    fn test_json_flattens_plan() {
        let report = IsoReport::new(plan(), &[0]).unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["total_samples"], 128);
        assert_eq!(value["dispositions"][0], "release");
    }
}
