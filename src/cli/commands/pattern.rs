//! `backcheck pattern` command - containers to check back from the defect pattern

use clap::ValueEnum;
use miette::{miette, Result};

use crate::cli::commands::backward::{plan_fields, tier_highlight};
use crate::cli::commands::utils::{domain_error, format_aql, ConfidenceArg};
use crate::cli::helpers::format_hours;
use crate::cli::output::{emit, Report};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::sampling::pattern::{self, PatternInput, PatternPlan, ZeroAqlSubstitute};
use crate::sampling::{ColorTag, DefectPattern};

/// Defect occurrence pattern
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PatternArg {
    /// Concentrated in a short production window
    Clustered,
    /// Recurring on and off
    Intermittent,
    /// Scattered with no visible structure
    Random,
}

impl From<PatternArg> for DefectPattern {
    fn from(arg: PatternArg) -> Self {
        match arg {
            PatternArg::Clustered => DefectPattern::Clustered,
            PatternArg::Intermittent => DefectPattern::Intermittent,
            PatternArg::Random => DefectPattern::Random,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct PatternArgs {
    /// Defects found in the initial check
    #[arg(long)]
    pub defects: u64,

    /// Units examined in the initial check
    #[arg(long)]
    pub checked: u64,

    /// Acceptable quality level in percent
    #[arg(long)]
    pub aql: f64,

    /// Observed pattern (ratio classification when omitted)
    #[arg(long, short = 'p')]
    pub pattern: Option<PatternArg>,

    /// Units packed per container [config: units_per_container]
    #[arg(long)]
    pub units_per_container: Option<u64>,

    /// Containers produced per hour
    #[arg(long)]
    pub production_rate: f64,

    /// Confidence level (derived from the AQL when omitted)
    #[arg(long, short = 'c')]
    pub confidence: Option<ConfidenceArg>,

    /// Decimal AQL used in place of 0% [config: zero_aql_substitute]
    #[arg(long)]
    pub zero_aql_substitute: Option<f64>,
}

pub fn run(args: PatternArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let units_per_container = args
        .units_per_container
        .or(config.units_per_container)
        .ok_or_else(|| {
            miette!("--units-per-container is required (or set units_per_container in config)")
        })?;
    let zero_aql_substitute = args
        .zero_aql_substitute
        .map(ZeroAqlSubstitute)
        .unwrap_or_else(|| config.zero_aql_substitute());

    let input = PatternInput {
        total_defects: args.defects,
        samples_checked: args.checked,
        aql: args.aql,
        confidence: args.confidence.map(Into::into),
        pattern: args.pattern.map(Into::into),
        units_per_container,
        production_rate_per_hour: args.production_rate,
        zero_aql_substitute,
    };
    let plan = pattern::compute(&input).map_err(domain_error)?;
    emit(&plan, global, &config)
}

impl Report for PatternPlan {
    fn title(&self) -> String {
        match self.pattern {
            Some(pattern) => format!("Pattern-based plan ({})", pattern),
            None => "Pattern-based plan (ratio)".to_string(),
        }
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("actual_defect_rate", format_aql(self.actual_defect_rate)),
            ("strategy", self.strategy.to_string()),
            ("boxes_to_check", self.boxes_to_check.to_string()),
            ("units_per_container", self.units_per_container.to_string()),
            ("hours_to_check_back", format_hours(self.hours_to_check_back)),
        ];
        fields.extend(plan_fields(&self.plan));
        fields
    }

    fn highlight(&self) -> Option<(String, ColorTag)> {
        let (_, color) = tier_highlight(&self.plan);
        Some((
            format!(
                "Check back {} containers ({} units) over {}",
                self.boxes_to_check,
                self.plan.total_samples,
                format_hours(self.hours_to_check_back)
            ),
            color,
        ))
    }

    fn notes(&self) -> Vec<String> {
        if self.zero_aql_substituted {
            vec!["AQL of 0% approximated by the zero-AQL substitute; 100% inspection is exact".to_string()]
        } else {
            Vec::new()
        }
    }
}
