//! `backcheck size` command - zero-defect sample size for a held quantity

use miette::Result;

use crate::cli::commands::utils::{domain_error, format_aql, ConfidenceArg};
use crate::cli::output::{emit, Report};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::sampling::zero_defect::{self, InspectionPolicy, ZeroDefectInput, ZeroDefectPlan};
use crate::sampling::ColorTag;

#[derive(clap::Args, Debug)]
pub struct SizeArgs {
    /// Acceptable quality level in percent (0 means 100% inspection)
    #[arg(long)]
    pub aql: f64,

    /// Units currently on hold
    #[arg(long = "held", value_name = "QTY")]
    pub held_quantity: u64,

    /// Observed defect rate in percent
    #[arg(long, default_value_t = 0.0)]
    pub defect_rate: f64,

    /// Confidence level (derived from the AQL when omitted)
    #[arg(long, short = 'c')]
    pub confidence: Option<ConfidenceArg>,
}

pub fn run(args: SizeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let input = ZeroDefectInput {
        aql: args.aql,
        confidence: args.confidence.map(Into::into),
        defect_rate: args.defect_rate,
        held_quantity: args.held_quantity,
    };
    let plan = zero_defect::plan(&input).map_err(domain_error)?;
    emit(&plan, global, &config)
}

impl Report for ZeroDefectPlan {
    fn title(&self) -> String {
        "Zero-defect sampling plan".to_string()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let policy = match self.policy {
            InspectionPolicy::ZeroDefect => "zero_defect",
            InspectionPolicy::FullInspection => "full_inspection",
        };
        vec![
            ("aql", format_aql(self.aql)),
            ("confidence", self.confidence.to_string()),
            ("defect_rate", format_aql(self.defect_rate)),
            ("held_quantity", self.held_quantity.to_string()),
            ("policy", policy.to_string()),
            ("required_sample_size", self.required_sample_size.to_string()),
            ("adjusted_sample_size", self.adjusted_sample_size.to_string()),
            ("expected_defects", self.expected_defects.to_string()),
            ("recommendation", self.recommendation.to_string()),
        ]
    }

    fn highlight(&self) -> Option<(String, ColorTag)> {
        Some((self.message(), self.recommendation.color()))
    }

    fn notes(&self) -> Vec<String> {
        match self.policy {
            InspectionPolicy::FullInspection => {
                vec!["AQL of 0% allows no defects: every held unit is inspected".to_string()]
            }
            InspectionPolicy::ZeroDefect => Vec::new(),
        }
    }
}
