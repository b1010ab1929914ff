//! `backcheck backward` command - risk-multiplied backward sample

use clap::ValueEnum;
use miette::{miette, Result};

use crate::cli::commands::utils::{domain_error, ConfidenceArg};
use crate::cli::helpers::format_percent;
use crate::cli::output::{emit, Report};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::sampling::backward::{self, BackwardInput, RiskMethod, SamplingPlanResult};
use crate::sampling::ColorTag;

/// How the risk multiplier is chosen
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum MethodArg {
    /// Observed defect rate divided by AQL
    #[default]
    Ratio,
    /// Multiplier given with --multiplier
    Manual,
    /// Risk priority number from --severity, --occurrence and --detection
    Fmea,
}

#[derive(clap::Args, Debug)]
pub struct BackwardArgs {
    /// Observed defect rate in percent
    #[arg(long)]
    pub defect_rate: f64,

    /// Acceptable quality level in percent
    #[arg(long)]
    pub aql: f64,

    /// Units in the held lot
    #[arg(long)]
    pub lot_size: u64,

    /// Confidence level (derived from the AQL when omitted)
    #[arg(long, short = 'c')]
    pub confidence: Option<ConfidenceArg>,

    /// Risk method
    #[arg(long, short = 'm', default_value = "ratio")]
    pub method: MethodArg,

    /// Sample multiplier for the manual method (>= 1)
    #[arg(long, required_if_eq("method", "manual"))]
    pub multiplier: Option<f64>,

    /// FMEA severity rating (1-10)
    #[arg(long, short = 'S', required_if_eq("method", "fmea"))]
    pub severity: Option<u8>,

    /// FMEA occurrence rating (1-10)
    #[arg(long, short = 'O', required_if_eq("method", "fmea"))]
    pub occurrence: Option<u8>,

    /// FMEA detection rating (1-10)
    #[arg(long, short = 'D', required_if_eq("method", "fmea"))]
    pub detection: Option<u8>,
}

impl BackwardArgs {
    fn risk_method(&self) -> Result<RiskMethod> {
        match self.method {
            MethodArg::Ratio => Ok(RiskMethod::Ratio),
            MethodArg::Manual => {
                let multiplier = self
                    .multiplier
                    .ok_or_else(|| miette!("--multiplier is required with --method manual"))?;
                Ok(RiskMethod::Manual { multiplier })
            }
            MethodArg::Fmea => match (self.severity, self.occurrence, self.detection) {
                (Some(severity), Some(occurrence), Some(detection)) => Ok(RiskMethod::Fmea {
                    severity,
                    occurrence,
                    detection,
                }),
                _ => Err(miette!(
                    "--severity, --occurrence and --detection are required with --method fmea"
                )),
            },
        }
    }
}

pub fn run(args: BackwardArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let input = BackwardInput {
        defect_rate: args.defect_rate,
        aql: args.aql,
        confidence: args.confidence.map(Into::into),
        lot_size: args.lot_size,
        method: args.risk_method()?,
    };
    let plan = backward::compute(&input).map_err(domain_error)?;
    emit(&plan, global, &config)
}

/// Summary fields shared by every plan built on [`SamplingPlanResult`]
pub(crate) fn plan_fields(plan: &SamplingPlanResult) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("confidence", plan.confidence.to_string()),
        ("base_sample_size", plan.base_sample_size.to_string()),
        ("adjusted_sample_size", plan.adjusted_sample_size.to_string()),
        ("multiplier", plan.multiplier.to_string()),
        ("total_samples", plan.total_samples.to_string()),
        ("risk_tier", plan.risk_tier.to_string()),
        ("recommended_batches", plan.recommended_batches.to_string()),
        ("acceptance_probability", format_percent(plan.acceptance_probability)),
        ("beta_risk", format_percent(plan.beta_risk)),
        ("ci_reduction", format_percent(plan.ci_reduction)),
    ];
    if let Some(rpn) = plan.rpn {
        fields.push(("rpn", rpn.to_string()));
    }
    fields
}

pub(crate) fn tier_highlight(plan: &SamplingPlanResult) -> (String, ColorTag) {
    (
        format!(
            "Risk tier {}: inspect {} units (x{})",
            plan.risk_tier, plan.total_samples, plan.multiplier
        ),
        plan.risk_tier.color(),
    )
}

impl Report for SamplingPlanResult {
    fn title(&self) -> String {
        "Backward inspection plan".to_string()
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        plan_fields(self)
    }

    fn highlight(&self) -> Option<(String, ColorTag)> {
        Some(tier_highlight(self))
    }
}
