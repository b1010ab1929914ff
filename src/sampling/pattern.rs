//! Pattern-based backward inspection
//!
//! The way defects showed up over time decides how far back to look. A
//! clustered pattern points at a short production window; a random pattern
//! could have been produced anywhere, so far more containers are pulled.

use serde::{Deserialize, Serialize};

use super::backward::{ci_reduction, risk_figures, SamplingPlanResult};
use super::tier::{DefectPattern, RiskTier};
use super::{percent_to_decimal, zero_defect, ConfidenceLevel};
use crate::core::DomainError;

/// Decimal AQL used in place of 0% so the log and power terms stay defined
///
/// This is an approximation: a true 0% AQL means 100% inspection. Plans that
/// used the substitute say so in [`PatternPlan::zero_aql_substituted`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZeroAqlSubstitute(pub f64);

impl ZeroAqlSubstitute {
    pub const DEFAULT: f64 = 0.001;
}

impl Default for ZeroAqlSubstitute {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Inputs to the pattern-based calculation
#[derive(Debug, Clone, PartialEq)]
pub struct PatternInput {
    /// Defects found in the initial check
    pub total_defects: u64,
    /// Units examined in the initial check
    pub samples_checked: u64,
    /// AQL in percent
    pub aql: f64,
    pub confidence: Option<ConfidenceLevel>,
    /// Observed pattern; the ratio classification is used when absent
    pub pattern: Option<DefectPattern>,
    pub units_per_container: u64,
    /// Containers produced per hour
    pub production_rate_per_hour: f64,
    pub zero_aql_substitute: ZeroAqlSubstitute,
}

/// A pattern-based backward inspection plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternPlan {
    #[serde(flatten)]
    pub plan: SamplingPlanResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<DefectPattern>,
    pub strategy: &'static str,
    /// Defect rate of the initial check, in percent
    pub actual_defect_rate: f64,
    pub boxes_to_check: u64,
    pub units_per_container: u64,
    pub hours_to_check_back: f64,
    pub zero_aql_substituted: bool,
}

/// Defect rate (percent) found by an initial check
pub fn actual_defect_rate(total_defects: u64, samples_checked: u64) -> Result<f64, DomainError> {
    if samples_checked == 0 {
        return Err(DomainError::ZeroSamplesChecked);
    }
    Ok(total_defects as f64 / samples_checked as f64 * 100.0)
}

/// Hours of production covered by a number of containers
pub fn hours_to_check_back(boxes: u64, production_rate_per_hour: f64) -> Result<f64, DomainError> {
    if !(production_rate_per_hour > 0.0) || !production_rate_per_hour.is_finite() {
        return Err(DomainError::NonPositiveRate(production_rate_per_hour));
    }
    Ok(boxes as f64 / production_rate_per_hour)
}

/// Compute a pattern-based plan
pub fn compute(input: &PatternInput) -> Result<PatternPlan, DomainError> {
    let actual = actual_defect_rate(input.total_defects, input.samples_checked)?;
    if input.units_per_container == 0 {
        return Err(DomainError::ZeroUnitsPerContainer);
    }
    let defect_rate = percent_to_decimal("actual defect rate", actual)?;
    let aql = percent_to_decimal("aql", input.aql)?;
    let substituted = aql == 0.0;
    let effective_aql = if substituted {
        tracing::warn!(
            substitute = input.zero_aql_substitute.0,
            "AQL of 0% replaced by substitute"
        );
        input.zero_aql_substitute.0
    } else {
        aql
    };
    let confidence = input
        .confidence
        .unwrap_or_else(|| ConfidenceLevel::for_aql(input.aql));

    let base = zero_defect::size(confidence.as_decimal(), effective_aql)?;

    let (tier, boxes, total_samples, strategy) = match input.pattern {
        Some(pattern) => {
            let boxes = pattern.containers();
            let total = boxes
                .checked_mul(input.units_per_container)
                .ok_or(DomainError::Overflow {
                    quantity: "units to check",
                })?;
            (pattern.tier(), boxes, total, pattern.strategy())
        }
        None => {
            let tier = RiskTier::from_ratio(actual, input.aql);
            let total = (base as f64 * tier.multiplier()).ceil() as u64;
            (
                tier,
                total.div_ceil(input.units_per_container),
                total,
                "ratio",
            )
        }
    };
    let hours = hours_to_check_back(boxes, input.production_rate_per_hour)?;
    let params = tier.params();
    let (acceptance_probability, beta_risk) = risk_figures(total_samples, effective_aql, defect_rate);

    tracing::debug!(
        pattern = ?input.pattern,
        %tier,
        boxes,
        total_samples,
        hours,
        "pattern-based plan"
    );

    Ok(PatternPlan {
        plan: SamplingPlanResult {
            confidence,
            base_sample_size: base,
            adjusted_sample_size: base,
            multiplier: params.multiplier,
            total_samples,
            acceptance_probability,
            beta_risk,
            risk_tier: tier,
            recommended_batches: params.recommended_batches,
            ci_reduction: ci_reduction(params.multiplier),
            rpn: None,
        },
        pattern: input.pattern,
        strategy,
        actual_defect_rate: actual,
        boxes_to_check: boxes,
        units_per_container: input.units_per_container,
        hours_to_check_back: hours,
        zero_aql_substituted: substituted,
    })
}
