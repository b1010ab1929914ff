//! Backward sampling of held lots with a risk multiplier
//!
//! After a defect escapes, the zero-defect sample is inflated by a multiplier
//! chosen from the observed risk. The multiplier can come from the ratio of
//! the observed defect rate to the AQL, from a manual override, or from an
//! FMEA risk priority number.

use serde::Serialize;

use super::tier::{rpn, RiskTier};
use super::{binomial, percent_to_decimal, zero_defect, ConfidenceLevel};
use crate::core::DomainError;

/// How the risk multiplier is chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RiskMethod {
    /// Observed defect rate divided by AQL
    Ratio,
    /// User supplied multiplier (>= 1)
    Manual { multiplier: f64 },
    /// Severity x occurrence x detection, each rated 1-10
    Fmea {
        severity: u8,
        occurrence: u8,
        detection: u8,
    },
}

impl std::fmt::Display for RiskMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskMethod::Ratio => write!(f, "ratio"),
            RiskMethod::Manual { .. } => write!(f, "manual"),
            RiskMethod::Fmea { .. } => write!(f, "fmea"),
        }
    }
}

/// The multiplier a risk method settles on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub tier: RiskTier,
    pub multiplier: f64,
    pub recommended_batches: u32,
    /// Present for the FMEA method
    pub rpn: Option<u16>,
}

impl RiskMethod {
    /// Resolve the method into a tier and multiplier
    ///
    /// `defect_rate` and `aql` are percentages; only the ratio method reads them.
    pub fn assess(&self, defect_rate: f64, aql: f64) -> Result<RiskAssessment, DomainError> {
        match *self {
            RiskMethod::Ratio => Ok(RiskAssessment::from_tier(
                RiskTier::from_ratio(defect_rate, aql),
                None,
            )),
            RiskMethod::Manual { multiplier } => {
                if !multiplier.is_finite() || multiplier < 1.0 {
                    return Err(DomainError::InvalidMultiplier(multiplier));
                }
                Ok(RiskAssessment {
                    tier: RiskTier::for_multiplier(multiplier),
                    multiplier,
                    recommended_batches: multiplier.floor() as u32,
                    rpn: None,
                })
            }
            RiskMethod::Fmea {
                severity,
                occurrence,
                detection,
            } => {
                let score = rpn(severity, occurrence, detection)?;
                Ok(RiskAssessment::from_tier(
                    RiskTier::from_rpn(score),
                    Some(score),
                ))
            }
        }
    }
}

impl RiskAssessment {
    pub fn from_tier(tier: RiskTier, rpn: Option<u16>) -> Self {
        let params = tier.params();
        Self {
            tier,
            multiplier: params.multiplier,
            recommended_batches: params.recommended_batches,
            rpn,
        }
    }
}

/// Inputs to the backward multiplier calculation
#[derive(Debug, Clone, PartialEq)]
pub struct BackwardInput {
    /// Observed defect rate in percent
    pub defect_rate: f64,
    /// AQL in percent
    pub aql: f64,
    /// Explicit confidence; derived from the AQL when absent
    pub confidence: Option<ConfidenceLevel>,
    /// Units in the held lot
    pub lot_size: u64,
    pub method: RiskMethod,
}

/// A computed sampling plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplingPlanResult {
    pub confidence: ConfidenceLevel,
    /// Zero-defect sample size before any multiplier
    pub base_sample_size: u64,
    /// Base size after finite-population correction
    pub adjusted_sample_size: u64,
    pub multiplier: f64,
    pub total_samples: u64,
    /// Chance (percent) of finding no defect when the lot is exactly at AQL
    pub acceptance_probability: f64,
    /// Chance (percent) of finding no defect at the observed defect rate
    pub beta_risk: f64,
    pub risk_tier: RiskTier,
    pub recommended_batches: u32,
    /// Confidence-interval shrinkage (percent) from inflating the sample
    pub ci_reduction: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpn: Option<u16>,
}

/// `(1 - 1/sqrt(m)) * 100`
pub fn ci_reduction(multiplier: f64) -> f64 {
    (1.0 - 1.0 / multiplier.sqrt()) * 100.0
}

/// Acceptance probability and beta risk, both in percent
///
/// `aql` and `defect_rate` are decimals.
pub(crate) fn risk_figures(total_samples: u64, aql: f64, defect_rate: f64) -> (f64, f64) {
    (
        binomial::prob_zero(total_samples, aql) * 100.0,
        binomial::prob_zero(total_samples, defect_rate) * 100.0,
    )
}

/// Compute a backward sampling plan for a held lot
pub fn compute(input: &BackwardInput) -> Result<SamplingPlanResult, DomainError> {
    if input.lot_size == 0 {
        return Err(DomainError::InvalidLotSize);
    }
    let aql = percent_to_decimal("aql", input.aql)?;
    let defect_rate = percent_to_decimal("defect rate", input.defect_rate)?;
    let confidence = input
        .confidence
        .unwrap_or_else(|| ConfidenceLevel::for_aql(input.aql));

    let base = zero_defect::size(confidence.as_decimal(), aql)?;
    let adjusted = zero_defect::adjust_for_population(base, input.lot_size);
    let assessment = input.method.assess(input.defect_rate, input.aql)?;

    let total_samples =
        ((base as f64 * assessment.multiplier).ceil() as u64).min(input.lot_size);
    let (acceptance_probability, beta_risk) = risk_figures(total_samples, aql, defect_rate);

    tracing::debug!(
        method = %input.method,
        tier = %assessment.tier,
        multiplier = assessment.multiplier,
        base,
        total_samples,
        "backward sampling plan"
    );

    Ok(SamplingPlanResult {
        confidence,
        base_sample_size: base,
        adjusted_sample_size: adjusted,
        multiplier: assessment.multiplier,
        total_samples,
        acceptance_probability,
        beta_risk,
        risk_tier: assessment.tier,
        recommended_batches: assessment.recommended_batches,
        ci_reduction: ci_reduction(assessment.multiplier),
        rpn: assessment.rpn,
    })
}
