//! Zero-defect (c = 0) sample sizing
//!
//! A zero-acceptance plan rejects the lot on the first defective unit. The
//! sample size that demonstrates, with confidence `CL`, that the defect rate
//! is below the AQL is
//!
//! ```text
//! n = ceil( ln(1 - CL) / ln(1 - AQL) )
//! ```
//!
//! When the sample is a sizeable share of a finite lot the requirement is
//! relaxed with the finite-population correction
//!
//! ```text
//! n_adj = ceil( n * N / (n + N - 1) )
//! ```

use serde::Serialize;

use super::{percent_to_decimal, round_to, ColorTag, ConfidenceLevel};
use crate::core::DomainError;

/// Sample share of the population above which the correction applies
pub const FPC_THRESHOLD: f64 = 0.1;

/// Zero-defect sample size for a confidence and AQL, both as decimals
pub fn size(confidence: f64, aql: f64) -> Result<u64, DomainError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(DomainError::InvalidConfidence(confidence));
    }
    if aql == 0.0 {
        return Err(DomainError::ZeroAql);
    }
    if !(aql > 0.0 && aql < 1.0) {
        return Err(DomainError::InvalidPercentage {
            field: "aql",
            value: aql * 100.0,
        });
    }
    let n = ((1.0 - confidence).ln() / (1.0 - aql).ln()).ceil();
    Ok(n as u64)
}

/// Finite-population correction of a sample size `n` for a lot of `population`
///
/// The result never exceeds `population`.
pub fn finite_population_correction(n: u64, population: u64) -> u64 {
    if n == 0 || population == 0 {
        return 0;
    }
    let numerator = n as u128 * population as u128;
    let denominator = n as u128 + population as u128 - 1;
    numerator.div_ceil(denominator) as u64
}

/// Apply the correction only when `n` exceeds 10% of the population
pub fn adjust_for_population(n: u64, population: u64) -> u64 {
    if n as f64 > population as f64 * FPC_THRESHOLD {
        finite_population_correction(n, population)
    } else {
        n
    }
}

/// Inputs for a zero-defect plan over a held quantity
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroDefectInput {
    /// AQL in percent
    pub aql: f64,
    /// Explicit confidence; derived from the AQL when absent
    pub confidence: Option<ConfidenceLevel>,
    /// Observed defect rate in percent
    pub defect_rate: f64,
    /// Units currently on hold
    pub held_quantity: u64,
}

/// How the held quantity is to be inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionPolicy {
    /// Sample under a zero-acceptance plan
    ZeroDefect,
    /// AQL of 0%: every unit is inspected
    FullInspection,
}

/// Disposition advice based on the defects expected in the sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Accept,
    ConsiderFullInspection,
    RecommendFullInspection,
}

impl Recommendation {
    pub fn from_expected_defects(expected: f64) -> Self {
        if expected < 1.0 {
            Recommendation::Accept
        } else if expected < 3.0 {
            Recommendation::ConsiderFullInspection
        } else {
            Recommendation::RecommendFullInspection
        }
    }

    pub fn color(self) -> ColorTag {
        match self {
            Recommendation::Accept => ColorTag::Green,
            Recommendation::ConsiderFullInspection => ColorTag::Yellow,
            Recommendation::RecommendFullInspection => ColorTag::Red,
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recommendation::Accept => write!(f, "accept"),
            Recommendation::ConsiderFullInspection => write!(f, "consider_full_inspection"),
            Recommendation::RecommendFullInspection => write!(f, "recommend_full_inspection"),
        }
    }
}

/// A zero-defect plan for a held quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroDefectPlan {
    pub aql: f64,
    pub confidence: ConfidenceLevel,
    pub defect_rate: f64,
    pub held_quantity: u64,
    pub policy: InspectionPolicy,
    pub required_sample_size: u64,
    pub adjusted_sample_size: u64,
    pub expected_defects: f64,
    pub recommendation: Recommendation,
}

impl ZeroDefectPlan {
    pub fn message(&self) -> String {
        match self.recommendation {
            Recommendation::Accept => format!(
                "Accept the lot if no defect is found in a sample of {} units",
                self.adjusted_sample_size
            ),
            Recommendation::ConsiderFullInspection => format!(
                "Consider 100% inspection: {} defects expected in the sample",
                self.expected_defects
            ),
            Recommendation::RecommendFullInspection => format!(
                "100% inspection recommended: {} defects expected in the sample",
                self.expected_defects
            ),
        }
    }
}

/// Build a zero-defect plan, falling back to 100% inspection for an AQL of 0%
pub fn plan(input: &ZeroDefectInput) -> Result<ZeroDefectPlan, DomainError> {
    if input.held_quantity == 0 {
        return Err(DomainError::InvalidLotSize);
    }
    let aql = percent_to_decimal("aql", input.aql)?;
    let defect_rate = percent_to_decimal("defect rate", input.defect_rate)?;
    let confidence = input
        .confidence
        .unwrap_or_else(|| ConfidenceLevel::for_aql(input.aql));

    let (policy, required) = if aql > 0.0 {
        (
            InspectionPolicy::ZeroDefect,
            size(confidence.as_decimal(), aql)?,
        )
    } else {
        (InspectionPolicy::FullInspection, input.held_quantity)
    };
    let adjusted = match policy {
        InspectionPolicy::ZeroDefect => adjust_for_population(required, input.held_quantity),
        InspectionPolicy::FullInspection => required,
    };
    let expected_defects = round_to(adjusted as f64 * defect_rate, 1);

    tracing::debug!(
        aql = input.aql,
        %confidence,
        required,
        adjusted,
        expected_defects,
        "zero-defect plan"
    );

    Ok(ZeroDefectPlan {
        aql: input.aql,
        confidence,
        defect_rate: input.defect_rate,
        held_quantity: input.held_quantity,
        policy,
        required_sample_size: required,
        adjusted_sample_size: adjusted,
        expected_defects,
        recommendation: Recommendation::from_expected_defects(expected_defects),
    })
}

/// One row of the published sampling reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceRow {
    pub aql: f64,
    pub confidence: ConfidenceLevel,
    pub sample_size: u64,
}

const REFERENCE_PAIRS: [(f64, ConfidenceLevel); 9] = [
    (0.1, ConfidenceLevel::NinetyNine),
    (0.1, ConfidenceLevel::NinetyFive),
    (1.0, ConfidenceLevel::NinetyNine),
    (1.0, ConfidenceLevel::NinetyFive),
    (2.5, ConfidenceLevel::NinetyFive),
    (2.5, ConfidenceLevel::Ninety),
    (4.0, ConfidenceLevel::NinetyFive),
    (4.0, ConfidenceLevel::Ninety),
    (6.5, ConfidenceLevel::Ninety),
];

/// Zero-defect sample sizes for the commonly quoted AQL/confidence pairs
///
/// Rows are computed from [`size`], not copied from a printed table. Some
/// published references round differently and list 4605 for 0.1%/99% and 92
/// for 2.5%/90%; the formula gives 4603 and 91.
pub fn reference_table() -> Vec<ReferenceRow> {
    REFERENCE_PAIRS
        .iter()
        .filter_map(|&(aql, confidence)| {
            size(confidence.as_decimal(), aql / 100.0)
                .ok()
                .map(|sample_size| ReferenceRow {
                    aql,
                    confidence,
                    sample_size,
                })
        })
        .collect()
}
