//! Sampling plan calculators
//!
//! Five independent, stateless calculators share the classifiers in
//! [`tier`] and the binomial helpers in [`binomial`]:
//!
//! - [`zero_defect`]: `n = ln(1-CL)/ln(1-AQL)` with finite-population correction
//! - [`backward`]: risk-multiplied backward sample with acceptance and beta risk
//! - [`pattern`]: containers to pull for a clustered/intermittent/random pattern
//! - [`iso`]: lot-size codes and per-interval ISO 2859-1 style plans
//! - [`stratified`]: exponential-decay allocation of a fixed sample budget
//!
//! Percentages cross the public API as percentages (`2.5` means 2.5%) and are
//! converted to decimals inside each calculator.

pub mod backward;
pub mod binomial;
pub mod iso;
pub mod pattern;
pub mod stratified;
pub mod tier;
pub mod zero_defect;

pub use backward::{BackwardInput, RiskMethod, SamplingPlanResult};
pub use iso::{IntervalAllocation, IsoPlan, IsoPlanInput, LotSizeCode};
pub use pattern::{PatternInput, PatternPlan, ZeroAqlSubstitute};
pub use stratified::{StratifiedInput, StratifiedPlan};
pub use tier::{
    ColorTag, ConfidenceLevel, DefectPattern, InspectionLevel, RiskTier, SeverityClass,
};
pub use zero_defect::{ZeroDefectInput, ZeroDefectPlan};

use crate::core::DomainError;

/// Discrete AQL values (percent) used by the sampling tables
pub const AQL_DOMAIN: [f64; 11] = [
    0.065, 0.1, 0.15, 0.25, 0.4, 0.65, 1.0, 1.5, 2.5, 4.0, 6.5,
];

/// Fewest and most time intervals a plan may be split into
pub const MIN_INTERVALS: usize = 2;
pub const MAX_INTERVALS: usize = 8;

/// Validate a percentage and convert it to a decimal fraction
pub(crate) fn percent_to_decimal(field: &'static str, value: f64) -> Result<f64, DomainError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(DomainError::InvalidPercentage { field, value });
    }
    Ok(value / 100.0)
}

pub(crate) fn check_interval_count(count: usize) -> Result<(), DomainError> {
    if !(MIN_INTERVALS..=MAX_INTERVALS).contains(&count) {
        return Err(DomainError::IntervalCount {
            got: count,
            min: MIN_INTERVALS,
            max: MAX_INTERVALS,
        });
    }
    Ok(())
}

/// Round to a number of decimal places, ties to even
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Snap an AQL to the nearest value of [`AQL_DOMAIN`]
///
/// Ties go to the candidate listed first, i.e. the tighter AQL.
pub fn snap_aql(aql: f64) -> f64 {
    let mut best = AQL_DOMAIN[0];
    let mut best_diff = (aql - best).abs();
    for &candidate in &AQL_DOMAIN[1..] {
        let diff = (aql - candidate).abs();
        if diff < best_diff {
            best = candidate;
            best_diff = diff;
        }
    }
    best
}

/// Position of an AQL in [`AQL_DOMAIN`], if it is one of the listed values
pub(crate) fn aql_index(aql: f64) -> Option<usize> {
    AQL_DOMAIN.iter().position(|&v| (v - aql).abs() < 1e-9)
}
