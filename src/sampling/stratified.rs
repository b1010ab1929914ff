//! Risk-stratified allocation of a fixed sample budget
//!
//! Intervals closer to the point where a defect was detected are the most
//! likely to contain more of it, so they get the largest share of the budget.
//! Weights decay as `exp(-k * i)` with `k` set by the defect's severity class.

use serde::Serialize;

use super::tier::SeverityClass;
use super::{aql_index, check_interval_count, percent_to_decimal, snap_aql};
use crate::core::{DomainError, LookupMiss};

/// No interval is ever sampled with fewer units than this
pub const MIN_PER_INTERVAL: u64 = 5;

/// AQLs at or below this are always zero-acceptance
pub const ZERO_ACCEPTANCE_CUTOFF: f64 = 0.25;

/// Acceptance number by AQL (in [`super::AQL_DOMAIN`] order)
const ACCEPTANCE_NUMBERS: [u32; 11] = [0, 0, 0, 1, 1, 1, 2, 3, 5, 7, 10];

/// Normalized decay weights for `count` intervals
pub fn weights(count: usize, severity: SeverityClass) -> Vec<f64> {
    let k = severity.decay();
    let raw: Vec<f64> = (0..count).map(|i| (-k * i as f64).exp()).collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// Split `budget` samples over `count` intervals
///
/// The result sums to `budget` exactly and gives every interval at least
/// [`MIN_PER_INTERVAL`].
pub fn allocate(count: usize, budget: u64, severity: SeverityClass) -> Result<Vec<u64>, DomainError> {
    check_interval_count(count)?;
    let required = MIN_PER_INTERVAL * count as u64;
    if budget < required {
        return Err(DomainError::InsufficientBudget {
            budget,
            intervals: count,
            floor: MIN_PER_INTERVAL,
            required,
        });
    }

    let mut allocation: Vec<u64> = weights(count, severity)
        .into_iter()
        .map(|w| ((budget as f64 * w).round_ties_even() as u64).max(MIN_PER_INTERVAL))
        .collect();

    // Sums run in u128: rounded shares of a budget near u64::MAX can add up
    // past it.
    let total: u128 = allocation.iter().map(|&n| n as u128).sum();

    // Over budget: trim the largest allocation still above the floor. It is
    // cut straight down to the runner-up, then ties lose one unit at a time
    // starting with the first. The precondition guarantees such an allocation
    // exists while the sum exceeds the budget.
    let mut excess = total.saturating_sub(budget as u128);
    while excess > 0 {
        let Some(i) = largest_above_floor(&allocation) else {
            break;
        };
        let runner_up = allocation
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(_, &n)| n)
            .max()
            .unwrap_or(MIN_PER_INTERVAL)
            .max(MIN_PER_INTERVAL);
        let step = (allocation[i] - runner_up)
            .max(1)
            .min(u64::try_from(excess).unwrap_or(u64::MAX));
        allocation[i] -= step;
        excess -= step as u128;
    }

    // Under budget: spread the shortfall evenly, the remainder one unit per
    // interval from the front. Rounding a budget that f64 holds exactly
    // loses at most half a unit per interval, so only the remainder applies.
    let total: u128 = allocation.iter().map(|&n| n as u128).sum();
    let shortfall = (budget as u128).saturating_sub(total);
    let per_interval = (shortfall / count as u128) as u64;
    let remainder = (shortfall % count as u128) as usize;
    for (i, slot) in allocation.iter_mut().enumerate() {
        *slot += per_interval + u64::from(i < remainder);
    }

    debug_assert_eq!(allocation.iter().sum::<u64>(), budget);
    tracing::debug!(%severity, budget, ?allocation, "stratified allocation");
    Ok(allocation)
}

/// First index holding the largest allocation above [`MIN_PER_INTERVAL`]
fn largest_above_floor(allocation: &[u64]) -> Option<usize> {
    let mut largest: Option<usize> = None;
    for (i, &n) in allocation.iter().enumerate() {
        if n > MIN_PER_INTERVAL && largest.map_or(true, |j| n > allocation[j]) {
            largest = Some(i);
        }
    }
    largest
}

/// AQL (percent) for each interval, loosening away from the detection point
pub fn aql_progression(
    base_aql: f64,
    count: usize,
    severity: SeverityClass,
) -> Result<Vec<f64>, DomainError> {
    check_interval_count(count)?;
    percent_to_decimal("base aql", base_aql)?;
    Ok(severity
        .aql_multipliers()
        .iter()
        .take(count)
        .map(|m| snap_aql(base_aql * m))
        .collect())
}

/// Acceptance number for one AQL
///
/// Tight AQLs (`<= 0.25`) are always zero-acceptance regardless of the table.
pub fn acceptance_number(aql: f64) -> (u32, Option<LookupMiss>) {
    let (snapped, miss) = match aql_index(aql) {
        Some(_) => (aql, None),
        None => {
            let snapped = snap_aql(aql);
            (
                snapped,
                Some(LookupMiss::record("stratified acceptance number", aql, snapped)),
            )
        }
    };
    if snapped <= ZERO_ACCEPTANCE_CUTOFF {
        return (0, miss);
    }
    let col = aql_index(snapped).unwrap_or(0);
    (ACCEPTANCE_NUMBERS[col], miss)
}

/// Acceptance numbers for a sequence of AQLs
pub fn acceptance_numbers(aqls: &[f64]) -> Vec<u32> {
    aqls.iter().map(|&aql| acceptance_number(aql).0).collect()
}

/// Inputs to a stratified plan
#[derive(Debug, Clone, PartialEq)]
pub struct StratifiedInput {
    pub interval_count: usize,
    pub budget: u64,
    pub severity: SeverityClass,
    /// AQL (percent) for the interval nearest the detection point
    pub base_aql: f64,
}

/// One interval of a stratified plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StratifiedRow {
    pub interval_index: usize,
    pub weight: f64,
    pub sample_size: u64,
    /// Share of the budget, in percent
    pub share_percent: f64,
    pub aql: f64,
    pub acceptance_number: u32,
}

/// A stratified plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StratifiedPlan {
    pub severity: SeverityClass,
    pub decay: f64,
    pub budget: u64,
    pub rows: Vec<StratifiedRow>,
}

/// Allocate the budget and attach the AQL progression to each interval
pub fn stratify(input: &StratifiedInput) -> Result<StratifiedPlan, DomainError> {
    let allocation = allocate(input.interval_count, input.budget, input.severity)?;
    let aqls = aql_progression(input.base_aql, input.interval_count, input.severity)?;
    let acceptance = acceptance_numbers(&aqls);
    let weights = weights(input.interval_count, input.severity);

    let rows = allocation
        .iter()
        .zip(&aqls)
        .zip(&acceptance)
        .zip(&weights)
        .enumerate()
        .map(|(index, (((&n, &aql), &ac), &weight))| StratifiedRow {
            interval_index: index,
            weight,
            sample_size: n,
            share_percent: super::round_to(n as f64 / input.budget as f64 * 100.0, 1),
            aql,
            acceptance_number: ac,
        })
        .collect();

    Ok(StratifiedPlan {
        severity: input.severity,
        decay: input.severity.decay(),
        budget: input.budget,
        rows,
    })
}
