//! ISO 2859-1 style lot sampling across inspection intervals
//!
//! A fixed production window before the detection point is split into equal
//! intervals. Each interval is inspected as its own lot: its size selects a
//! lot-size code letter, the code and interval AQL select a sample size, and
//! the AQL selects the acceptance number. Intervals further from the
//! detection point are inspected against a progressively looser AQL.
//!
//! The sample-size table is a simplified, truncated rendition of the
//! standard's single-sampling table. It is kept literally so reports stay
//! comparable with those produced earlier; do not replace it with the full
//! ISO 2859-1 tables.

use serde::Serialize;

use super::tier::InspectionLevel;
use super::{aql_index, binomial, check_interval_count, percent_to_decimal, round_to, snap_aql};
use super::AQL_DOMAIN;
use crate::core::{DomainError, LookupMiss};

/// Production window inspected back from the detection point
pub const DEFAULT_WINDOW_MINUTES: f64 = 120.0;

/// AQL escalation per interval step
pub const AQL_ESCALATION_STEP: f64 = 0.2;

/// Sample size used when the table has no entry
pub const DEFAULT_SAMPLE_SIZE: u64 = 200;

/// ISO 2859-1 lot-size code letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LotSizeCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    J,
    K,
    L,
    M,
    N,
    P,
    Q,
}

/// Inclusive lower bounds of each code's lot-size range; each range ends
/// where the next begins and Q is open-ended
const LOT_RANGES: [(u64, LotSizeCode); 15] = [
    (2, LotSizeCode::A),
    (9, LotSizeCode::B),
    (16, LotSizeCode::C),
    (26, LotSizeCode::D),
    (51, LotSizeCode::E),
    (91, LotSizeCode::F),
    (151, LotSizeCode::G),
    (281, LotSizeCode::H),
    (501, LotSizeCode::J),
    (1201, LotSizeCode::K),
    (3201, LotSizeCode::L),
    (10001, LotSizeCode::M),
    (35001, LotSizeCode::N),
    (150001, LotSizeCode::P),
    (500001, LotSizeCode::Q),
];

/// Sample size by code row (A..L) and AQL column (in [`AQL_DOMAIN`] order)
const SAMPLE_SIZES: [[u64; 11]; 11] = [
    [200, 125, 80, 50, 32, 20, 13, 8, 5, 3, 2],              // A
    [200, 125, 80, 50, 32, 20, 13, 8, 5, 3, 3],              // B
    [200, 125, 80, 50, 32, 20, 13, 8, 5, 5, 5],              // C
    [200, 125, 80, 50, 32, 20, 13, 8, 8, 8, 8],              // D
    [200, 125, 80, 50, 32, 20, 13, 13, 13, 13, 13],          // E
    [200, 125, 80, 50, 32, 20, 20, 20, 20, 20, 20],          // F
    [200, 125, 80, 50, 32, 32, 32, 32, 32, 32, 32],          // G
    [200, 125, 80, 50, 50, 50, 50, 50, 50, 50, 50],          // H
    [200, 125, 80, 80, 80, 80, 80, 80, 80, 80, 80],          // J
    [200, 125, 125, 125, 125, 125, 125, 125, 125, 125, 125], // K
    [200, 200, 200, 200, 200, 200, 200, 200, 200, 200, 200], // L
];

/// Acceptance number by AQL (in [`AQL_DOMAIN`] order)
const ACCEPTANCE_NUMBERS: [u32; 11] = [0, 0, 0, 0, 0, 1, 1, 2, 3, 5, 7];

impl LotSizeCode {
    /// Code for a lot size, or `None` below the smallest coded lot
    pub fn from_lot_size(lot_size: u64) -> Option<Self> {
        LOT_RANGES
            .iter()
            .rev()
            .find(|(lower, _)| lot_size >= *lower)
            .map(|(_, code)| *code)
    }

    /// Inclusive lot-size range covered by this code (`None` = unbounded)
    pub fn range(self) -> (u64, Option<u64>) {
        let pos = LOT_RANGES
            .iter()
            .position(|(_, code)| *code == self)
            .unwrap_or(0);
        let lower = LOT_RANGES[pos].0;
        let upper = LOT_RANGES.get(pos + 1).map(|(next, _)| next - 1);
        (lower, upper)
    }

    /// Row of [`SAMPLE_SIZES`]; M, N, P and Q share L's row
    fn table_row(self) -> usize {
        (self as usize).min(LotSizeCode::L as usize)
    }
}

impl std::fmt::Display for LotSizeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Code for a lot size, snapping lots below the table to `A`
pub fn lot_size_code(lot_size: u64) -> (LotSizeCode, Option<LookupMiss>) {
    match LotSizeCode::from_lot_size(lot_size) {
        Some(code) => (code, None),
        None => (
            LotSizeCode::A,
            Some(LookupMiss::record("lot-size code", lot_size, LotSizeCode::A)),
        ),
    }
}

/// Sample size for a code and AQL, defaulting when the AQL is not tabled
pub fn sample_size(code: LotSizeCode, aql: f64) -> (u64, Option<LookupMiss>) {
    match aql_index(aql) {
        Some(col) => (SAMPLE_SIZES[code.table_row()][col], None),
        None => (
            DEFAULT_SAMPLE_SIZE,
            Some(LookupMiss::record(
                "sample size",
                format!("{}/{}", code, aql),
                DEFAULT_SAMPLE_SIZE,
            )),
        ),
    }
}

/// Acceptance number for an AQL, snapping to the nearest tabled AQL
pub fn acceptance_number(aql: f64) -> (u32, Option<LookupMiss>) {
    match aql_index(aql) {
        Some(col) => (ACCEPTANCE_NUMBERS[col], None),
        None => {
            let snapped = snap_aql(aql);
            let col = aql_index(snapped).unwrap_or(0);
            (
                ACCEPTANCE_NUMBERS[col],
                Some(LookupMiss::record("acceptance number", aql, snapped)),
            )
        }
    }
}

/// AQL for interval `index` (0 = nearest the detection point)
pub fn escalated_aql(base_aql: f64, index: usize, loosest: f64) -> f64 {
    let raw = base_aql * (1.0 + index as f64 * AQL_ESCALATION_STEP);
    snap_aql(raw.min(loosest))
}

/// Where the units of a plan come from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LotSource {
    /// Units produced per hour across the window
    ProductionRate(f64),
    /// A known lot split evenly over the intervals
    LotSize(u64),
}

/// Inputs to an interval plan
#[derive(Debug, Clone, PartialEq)]
pub struct IsoPlanInput {
    pub source: LotSource,
    pub window_minutes: f64,
    pub interval_count: usize,
    /// AQL (percent) for the interval nearest the detection point
    pub base_aql: f64,
    /// AQLs (percent) the user allows; the loosest caps the escalation
    pub aql_options: Vec<f64>,
    pub inspection_level: InspectionLevel,
}

/// Minutes before the detection point covered by an interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeRange {
    pub start_minutes: f64,
    pub end_minutes: f64,
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{} min", self.start_minutes, self.end_minutes)
    }
}

/// Outcome of inspecting one interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Release,
    Hold,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::Release => write!(f, "release"),
            Disposition::Hold => write!(f, "hold"),
        }
    }
}

/// The sampling plan for one interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalAllocation {
    pub interval_index: usize,
    pub time_range: TimeRange,
    pub products_in_interval: u64,
    pub lot_code: LotSizeCode,
    pub aql: f64,
    pub sample_size: u64,
    pub acceptance_number: u32,
    pub rejection_number: u32,
    pub inspection_percentage: f64,
    /// Chance (percent) of release when the interval is exactly at its AQL
    pub acceptance_probability: f64,
}

impl IntervalAllocation {
    pub fn disposition(&self, defects_found: u32) -> Disposition {
        if defects_found <= self.acceptance_number {
            Disposition::Release
        } else {
            Disposition::Hold
        }
    }
}

/// A complete interval plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IsoPlan {
    pub source: LotSource,
    pub inspection_level: InspectionLevel,
    pub slice_minutes: f64,
    pub products_per_interval: u64,
    pub total_products: u64,
    pub total_samples: u64,
    pub intervals: Vec<IntervalAllocation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub approximations: Vec<LookupMiss>,
}

/// Build the per-interval plan
pub fn plan(input: &IsoPlanInput) -> Result<IsoPlan, DomainError> {
    check_interval_count(input.interval_count)?;
    if !(input.window_minutes > 0.0) || !input.window_minutes.is_finite() {
        return Err(DomainError::NonPositiveWindow(input.window_minutes));
    }
    percent_to_decimal("base aql", input.base_aql)?;
    for &option in &input.aql_options {
        percent_to_decimal("aql option", option)?;
    }

    let count = input.interval_count;
    let slice_minutes = input.window_minutes / count as f64;
    let products_per_interval = match input.source {
        LotSource::ProductionRate(rate) => {
            if !(rate > 0.0) || !rate.is_finite() {
                return Err(DomainError::NonPositiveRate(rate));
            }
            let products = (rate * slice_minutes / 60.0).ceil();
            if products >= u64::MAX as f64 {
                return Err(DomainError::Overflow {
                    quantity: "products per interval",
                });
            }
            products as u64
        }
        LotSource::LotSize(0) => return Err(DomainError::InvalidLotSize),
        LotSource::LotSize(lot) => lot.div_ceil(count as u64),
    };
    let total_products = products_per_interval
        .checked_mul(count as u64)
        .ok_or(DomainError::Overflow {
            quantity: "total products",
        })?;
    let loosest = input
        .aql_options
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    let loosest = if loosest.is_finite() {
        loosest
    } else {
        AQL_DOMAIN[AQL_DOMAIN.len() - 1]
    };

    let mut approximations = Vec::new();
    let (lot_code, miss) = lot_size_code(products_per_interval);
    approximations.extend(miss);

    let mut intervals = Vec::with_capacity(count);
    for index in 0..count {
        let aql = escalated_aql(input.base_aql, index, loosest);
        let (tabled, miss) = sample_size(lot_code, aql);
        approximations.extend(miss);
        let (acceptance_number, miss) = acceptance_number(aql);
        approximations.extend(miss);

        let sample_size = input
            .inspection_level
            .adjust(tabled)
            .min(products_per_interval);
        let acceptance_probability =
            binomial::cdf(acceptance_number as u64, sample_size, aql / 100.0) * 100.0;

        intervals.push(IntervalAllocation {
            interval_index: index,
            time_range: TimeRange {
                start_minutes: slice_minutes * index as f64,
                end_minutes: slice_minutes * (index + 1) as f64,
            },
            products_in_interval: products_per_interval,
            lot_code,
            aql,
            sample_size,
            acceptance_number,
            rejection_number: acceptance_number + 1,
            inspection_percentage: round_to(
                sample_size as f64 / products_per_interval as f64 * 100.0,
                1,
            ),
            acceptance_probability,
        });
    }

    let total_samples = intervals.iter().map(|i| i.sample_size).sum();
    tracing::debug!(
        %lot_code,
        products_per_interval,
        total_samples,
        level = %input.inspection_level,
        "interval plan"
    );

    Ok(IsoPlan {
        source: input.source,
        inspection_level: input.inspection_level,
        slice_minutes,
        products_per_interval,
        total_products,
        total_samples,
        intervals,
        approximations,
    })
}
