//! Error taxonomy for sampling calculations
//!
//! Two kinds of trouble can happen while building a plan:
//!
//! - [`DomainError`]: an input violates a mathematical precondition. The plan
//!   is unusable and the error always reaches the caller.
//! - [`LookupMiss`]: a value falls outside a fixed table's domain. The lookup
//!   snaps to the nearest known entry (or a default), the miss is logged, and
//!   the record is handed back with the plan for audit.

use serde::Serialize;
use thiserror::Error;

/// A violated mathematical precondition
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("AQL of 0% has no zero-defect sample size; choose 100% inspection instead")]
    ZeroAql,

    #[error("{field} must be a percentage in [0, 100], got {value}")]
    InvalidPercentage { field: &'static str, value: f64 },

    #[error("confidence level must lie strictly between 0 and 1, got {0}")]
    InvalidConfidence(f64),

    #[error("cannot compute a defect rate from zero checked samples")]
    ZeroSamplesChecked,

    #[error("units per container must be at least 1")]
    ZeroUnitsPerContainer,

    #[error("production rate must be positive, got {0} per hour")]
    NonPositiveRate(f64),

    #[error("inspection window must be positive, got {0} minutes")]
    NonPositiveWindow(f64),

    #[error("lot size must be at least 1")]
    InvalidLotSize,

    #[error("manual multiplier must be a finite value >= 1, got {0}")]
    InvalidMultiplier(f64),

    #[error("FMEA {field} rating must be between 1 and 10, got {value}")]
    InvalidRating { field: &'static str, value: u8 },

    #[error("interval count must be between {min} and {max}, got {got}")]
    IntervalCount { got: usize, min: usize, max: usize },

    #[error("{quantity} is too large to count")]
    Overflow { quantity: &'static str },

    #[error(
        "sample budget {budget} cannot give {intervals} intervals at least {floor} samples each (need {required})"
    )]
    InsufficientBudget {
        budget: u64,
        intervals: usize,
        floor: u64,
        required: u64,
    },
}

/// A table lookup that had to be resolved by approximation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupMiss {
    /// Which table missed
    pub table: &'static str,
    /// The value that was asked for
    pub requested: String,
    /// The value that was used instead
    pub resolved: String,
}

impl LookupMiss {
    /// Record a miss and log it as an approximation
    pub fn record(
        table: &'static str,
        requested: impl ToString,
        resolved: impl ToString,
    ) -> Self {
        let miss = Self {
            table,
            requested: requested.to_string(),
            resolved: resolved.to_string(),
        };
        tracing::warn!(
            table = miss.table,
            requested = %miss.requested,
            resolved = %miss.resolved,
            "lookup miss resolved by approximation"
        );
        miss
    }
}

impl std::fmt::Display for LookupMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} not in table, used {}",
            self.table, self.requested, self.resolved
        )
    }
}
