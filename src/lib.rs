//! Backcheck - acceptance sampling plans for backward inspection
//!
//! When a defect escapes, held production has to be re-inspected. This crate
//! sizes that inspection: zero-defect sample sizes, risk-multiplied backward
//! samples, pattern-based container counts, per-interval ISO 2859-1 style
//! plans and severity-weighted allocation of a fixed sample budget.

pub mod cli;
pub mod core;
pub mod sampling;
