//! Shared utilities for CLI commands

use clap::ValueEnum;
use miette::miette;

use crate::core::{DomainError, LookupMiss};
use crate::sampling::ConfidenceLevel;

/// Confidence level accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConfidenceArg {
    #[value(name = "90")]
    Ninety,
    #[value(name = "95")]
    NinetyFive,
    #[value(name = "99")]
    NinetyNine,
}

impl From<ConfidenceArg> for ConfidenceLevel {
    fn from(arg: ConfidenceArg) -> Self {
        match arg {
            ConfidenceArg::Ninety => ConfidenceLevel::Ninety,
            ConfidenceArg::NinetyFive => ConfidenceLevel::NinetyFive,
            ConfidenceArg::NinetyNine => ConfidenceLevel::NinetyNine,
        }
    }
}

/// Convert a calculation error into a diagnostic for the user
pub fn domain_error(e: DomainError) -> miette::Report {
    miette!("{}", e)
}

/// One note per approximated table lookup
pub fn approximation_notes(misses: &[LookupMiss]) -> Vec<String> {
    misses
        .iter()
        .map(|miss| format!("approximated {}", miss))
        .collect()
}

/// Format an AQL percentage without trailing zeros (e.g. `0.65%`, `1%`)
pub fn format_aql(aql: f64) -> String {
    format!("{}%", aql)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_arg_mapping() {
        assert_eq!(ConfidenceLevel::from(ConfidenceArg::Ninety), ConfidenceLevel::Ninety);
        assert_eq!(
            ConfidenceLevel::from(ConfidenceArg::NinetyNine),
            ConfidenceLevel::NinetyNine
        );
    }

    #[test]
    fn test_confidence_arg_names() {
        let value = ConfidenceArg::from_str("95", false).unwrap();
        assert_eq!(ConfidenceLevel::from(value), ConfidenceLevel::NinetyFive);
        assert!(ConfidenceArg::from_str("80", false).is_err());
    }

    #[test]
    fn test_domain_error_message() {
        let report = domain_error(DomainError::ZeroAql);
        assert_eq!(report.to_string(), DomainError::ZeroAql.to_string());
    }

    #[test]
    fn test_format_aql() {
        assert_eq!(format_aql(0.65), "0.65%");
        assert_eq!(format_aql(1.0), "1%");
    }
}
