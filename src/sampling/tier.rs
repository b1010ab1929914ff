//! Shared risk classifiers
//!
//! Every calculator classifies its inputs through the tagged variants in this
//! module. Each variant maps to a fixed parameter tuple, so the tables live in
//! exactly one place.

use serde::{Deserialize, Serialize};

use crate::core::DomainError;

/// Display color used when rendering a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Green,
    Yellow,
    Orange,
    Red,
}

impl std::fmt::Display for ColorTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorTag::Green => write!(f, "green"),
            ColorTag::Yellow => write!(f, "yellow"),
            ColorTag::Orange => write!(f, "orange"),
            ColorTag::Red => write!(f, "red"),
        }
    }
}

/// Risk tier driving the backward sample multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Fixed parameters attached to a [`RiskTier`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierParams {
    pub multiplier: f64,
    pub recommended_batches: u32,
    pub color: ColorTag,
}

impl RiskTier {
    pub const ALL: [RiskTier; 4] = [
        RiskTier::Low,
        RiskTier::Medium,
        RiskTier::High,
        RiskTier::VeryHigh,
    ];

    pub fn params(self) -> TierParams {
        match self {
            RiskTier::Low => TierParams {
                multiplier: 2.0,
                recommended_batches: 2,
                color: ColorTag::Green,
            },
            RiskTier::Medium => TierParams {
                multiplier: 3.0,
                recommended_batches: 3,
                color: ColorTag::Yellow,
            },
            RiskTier::High => TierParams {
                multiplier: 5.0,
                recommended_batches: 5,
                color: ColorTag::Orange,
            },
            RiskTier::VeryHigh => TierParams {
                multiplier: 10.0,
                recommended_batches: 10,
                color: ColorTag::Red,
            },
        }
    }

    pub fn multiplier(self) -> f64 {
        self.params().multiplier
    }

    pub fn color(self) -> ColorTag {
        self.params().color
    }

    /// Classify by the ratio of observed defect rate to AQL
    ///
    /// An AQL of zero yields an infinite ratio and therefore `VeryHigh`.
    pub fn from_ratio(defect_rate: f64, aql: f64) -> Self {
        let ratio = if aql == 0.0 {
            f64::INFINITY
        } else {
            defect_rate / aql
        };
        if ratio <= 1.0 {
            RiskTier::Low
        } else if ratio <= 3.0 {
            RiskTier::Medium
        } else if ratio <= 5.0 {
            RiskTier::High
        } else {
            RiskTier::VeryHigh
        }
    }

    /// Classify by FMEA risk priority number
    pub fn from_rpn(rpn: u16) -> Self {
        match rpn {
            0..=50 => RiskTier::Low,
            51..=100 => RiskTier::Medium,
            101..=200 => RiskTier::High,
            _ => RiskTier::VeryHigh,
        }
    }

    /// Smallest tier whose multiplier covers a manually chosen one
    pub fn for_multiplier(multiplier: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| multiplier <= tier.multiplier())
            .unwrap_or(RiskTier::VeryHigh)
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "low"),
            RiskTier::Medium => write!(f, "medium"),
            RiskTier::High => write!(f, "high"),
            RiskTier::VeryHigh => write!(f, "very_high"),
        }
    }
}

/// Compute an FMEA risk priority number (S x O x D)
///
/// Each rating must be in 1..=10, so the result lies in 1..=1000.
pub fn rpn(severity: u8, occurrence: u8, detection: u8) -> Result<u16, DomainError> {
    for (field, value) in [
        ("severity", severity),
        ("occurrence", occurrence),
        ("detection", detection),
    ] {
        if !(1..=10).contains(&value) {
            return Err(DomainError::InvalidRating { field, value });
        }
    }
    Ok(severity as u16 * occurrence as u16 * detection as u16)
}

/// How defects were observed to occur over production time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefectPattern {
    /// Defects concentrated in a short production window
    Clustered,
    /// Defects recurring on and off
    Intermittent,
    /// Defects scattered with no visible structure
    Random,
}

impl DefectPattern {
    /// Containers to pull for inspection
    pub fn containers(self) -> u64 {
        match self {
            DefectPattern::Clustered => 200,
            DefectPattern::Intermittent => 500,
            DefectPattern::Random => 1000,
        }
    }

    pub fn tier(self) -> RiskTier {
        match self {
            DefectPattern::Clustered => RiskTier::Low,
            DefectPattern::Intermittent => RiskTier::Medium,
            DefectPattern::Random => RiskTier::High,
        }
    }

    pub fn multiplier(self) -> f64 {
        self.tier().multiplier()
    }

    pub fn strategy(self) -> &'static str {
        match self {
            DefectPattern::Clustered => "focused",
            DefectPattern::Intermittent => "systematic",
            DefectPattern::Random => "random",
        }
    }
}

impl std::fmt::Display for DefectPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefectPattern::Clustered => write!(f, "clustered"),
            DefectPattern::Intermittent => write!(f, "intermittent"),
            DefectPattern::Random => write!(f, "random"),
        }
    }
}

/// Defect class used by the stratified allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityClass {
    Critical,
    Major,
    Minor,
}

impl SeverityClass {
    /// Exponential decay constant for interval weights
    pub fn decay(self) -> f64 {
        match self {
            SeverityClass::Critical => 0.8,
            SeverityClass::Major => 0.6,
            SeverityClass::Minor => 0.4,
        }
    }

    /// AQL multipliers for intervals moving away from the detection point
    pub fn aql_multipliers(self) -> &'static [f64; 8] {
        match self {
            SeverityClass::Critical => &[1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0, 4.5],
            SeverityClass::Major => &[1.0, 1.3, 1.6, 2.0, 2.5, 3.0, 3.5, 4.0],
            SeverityClass::Minor => &[1.0, 1.2, 1.4, 1.6, 1.8, 2.0, 2.2, 2.4],
        }
    }
}

impl std::fmt::Display for SeverityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityClass::Critical => write!(f, "critical"),
            SeverityClass::Major => write!(f, "major"),
            SeverityClass::Minor => write!(f, "minor"),
        }
    }
}

/// ISO 2859-1 inspection severity switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectionLevel {
    #[default]
    Normal,
    Tightened,
    Reduced,
}

impl InspectionLevel {
    /// Minimum sample size under reduced inspection
    pub const REDUCED_FLOOR: u64 = 5;

    pub fn adjust(self, sample_size: u64) -> u64 {
        match self {
            InspectionLevel::Normal => sample_size,
            InspectionLevel::Tightened => (sample_size as f64 * 1.2).ceil() as u64,
            InspectionLevel::Reduced => {
                ((sample_size as f64 * 0.8).floor() as u64).max(Self::REDUCED_FLOOR)
            }
        }
    }
}

impl std::fmt::Display for InspectionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InspectionLevel::Normal => write!(f, "normal"),
            InspectionLevel::Tightened => write!(f, "tightened"),
            InspectionLevel::Reduced => write!(f, "reduced"),
        }
    }
}

/// Statistical confidence offered by the dashboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    #[serde(rename = "90")]
    Ninety,
    #[serde(rename = "95")]
    NinetyFive,
    #[serde(rename = "99")]
    NinetyNine,
}

impl ConfidenceLevel {
    pub fn percent(self) -> u8 {
        match self {
            ConfidenceLevel::Ninety => 90,
            ConfidenceLevel::NinetyFive => 95,
            ConfidenceLevel::NinetyNine => 99,
        }
    }

    pub fn as_decimal(self) -> f64 {
        self.percent() as f64 / 100.0
    }

    /// Confidence implied by an AQL (percent): tight AQLs demand more confidence
    pub fn for_aql(aql: f64) -> Self {
        if aql <= 1.0 {
            ConfidenceLevel::NinetyNine
        } else if aql <= 4.0 {
            ConfidenceLevel::NinetyFive
        } else {
            ConfidenceLevel::Ninety
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}
