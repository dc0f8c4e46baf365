//! Risk classification and score bands.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::policy::RiskThresholds;
use crate::types::Score;

/// Investor profile an offering suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskLevel {
    /// Alert-style label.
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Conservative => "Low Risk",
            RiskLevel::Moderate => "Medium Risk",
            RiskLevel::Aggressive => "High Risk",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Conservative => write!(f, "conservative"),
            RiskLevel::Moderate => write!(f, "moderate"),
            RiskLevel::Aggressive => write!(f, "aggressive"),
        }
    }
}

/// Classify from the overall score, with governance able to veto
/// `Conservative`: a profitable offering with weak governance is never
/// labelled safe.
pub fn classify(overall: Score, governance: Score, thresholds: &RiskThresholds) -> RiskLevel {
    if overall >= thresholds.conservative_min_overall
        && governance >= thresholds.conservative_min_governance
    {
        RiskLevel::Conservative
    } else if overall >= thresholds.moderate_min_overall {
        RiskLevel::Moderate
    } else {
        RiskLevel::Aggressive
    }
}

/// Coarse quality band for the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBand {
    Strong,
    Moderate,
    Weak,
}

impl ScoreBand {
    pub fn from_score(overall: Score) -> Self {
        if overall >= dec!(7) {
            ScoreBand::Strong
        } else if overall >= dec!(5) {
            ScoreBand::Moderate
        } else {
            ScoreBand::Weak
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreBand::Strong => write!(f, "Strong"),
            ScoreBand::Moderate => write!(f, "Moderate"),
            ScoreBand::Weak => write!(f, "Weak"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_classification_table() {
        let t = RiskThresholds::default();
        let cases = [
            (dec!(7.0), dec!(6.0), RiskLevel::Conservative),
            (dec!(9.5), dec!(8.0), RiskLevel::Conservative),
            (dec!(6.99), dec!(9.0), RiskLevel::Moderate),
            (dec!(4.5), dec!(2.0), RiskLevel::Moderate),
            (dec!(4.49), dec!(10.0), RiskLevel::Aggressive),
            (dec!(0), dec!(0), RiskLevel::Aggressive),
        ];
        for (overall, governance, expected) in cases {
            assert_eq!(
                classify(overall, governance, &t),
                expected,
                "overall {overall}, governance {governance}"
            );
        }
    }

    #[test]
    fn test_governance_veto() {
        let t = RiskThresholds::default();
        assert_eq!(classify(dec!(9.8), dec!(5.99), &t), RiskLevel::Moderate);
        assert_eq!(classify(dec!(10), dec!(0), &t), RiskLevel::Moderate);
    }

    #[test]
    fn test_risk_level_serializes_lowercase() {
        let json = serde_json::to_string(&RiskLevel::Conservative).unwrap();
        assert_eq!(json, "\"conservative\"");
        assert_eq!(RiskLevel::Aggressive.to_string(), "aggressive");
        assert_eq!(RiskLevel::Moderate.label(), "Medium Risk");
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::from_score(dec!(7)), ScoreBand::Strong);
        assert_eq!(ScoreBand::from_score(dec!(6.99)), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(dec!(5)), ScoreBand::Moderate);
        assert_eq!(ScoreBand::from_score(dec!(4.99)), ScoreBand::Weak);
    }
}
