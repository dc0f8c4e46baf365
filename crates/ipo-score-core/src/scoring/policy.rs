//! Scoring policy: every threshold table, weight and cut-off the engine uses.
//!
//! The numbers here are a tunable policy, not a law of nature. Changing any of
//! them is a policy revision and should move the pinned boundary tests with it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::aggregate::MAX_WEIGHT;
use super::normalize::Ladder;
use crate::error::IpoScoreError;
use crate::IpoScoreResult;

// ---------------------------------------------------------------------------
// Named constants
// ---------------------------------------------------------------------------

pub const FUNDAMENTALS_WEIGHT: Decimal = dec!(0.45);
pub const VALUATION_WEIGHT: Decimal = dec!(0.30);
pub const GOVERNANCE_WEIGHT: Decimal = dec!(0.25);

pub const CONSERVATIVE_MIN_OVERALL: Decimal = dec!(7.0);
pub const CONSERVATIVE_MIN_GOVERNANCE: Decimal = dec!(6.0);
pub const MODERATE_MIN_OVERALL: Decimal = dec!(4.5);

// ---------------------------------------------------------------------------
// Policy sections
// ---------------------------------------------------------------------------

/// Term weights inside the fundamentals sub-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FundamentalsWeights {
    pub revenue_growth: Decimal,
    pub ebitda_margin: Decimal,
    pub pat_margin: Decimal,
    pub roe: Decimal,
    pub roce: Decimal,
    pub debt_to_equity: Decimal,
}

impl Default for FundamentalsWeights {
    fn default() -> Self {
        Self {
            revenue_growth: dec!(1.25),
            ebitda_margin: dec!(1.0),
            pat_margin: dec!(1.0),
            roe: dec!(1.0),
            roce: dec!(1.25),
            debt_to_equity: dec!(1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValuationWeights {
    pub pe: Decimal,
    pub pb: Decimal,
}

impl Default for ValuationWeights {
    fn default() -> Self {
        Self {
            pe: dec!(2.0),
            pb: dec!(1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GovernanceWeights {
    pub ofs: Decimal,
    pub promoter_dilution: Decimal,
}

impl Default for GovernanceWeights {
    fn default() -> Self {
        Self {
            ofs: dec!(1.0),
            promoter_dilution: dec!(1.0),
        }
    }
}

/// Weights of the three sub-scores in the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverallWeights {
    pub fundamentals: Decimal,
    pub valuation: Decimal,
    pub governance: Decimal,
}

impl Default for OverallWeights {
    fn default() -> Self {
        Self {
            fundamentals: FUNDAMENTALS_WEIGHT,
            valuation: VALUATION_WEIGHT,
            governance: GOVERNANCE_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskThresholds {
    pub conservative_min_overall: Decimal,
    pub conservative_min_governance: Decimal,
    pub moderate_min_overall: Decimal,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            conservative_min_overall: CONSERVATIVE_MIN_OVERALL,
            conservative_min_governance: CONSERVATIVE_MIN_GOVERNANCE,
            moderate_min_overall: MODERATE_MIN_OVERALL,
        }
    }
}

/// Threshold tables for each normalized metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ladders {
    pub revenue_growth: Ladder,
    pub ebitda_margin: Ladder,
    pub pat_margin: Ladder,
    pub roe: Ladder,
    pub roce: Ladder,
    pub debt_to_equity: Ladder,
    /// Applied to `pe_ratio / sector_pe_median`.
    pub pe_relative: Ladder,
    /// Applied to `pe_ratio` when no sector median is known.
    pub pe_absolute: Ladder,
    pub pb_ratio: Ladder,
    /// Applied to pre-offering minus post-offering promoter holding.
    pub promoter_dilution: Ladder,
}

impl Default for Ladders {
    fn default() -> Self {
        Self {
            revenue_growth: Ladder::higher_is_better(
                &[(dec!(30), dec!(10)), (dec!(15), dec!(7.5)), (dec!(0), dec!(5))],
                dec!(2.5),
            ),
            ebitda_margin: Ladder::higher_is_better(
                &[
                    (dec!(25), dec!(10)),
                    (dec!(15), dec!(7.5)),
                    (dec!(5), dec!(5)),
                    (dec!(0), dec!(2.5)),
                ],
                Decimal::ZERO,
            ),
            pat_margin: Ladder::higher_is_better(
                &[
                    (dec!(15), dec!(10)),
                    (dec!(8), dec!(7.5)),
                    (dec!(3), dec!(5)),
                    (dec!(0), dec!(2.5)),
                ],
                Decimal::ZERO,
            ),
            roe: Ladder::higher_is_better(
                &[
                    (dec!(20), dec!(10)),
                    (dec!(15), dec!(7.5)),
                    (dec!(10), dec!(5)),
                    (dec!(0), dec!(2.5)),
                ],
                Decimal::ZERO,
            ),
            roce: Ladder::higher_is_better(
                &[
                    (dec!(20), dec!(10)),
                    (dec!(15), dec!(7.5)),
                    (dec!(10), dec!(5)),
                    (dec!(0), dec!(2.5)),
                ],
                Decimal::ZERO,
            ),
            debt_to_equity: Ladder::lower_is_better(
                &[
                    (dec!(0.25), dec!(10)),
                    (dec!(0.5), dec!(8)),
                    (dec!(1), dec!(6)),
                    (dec!(2), dec!(3)),
                ],
                Decimal::ZERO,
            ),
            pe_relative: Ladder::lower_is_better(
                &[
                    (dec!(0.8), dec!(10)),
                    (dec!(1.0), dec!(7.5)),
                    (dec!(1.2), dec!(5)),
                    (dec!(1.5), dec!(2.5)),
                ],
                Decimal::ZERO,
            ),
            pe_absolute: Ladder::lower_is_better(
                &[
                    (dec!(15), dec!(10)),
                    (dec!(25), dec!(7.5)),
                    (dec!(40), dec!(5)),
                    (dec!(60), dec!(2.5)),
                ],
                Decimal::ZERO,
            ),
            pb_ratio: Ladder::lower_is_better(
                &[
                    (dec!(1), dec!(10)),
                    (dec!(3), dec!(7.5)),
                    (dec!(6), dec!(5)),
                    (dec!(10), dec!(2.5)),
                ],
                Decimal::ZERO,
            ),
            promoter_dilution: Ladder::lower_is_better(
                &[
                    (dec!(10), dec!(10)),
                    (dec!(20), dec!(7.5)),
                    (dec!(30), dec!(5)),
                    (dec!(40), dec!(2.5)),
                ],
                Decimal::ZERO,
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Complete scoring policy.
///
/// Every section falls back to its default when omitted, so a policy file only
/// needs to name what it changes:
///
/// ```yaml
/// overall_weights:
///   fundamentals: 0.5
///   valuation: 0.3
///   governance: 0.2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringPolicy {
    pub ladders: Ladders,
    pub fundamentals_weights: FundamentalsWeights,
    pub valuation_weights: ValuationWeights,
    pub governance_weights: GovernanceWeights,
    pub overall_weights: OverallWeights,
    pub risk: RiskThresholds,
}

impl ScoringPolicy {
    /// Check the policy, collecting every problem rather than stopping at the first.
    pub fn validate(&self) -> IpoScoreResult<()> {
        let mut errors = Vec::new();

        let l = &self.ladders;
        for (name, ladder) in [
            ("ladders.revenue_growth", &l.revenue_growth),
            ("ladders.ebitda_margin", &l.ebitda_margin),
            ("ladders.pat_margin", &l.pat_margin),
            ("ladders.roe", &l.roe),
            ("ladders.roce", &l.roce),
            ("ladders.debt_to_equity", &l.debt_to_equity),
            ("ladders.pe_relative", &l.pe_relative),
            ("ladders.pe_absolute", &l.pe_absolute),
            ("ladders.pb_ratio", &l.pb_ratio),
            ("ladders.promoter_dilution", &l.promoter_dilution),
        ] {
            errors.extend(ladder.problems(name));
        }

        let f = &self.fundamentals_weights;
        let v = &self.valuation_weights;
        let g = &self.governance_weights;
        let o = &self.overall_weights;
        for (name, weight) in [
            ("fundamentals_weights.revenue_growth", f.revenue_growth),
            ("fundamentals_weights.ebitda_margin", f.ebitda_margin),
            ("fundamentals_weights.pat_margin", f.pat_margin),
            ("fundamentals_weights.roe", f.roe),
            ("fundamentals_weights.roce", f.roce),
            ("fundamentals_weights.debt_to_equity", f.debt_to_equity),
            ("valuation_weights.pe", v.pe),
            ("valuation_weights.pb", v.pb),
            ("governance_weights.ofs", g.ofs),
            ("governance_weights.promoter_dilution", g.promoter_dilution),
            ("overall_weights.fundamentals", o.fundamentals),
            ("overall_weights.valuation", o.valuation),
            ("overall_weights.governance", o.governance),
        ] {
            if weight < Decimal::ZERO {
                errors.push(format!("{name}: must be non-negative"));
            } else if weight > MAX_WEIGHT {
                errors.push(format!("{name}: must not exceed {MAX_WEIGHT}"));
            }
        }
        let overall_total = [o.fundamentals, o.valuation, o.governance]
            .into_iter()
            .map(|w| w.clamp(Decimal::ZERO, MAX_WEIGHT))
            .sum::<Decimal>();
        if overall_total <= Decimal::ZERO {
            errors.push("overall_weights: sum of weights must be positive".to_string());
        }

        let r = &self.risk;
        if r.conservative_min_overall < r.moderate_min_overall {
            errors.push(format!(
                "risk.conservative_min_overall: {} is below moderate_min_overall {}",
                r.conservative_min_overall, r.moderate_min_overall
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(IpoScoreError::InvalidPolicy(errors))
        }
    }

    /// Parse a policy from JSON and validate it.
    pub fn from_json(json: &str) -> IpoScoreResult<Self> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
