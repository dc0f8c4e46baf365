//! Sub-score aggregation: weighted means renormalized over present terms.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::normalize::{clamp_score, NEUTRAL_SCORE};
use crate::types::Score;

/// Largest weight a term can carry; larger weights are capped here so the
/// weighted sum stays inside the decimal range.
pub const MAX_WEIGHT: Decimal = dec!(1_000_000);

/// One term that contributed to a sub-score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermContribution {
    pub metric: String,
    pub score: Score,
    /// Share of the sub-score after renormalization (sums to 1 over terms).
    pub effective_weight: Decimal,
}

/// Accumulates `(weight, score)` pairs, skipping absent terms.
#[derive(Debug, Default)]
pub struct WeightedMean {
    terms: Vec<(&'static str, Decimal, Score)>,
}

impl WeightedMean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term. `None` scores and non-positive weights are ignored so that
    /// their weight is redistributed over the remaining terms.
    pub fn term(mut self, metric: &'static str, weight: Decimal, score: Option<Score>) -> Self {
        if let Some(score) = score {
            if weight > Decimal::ZERO {
                self.terms.push((metric, weight.min(MAX_WEIGHT), score));
            }
        }
        self
    }

    /// Weighted mean of present terms clamped to 0-10, or exactly
    /// [`NEUTRAL_SCORE`] when no term is present.
    pub fn finish(self) -> (Score, Vec<TermContribution>) {
        let total_weight: Decimal = self.terms.iter().map(|(_, w, _)| *w).sum();
        if total_weight <= Decimal::ZERO {
            return (NEUTRAL_SCORE, Vec::new());
        }

        let weighted_sum: Decimal = self.terms.iter().map(|(_, w, s)| *w * *s).sum();
        let score = clamp_score(weighted_sum / total_weight);

        let contributions = self
            .terms
            .into_iter()
            .map(|(metric, weight, score)| TermContribution {
                metric: metric.to_string(),
                score,
                effective_weight: weight / total_weight,
            })
            .collect();

        (score, contributions)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_terms_is_neutral() {
        let (score, terms) = WeightedMean::new().finish();
        assert_eq!(score, dec!(5));
        assert!(terms.is_empty());
    }

    #[test]
    fn test_all_terms_absent_is_neutral() {
        let (score, _) = WeightedMean::new()
            .term("a", dec!(1), None)
            .term("b", dec!(2), None)
            .finish();
        assert_eq!(score, dec!(5));
    }

    #[test]
    fn test_absent_weight_is_redistributed() {
        // a=10 (w 1), b absent (w 3): result is 10, not 2.5
        let (score, terms) = WeightedMean::new()
            .term("a", dec!(1), Some(dec!(10)))
            .term("b", dec!(3), None)
            .finish();
        assert_eq!(score, dec!(10));
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].effective_weight, dec!(1));
    }

    #[test]
    fn test_weighted_mean() {
        // (2*10 + 1*4) / 3 = 8
        let (score, terms) = WeightedMean::new()
            .term("pe", dec!(2), Some(dec!(10)))
            .term("pb", dec!(1), Some(dec!(4)))
            .finish();
        assert_eq!(score, dec!(8));
        let weights: Decimal = terms.iter().map(|t| t.effective_weight).sum();
        assert!((weights - Decimal::ONE).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_zero_weight_terms_ignored() {
        let (score, terms) = WeightedMean::new()
            .term("a", dec!(0), Some(dec!(0)))
            .term("b", dec!(1), Some(dec!(6)))
            .finish();
        assert_eq!(score, dec!(6));
        assert_eq!(terms.len(), 1);
    }

    #[test]
    fn test_result_clamped() {
        let (score, _) = WeightedMean::new()
            .term("a", dec!(1), Some(dec!(25)))
            .finish();
        assert_eq!(score, dec!(10));
    }
}
