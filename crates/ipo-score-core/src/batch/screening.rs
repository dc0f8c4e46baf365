//! Batch screening over many offerings.
//!
//! Scoring is total, so a malformed record degrades to a neutral summary
//! instead of aborting the batch.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::scoring::engine::{compute_score_with_policy, SCORE_DP};
use crate::scoring::record::FinancialRecord;
use crate::scoring::risk::RiskLevel;
use crate::scoring::{ScoreSummary, ScoringPolicy};

/// Score every record, preserving input order.
pub fn score_batch(records: &[FinancialRecord], policy: &ScoringPolicy) -> Vec<ScoreSummary> {
    records
        .iter()
        .map(|record| compute_score_with_policy(record, policy))
        .collect()
}

/// Aggregate view of a scored batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    pub count: usize,
    pub average_overall_score: Decimal,
    pub conservative: usize,
    pub moderate: usize,
    pub aggressive: usize,
    /// Summaries carrying at least one red flag.
    pub flagged: usize,
}

impl BatchStats {
    pub fn from_summaries(summaries: &[ScoreSummary]) -> Self {
        let count = summaries.len();
        let count_risk = |level: RiskLevel| {
            summaries
                .iter()
                .filter(|s| s.risk_level == level)
                .count()
        };

        let average_overall_score = if count == 0 {
            Decimal::ZERO
        } else {
            let total: Decimal = summaries.iter().map(|s| s.overall_score).sum();
            (total / Decimal::from(count))
                .round_dp_with_strategy(SCORE_DP, RoundingStrategy::MidpointAwayFromZero)
                .normalize()
        };

        Self {
            count,
            average_overall_score,
            conservative: count_risk(RiskLevel::Conservative),
            moderate: count_risk(RiskLevel::Moderate),
            aggressive: count_risk(RiskLevel::Aggressive),
            flagged: summaries.iter().filter(|s| !s.red_flags.is_empty()).count(),
        }
    }
}
