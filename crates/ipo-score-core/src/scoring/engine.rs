//! IPO scoring engine.
//!
//! Pipeline: sanitize the raw record, normalize each metric to 0-10, aggregate
//! three sub-scores as weighted means over the metrics that are present,
//! combine them into an overall score, classify risk and detect flags.
//!
//! `compute_score` is total: any record, including one with every field
//! absent or non-finite, yields a usable summary. All arithmetic after the
//! sanitizer uses `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::aggregate::{TermContribution, WeightedMean, MAX_WEIGHT};
use super::flags;
use super::normalize::{self, clamp_score, NEUTRAL_SCORE};
use super::policy::ScoringPolicy;
use super::record::{sanitize, FinancialRecord, Metrics};
use super::risk::{self, RiskLevel};
use crate::types::{with_metadata, ComputationOutput, Score};
use crate::IpoScoreResult;

/// Decimal places kept on every reported score.
pub const SCORE_DP: u32 = 2;

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Terms behind each sub-score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub fundamentals: Vec<TermContribution>,
    pub valuation: Vec<TermContribution>,
    pub governance: Vec<TermContribution>,
}

/// Scores, risk level and rationale for one offering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub fundamentals_score: Score,
    pub valuation_score: Score,
    pub governance_score: Score,
    pub overall_score: Score,
    pub risk_level: RiskLevel,
    pub red_flags: Vec<String>,
    pub pros: Vec<String>,
    #[serde(default)]
    pub components: ScoreComponents,
}

// ---------------------------------------------------------------------------
// Sub-scores
// ---------------------------------------------------------------------------

fn fundamentals(m: &Metrics, p: &ScoringPolicy) -> (Score, Vec<TermContribution>) {
    let l = &p.ladders;
    let w = &p.fundamentals_weights;
    WeightedMean::new()
        .term("revenueGrowth", w.revenue_growth, m.revenue_growth.map(|v| l.revenue_growth.score(v)))
        .term("ebitdaMargin", w.ebitda_margin, m.ebitda_margin.map(|v| l.ebitda_margin.score(v)))
        .term("patMargin", w.pat_margin, m.pat_margin.map(|v| l.pat_margin.score(v)))
        .term("roe", w.roe, m.roe.map(|v| l.roe.score(v)))
        .term("roce", w.roce, m.roce.map(|v| l.roce.score(v)))
        .term("debtToEquity", w.debt_to_equity, m.debt_to_equity.map(|v| l.debt_to_equity.score(v)))
        .finish()
}

fn valuation(m: &Metrics, p: &ScoringPolicy) -> (Score, Vec<TermContribution>) {
    let l = &p.ladders;
    let w = &p.valuation_weights;
    let pe = normalize::pe_score(m.pe_ratio, m.sector_pe_median, &l.pe_relative, &l.pe_absolute);
    WeightedMean::new()
        .term("peRatio", w.pe, pe)
        .term("pbRatio", w.pb, m.pb_ratio.map(|v| l.pb_ratio.score(v)))
        .finish()
}

fn governance(m: &Metrics, p: &ScoringPolicy) -> (Score, Vec<TermContribution>) {
    let w = &p.governance_weights;
    let dilution = m
        .promoter_dilution()
        .map(|d| normalize::dilution_score(d, &p.ladders.promoter_dilution));
    WeightedMean::new()
        .term("ofsRatio", w.ofs, m.effective_ofs_ratio().map(normalize::ofs_score))
        .term("promoterDilution", w.promoter_dilution, dilution)
        .finish()
}

/// Weighted sum of the three sub-scores, renormalized by the weight total.
fn overall(fundamentals: Score, valuation: Score, governance: Score, p: &ScoringPolicy) -> Score {
    let w = &p.overall_weights;
    let capped = |weight: Decimal| weight.clamp(Decimal::ZERO, MAX_WEIGHT);
    let weights = [
        (capped(w.fundamentals), fundamentals),
        (capped(w.valuation), valuation),
        (capped(w.governance), governance),
    ];
    let total: Decimal = weights.iter().map(|(w, _)| *w).sum();
    if total <= Decimal::ZERO {
        return NEUTRAL_SCORE;
    }
    let sum: Decimal = weights.iter().map(|(w, s)| *w * *s).sum();
    clamp_score(sum / total)
}

fn report(score: Score) -> Score {
    clamp_score(score)
        .round_dp_with_strategy(SCORE_DP, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

fn score_metrics(metrics: &Metrics, policy: &ScoringPolicy) -> ScoreSummary {
    let (f, f_terms) = fundamentals(metrics, policy);
    let (v, v_terms) = valuation(metrics, policy);
    let (g, g_terms) = governance(metrics, policy);

    let fundamentals_score = report(f);
    let valuation_score = report(v);
    let governance_score = report(g);
    let overall_score = report(overall(
        fundamentals_score,
        valuation_score,
        governance_score,
        policy,
    ));

    let risk_level = risk::classify(overall_score, governance_score, &policy.risk);
    let flags = flags::detect(metrics);

    ScoreSummary {
        fundamentals_score,
        valuation_score,
        governance_score,
        overall_score,
        risk_level,
        red_flags: flags.red_flags,
        pros: flags.pros,
        components: ScoreComponents {
            fundamentals: f_terms,
            valuation: v_terms,
            governance: g_terms,
        },
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score a record under the default policy. Never fails.
pub fn compute_score(record: &FinancialRecord) -> ScoreSummary {
    compute_score_with_policy(record, &ScoringPolicy::default())
}

/// Score a record under `policy`. Never fails, even for a policy that would
/// not pass [`ScoringPolicy::validate`].
pub fn compute_score_with_policy(record: &FinancialRecord, policy: &ScoringPolicy) -> ScoreSummary {
    let sanitized = sanitize(record);
    score_metrics(&sanitized.metrics, policy)
}

/// Validate `policy`, score the record and wrap the summary in the standard
/// computation envelope. Sanitizer adjustments become warnings.
pub fn analyze_offering(
    record: &FinancialRecord,
    policy: &ScoringPolicy,
) -> IpoScoreResult<ComputationOutput<ScoreSummary>> {
    let start = Instant::now();
    policy.validate()?;

    let sanitized = sanitize(record);
    let mut warnings = sanitized.notes;
    let summary = score_metrics(&sanitized.metrics, policy);

    if summary.components.fundamentals.is_empty() {
        warnings.push("No fundamentals metrics present; fundamentals score is neutral".into());
    }
    if summary.components.valuation.is_empty() {
        warnings.push("No valuation metrics present; valuation score is neutral".into());
    }
    if summary.components.governance.is_empty() {
        warnings.push("No ownership metrics present; governance score is neutral".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "IPO scorecard: threshold-ladder normalization, renormalized weighted sub-scores, governance-vetoed risk classification",
        policy,
        warnings,
        elapsed,
        summary,
    ))
}

// ===========================================================================
// Tests
// ===========================================================================
