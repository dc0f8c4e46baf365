use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::info;

use ipo_score_core::batch::{score_batch, BatchStats};
use ipo_score_core::scoring::ScoringPolicy;
use ipo_score_core::FinancialRecord;

use crate::input;

#[derive(Args)]
pub struct BatchArgs {
    /// Path to a JSON file holding an array of financial records
    #[arg(long)]
    pub input: Option<String>,

    /// Only list offerings whose overall score is at least this value
    #[arg(long)]
    pub min_score: Option<Decimal>,
}

pub fn run_batch(args: BatchArgs, policy: &ScoringPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let records: Vec<FinancialRecord> = input::read_input(args.input.as_deref())?;
    let summaries = score_batch(&records, policy);
    let stats = BatchStats::from_summaries(&summaries);
    info!(
        records = stats.count,
        flagged = stats.flagged,
        average = %stats.average_overall_score,
        "scored batch"
    );

    let results: Vec<Value> = summaries
        .iter()
        .enumerate()
        .filter(|(_, s)| args.min_score.map_or(true, |min| s.overall_score >= min))
        .map(|(index, s)| {
            json!({
                "index": index,
                "overallScore": s.overall_score,
                "fundamentalsScore": s.fundamentals_score,
                "valuationScore": s.valuation_score,
                "governanceScore": s.governance_score,
                "riskLevel": s.risk_level,
                "redFlags": s.red_flags,
                "pros": s.pros,
            })
        })
        .collect();

    Ok(json!({
        "results": results,
        "stats": stats,
    }))
}
