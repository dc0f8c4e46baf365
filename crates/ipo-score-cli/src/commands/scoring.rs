use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use ipo_score_core::narrative::{build_narrative, headline, OfferingProfile};
use ipo_score_core::scoring::ScoringPolicy;
use ipo_score_core::{analyze_offering, compute_score_with_policy, FinancialRecord};

use crate::input;

#[derive(Args)]
pub struct ScoreArgs {
    /// Path to a JSON file holding one financial record
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct NarrativeArgs {
    /// Path to a JSON file holding one record plus optional companyName, symbol and sector
    #[arg(long)]
    pub input: Option<String>,
}

/// A record together with the descriptive fields the narrative mentions.
#[derive(Deserialize)]
struct NarrativeRequest {
    #[serde(flatten)]
    record: FinancialRecord,
    #[serde(flatten)]
    profile: OfferingProfile,
}

pub fn run_score(args: ScoreArgs, policy: &ScoringPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    let record: FinancialRecord = input::read_input(args.input.as_deref())?;
    let output = analyze_offering(&record, policy)?;
    for warning in &output.warnings {
        warn!("{}", warning);
    }
    debug!(
        overall = %output.result.overall_score,
        risk = %output.result.risk_level,
        "scored offering"
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_narrative(
    args: NarrativeArgs,
    policy: &ScoringPolicy,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: NarrativeRequest = input::read_input(args.input.as_deref())?;
    let summary = compute_score_with_policy(&request.record, policy);
    let narrative = build_narrative(&summary, &request.record, Some(&request.profile));
    Ok(json!({
        "result": {
            "headline": headline(&summary),
            "summary": narrative.summary,
            "recommendation": narrative.recommendation,
            "keyInsights": narrative.key_insights,
            "marketSignals": narrative.market_signals,
            "overallScore": summary.overall_score,
            "riskLevel": summary.risk_level,
        }
    }))
}

pub fn run_policy(policy: &ScoringPolicy) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::to_value(policy)?)
}
