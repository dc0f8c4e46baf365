//! Node.js bindings for the IPO scoring engine.
//!
//! Every function takes and returns JSON strings so the TypeScript ingestion
//! and API layers can pass their camelCase records straight through.

use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use ipo_score_core::batch::{score_batch as score_records, BatchStats};
use ipo_score_core::narrative::{build_narrative as narrate, headline, OfferingProfile};
use ipo_score_core::scoring::ScoringPolicy;
use ipo_score_core::FinancialRecord;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse an optional policy JSON string, validating it when given.
fn parse_policy(policy_json: Option<String>) -> NapiResult<ScoringPolicy> {
    match policy_json {
        None => Ok(ScoringPolicy::default()),
        Some(json) => ScoringPolicy::from_json(&json).map_err(to_napi_error),
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_score(record_json: String) -> NapiResult<String> {
    let record = FinancialRecord::from_json(&record_json).map_err(to_napi_error)?;
    let summary = ipo_score_core::compute_score(&record);
    serde_json::to_string(&summary).map_err(to_napi_error)
}

#[napi]
pub fn analyze_offering(record_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let record = FinancialRecord::from_json(&record_json).map_err(to_napi_error)?;
    let policy = parse_policy(policy_json)?;
    let output = ipo_score_core::analyze_offering(&record, &policy).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn score_batch(records_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let records: Vec<FinancialRecord> =
        serde_json::from_str(&records_json).map_err(to_napi_error)?;
    let policy = parse_policy(policy_json)?;
    let summaries = score_records(&records, &policy);
    let stats = BatchStats::from_summaries(&summaries);
    serde_json::to_string(&serde_json::json!({
        "results": summaries,
        "stats": stats,
    }))
    .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Narrative
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct NarrativeRequest {
    #[serde(flatten)]
    record: FinancialRecord,
    #[serde(flatten)]
    profile: OfferingProfile,
}

#[napi]
pub fn build_narrative(request_json: String) -> NapiResult<String> {
    let request: NarrativeRequest = serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let summary = ipo_score_core::compute_score(&request.record);
    let narrative = narrate(&summary, &request.record, Some(&request.profile));
    serde_json::to_string(&serde_json::json!({
        "headline": headline(&summary),
        "summary": summary,
        "narrative": narrative,
    }))
    .map_err(to_napi_error)
}
