//! Templated plain-text description of a score summary.
//!
//! Output is a pure function of its inputs: no free-form text generation, so
//! the same summary always reads the same way.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::scoring::record::{sanitize, FinancialRecord};
use crate::scoring::risk::ScoreBand;
use crate::scoring::ScoreSummary;

/// Most insights a narrative lists.
pub const MAX_KEY_INSIGHTS: usize = 5;

/// Descriptive details about the offering, all optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub summary: String,
    pub recommendation: String,
    pub key_insights: Vec<String>,
    /// Demand indicators; informational only, never scored.
    pub market_signals: Vec<String>,
}

fn one_dp(value: Decimal) -> Decimal {
    value.round_dp(1)
}

fn subject(profile: Option<&OfferingProfile>) -> String {
    let name = profile.and_then(|p| p.company_name.as_deref());
    let symbol = profile.and_then(|p| p.symbol.as_deref());
    match (name, symbol) {
        (Some(name), Some(symbol)) => format!("{name} ({symbol})"),
        (Some(name), None) => name.to_string(),
        (None, Some(symbol)) => symbol.to_string(),
        (None, None) => "This offering".to_string(),
    }
}

fn market_signals(record: &FinancialRecord) -> Vec<String> {
    let m = sanitize(record).metrics;
    let mut signals = Vec::new();

    if let Some(gmp) = m.gmp {
        let sign = if gmp >= Decimal::ZERO { "+" } else { "" };
        signals.push(format!("GMP: {sign}Rs.{}", gmp.normalize()));
    }

    let parts: Vec<String> = [
        ("QIB", m.subscription_qib),
        ("HNI", m.subscription_hni),
        ("Retail", m.subscription_retail),
    ]
    .into_iter()
    .filter_map(|(label, times)| times.map(|t| format!("{label} {}x", one_dp(t).normalize())))
    .collect();
    if !parts.is_empty() {
        signals.push(format!("Subscription: {}", parts.join(", ")));
    }

    signals
}

/// Build the narrative for a scored offering.
pub fn build_narrative(
    summary: &ScoreSummary,
    record: &FinancialRecord,
    profile: Option<&OfferingProfile>,
) -> Narrative {
    let sector = profile
        .and_then(|p| p.sector.as_deref())
        .unwrap_or("company");
    let overall = one_dp(summary.overall_score);
    let band = ScoreBand::from_score(summary.overall_score);

    let text = format!(
        "{} is a {sector} IPO with a {} overall score of {:.1}/10 and a {} risk profile.",
        subject(profile),
        band.to_string().to_lowercase(),
        overall,
        summary.risk_level,
    );

    let recommendation = format!(
        "Based on the computed scores, this IPO appears suitable for {} risk investors. \
         Always conduct your own research.",
        summary.risk_level
    );

    let key_insights = summary
        .red_flags
        .iter()
        .chain(summary.pros.iter())
        .take(MAX_KEY_INSIGHTS)
        .cloned()
        .collect();

    Narrative {
        summary: text,
        recommendation,
        key_insights,
        market_signals: market_signals(record),
    }
}

/// Headline used by alerting collaborators, e.g. `[Strong] Overall Score: 7.4/10`.
pub fn headline(summary: &ScoreSummary) -> String {
    format!(
        "[{}] Overall Score: {:.1}/10 | [{}] Risk Level: {}",
        ScoreBand::from_score(summary.overall_score),
        one_dp(summary.overall_score),
        summary.risk_level.label(),
        summary.risk_level
    )
}
