//! Raw offering record and its conversion into decimal metrics.
//!
//! Records arrive from scrapers, seed files and admin edits as loosely typed
//! JSON, so every field is an optional `f64`. [`sanitize`] is the only place
//! that touches floating point: it drops non-finite values, clamps fields that
//! fall outside their declared domain and hands decimal [`Metrics`] to the
//! rest of the engine.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::IpoScoreError;
use crate::types::{Fraction, Multiple, Percent};
use crate::IpoScoreResult;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One IPO offering as reported by its prospectus. Every field is optional;
/// absent means unknown, not zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    /// 3-year revenue CAGR, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_growth: Option<f64>,
    /// EBITDA margin, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebitda_margin: Option<f64>,
    /// Profit-after-tax margin, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pat_margin: Option<f64>,
    /// Return on equity, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roe: Option<f64>,
    /// Return on capital employed, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roce: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_to_equity: Option<f64>,
    /// Offer price over EPS; absent when earnings are negative
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pb_ratio: Option<f64>,
    /// Median P/E of listed sector peers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector_pe_median: Option<f64>,
    /// Share of the issue that is newly issued stock, in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fresh_issue: Option<f64>,
    /// Share of the issue sold by existing holders, in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ofs_ratio: Option<f64>,
    /// Promoter holding before the offering, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promoter_holding: Option<f64>,
    /// Promoter holding after the offering, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_ipo_promoter_holding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_qib: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_hni: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_retail: Option<f64>,
    /// Grey market premium, in rupees per share
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gmp: Option<f64>,
}

impl FinancialRecord {
    /// Parse one record from JSON. Anything other than an object is rejected;
    /// missing keys are absent fields.
    pub fn from_json(json: &str) -> IpoScoreResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(IpoScoreError::InvalidInput {
                field: "record".into(),
                reason: "expected a JSON object".into(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }
}

// ---------------------------------------------------------------------------
// Sanitized metrics
// ---------------------------------------------------------------------------

/// Decimal view of a [`FinancialRecord`] with every field inside its domain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub revenue_growth: Option<Percent>,
    pub ebitda_margin: Option<Percent>,
    pub pat_margin: Option<Percent>,
    pub roe: Option<Percent>,
    pub roce: Option<Percent>,
    pub debt_to_equity: Option<Multiple>,
    pub pe_ratio: Option<Multiple>,
    pub pb_ratio: Option<Multiple>,
    pub sector_pe_median: Option<Multiple>,
    pub fresh_issue: Option<Fraction>,
    pub ofs_ratio: Option<Fraction>,
    pub promoter_holding: Option<Percent>,
    pub post_ipo_promoter_holding: Option<Percent>,
    pub subscription_qib: Option<Multiple>,
    pub subscription_hni: Option<Multiple>,
    pub subscription_retail: Option<Multiple>,
    pub gmp: Option<Decimal>,
    /// Pre minus post holding as reported, before clamping. Flags read this.
    pub reported_dilution: Option<Percent>,
}

impl Metrics {
    /// Promoter stake given up in the offering, in percentage points.
    /// Present only when both holdings are known.
    pub fn promoter_dilution(&self) -> Option<Percent> {
        match (self.promoter_holding, self.post_ipo_promoter_holding) {
            (Some(pre), Some(post)) => Some(pre - post),
            _ => None,
        }
    }

    /// Reported OFS ratio, or the complement of the fresh-issue share.
    pub fn effective_ofs_ratio(&self) -> Option<Fraction> {
        self.ofs_ratio
            .or_else(|| self.fresh_issue.map(|fresh| Decimal::ONE - fresh))
    }
}

/// Output of [`sanitize`]: clean metrics plus one note per adjusted field.
#[derive(Debug, Clone, Default)]
pub struct Sanitized {
    pub metrics: Metrics,
    pub notes: Vec<String>,
}

const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Field policies
// ---------------------------------------------------------------------------

/// Domain of a raw field and what to do when a value falls outside it.
#[derive(Debug, Clone, Copy)]
enum Domain {
    /// Any finite value.
    Unbounded,
    /// Clamp into `[lo, hi]`.
    Clamp(Decimal, Decimal),
    /// Clamp below at `lo`.
    AtLeast(Decimal),
    /// Strictly positive, otherwise absent.
    Positive,
}

struct Cleaner {
    notes: Vec<String>,
}

impl Cleaner {
    fn field(&mut self, name: &str, raw: Option<f64>, domain: Domain) -> Option<Decimal> {
        let raw = raw?;
        let Some(value) = to_decimal(raw) else {
            self.notes
                .push(format!("{name} is not a finite number; treated as absent"));
            return None;
        };

        match domain {
            Domain::Unbounded => Some(value),
            Domain::Clamp(lo, hi) => {
                let clamped = value.clamp(lo, hi);
                if clamped != value {
                    self.notes
                        .push(format!("{name} {value} outside [{lo}, {hi}]; clamped to {clamped}"));
                }
                Some(clamped)
            }
            Domain::AtLeast(lo) => {
                if value < lo {
                    self.notes
                        .push(format!("{name} {value} below {lo}; clamped to {lo}"));
                    Some(lo)
                } else {
                    Some(value)
                }
            }
            Domain::Positive => {
                if value <= Decimal::ZERO {
                    self.notes
                        .push(format!("{name} {value} is not positive; treated as absent"));
                    None
                } else {
                    Some(value)
                }
            }
        }
    }
}

/// Finite values beyond the `Decimal` range saturate to `Decimal::MAX` or
/// `Decimal::MIN`; values too small to represent become zero.
fn to_decimal(raw: f64) -> Option<Decimal> {
    if !raw.is_finite() {
        return None;
    }
    match Decimal::from_f64(raw) {
        Some(d) => Some(d.normalize()),
        None if raw.abs() < 1.0 => Some(Decimal::ZERO),
        None if raw > 0.0 => Some(Decimal::MAX),
        None => Some(Decimal::MIN),
    }
}

/// Promoter stake given up according to the holdings as reported, before
/// clamping. Saturates instead of overflowing.
fn reported_dilution(record: &FinancialRecord) -> Option<Percent> {
    let pre = to_decimal(record.promoter_holding?)?;
    let post = to_decimal(record.post_ipo_promoter_holding?)?;
    Some(pre.checked_sub(post).unwrap_or(if pre > post {
        Decimal::MAX
    } else {
        Decimal::MIN
    }))
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Convert a raw record into decimal metrics. Never fails: NaN and infinities
/// become absent, values beyond the decimal range saturate, and out-of-domain
/// values are clamped, each with a note.
pub fn sanitize(record: &FinancialRecord) -> Sanitized {
    let mut c = Cleaner { notes: Vec::new() };

    let metrics = Metrics {
        revenue_growth: c.field("revenueGrowth", record.revenue_growth, Domain::Unbounded),
        ebitda_margin: c.field("ebitdaMargin", record.ebitda_margin, Domain::Unbounded),
        pat_margin: c.field("patMargin", record.pat_margin, Domain::Unbounded),
        roe: c.field("roe", record.roe, Domain::Unbounded),
        roce: c.field("roce", record.roce, Domain::Unbounded),
        debt_to_equity: c.field(
            "debtToEquity",
            record.debt_to_equity,
            Domain::AtLeast(Decimal::ZERO),
        ),
        pe_ratio: c.field("peRatio", record.pe_ratio, Domain::Positive),
        pb_ratio: c.field("pbRatio", record.pb_ratio, Domain::Positive),
        sector_pe_median: c.field("sectorPeMedian", record.sector_pe_median, Domain::Positive),
        fresh_issue: c.field(
            "freshIssue",
            record.fresh_issue,
            Domain::Clamp(Decimal::ZERO, Decimal::ONE),
        ),
        ofs_ratio: c.field(
            "ofsRatio",
            record.ofs_ratio,
            Domain::Clamp(Decimal::ZERO, Decimal::ONE),
        ),
        promoter_holding: c.field(
            "promoterHolding",
            record.promoter_holding,
            Domain::Clamp(Decimal::ZERO, HUNDRED),
        ),
        post_ipo_promoter_holding: c.field(
            "postIpoPromoterHolding",
            record.post_ipo_promoter_holding,
            Domain::Clamp(Decimal::ZERO, HUNDRED),
        ),
        subscription_qib: c.field(
            "subscriptionQib",
            record.subscription_qib,
            Domain::AtLeast(Decimal::ZERO),
        ),
        subscription_hni: c.field(
            "subscriptionHni",
            record.subscription_hni,
            Domain::AtLeast(Decimal::ZERO),
        ),
        subscription_retail: c.field(
            "subscriptionRetail",
            record.subscription_retail,
            Domain::AtLeast(Decimal::ZERO),
        ),
        gmp: c.field("gmp", record.gmp, Domain::Unbounded),
        reported_dilution: reported_dilution(record),
    };

    Sanitized {
        metrics,
        notes: c.notes,
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
    fn test_from_json_rejects_non_object() {
        let err = FinancialRecord::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, IpoScoreError::InvalidInput { .. }));
        let err = FinancialRecord::from_json("{").unwrap_err();
        assert!(matches!(err, IpoScoreError::SerializationError(_)));
    }

    #[test]
    fn test_from_json_camel_case() {
        let record = FinancialRecord::from_json(r#"{"revenueGrowth": 12.5, "ofsRatio": 0.4}"#).unwrap();
        assert_eq!(record.revenue_growth, Some(12.5));
        assert_eq!(record.ofs_ratio, Some(0.4));
        assert_eq!(record.roe, None);
    }

    #[test]
    fn test_empty_record_has_no_metrics_or_notes() {
        let out = sanitize(&FinancialRecord::default());
        assert_eq!(out.metrics, Metrics::default());
        assert!(out.notes.is_empty());
    }

    #[test]
    fn test_nan_and_infinity_become_absent() {
        let record = FinancialRecord {
            revenue_growth: Some(f64::NAN),
            roe: Some(f64::INFINITY),
            roce: Some(f64::NEG_INFINITY),
            ..Default::default()
        };
        let out = sanitize(&record);
        assert!(out.metrics.revenue_growth.is_none());
        assert!(out.metrics.roe.is_none());
        assert!(out.metrics.roce.is_none());
        assert_eq!(out.notes.len(), 3);
        assert!(out.notes[0].starts_with("revenueGrowth"));
    }

    #[test]
    fn test_values_beyond_decimal_range_saturate_then_clamp() {
        let record = FinancialRecord {
            ofs_ratio: Some(1e30),
            fresh_issue: Some(-1e30),
            revenue_growth: Some(1e30),
            roe: Some(-1e30),
            pe_ratio: Some(1e30),
            pb_ratio: Some(-1e30),
            debt_to_equity: Some(1e-30),
            ..Default::default()
        };
        let out = sanitize(&record);
        assert_eq!(out.metrics.ofs_ratio, Some(Decimal::ONE));
        assert_eq!(out.metrics.fresh_issue, Some(Decimal::ZERO));
        assert_eq!(out.metrics.revenue_growth, Some(Decimal::MAX));
        assert_eq!(out.metrics.roe, Some(Decimal::MIN));
        assert_eq!(out.metrics.pe_ratio, Some(Decimal::MAX));
        assert!(out.metrics.pb_ratio.is_none());
        assert_eq!(out.metrics.debt_to_equity, Some(Decimal::ZERO));
        assert!(out.notes.iter().all(|n| !n.contains("not a finite number")));
    }

    #[test]
    fn test_reported_dilution_ignores_clamping() {
        let record = FinancialRecord {
            promoter_holding: Some(125.0),
            post_ipo_promoter_holding: Some(100.0),
            ..Default::default()
        };
        let m = sanitize(&record).metrics;
        assert_eq!(m.promoter_dilution(), Some(Decimal::ZERO));
        assert_eq!(m.reported_dilution, Some(dec!(25)));

        let extreme = FinancialRecord {
            promoter_holding: Some(1e30),
            post_ipo_promoter_holding: Some(-1e30),
            ..Default::default()
        };
        assert_eq!(sanitize(&extreme).metrics.reported_dilution, Some(Decimal::MAX));

        let partial = FinancialRecord {
            promoter_holding: Some(f64::NAN),
            post_ipo_promoter_holding: Some(60.0),
            ..Default::default()
        };
        assert!(sanitize(&partial).metrics.reported_dilution.is_none());
    }

    #[test]
    fn test_fraction_clamped_to_unit_interval() {
        let record = FinancialRecord {
            ofs_ratio: Some(1.4),
            fresh_issue: Some(-0.2),
            ..Default::default()
        };
        let out = sanitize(&record);
        assert_eq!(out.metrics.ofs_ratio, Some(Decimal::ONE));
        assert_eq!(out.metrics.fresh_issue, Some(Decimal::ZERO));
        assert_eq!(out.notes.len(), 2);
    }

    #[test]
    fn test_holdings_clamped_to_percent_range() {
        let record = FinancialRecord {
            promoter_holding: Some(104.0),
            post_ipo_promoter_holding: Some(-3.0),
            ..Default::default()
        };
        let out = sanitize(&record);
        assert_eq!(out.metrics.promoter_holding, Some(dec!(100)));
        assert_eq!(out.metrics.post_ipo_promoter_holding, Some(Decimal::ZERO));
    }

    #[test]
    fn test_negative_leverage_clamped_to_zero() {
        let record = FinancialRecord {
            debt_to_equity: Some(-0.5),
            ..Default::default()
        };
        let out = sanitize(&record);
        assert_eq!(out.metrics.debt_to_equity, Some(Decimal::ZERO));
        assert_eq!(out.notes.len(), 1);
    }

    #[test]
    fn test_non_positive_multiples_become_absent() {
        let record = FinancialRecord {
            pe_ratio: Some(-12.0),
            pb_ratio: Some(0.0),
            sector_pe_median: Some(22.0),
            ..Default::default()
        };
        let out = sanitize(&record);
        assert!(out.metrics.pe_ratio.is_none());
        assert!(out.metrics.pb_ratio.is_none());
        assert_eq!(out.metrics.sector_pe_median, Some(dec!(22)));
        assert_eq!(out.notes.len(), 2);
    }

    #[test]
    fn test_negative_margins_pass_through() {
        let record = FinancialRecord {
            ebitda_margin: Some(-14.5),
            gmp: Some(-8.0),
            ..Default::default()
        };
        let out = sanitize(&record);
        assert_eq!(out.metrics.ebitda_margin, Some(dec!(-14.5)));
        assert_eq!(out.metrics.gmp, Some(dec!(-8)));
        assert!(out.notes.is_empty());
    }

    #[test]
    fn test_promoter_dilution_requires_both_holdings() {
        let mut m = Metrics {
            promoter_holding: Some(dec!(100)),
            ..Default::default()
        };
        assert!(m.promoter_dilution().is_none());
        m.post_ipo_promoter_holding = Some(dec!(82.5));
        assert_eq!(m.promoter_dilution(), Some(dec!(17.5)));
    }

    #[test]
    fn test_effective_ofs_falls_back_to_fresh_issue() {
        let m = Metrics {
            fresh_issue: Some(dec!(0.55)),
            ..Default::default()
        };
        assert_eq!(m.effective_ofs_ratio(), Some(dec!(0.45)));

        let reported = Metrics {
            fresh_issue: Some(dec!(0.55)),
            ofs_ratio: Some(dec!(0.30)),
            ..Default::default()
        };
        assert_eq!(reported.effective_ofs_ratio(), Some(dec!(0.30)));
    }

    #[test]
    fn test_record_deserializes_camel_case_with_nulls() {
        let json = r#"{"revenueGrowth": 18.5, "peRatio": null, "postIpoPromoterHolding": 82.5}"#;
        let record: FinancialRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.revenue_growth, Some(18.5));
        assert!(record.pe_ratio.is_none());
        assert_eq!(record.post_ipo_promoter_holding, Some(82.5));
    }
}
