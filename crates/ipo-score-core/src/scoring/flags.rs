//! Red flags and positives.
//!
//! A fixed, ordered rule list evaluated against the record rather than the
//! normalized scores. Dilution uses the holdings as reported, before clamping. Each rule emits at most one string and skips
//! silently when its inputs are absent.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::record::Metrics;

pub const HIGH_OFS_RATIO: Decimal = dec!(0.75);
pub const RICH_PE_MULTIPLE_OF_SECTOR: Decimal = dec!(1.5);
pub const HIGH_DEBT_TO_EQUITY: Decimal = dec!(2.0);
pub const SIGNIFICANT_PROMOTER_DILUTION: Decimal = dec!(20);
pub const STRONG_REVENUE_GROWTH: Decimal = dec!(25);
pub const HIGH_ROCE: Decimal = dec!(20);
pub const MAJORITY_FRESH_ISSUE: Decimal = dec!(0.7);

pub const FLAG_HIGH_OFS: &str =
    "High Offer-for-Sale ratio — promoters/investors cashing out heavily";
pub const FLAG_RICH_VALUATION: &str = "Valuation rich vs sector peers";
pub const FLAG_HIGH_LEVERAGE: &str = "High leverage";
pub const FLAG_PROMOTER_DILUTION: &str = "Significant promoter dilution post-offering";
pub const PRO_REVENUE_GROWTH: &str = "Strong revenue growth";
pub const PRO_HIGH_ROCE: &str = "High capital efficiency (ROCE)";
pub const PRO_FRESH_ISSUE: &str = "Majority fresh issue — proceeds fund growth, not exits";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    RedFlag,
    Pro,
}

struct Rule {
    kind: Kind,
    text: &'static str,
    fires: fn(&Metrics) -> bool,
}

/// Evaluation order is the order of this table.
const RULES: &[Rule] = &[
    Rule {
        kind: Kind::RedFlag,
        text: FLAG_HIGH_OFS,
        fires: |m| m.ofs_ratio.is_some_and(|ofs| ofs > HIGH_OFS_RATIO),
    },
    Rule {
        kind: Kind::RedFlag,
        text: FLAG_RICH_VALUATION,
        fires: |m| match (m.pe_ratio, m.sector_pe_median) {
            // a limit beyond the decimal range cannot be exceeded
            (Some(pe), Some(median)) => RICH_PE_MULTIPLE_OF_SECTOR
                .checked_mul(median)
                .is_some_and(|limit| pe > limit),
            _ => false,
        },
    },
    Rule {
        kind: Kind::RedFlag,
        text: FLAG_HIGH_LEVERAGE,
        fires: |m| m.debt_to_equity.is_some_and(|de| de > HIGH_DEBT_TO_EQUITY),
    },
    Rule {
        kind: Kind::RedFlag,
        text: FLAG_PROMOTER_DILUTION,
        fires: |m| {
            m.reported_dilution
                .is_some_and(|d| d > SIGNIFICANT_PROMOTER_DILUTION)
        },
    },
    Rule {
        kind: Kind::Pro,
        text: PRO_REVENUE_GROWTH,
        fires: |m| m.revenue_growth.is_some_and(|g| g >= STRONG_REVENUE_GROWTH),
    },
    Rule {
        kind: Kind::Pro,
        text: PRO_HIGH_ROCE,
        fires: |m| m.roce.is_some_and(|r| r >= HIGH_ROCE),
    },
    Rule {
        kind: Kind::Pro,
        text: PRO_FRESH_ISSUE,
        fires: |m| m.fresh_issue.is_some_and(|f| f >= MAJORITY_FRESH_ISSUE),
    },
];

/// Detected red flags and positives, each in detection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    pub red_flags: Vec<String>,
    pub pros: Vec<String>,
}

pub fn detect(metrics: &Metrics) -> Flags {
    let mut flags = Flags::default();
    for rule in RULES.iter().filter(|r| (r.fires)(metrics)) {
        match rule.kind {
            Kind::RedFlag => flags.red_flags.push(rule.text.to_string()),
            Kind::Pro => flags.pros.push(rule.text.to_string()),
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_no_metrics_no_flags() {
        assert_eq!(detect(&Metrics::default()), Flags::default());
    }

    #[test]
    fn test_rule_boundaries() {
        let cases: Vec<(Metrics, Option<&str>)> = vec![
            (Metrics { ofs_ratio: Some(dec!(0.75)), ..Default::default() }, None),
            (Metrics { ofs_ratio: Some(dec!(0.76)), ..Default::default() }, Some(FLAG_HIGH_OFS)),
            (
                Metrics { pe_ratio: Some(dec!(33)), sector_pe_median: Some(dec!(22)), ..Default::default() },
                None,
            ),
            (
                Metrics { pe_ratio: Some(dec!(33.1)), sector_pe_median: Some(dec!(22)), ..Default::default() },
                Some(FLAG_RICH_VALUATION),
            ),
            (Metrics { pe_ratio: Some(dec!(300)), ..Default::default() }, None),
            (Metrics { debt_to_equity: Some(dec!(2.0)), ..Default::default() }, None),
            (Metrics { debt_to_equity: Some(dec!(2.01)), ..Default::default() }, Some(FLAG_HIGH_LEVERAGE)),
            (
                Metrics { reported_dilution: Some(dec!(20)), ..Default::default() },
                None,
            ),
            (
                Metrics { reported_dilution: Some(dec!(20.1)), ..Default::default() },
                Some(FLAG_PROMOTER_DILUTION),
            ),
            (Metrics { revenue_growth: Some(dec!(24.99)), ..Default::default() }, None),
            (Metrics { revenue_growth: Some(dec!(25)), ..Default::default() }, Some(PRO_REVENUE_GROWTH)),
            (Metrics { roce: Some(dec!(19.9)), ..Default::default() }, None),
            (Metrics { roce: Some(dec!(20)), ..Default::default() }, Some(PRO_HIGH_ROCE)),
            (Metrics { fresh_issue: Some(dec!(0.69)), ..Default::default() }, None),
            (Metrics { fresh_issue: Some(dec!(0.7)), ..Default::default() }, Some(PRO_FRESH_ISSUE)),
        ];

        for (metrics, expected) in cases {
            let flags = detect(&metrics);
            let all: Vec<String> = flags.red_flags.into_iter().chain(flags.pros).collect();
            match expected {
                Some(text) => assert_eq!(all, vec![text.to_string()], "{metrics:?}"),
                None => assert!(all.is_empty(), "{metrics:?} produced {all:?}"),
            }
        }
    }

    #[test]
    fn test_flags_in_rule_order() {
        let metrics = Metrics {
            ofs_ratio: Some(dec!(0.9)),
            pe_ratio: Some(dec!(218)),
            sector_pe_median: Some(dec!(42)),
            debt_to_equity: Some(dec!(2.85)),
            reported_dilution: Some(dec!(30)),
            revenue_growth: Some(dec!(85.2)),
            roce: Some(dec!(21)),
            fresh_issue: Some(dec!(0.1)),
            ..Default::default()
        };
        let flags = detect(&metrics);
        assert_eq!(
            flags.red_flags,
            vec![
                FLAG_HIGH_OFS.to_string(),
                FLAG_RICH_VALUATION.to_string(),
                FLAG_HIGH_LEVERAGE.to_string(),
                FLAG_PROMOTER_DILUTION.to_string(),
            ]
        );
        assert_eq!(
            flags.pros,
            vec![PRO_REVENUE_GROWTH.to_string(), PRO_HIGH_ROCE.to_string()]
        );
    }

    #[test]
    fn test_ofs_flag_ignores_fresh_issue_complement() {
        let metrics = Metrics {
            fresh_issue: Some(dec!(0.1)),
            ..Default::default()
        };
        assert!(detect(&metrics).red_flags.is_empty());
    }

    #[test]
    fn test_huge_sector_median_does_not_overflow() {
        let metrics = Metrics {
            pe_ratio: Some(dec!(30)),
            sector_pe_median: Some(Decimal::from_i128_with_scale(7 * 10_i128.pow(28), 0)),
            ..Default::default()
        };
        assert!(detect(&metrics).red_flags.is_empty());

        let saturated = Metrics {
            pe_ratio: Some(Decimal::MAX),
            sector_pe_median: Some(Decimal::MAX),
            ..Default::default()
        };
        assert!(detect(&saturated).red_flags.is_empty());
    }

    #[test]
    fn test_dilution_flag_reads_reported_holdings() {
        let record = crate::FinancialRecord {
            promoter_holding: Some(125.0),
            post_ipo_promoter_holding: Some(100.0),
            ..Default::default()
        };
        let metrics = crate::scoring::record::sanitize(&record).metrics;
        assert_eq!(detect(&metrics).red_flags, vec![FLAG_PROMOTER_DILUTION.to_string()]);
    }
}
