//! Metric normalizer.
//!
//! Maps each sanitized metric onto the common 0-10 scale. Threshold tables are
//! [`Ladder`] values so that every boundary is a named, serializable policy
//! constant rather than an inline literal.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Fraction, Multiple, Score};

/// Lowest score a term can contribute.
pub const MIN_SCORE: Score = Decimal::ZERO;
/// Highest score a term can contribute.
pub const MAX_SCORE: Score = dec!(10);
/// Contribution used when there is no data to judge.
pub const NEUTRAL_SCORE: Score = dec!(5);

/// Clamp a score into `[MIN_SCORE, MAX_SCORE]`.
pub fn clamp_score(score: Score) -> Score {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

// ---------------------------------------------------------------------------
// Ladder
// ---------------------------------------------------------------------------

/// Which side of a rung's bound earns its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `value >= bound` earns the rung.
    HigherIsBetter,
    /// `value <= bound` earns the rung.
    LowerIsBetter,
}

/// One step of a [`Ladder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rung {
    pub bound: Decimal,
    pub score: Score,
}

/// Threshold table mapping a raw metric to a score.
///
/// Rungs are checked in order and the first one the value reaches wins; a
/// value that reaches none scores `floor`. Rungs are expected best-first, i.e.
/// descending bounds for [`Direction::HigherIsBetter`] and ascending bounds
/// for [`Direction::LowerIsBetter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ladder {
    pub direction: Direction,
    pub rungs: Vec<Rung>,
    pub floor: Score,
}

impl Ladder {
    pub fn higher_is_better(rungs: &[(Decimal, Score)], floor: Score) -> Self {
        Self::new(Direction::HigherIsBetter, rungs, floor)
    }

    pub fn lower_is_better(rungs: &[(Decimal, Score)], floor: Score) -> Self {
        Self::new(Direction::LowerIsBetter, rungs, floor)
    }

    fn new(direction: Direction, rungs: &[(Decimal, Score)], floor: Score) -> Self {
        Self {
            direction,
            rungs: rungs
                .iter()
                .map(|&(bound, score)| Rung { bound, score })
                .collect(),
            floor,
        }
    }

    /// Score `value`, clamped to 0-10.
    pub fn score(&self, value: Decimal) -> Score {
        let reached = |bound: Decimal| match self.direction {
            Direction::HigherIsBetter => value >= bound,
            Direction::LowerIsBetter => value <= bound,
        };
        let raw = self
            .rungs
            .iter()
            .find(|r| reached(r.bound))
            .map(|r| r.score)
            .unwrap_or(self.floor);
        clamp_score(raw)
    }

    /// Structural problems with this ladder, prefixed with `name`.
    pub fn problems(&self, name: &str) -> Vec<String> {
        let mut errors = Vec::new();

        let out_of_range = |s: Score| s < MIN_SCORE || s > MAX_SCORE;
        for (i, rung) in self.rungs.iter().enumerate() {
            if out_of_range(rung.score) {
                errors.push(format!(
                    "{name}.rungs[{i}].score: {} outside [0, 10]",
                    rung.score
                ));
            }
        }
        if out_of_range(self.floor) {
            errors.push(format!("{name}.floor: {} outside [0, 10]", self.floor));
        }

        for (i, pair) in self.rungs.windows(2).enumerate() {
            let ordered = match self.direction {
                Direction::HigherIsBetter => pair[0].bound > pair[1].bound,
                Direction::LowerIsBetter => pair[0].bound < pair[1].bound,
            };
            if !ordered {
                errors.push(format!(
                    "{name}.rungs[{}].bound: {} is not ordered best-first after {}",
                    i + 1,
                    pair[1].bound,
                    pair[0].bound
                ));
            }
            if pair[1].score > pair[0].score {
                errors.push(format!(
                    "{name}.rungs[{}].score: {} rewards a worse value more than {}",
                    i + 1,
                    pair[1].score,
                    pair[0].score
                ));
            }
        }
        if let Some(last) = self.rungs.last() {
            if self.floor > last.score {
                errors.push(format!(
                    "{name}.floor: {} exceeds the last rung score {}",
                    self.floor, last.score
                ));
            }
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Special-case terms
// ---------------------------------------------------------------------------

/// P/E contribution: relative to sector peers when the median is known,
/// otherwise against the absolute table. Absent without a P/E.
pub fn pe_score(
    pe_ratio: Option<Multiple>,
    sector_pe_median: Option<Multiple>,
    relative: &Ladder,
    absolute: &Ladder,
) -> Option<Score> {
    let pe = pe_ratio?;
    match sector_pe_median {
        Some(median) if median > Decimal::ZERO => {
            // overflow means a ratio beyond the decimal range
            let ratio = pe.checked_div(median).unwrap_or(Decimal::MAX);
            Some(relative.score(ratio))
        }
        _ => Some(absolute.score(pe)),
    }
}

/// OFS contribution: linear from 10 (all fresh issue) down to 0 (all OFS).
pub fn ofs_score(ofs_ratio: Fraction) -> Score {
    let ofs = ofs_ratio.clamp(Decimal::ZERO, Decimal::ONE);
    clamp_score(MAX_SCORE * (Decimal::ONE - ofs))
}

/// Promoter dilution contribution. A stake increase counts as no dilution.
pub fn dilution_score(dilution: Decimal, ladder: &Ladder) -> Score {
    ladder.score(dilution.max(Decimal::ZERO))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn growth() -> Ladder {
        Ladder::higher_is_better(
            &[(dec!(30), dec!(10)), (dec!(15), dec!(7.5)), (dec!(0), dec!(5))],
            dec!(2.5),
        )
    }

    fn leverage() -> Ladder {
        Ladder::lower_is_better(
            &[(dec!(0.25), dec!(10)), (dec!(0.5), dec!(8)), (dec!(1), dec!(6)), (dec!(2), dec!(3))],
            Decimal::ZERO,
        )
    }

    #[test]
    fn test_higher_is_better_boundaries() {
        let ladder = growth();
        let cases = [
            (dec!(45), dec!(10)),
            (dec!(30), dec!(10)),
            (dec!(29.99), dec!(7.5)),
            (dec!(15), dec!(7.5)),
            (dec!(0), dec!(5)),
            (dec!(-0.01), dec!(2.5)),
            (dec!(-80), dec!(2.5)),
        ];
        for (value, expected) in cases {
            assert_eq!(ladder.score(value), expected, "value {value}");
        }
    }

    #[test]
    fn test_lower_is_better_boundaries() {
        let ladder = leverage();
        let cases = [
            (dec!(0), dec!(10)),
            (dec!(0.25), dec!(10)),
            (dec!(0.26), dec!(8)),
            (dec!(1), dec!(6)),
            (dec!(2), dec!(3)),
            (dec!(2.01), dec!(0)),
            (dec!(15), dec!(0)),
        ];
        for (value, expected) in cases {
            assert_eq!(ladder.score(value), expected, "value {value}");
        }
    }

    #[test]
    fn test_ladder_output_is_clamped() {
        let wild = Ladder::higher_is_better(&[(dec!(0), dec!(14))], dec!(-3));
        assert_eq!(wild.score(dec!(5)), MAX_SCORE);
        assert_eq!(wild.score(dec!(-5)), MIN_SCORE);
    }

    #[test]
    fn test_empty_ladder_scores_floor() {
        let ladder = Ladder::higher_is_better(&[], dec!(4));
        assert_eq!(ladder.score(dec!(100)), dec!(4));
    }

    #[test]
    fn test_well_formed_ladder_has_no_problems() {
        assert!(growth().problems("growth").is_empty());
        assert!(leverage().problems("leverage").is_empty());
    }

    #[test]
    fn test_unordered_bounds_reported() {
        let ladder = Ladder::higher_is_better(&[(dec!(10), dec!(10)), (dec!(20), dec!(5))], dec!(0));
        let problems = ladder.problems("roe");
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("roe.rungs[1].bound"));
    }

    #[test]
    fn test_out_of_range_scores_reported() {
        let ladder = Ladder::lower_is_better(&[(dec!(1), dec!(11))], dec!(-1));
        let problems = ladder.problems("pb");
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.starts_with("pb.rungs[0].score")));
        assert!(problems.iter().any(|p| p.starts_with("pb.floor")));
    }

    #[test]
    fn test_pe_relative_when_median_known() {
        let relative = Ladder::lower_is_better(&[(dec!(1), dec!(10))], dec!(0));
        let absolute = Ladder::lower_is_better(&[(dec!(100), dec!(7))], dec!(0));
        assert_eq!(
            pe_score(Some(dec!(20)), Some(dec!(25)), &relative, &absolute),
            Some(dec!(10))
        );
        assert_eq!(
            pe_score(Some(dec!(30)), Some(dec!(25)), &relative, &absolute),
            Some(dec!(0))
        );
    }

    #[test]
    fn test_pe_absolute_fallback_and_absent() {
        let relative = Ladder::lower_is_better(&[(dec!(1), dec!(10))], dec!(0));
        let absolute = Ladder::lower_is_better(&[(dec!(100), dec!(7))], dec!(0));
        assert_eq!(pe_score(Some(dec!(30)), None, &relative, &absolute), Some(dec!(7)));
        assert_eq!(pe_score(None, Some(dec!(25)), &relative, &absolute), None);
        assert_eq!(pe_score(None, None, &relative, &absolute), None);
    }

    #[test]
    fn test_ofs_score_linear() {
        assert_eq!(ofs_score(dec!(0)), dec!(10));
        assert_eq!(ofs_score(dec!(0.45)), dec!(5.5));
        assert_eq!(ofs_score(dec!(1)), dec!(0));
        assert_eq!(ofs_score(dec!(1.3)), dec!(0));
    }

    #[test]
    fn test_dilution_increase_counts_as_none() {
        let ladder = Ladder::lower_is_better(&[(dec!(10), dec!(10)), (dec!(20), dec!(7.5))], dec!(0));
        assert_eq!(dilution_score(dec!(-4), &ladder), dec!(10));
        assert_eq!(dilution_score(dec!(17.5), &ladder), dec!(7.5));
        assert_eq!(dilution_score(dec!(27.5), &ladder), dec!(0));
    }

    #[test]
    fn test_pe_ratio_overflow_takes_worst_rung() {
        let relative = Ladder::lower_is_better(
            &[(dec!(0.8), dec!(10)), (dec!(1.0), dec!(7.5)), (dec!(1.2), dec!(5)), (dec!(1.5), dec!(2.5))],
            Decimal::ZERO,
        );
        let absolute = relative.clone();
        let tiny_median = Decimal::new(1, 20);
        let huge_pe = Decimal::from_i128_with_scale(7 * 10_i128.pow(28), 0);
        assert_eq!(pe_score(Some(huge_pe), Some(tiny_median), &relative, &absolute), Some(Decimal::ZERO));
        assert_eq!(
            pe_score(Some(Decimal::MAX), Some(Decimal::new(1, 28)), &relative, &absolute),
            Some(Decimal::ZERO)
        );
        assert_eq!(pe_score(Some(dec!(30)), Some(huge_pe), &relative, &absolute), Some(dec!(10)));
    }
}
