//! Commentary Calculator Module
//! Turns one PCA data row into impressions, CPM and CTR benchmark sentences.

use crate::config::{CommentaryRules, Direction};
use crate::data::MetricRow;
use std::fmt;

/// Numeric fields a data row must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricField {
    PlannedImpressions,
    ActualImpressions,
    PlannedCpm,
    ActualCpm,
    Ctr,
}

impl MetricField {
    pub fn label(self) -> &'static str {
        match self {
            MetricField::PlannedImpressions => "planned impressions",
            MetricField::ActualImpressions => "actual impressions",
            MetricField::PlannedCpm => "planned CPM",
            MetricField::ActualCpm => "actual CPM",
            MetricField::Ctr => "CTR",
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a row produced no commentary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OmissionReason {
    Missing(MetricField),
    NotNumeric { field: MetricField, value: String },
}

impl fmt::Display for OmissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OmissionReason::Missing(field) => write!(f, "{} is missing", field),
            OmissionReason::NotNumeric { field, value } => {
                write!(f, "{} is not a number: \"{}\"", field, value)
            }
        }
    }
}

/// Outcome for one data row: either the full text or nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowCommentary {
    Text(String),
    Omitted(OmissionReason),
}

impl RowCommentary {
    /// The text to place on the slide, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            RowCommentary::Text(text) if !text.trim().is_empty() => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Parse a cell as a finite float. Surrounding whitespace is ignored.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// (actual - planned) / planned * 100. Callers guard `planned > 0`.
pub fn percent_difference(actual: f64, planned: f64) -> f64 {
    (actual - planned) / planned * 100.0
}

/// "higher" only for a strictly positive difference; zero takes `tie`.
pub fn direction(diff: f64, tie: Direction) -> Direction {
    if diff > 0.0 {
        Direction::Higher
    } else if diff < 0.0 {
        Direction::Lower
    } else {
        tie
    }
}

/// Parsed metrics of one row. `actual_cpm` already holds the planned-CPM fallback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricValues {
    pub planned_impressions: f64,
    pub actual_impressions: f64,
    pub planned_cpm: f64,
    pub actual_cpm: f64,
    pub ctr: f64,
}

fn required(raw: &Option<String>, field: MetricField) -> Result<f64, OmissionReason> {
    let value = raw.as_deref().ok_or(OmissionReason::Missing(field))?;
    parse_number(value).ok_or_else(|| OmissionReason::NotNumeric {
        field,
        value: value.to_string(),
    })
}

impl MetricValues {
    pub fn from_row(row: &MetricRow) -> Result<Self, OmissionReason> {
        let planned_impressions = required(&row.planned_impressions, MetricField::PlannedImpressions)?;
        let actual_impressions = required(&row.actual_impressions, MetricField::ActualImpressions)?;
        let planned_cpm = required(&row.planned_cpm, MetricField::PlannedCpm)?;
        let actual_cpm = match row.actual_cpm {
            Some(_) => required(&row.actual_cpm, MetricField::ActualCpm)?,
            None => planned_cpm,
        };
        let ctr = required(&row.ctr, MetricField::Ctr)?;

        Ok(Self {
            planned_impressions,
            actual_impressions,
            planned_cpm,
            actual_cpm,
            ctr,
        })
    }
}

/// Builds commentary text from parsed metrics.
pub struct CommentaryCalculator;

impl CommentaryCalculator {
    /// Sentences in output order: impressions, CPM, CTR benchmark.
    pub fn sentences(values: &MetricValues, rules: &CommentaryRules) -> Vec<String> {
        let mut sentences = Vec::with_capacity(3);

        if values.planned_impressions > 0.0 {
            let diff = percent_difference(values.actual_impressions, values.planned_impressions);
            sentences.push(format!(
                "Impressions were {:.1}% {} than planned.",
                diff.abs(),
                direction(diff, rules.tie_direction)
            ));
        }

        if values.planned_cpm > 0.0 {
            let diff = percent_difference(values.actual_cpm, values.planned_cpm);
            sentences.push(format!(
                "CPM was {:.1}% {} than planned.",
                diff.abs(),
                direction(diff, rules.tie_direction)
            ));
        }

        if values.ctr >= rules.ctr_benchmark {
            sentences.push(format!(
                "CTR met or exceeded the {}% benchmark.",
                rules.ctr_benchmark
            ));
        } else {
            sentences.push(format!("CTR was below the {}% benchmark.", rules.ctr_benchmark));
        }

        sentences
    }

    pub fn commentary_for(row: &MetricRow, rules: &CommentaryRules) -> RowCommentary {
        match MetricValues::from_row(row) {
            Ok(values) => RowCommentary::Text(Self::sentences(&values, rules).join(" ")),
            Err(reason) => RowCommentary::Omitted(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(fields: [&str; 5]) -> MetricRow {
        let cell = |v: &str| (!v.is_empty()).then(|| v.to_string());
        MetricRow {
            row: 0,
            sheet_row: 2,
            planned_impressions: cell(fields[0]),
            actual_impressions: cell(fields[1]),
            planned_cpm: cell(fields[2]),
            actual_cpm: cell(fields[3]),
            ctr: cell(fields[4]),
        }
    }

    fn text(fields: [&str; 5]) -> String {
        match CommentaryCalculator::commentary_for(&row(fields), &CommentaryRules::default()) {
            RowCommentary::Text(text) => text,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn full_row_with_cpm_fallback() {
        assert_eq!(
            text(["1000", "1100", "10", "", "0.08"]),
            "Impressions were 10.0% higher than planned. \
             CPM was 0.0% lower than planned. \
             CTR met or exceeded the 0.07% benchmark."
        );
    }

    #[test]
    fn lower_values_and_missed_benchmark() {
        assert_eq!(
            text(["2000", "1500", "8", "10", "0.05"]),
            "Impressions were 25.0% lower than planned. \
             CPM was 25.0% higher than planned. \
             CTR was below the 0.07% benchmark."
        );
    }

    #[test]
    fn non_positive_plans_skip_their_sentence() {
        assert_eq!(
            text(["0", "100", "-1", "3", "0.07"]),
            "CTR met or exceeded the 0.07% benchmark."
        );
    }

    #[test]
    fn tie_direction_is_configurable() {
        let rules = CommentaryRules {
            tie_direction: Direction::Higher,
            ..CommentaryRules::default()
        };
        let out = CommentaryCalculator::commentary_for(&row(["500", "500", "4", "", "0.1"]), &rules);
        let text = out.text().unwrap();
        assert!(text.starts_with("Impressions were 0.0% higher than planned."));
        assert!(text.contains("CPM was 0.0% higher than planned."));
    }

    #[test]
    fn malformed_rows_are_omitted_with_reason() {
        let rules = CommentaryRules::default();

        let out = CommentaryCalculator::commentary_for(&row(["1,000", "1100", "10", "", "0.08"]), &rules);
        assert_eq!(
            out,
            RowCommentary::Omitted(OmissionReason::NotNumeric {
                field: MetricField::PlannedImpressions,
                value: "1,000".to_string(),
            })
        );
        assert_eq!(out.text(), None);

        let out = CommentaryCalculator::commentary_for(&row(["1000", "1100", "10", "n/a", "0.08"]), &rules);
        assert!(matches!(
            out,
            RowCommentary::Omitted(OmissionReason::NotNumeric {
                field: MetricField::ActualCpm,
                ..
            })
        ));

        let out = CommentaryCalculator::commentary_for(&row(["1000", "1100", "10", "", ""]), &rules);
        assert_eq!(out, RowCommentary::Omitted(OmissionReason::Missing(MetricField::Ctr)));
        assert_eq!(
            OmissionReason::Missing(MetricField::Ctr).to_string(),
            "CTR is missing"
        );
    }

    #[test]
    fn parses_padded_numbers_only() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("$10"), None);
    }

    proptest! {
        #[test]
        fn reported_difference_matches_formula(
            planned in 1.0f64..1e7,
            actual in 0.0f64..1e7,
        ) {
            let values = MetricValues {
                planned_impressions: planned,
                actual_impressions: actual,
                planned_cpm: 0.0,
                actual_cpm: 0.0,
                ctr: 0.0,
            };
            let sentences = CommentaryCalculator::sentences(&values, &CommentaryRules::default());
            let diff = (actual - planned) / planned * 100.0;
            let word = if actual > planned { "higher" } else { "lower" };
            prop_assert_eq!(
                &sentences[0],
                &format!("Impressions were {:.1}% {} than planned.", diff.abs(), word)
            );
        }

        #[test]
        fn exactly_one_benchmark_sentence(ctr in -1.0f64..1.0, planned_cpm in -10.0f64..10.0) {
            let values = MetricValues {
                planned_impressions: 100.0,
                actual_impressions: 90.0,
                planned_cpm,
                actual_cpm: planned_cpm,
                ctr,
            };
            let text = CommentaryCalculator::sentences(&values, &CommentaryRules::default()).join(" ");
            let met = text.matches("CTR met or exceeded").count();
            let below = text.matches("CTR was below").count();
            prop_assert_eq!(met + below, 1);
            prop_assert_eq!(met == 1, ctr >= 0.07);
        }
    }
}
