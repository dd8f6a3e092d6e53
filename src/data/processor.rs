//! Data Processor Module
//! Filters the PCA sheet into commentary rows and cost rows.

use super::loader::Dataset;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Raw fields of one commentary-eligible row. Parsing happens later so a
/// malformed cell can be reported instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    /// Zero-based position in the data body (header excluded).
    pub row: usize,
    /// 1-based worksheet row the values came from.
    pub sheet_row: usize,
    pub planned_impressions: Option<String>,
    pub actual_impressions: Option<String>,
    pub planned_cpm: Option<String>,
    pub actual_cpm: Option<String>,
    pub ctr: Option<String>,
}

/// One row feeding the cost charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostRow {
    pub row: usize,
    pub sheet_row: usize,
    pub placement: Option<String>,
    pub cost: Option<String>,
    pub planned_cpm: Option<String>,
    pub actual_cpm: Option<String>,
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked, ProcessorError> {
    Ok(df.column(name)?.as_materialized_series().str()?)
}

/// Positions where the section marker is blank and `value` is present.
fn eligible_rows(df: &DataFrame, marker: &str, value: &str) -> Result<Vec<usize>, ProcessorError> {
    let marker = df.column(marker)?.as_materialized_series().is_null();
    let present = df.column(value)?.as_materialized_series().is_not_null();
    let mask = &marker & &present;

    Ok(mask
        .into_iter()
        .enumerate()
        .filter_map(|(i, keep)| (keep == Some(true)).then_some(i))
        .collect())
}

/// Handles row filtering and field extraction.
pub struct DataProcessor;

impl DataProcessor {
    /// Rows with a blank section marker and planned impressions present.
    pub fn data_rows(dataset: &Dataset) -> Result<Vec<MetricRow>, ProcessorError> {
        let df = dataset.dataframe();
        let cols = dataset.columns();

        let planned_impressions = text_column(df, &cols.planned_impressions)?;
        let actual_impressions = text_column(df, &cols.actual_impressions)?;
        let planned_cpm = text_column(df, &cols.planned_cpm)?;
        let actual_cpm = text_column(df, &cols.actual_cpm)?;
        let ctr = text_column(df, &cols.ctr)?;
        let owned = |ca: &StringChunked, i: usize| ca.get(i).map(str::to_string);

        let rows: Vec<MetricRow> = eligible_rows(df, &cols.section_marker, &cols.planned_impressions)?
            .into_iter()
            .map(|i| MetricRow {
                row: i,
                sheet_row: dataset.sheet_row(i),
                planned_impressions: owned(planned_impressions, i),
                actual_impressions: owned(actual_impressions, i),
                planned_cpm: owned(planned_cpm, i),
                actual_cpm: owned(actual_cpm, i),
                ctr: owned(ctr, i),
            })
            .collect();

        debug!("Filtered {} data rows out of {}", rows.len(), df.height());
        Ok(rows)
    }

    /// Rows with a blank section marker and a cost present.
    pub fn cost_rows(dataset: &Dataset) -> Result<Vec<CostRow>, ProcessorError> {
        let df = dataset.dataframe();
        let cols = dataset.columns();

        let placement = text_column(df, &cols.placement)?;
        let cost = text_column(df, &cols.cost)?;
        let planned_cpm = text_column(df, &cols.planned_cpm)?;
        let actual_cpm = text_column(df, &cols.actual_cpm)?;
        let owned = |ca: &StringChunked, i: usize| ca.get(i).map(str::to_string);

        let rows: Vec<CostRow> = eligible_rows(df, &cols.section_marker, &cols.cost)?
            .into_iter()
            .map(|i| CostRow {
                row: i,
                sheet_row: dataset.sheet_row(i),
                placement: owned(placement, i),
                cost: owned(cost, i),
                planned_cpm: owned(planned_cpm, i),
                actual_cpm: owned(actual_cpm, i),
            })
            .collect();

        debug!("Filtered {} cost rows out of {}", rows.len(), df.height());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnMap;

    fn row(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.to_string()))
            .collect()
    }

    fn sample() -> Dataset {
        let header = row(&["", "", "Placement", "", "Cost", "PI", "AI", "PC", "AC", "CTR"]);
        let rows = vec![
            row(&["Display", "", "", "", "", "", "", "", "", ""]),
            row(&["", "", "Homepage", "", "100", "1000", "1100", "10", "", "0.08"]),
            row(&["", "", "Sidebar", "", "", "500", "400", "8", "9", "0.05"]),
            row(&["Total", "", "", "", "150", "1500", "", "", "", ""]),
            row(&["", "", "", "", "50", "", "", "", "", ""]),
        ];
        Dataset::from_rows(header, rows, &ColumnMap::default()).unwrap()
    }

    #[test]
    fn data_rows_need_blank_marker_and_planned_impressions() {
        let rows = DataProcessor::data_rows(&sample()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 1);
        assert_eq!(rows[0].sheet_row, 3);
        assert_eq!(rows[0].actual_cpm, None);
        assert_eq!(rows[1].planned_impressions.as_deref(), Some("500"));
    }

    #[test]
    fn cost_rows_need_blank_marker_and_cost() {
        let rows = DataProcessor::cost_rows(&sample()).unwrap();
        let costs: Vec<_> = rows.iter().map(|r| r.cost.as_deref()).collect();
        assert_eq!(costs, [Some("100"), Some("50")]);
        assert_eq!(rows[0].placement.as_deref(), Some("Homepage"));
        assert_eq!(rows[1].placement, None);
    }

    #[test]
    fn sheet_rows_follow_header_position() {
        let dataset = sample().with_header_row(4);
        let rows = DataProcessor::cost_rows(&dataset).unwrap();
        assert_eq!(rows[0].sheet_row, 7);
        assert_eq!(rows[1].sheet_row, 10);
    }
}
