//! Category chart data built from cost rows.

use super::ChartError;
use crate::commentary::parse_number;
use crate::data::CostRow;

/// Chart types the generator places on slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Pie,
    ClusteredColumn,
}

impl ChartKind {
    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Pie => "pie",
            ChartKind::ClusteredColumn => "clustered column",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    pub values: Vec<f64>,
}

/// Categories plus one or more value series of the same length.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryChartData {
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl CategoryChartData {
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            categories,
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, name: &str, values: Vec<f64>) -> &mut Self {
        self.series.push(ChartSeries {
            name: name.to_string(),
            values,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Missing cells chart as 0; anything unparsable aborts the chart.
pub fn numeric_or_zero(
    raw: Option<&str>,
    column: &'static str,
    sheet_row: usize,
) -> Result<f64, ChartError> {
    match raw {
        None => Ok(0.0),
        Some(value) => parse_number(value).ok_or_else(|| ChartError::NonNumeric {
            column,
            sheet_row,
            value: value.to_string(),
        }),
    }
}

fn column_values(
    rows: &[CostRow],
    column: &'static str,
    field: impl Fn(&CostRow) -> Option<&str>,
) -> Result<Vec<f64>, ChartError> {
    rows.iter()
        .map(|row| numeric_or_zero(field(row), column, row.sheet_row))
        .collect()
}

fn placement_labels(rows: &[CostRow], unknown_label: &str) -> Vec<String> {
    rows.iter()
        .map(|row| {
            row.placement
                .clone()
                .unwrap_or_else(|| unknown_label.to_string())
        })
        .collect()
}

/// One "Cost" series, categories `Slide 1..N` in row order.
pub fn cost_by_slide(rows: &[CostRow]) -> Result<CategoryChartData, ChartError> {
    let categories = (1..=rows.len()).map(|i| format!("Slide {}", i)).collect();
    let mut data = CategoryChartData::new(categories);
    data.add_series("Cost", column_values(rows, "cost", |r| r.cost.as_deref())?);
    Ok(data)
}

/// One "Cost" series, categories are placement labels.
pub fn cost_by_placement(
    rows: &[CostRow],
    unknown_label: &str,
) -> Result<CategoryChartData, ChartError> {
    let mut data = CategoryChartData::new(placement_labels(rows, unknown_label));
    data.add_series("Cost", column_values(rows, "cost", |r| r.cost.as_deref())?);
    Ok(data)
}

/// "Planned CPM" and "Actual CPM" series per placement.
pub fn cpm_comparison(
    rows: &[CostRow],
    unknown_label: &str,
) -> Result<CategoryChartData, ChartError> {
    let mut data = CategoryChartData::new(placement_labels(rows, unknown_label));
    data.add_series(
        "Planned CPM",
        column_values(rows, "planned_cpm", |r| r.planned_cpm.as_deref())?,
    )
    .add_series(
        "Actual CPM",
        column_values(rows, "actual_cpm", |r| r.actual_cpm.as_deref())?,
    );
    Ok(data)
}
