//! Charts module - native PowerPoint chart parts

mod data;
mod workbook;
mod xml;

pub use data::{
    cost_by_placement, cost_by_slide, cpm_comparison, numeric_or_zero, CategoryChartData,
    ChartKind, ChartSeries,
};
pub use workbook::chart_workbook;
pub use xml::{column_letter, write_chart, PALETTE};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to write chart XML: {0}")]
    Xml(#[from] std::io::Error),
    #[error("Failed to build chart workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("Non-numeric {column} value \"{value}\" in sheet row {sheet_row}")]
    NonNumeric {
        column: &'static str,
        sheet_row: usize,
        value: String,
    },
    #[error("Chart data contains no categories")]
    NoCategories,
}

/// A chart ready to be stored in a deck: part XML plus its embedded workbook.
#[derive(Debug, Clone)]
pub struct ChartPart {
    pub kind: ChartKind,
    pub xml: Vec<u8>,
    pub workbook: Vec<u8>,
}

impl ChartPart {
    pub fn build(kind: ChartKind, data: &CategoryChartData) -> Result<Self, ChartError> {
        if data.is_empty() {
            return Err(ChartError::NoCategories);
        }
        let mut xml = Vec::with_capacity(4096);
        write_chart(&mut xml, kind, data)?;
        Ok(Self {
            kind,
            xml,
            workbook: chart_workbook(data)?,
        })
    }
}
