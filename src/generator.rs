//! Commentary & chart generation over an open deck.

use crate::charts::{self, CategoryChartData, ChartError, ChartKind, ChartPart};
use crate::commentary::{CommentaryCalculator, RowCommentary};
use crate::config::{ChartVariant, Frame, GeneratorConfig};
use crate::data::{DataLoader, DataProcessor, Dataset, LoaderError, ProcessorError};
use crate::ppt::{Deck, EmuRect, PptError};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Ppt(#[from] PptError),
    #[error(transparent)]
    Chart(ChartError),
    #[error("No valid slide index to place the chart on")]
    NoChartSlide,
    #[error("Dataset has no cost rows to chart")]
    NoCostRows,
    #[error("Slide layout {index} not found (first master has {available} layouts)")]
    LayoutNotFound { index: usize, available: usize },
    #[error("Non-numeric {column} value \"{value}\" in sheet row {sheet_row}")]
    NonNumeric {
        column: &'static str,
        sheet_row: usize,
        value: String,
    },
}

impl From<ChartError> for GenerateError {
    fn from(err: ChartError) -> Self {
        match err {
            ChartError::NonNumeric {
                column,
                sheet_row,
                value,
            } => GenerateError::NonNumeric {
                column,
                sheet_row,
                value,
            },
            ChartError::NoCategories => GenerateError::NoCostRows,
            other => GenerateError::Chart(other),
        }
    }
}

/// Commentary outcome for one paired slide.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideCommentary {
    pub slide_index: usize,
    pub sheet_row: usize,
    pub commentary: RowCommentary,
}

impl SlideCommentary {
    pub fn inserted(&self) -> bool {
        self.commentary.text().is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlacement {
    pub slide_index: usize,
    pub kind: ChartKind,
    pub part: String,
    pub categories: usize,
}

/// What a run changed, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub variant: ChartVariant,
    pub slides: Vec<SlideCommentary>,
    /// Requested indices ignored because they were out of range or repeated.
    pub dropped_indices: Vec<usize>,
    /// Data rows left without a slide.
    pub unpaired_rows: usize,
    pub charts: Vec<ChartPlacement>,
    /// Index of the appended summary slide.
    pub summary_slide: Option<usize>,
}

impl GenerationReport {
    pub fn text_boxes_added(&self) -> usize {
        self.slides.iter().filter(|s| s.inserted()).count()
    }

    pub fn omitted(&self) -> impl Iterator<Item = &SlideCommentary> {
        self.slides.iter().filter(|s| !s.inserted())
    }
}

/// Parse "5, 6,x,7" into `[5, 6, 7]`. Tokens that are not plain digits are skipped.
pub fn parse_slide_indices(text: &str) -> Vec<usize> {
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|token| token.parse().ok())
        .collect()
}

/// Split requested indices into usable ones (in order, first occurrence) and dropped ones.
pub fn valid_slide_indices(requested: &[usize], slide_count: usize) -> (Vec<usize>, Vec<usize>) {
    let mut valid: Vec<usize> = Vec::with_capacity(requested.len());
    let mut dropped = Vec::new();

    for &index in requested {
        if index >= slide_count || valid.contains(&index) {
            dropped.push(index);
        } else {
            valid.push(index);
        }
    }

    (valid, dropped)
}

/// Charts to add once commentary is in place.
enum ChartPlan {
    Inline {
        slide_index: usize,
        chart: ChartPart,
        categories: usize,
    },
    Summary {
        layout_index: usize,
        pie: (ChartPart, usize),
        bar: (ChartPart, usize),
    },
}

fn build(kind: ChartKind, data: &CategoryChartData) -> Result<(ChartPart, usize), ChartError> {
    Ok((ChartPart::build(kind, data)?, data.len()))
}

fn add_chart(
    deck: &mut Deck,
    slide_index: usize,
    frame: Frame,
    (chart, categories): (ChartPart, usize),
) -> Result<ChartPlacement, GenerateError> {
    let kind = chart.kind;
    let part = deck.add_chart(slide_index, EmuRect::from(frame), chart.xml, chart.workbook)?;
    info!(
        "Added {} chart ({} categories) to slide {}",
        kind.label(),
        categories,
        slide_index
    );
    Ok(ChartPlacement {
        slide_index,
        kind,
        part,
        categories,
    })
}

/// Add commentary text boxes and the variant's charts to `deck`.
///
/// All inputs are validated and chart data computed up front. On error `deck`
/// is left unchanged.
pub fn generate(
    deck: &mut Deck,
    dataset: &Dataset,
    slide_indices: &[usize],
    config: &GeneratorConfig,
) -> Result<GenerationReport, GenerateError> {
    let slide_count = deck.slide_count()?;
    let (valid, dropped) = valid_slide_indices(slide_indices, slide_count);
    for index in &dropped {
        warn!(
            "Skipping slide index {} (deck has {} slides or index repeated)",
            index, slide_count
        );
    }

    let data_rows = DataProcessor::data_rows(dataset)?;
    let slides: Vec<SlideCommentary> = valid
        .iter()
        .zip(&data_rows)
        .map(|(&slide_index, row)| SlideCommentary {
            slide_index,
            sheet_row: row.sheet_row,
            commentary: CommentaryCalculator::commentary_for(row, &config.commentary),
        })
        .collect();
    let unpaired_rows = data_rows.len().saturating_sub(slides.len());
    debug!(
        "Paired {} slides with {} data rows",
        valid.len(),
        data_rows.len()
    );

    let cost_rows = DataProcessor::cost_rows(dataset)?;
    if cost_rows.is_empty() {
        return Err(GenerateError::NoCostRows);
    }
    let unknown = &config.charts.unknown_placement_label;
    let plan = match config.variant {
        ChartVariant::Inline => {
            let slide_index = *valid.last().ok_or(GenerateError::NoChartSlide)?;
            let (chart, categories) = build(ChartKind::Pie, &charts::cost_by_slide(&cost_rows)?)?;
            ChartPlan::Inline {
                slide_index,
                chart,
                categories,
            }
        }
        ChartVariant::Summary => {
            let layout_index = config.charts.summary_layout_index;
            let available = deck.slide_layout_parts()?.len();
            if layout_index >= available {
                return Err(GenerateError::LayoutNotFound {
                    index: layout_index,
                    available,
                });
            }
            ChartPlan::Summary {
                layout_index,
                pie: build(ChartKind::Pie, &charts::cost_by_placement(&cost_rows, unknown)?)?,
                bar: build(
                    ChartKind::ClusteredColumn,
                    &charts::cpm_comparison(&cost_rows, unknown)?,
                )?,
            }
        }
    };

    // Edits go to a copy that replaces `deck` only once every step succeeded.
    let mut working = deck.clone();
    let rect = EmuRect::from(config.text_box.frame);
    for slide in &slides {
        match &slide.commentary {
            RowCommentary::Omitted(reason) => warn!(
                "No commentary for slide {} (sheet row {}): {}",
                slide.slide_index, slide.sheet_row, reason
            ),
            commentary => {
                if let Some(text) = commentary.text() {
                    working.add_text_box(slide.slide_index, rect, text, &config.text_box)?;
                    info!(
                        "Added commentary to slide {} from sheet row {}",
                        slide.slide_index, slide.sheet_row
                    );
                }
            }
        }
    }

    let mut placements = Vec::new();
    let mut summary_slide = None;
    match plan {
        ChartPlan::Inline {
            slide_index,
            chart,
            categories,
        } => {
            placements.push(add_chart(
                &mut working,
                slide_index,
                config.charts.inline_pie,
                (chart, categories),
            )?);
        }
        ChartPlan::Summary {
            layout_index,
            pie,
            bar,
        } => {
            let index = working.append_slide(layout_index).map_err(|err| match err {
                PptError::LayoutNotFound { index, available } => {
                    GenerateError::LayoutNotFound { index, available }
                }
                other => GenerateError::Ppt(other),
            })?;
            placements.push(add_chart(&mut working, index, config.charts.summary_pie, pie)?);
            placements.push(add_chart(&mut working, index, config.charts.summary_bar, bar)?);
            summary_slide = Some(index);
        }
    }

    *deck = working;

    let report = GenerationReport {
        variant: config.variant,
        slides,
        dropped_indices: dropped,
        unpaired_rows,
        charts: placements,
        summary_slide,
    };
    info!(
        "Generation finished: {} text boxes, {} omitted rows, {} charts",
        report.text_boxes_added(),
        report.omitted().count(),
        report.charts.len()
    );
    Ok(report)
}

/// Load the dataset, run [`generate`] on `deck` and save the result to `output`.
pub fn generate_to_file(
    mut deck: Deck,
    dataset_path: &Path,
    slide_indices: &[usize],
    config: &GeneratorConfig,
    output: &Path,
) -> Result<GenerationReport, GenerateError> {
    let dataset = DataLoader::load(dataset_path, &config.columns)?;
    let report = generate(&mut deck, &dataset, slide_indices, config)?;
    deck.save(output)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnMap;

    fn cells(values: [&str; 10]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.to_string()))
            .collect()
    }

    fn dataset(rows: Vec<[&str; 10]>) -> Dataset {
        let header = cells([
            "Section", "Site", "Placement", "Format", "Cost", "Planned Imp", "Actual Imp",
            "Planned CPM", "Actual CPM", "CTR",
        ]);
        Dataset::from_rows(header, rows.into_iter().map(cells).collect(), &ColumnMap::default())
            .unwrap()
    }

    fn slide_xml(deck: &Deck, index: usize) -> Vec<u8> {
        deck.part(&deck.slide_part(index).unwrap()).unwrap().to_vec()
    }

    #[test]
    fn parses_comma_separated_digits_only() {
        assert_eq!(parse_slide_indices("5,6,7"), [5, 6, 7]);
        assert_eq!(parse_slide_indices(" 5 , x, -1, 2.0,,12"), [5, 12]);
        assert!(parse_slide_indices("").is_empty());
        assert!(parse_slide_indices("99999999999999999999999").is_empty());
    }

    #[test]
    fn drops_out_of_range_and_repeated_indices() {
        let (valid, dropped) = valid_slide_indices(&[5, 12, 6, 5, 9], 10);
        assert_eq!(valid, [5, 6, 9]);
        assert_eq!(dropped, [12, 5]);
    }

    #[test]
    fn chart_non_numeric_maps_to_generate_error() {
        let err = GenerateError::from(ChartError::NonNumeric {
            column: "cost",
            sheet_row: 4,
            value: "TBD".into(),
        });
        assert!(matches!(err, GenerateError::NonNumeric { sheet_row: 4, .. }));
    }

    #[test]
    fn no_cost_rows_is_an_error() {
        let data = dataset(vec![["Total", "", "", "", "", "1000", "1100", "10", "", "0.08"]]);
        let mut deck = Deck::blank(3);
        let before = slide_xml(&deck, 1);

        let config = GeneratorConfig::default().with_variant(ChartVariant::Inline);
        let err = generate(&mut deck, &data, &[1], &config).unwrap_err();
        assert!(matches!(err, GenerateError::NoCostRows));
        assert_eq!(slide_xml(&deck, 1), before);
    }

    #[test]
    fn failed_run_leaves_deck_untouched() {
        let data = dataset(vec![["", "site", "Homepage", "", "500", "1000", "1100", "10", "", "0.08"]]);
        let mut deck = Deck::blank(3);
        deck.set_part("ppt/slideLayouts/slideLayout6.xml", b"<p:sldLayout><p:cSld></p:sldLayout>".to_vec());
        let before = slide_xml(&deck, 1);

        let config = GeneratorConfig::default().with_variant(ChartVariant::Summary);
        assert!(generate(&mut deck, &data, &[1], &config).is_err());
        assert_eq!(slide_xml(&deck, 1), before);
        assert_eq!(deck.slide_count().unwrap(), 3);
    }
}
