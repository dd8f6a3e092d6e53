//! Generator Configuration Module
//! Column map, commentary rules and slide layout policy, loadable from JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Which chart set to build alongside the commentary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartVariant {
    /// One cost pie chart on the last targeted slide, categories "Slide N".
    Inline,
    /// Appended summary slide with a cost pie and a planned/actual CPM bar chart.
    #[default]
    Summary,
}

impl ChartVariant {
    /// Fixed download name for the generated deck.
    pub fn output_file_name(self) -> &'static str {
        match self {
            ChartVariant::Inline => "Updated_PCA_with_Commentary_and_Chart.pptx",
            ChartVariant::Summary => "Updated_PCA_with_Summary_Charts.pptx",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChartVariant::Inline => "Commentary & Chart",
            ChartVariant::Summary => "Commentary & Summary Charts",
        }
    }
}

/// Direction word used in commentary sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Higher,
    Lower,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Higher => "higher",
            Direction::Lower => "lower",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dataset column, either by zero-based position or by header text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "column #{}", i),
            ColumnRef::Name(name) => write!(f, "column \"{}\"", name),
        }
    }
}

/// Roles the generator reads from the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// Blank in data rows; filled in header/summary rows.
    pub section_marker: ColumnRef,
    pub placement: ColumnRef,
    pub cost: ColumnRef,
    pub planned_impressions: ColumnRef,
    pub actual_impressions: ColumnRef,
    pub planned_cpm: ColumnRef,
    pub actual_cpm: ColumnRef,
    pub ctr: ColumnRef,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            section_marker: ColumnRef::Index(0),
            placement: ColumnRef::Index(2),
            cost: ColumnRef::Index(4),
            planned_impressions: ColumnRef::Index(5),
            actual_impressions: ColumnRef::Index(6),
            planned_cpm: ColumnRef::Index(7),
            actual_cpm: ColumnRef::Index(8),
            ctr: ColumnRef::Index(9),
        }
    }
}

impl ColumnMap {
    /// (role, reference) pairs in a stable order.
    pub fn roles(&self) -> [(&'static str, &ColumnRef); 8] {
        [
            ("section_marker", &self.section_marker),
            ("placement", &self.placement),
            ("cost", &self.cost),
            ("planned_impressions", &self.planned_impressions),
            ("actual_impressions", &self.actual_impressions),
            ("planned_cpm", &self.planned_cpm),
            ("actual_cpm", &self.actual_cpm),
            ("ctr", &self.ctr),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentaryRules {
    /// Compared directly against the raw CTR cell, no unit conversion.
    pub ctr_benchmark: f64,
    /// Label used when actual equals planned exactly.
    pub tie_direction: Direction,
}

impl Default for CommentaryRules {
    fn default() -> Self {
        Self {
            ctr_benchmark: 0.07,
            tie_direction: Direction::Lower,
        }
    }
}

/// Position and size of a shape, in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let all_finite = [self.left, self.top, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite || self.width <= 0.0 || self.height <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{} frame must be finite with a positive size",
                name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBoxStyle {
    pub frame: Frame,
    pub font_name: String,
    pub font_size_pt: f64,
    /// RRGGBB
    pub color: String,
}

impl Default for TextBoxStyle {
    fn default() -> Self {
        Self {
            frame: Frame::new(0.5, 5.5, 8.5, 1.0),
            font_name: "Arial".to_string(),
            font_size_pt: 14.0,
            color: "000000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayout {
    pub inline_pie: Frame,
    pub summary_pie: Frame,
    pub summary_bar: Frame,
    /// Index into the first slide master's layouts for the appended slide.
    pub summary_layout_index: usize,
    pub unknown_placement_label: String,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            inline_pie: Frame::new(5.0, 1.0, 4.0, 3.5),
            summary_pie: Frame::new(0.5, 0.5, 4.5, 3.5),
            summary_bar: Frame::new(5.2, 0.5, 4.5, 3.5),
            summary_layout_index: 5,
            unknown_placement_label: "Unknown Placement".to_string(),
        }
    }
}

/// Everything the generator needs besides its inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub variant: ChartVariant,
    pub columns: ColumnMap,
    pub commentary: CommentaryRules,
    pub text_box: TextBoxStyle,
    pub charts: ChartLayout,
}

impl GeneratorConfig {
    /// Load and validate a JSON config file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: GeneratorConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_variant(mut self, variant: ChartVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.commentary.ctr_benchmark.is_finite() {
            return Err(ConfigError::Invalid(
                "ctr_benchmark must be a finite number".to_string(),
            ));
        }
        let size = self.text_box.font_size_pt;
        if !size.is_finite() || size <= 0.0 {
            return Err(ConfigError::Invalid(
                "font_size_pt must be positive".to_string(),
            ));
        }
        let color = &self.text_box.color;
        if color.len() != 6 || !color.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::Invalid(format!(
                "color must be six hex digits, got \"{}\"",
                color
            )));
        }
        self.text_box.frame.validate("text_box")?;
        self.charts.inline_pie.validate("inline_pie")?;
        self.charts.summary_pie.validate("summary_pie")?;
        self.charts.summary_bar.validate("summary_bar")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_layout() {
        let config = GeneratorConfig::default();
        assert_eq!(config.columns.planned_impressions, ColumnRef::Index(5));
        assert_eq!(config.commentary.ctr_benchmark, 0.07);
        assert_eq!(config.text_box.frame, Frame::new(0.5, 5.5, 8.5, 1.0));
        assert_eq!(config.charts.summary_layout_index, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GeneratorConfig::from_json_str(
            r#"{
                "variant": "inline",
                "columns": { "cost": "Total Cost", "ctr": 11 },
                "commentary": { "tie_direction": "higher" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.variant, ChartVariant::Inline);
        assert_eq!(config.columns.cost, ColumnRef::Name("Total Cost".into()));
        assert_eq!(config.columns.ctr, ColumnRef::Index(11));
        assert_eq!(config.columns.placement, ColumnRef::Index(2));
        assert_eq!(config.commentary.tie_direction, Direction::Higher);
        assert_eq!(config.commentary.ctr_benchmark, 0.07);
    }

    #[test]
    fn rejects_bad_values() {
        let err = GeneratorConfig::from_json_str(r#"{ "text_box": { "color": "black" } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = GeneratorConfig::from_json_str(
            r#"{ "charts": { "summary_pie": { "left": 0, "top": 0, "width": 0, "height": 1 } } }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("summary_pie"));
    }

    #[test]
    fn output_names_are_fixed_per_variant() {
        assert_eq!(
            ChartVariant::Inline.output_file_name(),
            "Updated_PCA_with_Commentary_and_Chart.pptx"
        );
        assert_eq!(
            ChartVariant::Summary.output_file_name(),
            "Updated_PCA_with_Summary_Charts.pptx"
        );
    }
}
