//! PPT module - PresentationML package editing
//!
//! Works directly on the ZIP/XML parts of a `.pptx`: slide order, relationships,
//! content types, text boxes, chart frames and appended slides.

mod content_types;
mod package;
mod presentation;
mod relationships;
mod shapes;
mod template;

pub use package::Deck;
pub use relationships::{Relationship, Relationships};

use crate::config::Frame;
use thiserror::Error;

/// EMU (English Metric Units) conversion: 914400 EMU = 1 inch
pub const EMU_PER_INCH: i64 = 914400;
/// Standard 4:3 slide dimensions (in EMU)
pub const SLIDE_WIDTH: i64 = 9144000; // 10 inches
pub const SLIDE_HEIGHT: i64 = 6858000; // 7.5 inches

/// MIME type offered for the generated deck.
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

pub(crate) mod rel_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
    pub const SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
    pub const SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
    pub const CHART: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
    pub const PACKAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/package";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
}

pub(crate) mod content_type_names {
    pub const SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
    pub const CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
    pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
}

#[derive(Error, Debug)]
pub enum PptError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid PPTX container: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Malformed XML in {part}: {message}")]
    Xml { part: String, message: String },
    #[error("Missing package part: {0}")]
    MissingPart(String),
    #[error("Relationship {id} not found in {part}")]
    MissingRelationship { part: String, id: String },
    #[error("Slide index {index} out of range (deck has {count} slides)")]
    SlideOutOfRange { index: usize, count: usize },
    #[error("Slide layout {index} not found (first master has {available} layouts)")]
    LayoutNotFound { index: usize, available: usize },
    #[error("Failed to save presentation: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl PptError {
    pub(crate) fn xml(part: &str, err: impl std::fmt::Display) -> Self {
        PptError::Xml {
            part: part.to_string(),
            message: err.to_string(),
        }
    }
}

/// Inches to EMU, rounded like python-pptx's `Inches`.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

/// Points to hundredths of a point, the unit of `a:rPr/@sz`.
pub fn points_to_centipoints(points: f64) -> i64 {
    (points * 100.0).round() as i64
}

/// A frame converted to EMU offsets and extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmuRect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl From<Frame> for EmuRect {
    fn from(frame: Frame) -> Self {
        Self {
            x: inches_to_emu(frame.left),
            y: inches_to_emu(frame.top),
            cx: inches_to_emu(frame.width),
            cy: inches_to_emu(frame.height),
        }
    }
}
