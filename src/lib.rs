//! PCA Commentary Generator
//!
//! Writes per-placement performance commentary and cost charts into a
//! PowerPoint template from a media-buy PCA workbook.

pub mod charts;
pub mod commentary;
pub mod config;
pub mod data;
pub mod generator;
pub mod gui;
pub mod ppt;

pub use config::{ChartVariant, GeneratorConfig};
pub use generator::{generate, generate_to_file, parse_slide_indices, GenerateError, GenerationReport};
pub use ppt::Deck;
