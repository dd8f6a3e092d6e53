//! Data module - workbook loading and row filtering

mod loader;
mod processor;

pub use loader::{normalize_headers, DataLoader, Dataset, LoaderError, MissingColumn, ResolvedColumns};
pub use processor::{CostRow, DataProcessor, MetricRow, ProcessorError};
