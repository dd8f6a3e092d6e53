//! Dataset Loader Module
//! Reads the first worksheet (or a CSV) into a string-typed Polars DataFrame
//! and resolves the configured column roles against its header.

use crate::config::{ColumnMap, ColumnRef};
use polars::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// A configured column that could not be found in the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingColumn {
    pub role: &'static str,
    pub reference: ColumnRef,
}

impl fmt::Display for MissingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.role, self.reference)
    }
}

fn join_missing(missing: &[MissingColumn]) -> String {
    missing
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read workbook: {0}")]
    Calamine(#[from] calamine::Error),
    #[error("Failed to load CSV: {0}")]
    Polars(#[from] PolarsError),
    #[error("Unsupported dataset extension: {0:?}")]
    UnsupportedExtension(String),
    #[error("Workbook has no worksheets or no header row")]
    EmptyWorkbook,
    #[error("Missing columns: {} (available: {})", join_missing(.missing), .available.join(", "))]
    MissingColumns {
        missing: Vec<MissingColumn>,
        available: Vec<String>,
    },
}

/// Header names of every role, resolved against the loaded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub section_marker: String,
    pub placement: String,
    pub cost: String,
    pub planned_impressions: String,
    pub actual_impressions: String,
    pub planned_cpm: String,
    pub actual_cpm: String,
    pub ctr: String,
}

impl ResolvedColumns {
    fn resolve(map: &ColumnMap, headers: &[String]) -> Result<Self, LoaderError> {
        let mut missing = Vec::new();
        let mut names = Vec::with_capacity(8);

        for (role, reference) in map.roles() {
            let found = match reference {
                ColumnRef::Index(i) => headers.get(*i).cloned(),
                ColumnRef::Name(name) => headers.iter().find(|h| *h == name).cloned(),
            };
            match found {
                Some(name) => names.push(name),
                None => {
                    missing.push(MissingColumn {
                        role,
                        reference: reference.clone(),
                    });
                    names.push(String::new());
                }
            }
        }

        if !missing.is_empty() {
            return Err(LoaderError::MissingColumns {
                missing,
                available: headers.to_vec(),
            });
        }

        let mut names = names.into_iter();
        let mut next = || names.next().unwrap_or_default();
        Ok(Self {
            section_marker: next(),
            placement: next(),
            cost: next(),
            planned_impressions: next(),
            actual_impressions: next(),
            planned_cpm: next(),
            actual_cpm: next(),
            ctr: next(),
        })
    }
}

/// A loaded sheet: every column a nullable string, blanks already null.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    columns: ResolvedColumns,
    /// Zero-based worksheet row holding the header.
    header_row: usize,
}

impl Dataset {
    /// Build from a raw header row and body rows. Ragged rows are padded with nulls.
    pub fn from_rows(
        header: Vec<Option<String>>,
        rows: Vec<Vec<Option<String>>>,
        map: &ColumnMap,
    ) -> Result<Self, LoaderError> {
        let width = rows
            .iter()
            .map(|r| r.len())
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);

        let mut header = header;
        header.resize(width, None);
        let headers = normalize_headers(header);

        let mut columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(rows.len()); width];
        for row in rows {
            let mut cells = row.into_iter();
            for column in columns.iter_mut() {
                column.push(cells.next().flatten().and_then(clean_cell));
            }
        }

        let resolved = ResolvedColumns::resolve(map, &headers)?;
        let df = DataFrame::new(
            headers
                .iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name.as_str().into(), values))
                .collect(),
        )?;

        Ok(Self {
            df,
            columns: resolved,
            header_row: 0,
        })
    }

    /// Record where the header sits when the sheet does not start at row 1.
    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// 1-based worksheet row of body row `row`.
    pub fn sheet_row(&self, row: usize) -> usize {
        self.header_row + row + 2
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn columns(&self) -> &ResolvedColumns {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

/// Blank text counts as missing, like an empty cell.
fn clean_cell(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Header naming as pandas does it: blanks become `Unnamed: {i}`,
/// repeats get `.1`, `.2`, ... suffixes.
pub fn normalize_headers(raw: Vec<Option<String>>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, cell) in raw.into_iter().enumerate() {
        let base = match cell.and_then(clean_cell) {
            Some(text) => text,
            None => format!("Unnamed: {}", i),
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }

    names
}

fn cell_text(cell: &calamine::Data) -> Option<String> {
    match cell {
        calamine::Data::Empty => None,
        calamine::Data::String(s) => clean_cell(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Loads PCA workbooks. Excel/ODS go through calamine, CSV through Polars.
pub struct DataLoader;

impl DataLoader {
    pub fn load(path: &Path, map: &ColumnMap) -> Result<Dataset, LoaderError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let dataset = match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::load_workbook(path, map)?,
            "csv" => Self::load_csv(path, map)?,
            _ => return Err(LoaderError::UnsupportedExtension(extension)),
        };

        info!(
            "Loaded dataset {} ({} rows, {} columns)",
            path.display(),
            dataset.height(),
            dataset.dataframe().width()
        );
        Ok(dataset)
    }

    /// First worksheet; its first row is the header.
    fn load_workbook(path: &Path, map: &ColumnMap) -> Result<Dataset, LoaderError> {
        use calamine::Reader;

        let mut workbook = calamine::open_workbook_auto(path)?;
        let sheet = workbook
            .sheet_names()
            .into_iter()
            .next()
            .ok_or(LoaderError::EmptyWorkbook)?;
        let range = workbook.worksheet_range(&sheet)?;
        debug!("Reading worksheet \"{}\" ({:?})", sheet, range.get_size());

        // Columns left of the used range still count toward positions.
        let (header_row, lead) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));
        let mut rows = range.rows().map(|row| {
            std::iter::repeat(None)
                .take(lead)
                .chain(row.iter().map(cell_text))
                .collect::<Vec<_>>()
        });

        let header = rows.next().ok_or(LoaderError::EmptyWorkbook)?;
        Ok(Dataset::from_rows(header, rows.collect(), map)?.with_header_row(header_row))
    }

    fn load_csv(path: &Path, map: &ColumnMap) -> Result<Dataset, LoaderError> {
        // Read headerless and untyped, then apply the same header rules as workbooks
        let df = LazyCsvReader::new(path)
            .with_has_header(false)
            .with_infer_schema_length(Some(0))
            .with_truncate_ragged_lines(true)
            .finish()?
            .collect()?;

        let columns = df
            .get_columns()
            .iter()
            .map(|c| c.as_materialized_series().str().cloned())
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = (0..df.height()).map(|i| {
            columns
                .iter()
                .map(|ca| ca.get(i).map(str::to_string))
                .collect::<Vec<_>>()
        });

        let header = rows.next().ok_or(LoaderError::EmptyWorkbook)?;
        Dataset::from_rows(header, rows.collect(), map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn cells(values: &[&str]) -> Vec<Option<String>> {
        values
            .iter()
            .map(|v| (!v.is_empty()).then(|| v.to_string()))
            .collect()
    }

    #[test]
    fn headers_follow_pandas_rules() {
        let names = normalize_headers(cells(&["Site", "", "Cost", "Cost", " ", "Cost"]));
        assert_eq!(
            names,
            ["Site", "Unnamed: 1", "Cost", "Cost.1", "Unnamed: 4", "Cost.2"]
        );
    }

    #[test]
    fn resolves_positions_and_names() {
        let mut map = ColumnMap::default();
        map.cost = ColumnRef::Name("Spend".into());
        let header = cells(&["", "", "Placement", "", "Spend", "PI", "AI", "PC", "AC", "CTR"]);
        let rows = vec![cells(&["", "", "Homepage", "", "100", "1000"])];

        let dataset = Dataset::from_rows(header, rows, &map).unwrap();
        assert_eq!(dataset.columns().cost, "Spend");
        assert_eq!(dataset.columns().section_marker, "Unnamed: 0");
        assert_eq!(dataset.columns().ctr, "CTR");
        assert_eq!(dataset.height(), 1);
    }

    #[test]
    fn reports_every_missing_column() {
        let mut map = ColumnMap::default();
        map.placement = ColumnRef::Name("Placement Name".into());
        let header = cells(&["a", "b", "c", "d", "e", "f", "g"]);

        let err = Dataset::from_rows(header, Vec::new(), &map).unwrap_err();
        match err {
            LoaderError::MissingColumns { missing, available } => {
                let roles: Vec<&str> = missing.iter().map(|m| m.role).collect();
                assert_eq!(roles, ["placement", "planned_cpm", "actual_cpm", "ctr"]);
                assert_eq!(available.len(), 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn short_rows_are_padded_and_blanks_are_null() {
        let header = cells(&["m", "", "p", "", "cost", "pi", "ai", "pc", "ac", "ctr"]);
        let rows = vec![vec![None, None, Some("  ".to_string())]];
        let dataset = Dataset::from_rows(header, rows, &ColumnMap::default()).unwrap();

        let df = dataset.dataframe();
        assert_eq!(df.width(), 10);
        assert_eq!(df.column("p").unwrap().null_count(), 1);
        assert_eq!(df.column("ctr").unwrap().null_count(), 1);
    }

    #[test]
    fn loads_csv_with_header_row() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, ",,Placement,,Cost,Planned Imp,Actual Imp,Planned CPM,Actual CPM,CTR").unwrap();
        writeln!(file, "Total,,,,,,,,,").unwrap();
        writeln!(file, ",,Homepage,,100,1000,1100,10,,0.08").unwrap();

        let dataset = DataLoader::load(file.path(), &ColumnMap::default()).unwrap();
        assert_eq!(dataset.height(), 2);
        assert_eq!(dataset.columns().placement, "Placement");
        assert_eq!(dataset.columns().section_marker, "Unnamed: 0");
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = DataLoader::load(Path::new("report.txt"), &ColumnMap::default()).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedExtension(ext) if ext == "txt"));
    }
}
