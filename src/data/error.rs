use std::path::PathBuf;

use thiserror::Error;

use super::coerce::CoerceError;

// ---------------------------------------------------------------------------
// Data-layer error taxonomy
// ---------------------------------------------------------------------------

/// Everything that can go wrong between a workbook on disk and a figure.
#[derive(Debug, Error)]
pub enum DataError {
    /// A required label row is absent from column 1.
    #[error("section '{0}' not found in column 1")]
    MissingSection(&'static str),

    /// A cell (or CSV field) holds something other than the expected number(s).
    #[error("{location}: {source}")]
    MalformedCell {
        location: String,
        #[source]
        source: CoerceError,
    },

    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// Chamber CSV ended before both label rows were seen.
    #[error("{}: no '{missing}' row", path.display())]
    IncompleteCurve { path: PathBuf, missing: &'static str },

    #[error("{}: {x_len} frequencies but {y_len} values", path.display())]
    CurveLengthMismatch {
        path: PathBuf,
        x_len: usize,
        y_len: usize,
    },

    #[error("raw data section lists more than {capacity} files (row {row})")]
    CapacityExceeded { capacity: usize, row: usize },

    /// A chart needs a plot column the "Plot" header does not declare.
    #[error("{chart} chart needs plot column {index}, sheet declares {available}")]
    MissingPlotConfig {
        chart: &'static str,
        index: usize,
        available: usize,
    },

    #[error("{}: {reason}", path.display())]
    Touchstone { path: PathBuf, reason: String },

    #[error("workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DataError {
    /// Wrap a coercion failure at a 1-based sheet position.
    pub fn cell(row: usize, col: usize, source: CoerceError) -> Self {
        DataError::MalformedCell {
            location: format!("row {row}, column {col}"),
            source,
        }
    }
}

pub type DataResult<T> = Result<T, DataError>;
