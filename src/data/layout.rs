use std::ops::Range;
use std::path::PathBuf;

use super::cell::{CellValue, Sheet};
use super::coerce::{bracket_to_array, cell_to_f64, CoerceError};
use super::error::{DataError, DataResult};
use super::model::{
    AxisRange, BandMark, DataFileRef, PlotSetting, PlotSettingMatrix, SettingValue, SheetLayout,
};

// ---------------------------------------------------------------------------
// Section labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    Contains,
}

/// A labelled block, found by scanning column 1 top to bottom.
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub label: &'static str,
    pub mode: MatchMode,
}

impl Section {
    const fn exact(label: &'static str) -> Self {
        Section {
            label,
            mode: MatchMode::Exact,
        }
    }

    /// Only text cells can carry a label.
    pub fn matches(&self, cell: &CellValue) -> bool {
        let Some(text) = cell.as_text() else {
            return false;
        };
        match self.mode {
            MatchMode::Exact => text == self.label,
            MatchMode::Contains => text.contains(self.label),
        }
    }

    /// First matching row, 1-based.
    pub fn find_row(&self, sheet: &Sheet) -> Option<usize> {
        (1..=sheet.max_row()).find(|&row| self.matches(sheet.cell(row, 1)))
    }

    pub fn require_row(&self, sheet: &Sheet) -> DataResult<usize> {
        self.find_row(sheet)
            .ok_or(DataError::MissingSection(self.label))
    }
}

pub const RAW_DATA: Section = Section::exact("Raw data");
pub const PLOT: Section = Section::exact("Plot");
pub const LAYOUT: Section = Section::exact("Layout");
pub const SUBPLOT: Section = Section {
    label: "Subplot",
    mode: MatchMode::Contains,
};
pub const BANDMARK: Section = Section::exact("Bandmark");

const SECTIONS: [Section; 5] = [RAW_DATA, PLOT, LAYOUT, SUBPLOT, BANDMARK];

// Column layout inside the sections.
const LABEL_COL: usize = 2;
const DIR_COL: usize = 3;
const FILE_COL: usize = 4;
/// Plot headers start in column 2 when it is filled, otherwise in column 3.
const PLOT_COLS: [usize; 2] = [2, 3];
const SUBPLOT_COUNT_COL: usize = 2;
const BAND_NAME_COL: usize = 2;
const FIRST_BAND_EDGE_COL: usize = 2;

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// Knobs for [`scan_layout`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Rows below "Raw data" that may list a measurement file.
    pub max_data_files: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions { max_data_files: 8 }
    }
}

/// Outcome of scanning one sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutScan {
    /// No "Raw data" label in column 1.
    MissingRawData,
    /// "Raw data" present but no row has both a directory and a filename.
    NoFiles,
    Ready(SheetLayout),
}

/// Walk a sheet's labelled sections and extract the plot configuration.
pub fn scan_layout(sheet: &Sheet, options: &ScanOptions) -> DataResult<LayoutScan> {
    let Some(raw_row) = RAW_DATA.find_row(sheet) else {
        return Ok(LayoutScan::MissingRawData);
    };

    let files = read_data_files(sheet, raw_row, options.max_data_files)?;
    if files.is_empty() {
        return Ok(LayoutScan::NoFiles);
    }
    log::info!("{}: {} raw data files to plot", sheet.name, files.len());

    let plot_cols = plot_columns(sheet, PLOT.require_row(sheet)?);
    let num_subplot = read_subplot_count(sheet, LAYOUT.require_row(sheet)?)?;
    log::debug!(
        "{}: {} plot column(s) from column {}, {num_subplot} subplot(s)",
        sheet.name,
        plot_cols.len(),
        plot_cols.start
    );

    let settings = read_plot_settings(sheet, plot_cols, num_subplot)?;
    let bandmark = read_bandmark(sheet)?;

    Ok(LayoutScan::Ready(SheetLayout {
        files,
        settings,
        bandmark,
    }))
}

fn read_data_files(
    sheet: &Sheet,
    raw_row: usize,
    capacity: usize,
) -> DataResult<Vec<DataFileRef>> {
    let has_file = |row: usize| {
        !sheet.cell(row, DIR_COL).is_empty() && !sheet.cell(row, FILE_COL).is_empty()
    };

    // The block runs until the next labelled section, so a short list never
    // swallows the "Plot" header row.
    let block: Vec<usize> = (raw_row + 1..=sheet.max_row())
        .take_while(|&row| !is_section_label(sheet.cell(row, 1)))
        .collect();

    let files = block
        .iter()
        .take(capacity)
        .filter(|&&row| has_file(row))
        .map(|&row| DataFileRef {
            path: PathBuf::from(sheet.cell(row, DIR_COL).to_string())
                .join(sheet.cell(row, FILE_COL).to_string()),
            label: sheet.cell(row, LABEL_COL).to_string(),
        })
        .collect();

    if let Some(&row) = block.iter().skip(capacity).find(|&&row| has_file(row)) {
        return Err(DataError::CapacityExceeded { capacity, row });
    }

    Ok(files)
}

fn is_section_label(cell: &CellValue) -> bool {
    SECTIONS.iter().any(|section| section.matches(cell))
}

/// Columns of the consecutive non-empty "Plot" header cells. Each plot reads
/// its settings from the column of its own header.
fn plot_columns(sheet: &Sheet, plot_row: usize) -> Range<usize> {
    let start = PLOT_COLS
        .into_iter()
        .find(|&col| !sheet.cell(plot_row, col).is_empty())
        .unwrap_or(PLOT_COLS[1]);
    let count = (start..)
        .take_while(|&col| !sheet.cell(plot_row, col).is_empty())
        .count();
    start..start + count
}

fn read_subplot_count(sheet: &Sheet, layout_row: usize) -> DataResult<usize> {
    let cell = sheet.cell(layout_row, SUBPLOT_COUNT_COL);
    let value =
        cell_to_f64(cell).map_err(|e| DataError::cell(layout_row, SUBPLOT_COUNT_COL, e))?;
    if value < 1.0 || value.fract() != 0.0 {
        return Err(DataError::cell(
            layout_row,
            SUBPLOT_COUNT_COL,
            CoerceError::NotANumber(format!("{cell} (subplot count must be a positive integer)")),
        ));
    }
    // Every subplot needs its own label row, so the sheet height bounds the count.
    if value > sheet.max_row() as f64 {
        return Err(DataError::cell(
            layout_row,
            SUBPLOT_COUNT_COL,
            CoerceError::NotANumber(format!(
                "{cell} (more subplots than the sheet's {} rows)",
                sheet.max_row()
            )),
        ));
    }
    Ok(value as usize)
}

fn read_plot_settings(
    sheet: &Sheet,
    plot_cols: Range<usize>,
    num_subplot: usize,
) -> DataResult<PlotSettingMatrix> {
    let mut settings: PlotSettingMatrix =
        vec![vec![PlotSetting::default(); num_subplot]; plot_cols.len()];

    let mut subplot = 0;
    for row in SUBPLOT.require_row(sheet)?..=sheet.max_row() {
        if subplot > num_subplot {
            break;
        }
        let first = sheet.cell(row, 1);
        if first.is_empty() {
            break;
        }
        if SUBPLOT.matches(first) {
            subplot += 1;
            continue;
        }
        // `subplot` is at least 1 here: the scan starts on a "Subplot" row.
        let key = first.to_string();
        for (col, column) in plot_cols.clone().zip(settings.iter_mut()) {
            let cell = sheet.cell(row, col);
            let value = if key.contains("limit") {
                SettingValue::Range(parse_limit(cell).map_err(|e| DataError::cell(row, col, e))?)
            } else {
                SettingValue::Cell(cell.clone())
            };
            column[subplot - 1].insert(&key, value);
        }
    }

    Ok(settings)
}

fn parse_limit(cell: &CellValue) -> Result<AxisRange, CoerceError> {
    let text = match cell {
        CellValue::Text(s) => s,
        CellValue::Empty => return Err(CoerceError::Empty),
        CellValue::Number(v) => {
            return Err(CoerceError::NotANumber(format!("{v} (expected [lo,hi])")))
        }
    };
    let values = bracket_to_array(text)?;
    AxisRange::from_slice(&values)
        .ok_or_else(|| CoerceError::NotANumber(format!("{text} (expected exactly two values)")))
}

fn read_bandmark(sheet: &Sheet) -> DataResult<BandMark> {
    let Some(band_row) = BANDMARK.find_row(sheet) else {
        log::warn!("{}: no Bandmark section", sheet.name);
        return Ok(BandMark::default());
    };
    let band_name = sheet.cell(band_row, BAND_NAME_COL);
    if band_name.is_empty() {
        log::warn!("{}: Bandmark row names no band", sheet.name);
        return Ok(BandMark::default());
    }

    let found = (band_row..=sheet.max_row())
        .take_while(|&row| !sheet.cell(row, 1).is_empty())
        .find(|&row| sheet.cell(row, 1) == band_name);
    let Some(row) = found else {
        log::warn!("{}: band '{band_name}' has no row", sheet.name);
        return Ok(BandMark::default());
    };

    let edges = (FIRST_BAND_EDGE_COL..)
        .map(|col| (col, sheet.cell(row, col)))
        .take_while(|(_, cell)| !cell.is_empty())
        .map(|(col, cell)| cell_to_f64(cell).map_err(|e| DataError::cell(row, col, e)))
        .collect::<DataResult<Vec<f64>>>()?;

    Ok(BandMark(edges))
}
