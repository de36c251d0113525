use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Reader};

use crate::chart::figure::Figure;
use crate::chart::render::{render_sheet, ChartKind};

use super::cell::Sheet;
use super::error::DataError;
use super::layout::{scan_layout, LayoutScan, ScanOptions};
use super::model::SheetLayout;

// ---------------------------------------------------------------------------
// Per-sheet outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum SheetResult {
    Rendered {
        layout: SheetLayout,
        figures: Vec<Figure>,
    },
    /// Nothing to plot; the message says why.
    Skipped(String),
    /// The sheet's directives or data were bad; the error chain as text.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SheetOutcome {
    pub kind: ChartKind,
    pub result: SheetResult,
}

impl SheetOutcome {
    pub fn figures(&self) -> &[Figure] {
        match &self.result {
            SheetResult::Rendered { figures, .. } => figures,
            _ => &[],
        }
    }
}

// ---------------------------------------------------------------------------
// Workbook driver
// ---------------------------------------------------------------------------

/// Load every known sheet ("S11", "S21", "Efficiency") from a workbook.
///
/// A sheet that fails is reported in its outcome and does not stop the
/// others. Only a workbook that cannot be opened at all is an error.
pub fn process_workbook(path: &Path, options: &ScanOptions) -> Result<Vec<SheetOutcome>> {
    if !path.is_file() {
        return Err(DataError::MissingFile(path.to_path_buf()).into());
    }
    let mut workbook = open_workbook_auto(path)
        .map_err(DataError::from)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let sheet_names = workbook.sheet_names().to_vec();

    let mut outcomes = Vec::new();
    for kind in ChartKind::ALL {
        let name = kind.sheet_name();
        if !sheet_names.iter().any(|s| s == name) {
            log::debug!("no '{name}' sheet");
            continue;
        }
        let range = workbook
            .worksheet_range(name)
            .map_err(DataError::from)
            .with_context(|| format!("reading sheet '{name}'"))?;
        let sheet = Sheet::from_range(name, &range);

        let result = match process_sheet(kind, &sheet, base_dir, options) {
            Ok(result) => result,
            Err(e) => {
                log::error!("{name}: {e:#}");
                SheetResult::Failed(format!("{e:#}"))
            }
        };
        outcomes.push(SheetOutcome { kind, result });
    }

    Ok(outcomes)
}

fn process_sheet(
    kind: ChartKind,
    sheet: &Sheet,
    base_dir: &Path,
    options: &ScanOptions,
) -> Result<SheetResult> {
    let layout = match scan_layout(sheet, options).context("scanning layout")? {
        LayoutScan::MissingRawData => {
            log::warn!("{}: did not find Raw data in column 1", sheet.name);
            return Ok(SheetResult::Skipped(
                "did not find Raw data in column 1".to_string(),
            ));
        }
        LayoutScan::NoFiles => {
            log::warn!("{}: no raw data file", sheet.name);
            return Ok(SheetResult::Skipped("no raw data file".to_string()));
        }
        LayoutScan::Ready(layout) => layout,
    };

    let figures = render_sheet(kind, &layout, base_dir).context("loading curves")?;
    log::info!("{}: {} figure(s)", sheet.name, figures.len());
    Ok(SheetResult::Rendered { layout, figures })
}
