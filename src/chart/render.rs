use std::path::{Path, PathBuf};

use crate::data::chamber::read_chamber_csv;
use crate::data::error::{DataError, DataResult};
use crate::data::model::{DataFileRef, PlotSetting, SheetLayout};
use crate::data::touchstone::Network;

use super::figure::{Curve, Figure, LegendCorner, Subplot};

// ---------------------------------------------------------------------------
// Chart kinds, one per known sheet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Return loss and VSWR from 1-port files.
    S11,
    /// Insertion loss from 2-port files.
    S21,
    /// Radiated efficiency from chamber CSV exports.
    Efficiency,
}

impl ChartKind {
    /// Processing order.
    pub const ALL: [ChartKind; 3] = [ChartKind::S11, ChartKind::S21, ChartKind::Efficiency];

    pub fn sheet_name(self) -> &'static str {
        match self {
            ChartKind::S11 => "S11",
            ChartKind::S21 => "S21",
            ChartKind::Efficiency => "Efficiency",
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Load every data file of a sheet and build its figures.
///
/// Relative data-file paths are resolved against `base_dir` (the workbook's
/// directory).
pub fn render_sheet(
    kind: ChartKind,
    layout: &SheetLayout,
    base_dir: &Path,
) -> DataResult<Vec<Figure>> {
    let sheet = kind.sheet_name();
    if layout.bandmark.is_empty() {
        log::warn!("{sheet}: missing bandmark settings");
    }
    let bands = layout.bandmark.intervals();
    let figure = |name: &str, settings: &[PlotSetting], curves: Vec<Curve>, legend| Figure {
        sheet: sheet.to_string(),
        name: name.to_string(),
        subplots: build_subplots(settings, &curves, &bands, legend),
    };

    match kind {
        ChartKind::S11 => {
            let s11_settings = plot_settings(layout, "S11", 0)?;
            let vswr_settings = plot_settings(layout, "VSWR", 1)?;

            let mut s11 = Vec::new();
            let mut vswr = Vec::new();
            for file in &layout.files {
                let net = Network::from_touchstone(&resolve(base_dir, file))?;
                let freq = net.frequency_mhz();
                s11.push(Curve::new(&file.label, &freq, &net.s_db(0, 0)));
                vswr.push(Curve::new(&file.label, &freq, &net.vswr(0)));
            }

            Ok(vec![
                figure("S11", s11_settings, s11, LegendCorner::LowerLeft),
                figure("VSWR", vswr_settings, vswr, LegendCorner::UpperLeft),
            ])
        }
        ChartKind::S21 => {
            let settings = plot_settings(layout, "S21", 0)?;

            let mut curves = Vec::new();
            for file in &layout.files {
                let path = resolve(base_dir, file);
                let net = Network::from_touchstone(&path)?;
                if net.nports < 2 {
                    return Err(DataError::Touchstone {
                        path,
                        reason: format!("S21 needs a 2-port file, found {}-port", net.nports),
                    });
                }
                curves.push(Curve::new(&file.label, &net.frequency_mhz(), &net.s_db(1, 0)));
            }

            Ok(vec![figure("S21", settings, curves, LegendCorner::LowerLeft)])
        }
        ChartKind::Efficiency => {
            let settings = plot_settings(layout, "Efficiency", 0)?;

            let mut curves = Vec::new();
            for file in &layout.files {
                let curve = read_chamber_csv(&resolve(base_dir, file))?;
                curves.push(Curve::new(&file.label, &curve.freq_mhz, &curve.efficiency_db));
            }

            Ok(vec![figure("Efficiency", settings, curves, LegendCorner::UpperRight)])
        }
    }
}

fn plot_settings<'a>(
    layout: &'a SheetLayout,
    chart: &'static str,
    index: usize,
) -> DataResult<&'a [PlotSetting]> {
    layout
        .settings
        .get(index)
        .map(Vec::as_slice)
        .ok_or(DataError::MissingPlotConfig {
            chart,
            index: index + 1,
            available: layout.num_plot(),
        })
}

fn resolve(base_dir: &Path, file: &DataFileRef) -> PathBuf {
    if file.path.is_absolute() {
        file.path.clone()
    } else {
        base_dir.join(&file.path)
    }
}

/// Every curve goes on every subplot; the settings only change the framing.
fn build_subplots(
    settings: &[PlotSetting],
    curves: &[Curve],
    bands: &[(f64, f64)],
    legend: LegendCorner,
) -> Vec<Subplot> {
    settings
        .iter()
        .map(|setting| Subplot {
            title: setting.text("title").unwrap_or_default(),
            x_label: setting.text("x-label").unwrap_or_default(),
            y_label: setting.text("y-label").unwrap_or_default(),
            x_limit: setting.range("x-limit"),
            y_limit: setting.range("y-limit"),
            grid: true,
            legend,
            curves: curves.to_vec(),
            bands: bands.to_vec(),
        })
        .collect()
}
