use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::chart::figure::Figure;
use crate::data::layout::ScanOptions;
use crate::data::model::SheetLayout;
use crate::data::workbook::{process_workbook, SheetOutcome, SheetResult};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Workbook currently shown (None until one is loaded).
    pub workbook: Option<PathBuf>,

    /// One entry per known sheet found in the workbook.
    pub outcomes: Vec<SheetOutcome>,

    /// Index into [`AppState::figures`] of the figure on screen.
    pub selected: usize,

    pub scan_options: ScanOptions,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            workbook: None,
            outcomes: Vec::new(),
            selected: 0,
            scan_options: ScanOptions::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Read a workbook and replace the current figures.
    ///
    /// A workbook that cannot be opened keeps the previous figures and sets
    /// the status message; per-sheet problems are listed in the side panel.
    pub fn load_workbook(&mut self, path: &Path) {
        match process_workbook(path, &self.scan_options) {
            Ok(outcomes) => {
                log::info!(
                    "Loaded {} with {} figure(s)",
                    path.display(),
                    outcomes.iter().map(|o| o.figures().len()).sum::<usize>()
                );
                self.status_message = if outcomes.is_empty() {
                    Some("No S11, S21 or Efficiency sheet".to_string())
                } else {
                    None
                };
                self.outcomes = outcomes;
                self.selected = 0;
                self.workbook = Some(path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load workbook: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Re-read the current workbook from disk.
    pub fn reload(&mut self) {
        if let Some(path) = self.workbook.clone() {
            let selected = self.selected;
            self.load_workbook(&path);
            self.selected = selected.min(self.figures().count().saturating_sub(1));
        }
    }

    /// All rendered figures in sheet order.
    pub fn figures(&self) -> impl Iterator<Item = &Figure> {
        self.outcomes.iter().flat_map(SheetOutcome::figures)
    }

    pub fn selected_figure(&self) -> Option<&Figure> {
        self.figures().nth(self.selected)
    }

    /// Scanned layouts keyed by sheet name, as pretty JSON.
    pub fn layouts_json(&self) -> Result<String> {
        let layouts: std::collections::BTreeMap<&str, &SheetLayout> = self
            .outcomes
            .iter()
            .filter_map(|o| match &o.result {
                SheetResult::Rendered { layout, .. } => Some((o.kind.sheet_name(), layout)),
                _ => None,
            })
            .collect();
        serde_json::to_string_pretty(&layouts).context("serializing layouts")
    }

    pub fn export_layouts(&self, path: &Path) -> Result<()> {
        let json = self.layouts_json()?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::render::ChartKind;
    use crate::data::model::{BandMark, DataFileRef, PlotSetting};

    fn rendered(kind: ChartKind, names: &[&str]) -> SheetOutcome {
        SheetOutcome {
            kind,
            result: SheetResult::Rendered {
                layout: SheetLayout {
                    files: vec![DataFileRef {
                        path: PathBuf::from("d").join("f"),
                        label: "L".into(),
                    }],
                    settings: vec![vec![PlotSetting::default()]],
                    bandmark: BandMark(vec![1.0, 2.0]),
                },
                figures: names
                    .iter()
                    .map(|n| Figure {
                        sheet: kind.sheet_name().into(),
                        name: n.to_string(),
                        subplots: Vec::new(),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn figures_flatten_in_sheet_order() {
        let mut state = AppState::default();
        state.outcomes = vec![
            rendered(ChartKind::S11, &["S11", "VSWR"]),
            SheetOutcome {
                kind: ChartKind::S21,
                result: SheetResult::Skipped("no raw data file".into()),
            },
            rendered(ChartKind::Efficiency, &["Efficiency"]),
        ];
        let names: Vec<&str> = state.figures().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["S11", "VSWR", "Efficiency"]);

        state.selected = 2;
        assert_eq!(state.selected_figure().map(|f| f.name.as_str()), Some("Efficiency"));
        state.selected = 3;
        assert!(state.selected_figure().is_none());
    }

    #[test]
    fn layouts_export_as_json() {
        let mut state = AppState::default();
        state.outcomes = vec![rendered(ChartKind::S11, &["S11"])];
        let json: serde_json::Value = serde_json::from_str(&state.layouts_json().unwrap()).unwrap();
        assert_eq!(json["S11"]["files"][0]["label"], "L");
        assert_eq!(json["S11"]["bandmark"], serde_json::json!([1.0, 2.0]));

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("layout.json");
        state.export_layouts(&out).unwrap();
        assert!(std::fs::read_to_string(out).unwrap().contains("\"S11\""));
    }

    #[test]
    fn failed_load_keeps_previous_figures() {
        let mut state = AppState::default();
        state.outcomes = vec![rendered(ChartKind::S11, &["S11"])];
        state.load_workbook(Path::new("/nonexistent/antenna.xlsx"));
        assert_eq!(state.figures().count(), 1);
        assert!(state.status_message.as_deref().unwrap().contains("file not found"));
    }
}
