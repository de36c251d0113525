use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::SheetLayout;
use crate::data::workbook::SheetResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – per-sheet summary
// ---------------------------------------------------------------------------

/// Render the left panel: what each sheet produced, or why it did not.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Sheets");
    ui.separator();

    let Some(path) = &state.workbook else {
        ui.label("No workbook loaded.");
        return;
    };
    ui.label(
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    );
    ui.add_space(4.0);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for outcome in &state.outcomes {
                let name = outcome.kind.sheet_name();
                let (status, color) = match &outcome.result {
                    SheetResult::Rendered { figures, .. } => {
                        (format!("{} figure(s)", figures.len()), Color32::GREEN)
                    }
                    SheetResult::Skipped(_) => ("skipped".to_string(), Color32::YELLOW),
                    SheetResult::Failed(_) => ("failed".to_string(), Color32::RED),
                };

                egui::CollapsingHeader::new(RichText::new(format!("{name}  ({status})")).strong())
                    .id_salt(name)
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| match &outcome.result {
                        SheetResult::Rendered { layout, .. } => layout_summary(ui, name, layout),
                        SheetResult::Skipped(msg) | SheetResult::Failed(msg) => {
                            ui.label(RichText::new(msg).color(color));
                        }
                    });
            }
        });
}

fn layout_summary(ui: &mut Ui, sheet: &str, layout: &SheetLayout) {
    ui.label(format!(
        "{} plot(s) × {} subplot(s)",
        layout.num_plot(),
        layout.num_subplot()
    ));

    let bands = layout.bandmark.intervals();
    if bands.is_empty() {
        ui.label(RichText::new("No bandmark").italics());
    } else {
        let text: Vec<String> = bands
            .iter()
            .map(|(lo, hi)| format!("{lo}–{hi}"))
            .collect();
        ui.label(format!("Bands (MHz): {}", text.join(", ")));
    }

    ui.push_id(sheet, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder())
            .header(18.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong("Label");
                });
                header.col(|ui: &mut Ui| {
                    ui.strong("File");
                });
            })
            .body(|mut body| {
                for file in &layout.files {
                    body.row(18.0, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(&file.label);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(file.path.display().to_string());
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / figure selector.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.workbook.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                state.reload();
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.outcomes.is_empty(), egui::Button::new("Export layout…"))
                .clicked()
            {
                export_layout_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let names: Vec<String> = state.figures().map(|f| f.name.clone()).collect();
        for (i, name) in names.iter().enumerate() {
            ui.selectable_value(&mut state.selected, i, name);
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open plot workbook")
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .pick_file();

    if let Some(path) = file {
        state.load_workbook(&path);
    }
}

fn export_layout_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export scanned layout")
        .add_filter("JSON", &["json"])
        .set_file_name("layout.json")
        .save_file();

    if let Some(path) = file {
        match state.export_layouts(&path) {
            Ok(()) => log::info!("Exported layout to {}", path.display()),
            Err(e) => {
                log::error!("Failed to export layout: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
