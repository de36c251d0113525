use eframe::egui::{Stroke, Ui, Vec2b};
use egui_plot::{Corner, Legend, Line, Plot, PlotPoints, Polygon};

use crate::chart::figure::{Figure, LegendCorner, Subplot};
use crate::color::{generate_palette, BAND_FILL};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Figure view (central panel)
// ---------------------------------------------------------------------------

/// Render the selected figure in the central panel.
pub fn figure_view(ui: &mut Ui, state: &AppState) {
    let Some(figure) = state.selected_figure() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a workbook to plot measurements  (File → Open…)");
        });
        return;
    };

    if figure.subplots.is_empty() {
        ui.label(format!("{}: no subplots declared", figure.name));
        return;
    }

    // subplot(1, N, i): one row, N columns.
    ui.columns(figure.subplots.len(), |columns: &mut [Ui]| {
        for (i, (ui, subplot)) in columns.iter_mut().zip(&figure.subplots).enumerate() {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.strong(&subplot.title);
            });
            subplot_plot(ui, figure, i, subplot);
        }
    });
}

fn legend_corner(corner: LegendCorner) -> Corner {
    match corner {
        LegendCorner::LowerLeft => Corner::LeftBottom,
        LegendCorner::UpperLeft => Corner::LeftTop,
        LegendCorner::UpperRight => Corner::RightTop,
    }
}

fn subplot_plot(ui: &mut Ui, figure: &Figure, index: usize, subplot: &Subplot) {
    let x_bounds = subplot.x_bounds();
    let y_bounds = subplot.y_bounds();
    // Limited axes stay where the sheet puts them; free axes auto-scale and pan.
    let free = Vec2b::new(x_bounds.is_none(), y_bounds.is_none());

    let plot = Plot::new((figure.sheet.as_str(), figure.name.as_str(), index))
        .legend(Legend::default().position(legend_corner(subplot.legend)))
        .x_axis_label(subplot.x_label.as_str())
        .y_axis_label(subplot.y_label.as_str())
        .show_grid(subplot.grid)
        .auto_bounds(free)
        .allow_boxed_zoom(x_bounds.is_none() && y_bounds.is_none())
        .allow_drag(free)
        .allow_scroll(free)
        .allow_zoom(free);

    let colors = generate_palette(subplot.curves.len());
    let y_extent = subplot.y_extent();

    plot.show(ui, |plot_ui| {
        if let Some(x) = x_bounds {
            plot_ui.set_plot_bounds_x(x);
        }
        if let Some(y) = y_bounds {
            plot_ui.set_plot_bounds_y(y);
        }

        if let Some((y0, y1)) = y_extent {
            for &(lo, hi) in &subplot.bands {
                let corners: PlotPoints = vec![[lo, y0], [hi, y0], [hi, y1], [lo, y1]].into();
                plot_ui.polygon(
                    Polygon::new(corners)
                        .fill_color(BAND_FILL)
                        .stroke(Stroke::NONE),
                );
            }
        }

        for (curve, color) in subplot.curves.iter().zip(colors) {
            let points: PlotPoints = curve.points.iter().copied().collect();
            plot_ui.line(
                Line::new(points)
                    .name(&curve.label)
                    .color(color)
                    .width(1.5),
            );
        }
    });
}
