use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use crate::color::series_palette;
use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Chart preview (bottom panel)
// ---------------------------------------------------------------------------

/// Render a bar chart of up to the first two numeric columns of the
/// transformed dataset. Read-only: never touches the data.
pub fn numeric_bar_chart(ui: &mut Ui, dataset: &Dataset) {
    let series: Vec<_> = dataset.numeric_columns().take(2).collect();
    if series.is_empty() {
        ui.label("No numeric columns to chart.");
        return;
    }

    let colors = series_palette(series.len());
    // Bars for the same row sit side by side inside a 0.8-wide group.
    let width = 0.8 / series.len() as f64;

    Plot::new("preview_chart")
        .legend(Legend::default())
        .x_axis_label("Row")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (series_idx, col) in series.iter().enumerate() {
                let offset = (series_idx as f64 + 0.5) * width - 0.4;
                let bars: Vec<Bar> = col
                    .values
                    .iter()
                    .enumerate()
                    .filter_map(|(row, value)| {
                        value
                            .as_f64()
                            .map(|y| Bar::new(row as f64 + offset, y).width(width))
                    })
                    .collect();

                let chart = BarChart::new(bars)
                    .name(&col.name)
                    .color(colors[series_idx]);
                plot_ui.bar_chart(chart);
            }
        });
}
