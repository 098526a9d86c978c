use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::format::Format;
use crate::data::{reader, writer};
use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(src), Some(out)) = (&state.source, &state.transformed) {
            ui.label(format!(
                "{}: {} rows × {} columns  →  {} rows × {} columns",
                src.name,
                src.dataset.row_count(),
                src.dataset.column_count(),
                out.row_count(),
                out.column_count()
            ));
        }

        match &state.status {
            Some(Status::Error(msg)) => {
                ui.separator();
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Status::Info(msg)) => {
                ui.separator();
                ui.label(msg);
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – conversion controls
// ---------------------------------------------------------------------------

/// Render the conversion panel: transform toggles, the column keep-list,
/// the target format, and the save trigger.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Convert");
    ui.separator();

    // Clone the column list so we can mutate state inside the loop.
    let columns: Vec<String> = match &state.source {
        Some(src) => src.dataset.column_names().map(str::to_string).collect(),
        None => {
            ui.label("No file loaded.");
            return;
        }
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Transforms");
            let mut changed = false;
            changed |= ui
                .checkbox(&mut state.options.drop_duplicates, "Remove duplicates")
                .changed();
            changed |= ui
                .checkbox(&mut state.options.fill_missing, "Fill missing values")
                .changed();
            if changed {
                state.recompute();
            }
            ui.checkbox(&mut state.show_chart, "Show chart");
            ui.separator();

            ui.strong(format!(
                "Columns  ({}/{})",
                state.selected_column_count(),
                columns.len()
            ));
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_columns();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_columns();
                }
            });
            for col in &columns {
                let mut checked = state.is_column_selected(col);
                if ui.checkbox(&mut checked, col).changed() {
                    state.toggle_column(col);
                }
            }
            ui.separator();

            ui.strong("Output format");
            for format in Format::ALL {
                ui.radio_value(&mut state.target, format, format.label());
            }
            ui.add_space(4.0);

            if ui.button("Save as…").clicked() {
                save_file_dialog(state);
            }
        });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tabular data")
        .add_filter("Supported files", &["csv", "xlsx", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match reader::load_file(&path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows × {} columns from {}",
                    dataset.row_count(),
                    dataset.column_count(),
                    path.display()
                );
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("dataset")
                    .to_string();
                state.set_dataset(name, dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                state.status = Some(Status::Error(format!("Error: {e}")));
            }
        }
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let download = match (&state.source, &state.transformed) {
        (Some(source), Some(dataset)) => {
            writer::prepare_download(dataset, state.target, &source.name)
        }
        _ => return,
    };

    let download = match download {
        Ok(download) => download,
        Err(e) => {
            log::error!("Failed to encode dataset: {e}");
            state.status = Some(Status::Error(format!("Error: {e}")));
            return;
        }
    };

    let picked = rfd::FileDialog::new()
        .set_title("Save converted file")
        .set_file_name(&download.filename)
        .save_file();

    if let Some(path) = picked {
        match std::fs::write(&path, &download.bytes) {
            Ok(()) => {
                log::info!(
                    "Saved {} bytes ({}) to {}",
                    download.bytes.len(),
                    download.mime,
                    path.display()
                );
                state.status = Some(Status::Info(format!("Saved {}", path.display())));
            }
            Err(e) => {
                log::error!("Failed to save {}: {e}", path.display());
                state.status = Some(Status::Error(format!(
                    "Error: failed to save {}: {e}",
                    path.display()
                )));
            }
        }
    }
}
