use eframe::egui::{RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::state::AppState;

/// How many rows the preview shows. Conversion always covers the full
/// dataset; this only bounds rendering.
const PREVIEW_ROWS: usize = 100;

// ---------------------------------------------------------------------------
// Preview table (central panel)
// ---------------------------------------------------------------------------

/// Render the transformed dataset as a striped table.
pub fn preview_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.transformed else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to preview it  (File → Open…)");
        });
        return;
    };

    if dataset.column_count() == 0 {
        ui.label(format!(
            "No columns selected ({} rows retained).",
            dataset.row_count()
        ));
        return;
    }

    if dataset.row_count() > PREVIEW_ROWS {
        ui.label(
            RichText::new(format!(
                "Showing first {PREVIEW_ROWS} of {} rows",
                dataset.row_count()
            ))
            .weak(),
        );
    }

    let n_rows = dataset.row_count().min(PREVIEW_ROWS);

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(TableColumn::auto().at_least(60.0), dataset.column_count())
        .header(20.0, |mut header| {
            for name in dataset.column_names() {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, n_rows, |mut row| {
                let row_idx = row.index();
                for col in dataset.columns() {
                    row.col(|ui: &mut Ui| {
                        ui.label(col.values[row_idx].to_string());
                    });
                }
            });
        });
}
