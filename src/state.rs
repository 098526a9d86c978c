use std::collections::BTreeSet;

use crate::data::format::Format;
use crate::data::model::Dataset;
use crate::data::transform::{self, TransformOptions};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// A file the user opened: display name plus the decoded dataset.
pub struct SourceFile {
    pub name: String,
    pub dataset: Dataset,
}

/// A status line shown in the top bar.
pub enum Status {
    Info(String),
    Error(String),
}

/// The full session state, independent of rendering.
///
/// Each widget change re-runs the transform pipeline synchronously over the
/// source dataset and caches the result in `transformed`; the source
/// dataset itself is never mutated.
pub struct AppState {
    /// Loaded file (None until the user opens one).
    pub source: Option<SourceFile>,

    /// Transform toggles and the column selection.
    pub options: TransformOptions,

    /// Whether the read-only chart panel is shown. Not a transform: it has
    /// no effect on the dataset.
    pub show_chart: bool,

    /// Target format for the next save.
    pub target: Format,

    /// Result of applying `options` to the source dataset (cached).
    pub transformed: Option<Dataset>,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            source: None,
            options: TransformOptions::default(),
            show_chart: false,
            target: Format::Csv,
            transformed: None,
            status: None,
        }
    }
}

impl AppState {
    /// Ingest a newly decoded dataset: reset the options, select every
    /// column, and prime the transformed cache.
    pub fn set_dataset(&mut self, name: String, dataset: Dataset) {
        let all_columns: BTreeSet<String> =
            dataset.column_names().map(str::to_string).collect();
        self.options = TransformOptions {
            keep_columns: Some(all_columns),
            ..TransformOptions::default()
        };
        self.show_chart = false;
        self.source = Some(SourceFile { name, dataset });
        self.status = None;
        self.recompute();
    }

    /// Re-run the pipeline after any option change.
    pub fn recompute(&mut self) {
        self.transformed = self
            .source
            .as_ref()
            .map(|src| transform::apply(&src.dataset, &self.options));
    }

    pub fn is_column_selected(&self, column: &str) -> bool {
        self.options
            .keep_columns
            .as_ref()
            .is_some_and(|keep| keep.contains(column))
    }

    pub fn selected_column_count(&self) -> usize {
        self.options.keep_columns.as_ref().map_or(0, BTreeSet::len)
    }

    /// Toggle one column in the projection.
    pub fn toggle_column(&mut self, column: &str) {
        if let Some(keep) = &mut self.options.keep_columns {
            if !keep.remove(column) {
                keep.insert(column.to_string());
            }
            self.recompute();
        }
    }

    /// Select every column of the source dataset.
    pub fn select_all_columns(&mut self) {
        if let Some(src) = &self.source {
            self.options.keep_columns =
                Some(src.dataset.column_names().map(str::to_string).collect());
            self.recompute();
        }
    }

    /// Deselect every column (the result keeps its row count).
    pub fn select_no_columns(&mut self) {
        self.options.keep_columns = Some(BTreeSet::new());
        self.recompute();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column};

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            Column::new("a", vec![CellValue::Int(1), CellValue::Int(1)]),
            Column::new("b", vec![CellValue::Int(2), CellValue::Int(2)]),
        ])
        .unwrap()
    }

    #[test]
    fn set_dataset_selects_all_columns_and_primes_cache() {
        let mut state = AppState::default();
        state.set_dataset("data.csv".into(), dataset());

        assert_eq!(state.selected_column_count(), 2);
        assert!(state.is_column_selected("a"));
        let transformed = state.transformed.as_ref().unwrap();
        assert_eq!(transformed.column_count(), 2);
        assert_eq!(transformed.row_count(), 2);
    }

    #[test]
    fn toggling_a_column_recomputes_projection() {
        let mut state = AppState::default();
        state.set_dataset("data.csv".into(), dataset());

        state.toggle_column("b");
        assert!(!state.is_column_selected("b"));
        let transformed = state.transformed.as_ref().unwrap();
        assert_eq!(transformed.column_count(), 1);
        assert_eq!(transformed.row_count(), 2);

        state.toggle_column("b");
        assert_eq!(state.transformed.as_ref().unwrap().column_count(), 2);
    }

    #[test]
    fn option_changes_flow_through_recompute() {
        let mut state = AppState::default();
        state.set_dataset("data.csv".into(), dataset());

        state.options.drop_duplicates = true;
        state.recompute();
        assert_eq!(state.transformed.as_ref().unwrap().row_count(), 1);
    }
}
