use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use super::model::{CellValue, Column, Dataset};

// ---------------------------------------------------------------------------
// Transform options
// ---------------------------------------------------------------------------

/// User-toggled transforms. Each one is optional and independent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Remove rows that exactly duplicate an earlier row.
    pub drop_duplicates: bool,

    /// Replace missing values in numeric columns with the column mean.
    pub fill_missing: bool,

    /// `None` keeps every column; `Some(set)` projects onto the selection.
    pub keep_columns: Option<BTreeSet<String>>,
}

/// Run the enabled transforms in their canonical order:
/// deduplicate, then fill, then project.
///
/// The order is fixed here rather than by widget declaration order, so the
/// fill mean is always computed over the deduplicated rows when both are
/// enabled.
pub fn apply(dataset: &Dataset, options: &TransformOptions) -> Dataset {
    let mut result = dataset.clone();
    if options.drop_duplicates {
        result = drop_duplicates(&result);
    }
    if options.fill_missing {
        result = fill_missing(&result);
    }
    if let Some(keep) = &options.keep_columns {
        result = project(&result, keep);
    }
    result
}

// ---------------------------------------------------------------------------
// Deduplication
// ---------------------------------------------------------------------------

/// Remove rows that are exact duplicates of an earlier row, keeping the
/// first occurrence and the relative order of survivors. Idempotent.
pub fn drop_duplicates(dataset: &Dataset) -> Dataset {
    let mut seen: HashSet<Vec<CellValue>> = HashSet::new();
    let mut keep_rows: Vec<usize> = Vec::new();
    for idx in 0..dataset.row_count() {
        if seen.insert(dataset.row(idx)) {
            keep_rows.push(idx);
        }
    }
    take_rows(dataset, &keep_rows)
}

fn take_rows(dataset: &Dataset, indices: &[usize]) -> Dataset {
    let columns: Vec<Column> = dataset
        .columns()
        .iter()
        .map(|col| {
            Column::new(
                col.name.clone(),
                indices.iter().map(|&i| col.values[i].clone()).collect(),
            )
        })
        .collect();
    Dataset::from_uniform_columns(columns, indices.len())
}

// ---------------------------------------------------------------------------
// Missing-value fill
// ---------------------------------------------------------------------------

/// Replace `Null` cells in numeric columns with the column mean computed
/// over the non-null values present right now. Non-numeric columns (and
/// all-null columns, which have no mean) are left untouched.
pub fn fill_missing(dataset: &Dataset) -> Dataset {
    let columns: Vec<Column> = dataset
        .columns()
        .iter()
        .map(|col| {
            if !col.is_numeric() || !col.has_nulls() {
                return col.clone();
            }
            let Some(mean) = col.mean() else {
                return col.clone();
            };
            let values = col
                .values
                .iter()
                .map(|v| {
                    if v.is_null() {
                        CellValue::Float(mean)
                    } else {
                        v.clone()
                    }
                })
                .collect();
            Column::new(col.name.clone(), values)
        })
        .collect();
    Dataset::from_uniform_columns(columns, dataset.row_count())
}

// ---------------------------------------------------------------------------
// Column projection
// ---------------------------------------------------------------------------

/// Keep the dataset's columns that appear in the selection, in the
/// dataset's existing order. An empty selection yields a zero-column
/// dataset that retains the row count.
pub fn project(dataset: &Dataset, keep: &BTreeSet<String>) -> Dataset {
    let columns: Vec<Column> = dataset
        .columns()
        .iter()
        .filter(|col| keep.contains(&col.name))
        .cloned()
        .collect();
    Dataset::from_uniform_columns(columns, dataset.row_count())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(cols: Vec<(&str, Vec<CellValue>)>) -> Dataset {
        let columns = cols
            .into_iter()
            .map(|(name, values)| Column::new(name, values))
            .collect();
        Dataset::from_columns(columns).unwrap()
    }

    fn ints(values: &[i64]) -> Vec<CellValue> {
        values.iter().map(|&v| CellValue::Int(v)).collect()
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let ds = dataset(vec![
            ("a", ints(&[1, 2, 1, 3, 2])),
            ("b", ints(&[9, 8, 9, 7, 8])),
        ]);
        let out = drop_duplicates(&ds);

        assert_eq!(out.row_count(), 3);
        assert_eq!(out.columns()[0].values, ints(&[1, 2, 3]));
        assert_eq!(out.columns()[1].values, ints(&[9, 8, 7]));

        // Every surviving row appears in the input.
        for i in 0..out.row_count() {
            let row = out.row(i);
            assert!((0..ds.row_count()).any(|j| ds.row(j) == row));
        }
    }

    #[test]
    fn dedup_distinguishes_rows_differing_in_one_cell() {
        let ds = dataset(vec![("a", ints(&[1, 1])), ("b", ints(&[2, 3]))]);
        assert_eq!(drop_duplicates(&ds).row_count(), 2);
    }

    #[test]
    fn dedup_is_idempotent() {
        let ds = dataset(vec![("a", ints(&[1, 1, 2]))]);
        let once = drop_duplicates(&ds);
        let twice = drop_duplicates(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn fill_uses_mean_of_present_values() {
        // The worked example: a,b over rows (1,), (2,4), (1,) – the only
        // present value in b is 4, so every gap becomes 4.
        let ds = dataset(vec![
            ("a", ints(&[1, 2, 1])),
            (
                "b",
                vec![CellValue::Null, CellValue::Int(4), CellValue::Null],
            ),
        ]);
        let out = fill_missing(&ds);

        assert_eq!(out.columns()[0].values, ints(&[1, 2, 1]));
        assert_eq!(
            out.columns()[1].values,
            vec![
                CellValue::Float(4.0),
                CellValue::Int(4),
                CellValue::Float(4.0)
            ]
        );
        assert!(!out.columns()[1].has_nulls());
    }

    #[test]
    fn fill_leaves_non_numeric_columns_untouched() {
        let ds = dataset(vec![
            (
                "label",
                vec![CellValue::Text("x".into()), CellValue::Null],
            ),
            ("n", vec![CellValue::Null, CellValue::Null]),
        ]);
        let out = fill_missing(&ds);

        // Text column keeps its gap, and an all-null column has no mean to
        // fill from.
        assert_eq!(out.columns()[0].values[1], CellValue::Null);
        assert_eq!(out.columns()[1].values, vec![CellValue::Null, CellValue::Null]);
    }

    #[test]
    fn fill_is_idempotent_without_intervening_change() {
        let ds = dataset(vec![(
            "v",
            vec![CellValue::Int(2), CellValue::Null, CellValue::Int(4)],
        )]);
        let once = fill_missing(&ds);
        let twice = fill_missing(&once);
        assert_eq!(once, twice);
        assert_eq!(once.columns()[0].values[1], CellValue::Float(3.0));
    }

    #[test]
    fn projection_respects_dataset_order_and_intersection() {
        let ds = dataset(vec![
            ("a", ints(&[1])),
            ("b", ints(&[2])),
            ("c", ints(&[3])),
        ]);
        let keep: BTreeSet<String> =
            ["c", "a", "zzz"].iter().map(|s| s.to_string()).collect();
        let out = project(&ds, &keep);

        let names: Vec<&str> = out.column_names().collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn empty_projection_keeps_row_count() {
        let ds = dataset(vec![("a", ints(&[1, 2, 3]))]);
        let out = project(&ds, &BTreeSet::new());

        assert_eq!(out.column_count(), 0);
        assert_eq!(out.row_count(), 3);
    }

    #[test]
    fn apply_runs_dedup_before_fill() {
        // Row (1, 10) is duplicated. With the duplicate present the mean of
        // v would be 8; deduplicated it is 7. The canonical order must
        // produce 7.
        let ds = dataset(vec![
            ("k", ints(&[1, 1, 2, 3])),
            (
                "v",
                vec![
                    CellValue::Int(10),
                    CellValue::Int(10),
                    CellValue::Int(4),
                    CellValue::Null,
                ],
            ),
        ]);
        let options = TransformOptions {
            drop_duplicates: true,
            fill_missing: true,
            keep_columns: None,
        };
        let out = apply(&ds, &options);

        assert_eq!(out.row_count(), 3);
        assert_eq!(out.columns()[1].values[2], CellValue::Float(7.0));
    }

    #[test]
    fn apply_with_defaults_is_identity() {
        let ds = dataset(vec![("a", ints(&[1, 1, 2]))]);
        let out = apply(&ds, &TransformOptions::default());
        assert_eq!(out, ds);
    }
}
