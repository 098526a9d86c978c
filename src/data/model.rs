use std::fmt;

use anyhow::{Result, bail};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common dataframe dtypes.
/// Rows are hashed as `Vec<CellValue>` during deduplication so `CellValue`
/// must be `Eq + Hash`: floats compare by total order and hash by bit
/// pattern, which keeps the two consistent.
#[derive(Debug, Clone)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Missing-value marker.
    Null,
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        use CellValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a.total_cmp(b).is_eq(),
            (Bool(a), Bool(b)) => a == b,
            (Text(a), Text(b)) => a == b,
            (Null, Null) => true,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Int(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Text(s) => s.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    /// `Null` renders as the empty string – what both the preview table and
    /// the CSV encoder want for a missing cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for means and charting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Column – one named column with its logical type
// ---------------------------------------------------------------------------

/// Logical type of a column, derived from its non-null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Float,
    Bool,
    Text,
    /// Every cell is null.
    Null,
    /// Cells of incompatible types (e.g. text mixed with numbers).
    Mixed,
}

/// A named column. `Int` and `Float` cells may coexist (the column is then
/// `Float`, as after mean-filling an integer column); any other mixture
/// makes the column `Mixed`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Derive the logical type from the non-null cells.
    pub fn column_type(&self) -> ColumnType {
        let mut ty: Option<ColumnType> = None;
        for value in &self.values {
            let cell_ty = match value {
                CellValue::Int(_) => ColumnType::Int,
                CellValue::Float(_) => ColumnType::Float,
                CellValue::Bool(_) => ColumnType::Bool,
                CellValue::Text(_) => ColumnType::Text,
                CellValue::Null => continue,
            };
            ty = Some(match ty {
                None => cell_ty,
                Some(t) if t == cell_ty => t,
                Some(ColumnType::Int) if cell_ty == ColumnType::Float => ColumnType::Float,
                Some(ColumnType::Float) if cell_ty == ColumnType::Int => ColumnType::Float,
                Some(_) => return ColumnType::Mixed,
            });
        }
        ty.unwrap_or(ColumnType::Null)
    }

    /// Whether the column holds numbers (and at least one non-null one).
    pub fn is_numeric(&self) -> bool {
        matches!(self.column_type(), ColumnType::Int | ColumnType::Float)
    }

    /// Mean over the non-null numeric cells; `None` when there are none.
    pub fn mean(&self) -> Option<f64> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for value in &self.values {
            if let Some(v) = value.as_f64() {
                sum += v;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// Whether any cell is the missing-value marker.
    pub fn has_nulls(&self) -> bool {
        self.values.iter().any(CellValue::is_null)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete in-memory table
// ---------------------------------------------------------------------------

/// An ordered sequence of named columns with an aligned row count.
///
/// The row count is stored explicitly so a zero-column dataset (the result
/// of projecting onto an empty selection) still knows how many rows it has.
/// Invariant: every column's length equals `row_count`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset from columns, rejecting ragged input.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map_or(0, Column::len);
        for col in &columns {
            if col.len() != row_count {
                bail!(
                    "column '{}' has {} rows but '{}' has {}",
                    col.name,
                    col.len(),
                    columns[0].name,
                    row_count
                );
            }
        }
        Ok(Dataset { columns, row_count })
    }

    /// A dataset with no columns that still reports `row_count` rows.
    pub fn empty_with_rows(row_count: usize) -> Self {
        Dataset {
            columns: Vec::new(),
            row_count,
        }
    }

    /// Constructor for in-crate callers that uphold the length invariant
    /// themselves (the transforms rebuild columns row-aligned).
    pub(crate) fn from_uniform_columns(columns: Vec<Column>, row_count: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.len() == row_count));
        Dataset { columns, row_count }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Owned copy of one row, used as the deduplication key.
    pub fn row(&self, idx: usize) -> Vec<CellValue> {
        self.columns
            .iter()
            .map(|c| c.values[idx].clone())
            .collect()
    }

    /// Columns holding numbers, in dataset order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<CellValue> {
        values.iter().map(|&v| CellValue::Int(v)).collect()
    }

    #[test]
    fn ragged_columns_rejected() {
        let cols = vec![
            Column::new("a", ints(&[1, 2, 3])),
            Column::new("b", ints(&[1, 2])),
        ];
        assert!(Dataset::from_columns(cols).is_err());
    }

    #[test]
    fn empty_dataset_has_zero_rows() {
        let ds = Dataset::from_columns(Vec::new()).unwrap();
        assert_eq!(ds.row_count(), 0);
        assert_eq!(ds.column_count(), 0);
    }

    #[test]
    fn column_type_inference() {
        let int_col = Column::new("i", ints(&[1, 2]));
        assert_eq!(int_col.column_type(), ColumnType::Int);

        let mixed_numeric = Column::new(
            "f",
            vec![CellValue::Int(1), CellValue::Float(2.5), CellValue::Null],
        );
        assert_eq!(mixed_numeric.column_type(), ColumnType::Float);
        assert!(mixed_numeric.is_numeric());

        let mixed = Column::new("m", vec![CellValue::Int(1), CellValue::Text("x".into())]);
        assert_eq!(mixed.column_type(), ColumnType::Mixed);
        assert!(!mixed.is_numeric());

        let all_null = Column::new("n", vec![CellValue::Null, CellValue::Null]);
        assert_eq!(all_null.column_type(), ColumnType::Null);
        assert!(!all_null.is_numeric());
    }

    #[test]
    fn mean_skips_nulls() {
        let col = Column::new(
            "b",
            vec![CellValue::Null, CellValue::Int(4), CellValue::Null],
        );
        assert_eq!(col.mean(), Some(4.0));

        let empty = Column::new("n", vec![CellValue::Null]);
        assert_eq!(empty.mean(), None);
    }

    #[test]
    fn float_cells_are_hash_consistent() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(CellValue::Float(1.5));
        assert!(set.contains(&CellValue::Float(1.5)));
        assert!(!set.contains(&CellValue::Float(2.5)));

        // NaN equals itself under total ordering, so duplicate NaN rows
        // still collapse during deduplication.
        set.insert(CellValue::Float(f64::NAN));
        assert!(set.contains(&CellValue::Float(f64::NAN)));
    }

    #[test]
    fn null_displays_as_empty() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Float(4.0).to_string(), "4");
        assert_eq!(CellValue::Text("hi".into()).to_string(), "hi");
    }
}
