use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use bytes::Bytes;
use calamine::{Data, Reader as WorkbookReader, Xlsx};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::ConvertError;
use super::format::Format;
use super::model::{CellValue, Column, ColumnType, Dataset};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a dataset from a file. The format is derived from the extension.
pub fn load_file(path: &Path) -> Result<Dataset, ConvertError> {
    let format = Format::from_path(path)?;
    let bytes = std::fs::read(path).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_bytes(&bytes, format)
}

/// Decode a byte buffer as the given format. Any row or cell failure aborts
/// the whole decode; no partial dataset is produced.
pub fn read_bytes(bytes: &[u8], format: Format) -> Result<Dataset, ConvertError> {
    let decoded = match format {
        Format::Csv => read_csv(bytes),
        Format::Xlsx => read_xlsx(bytes),
        Format::Json => read_json(bytes),
        Format::Parquet => read_parquet(bytes),
    };
    decoded.map_err(|source| ConvertError::decode(format, source))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// First record is the header; records must be rectangular (the csv crate
/// rejects unequal lengths). Cell types are guessed per cell and reconciled
/// per column afterwards.
fn read_csv(bytes: &[u8]) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV header")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        for (col_idx, field) in record.iter().enumerate() {
            raw[col_idx].push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| infer_column(name, cells))
        .collect();
    Dataset::from_columns(columns)
}

/// Guess every cell, then reconcile: if the guesses disagree beyond the
/// int/float unification (e.g. "1" next to "abc"), keep the column as text.
fn infer_column(name: String, raw: Vec<String>) -> Column {
    let guessed: Vec<CellValue> = raw.iter().map(|s| guess_cell(s)).collect();
    let column = Column::new(name, guessed);
    if column.column_type() != ColumnType::Mixed {
        return column;
    }
    let values = raw
        .into_iter()
        .map(|s| {
            if s.trim().is_empty() {
                CellValue::Null
            } else {
                CellValue::Text(s)
            }
        })
        .collect();
    Column::new(column.name, values)
}

fn guess_cell(s: &str) -> CellValue {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return CellValue::Float(f);
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

/// Read the first worksheet. The first row is the header; empty header
/// cells are named `column_{index}`.
fn read_xlsx(bytes: &[u8]) -> Result<Dataset> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> = Xlsx::new(cursor).context("opening xlsx workbook")?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.context("reading first worksheet")?,
        None => bail!("workbook contains no sheets"),
    };

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Dataset::from_columns(Vec::new());
    };

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("column_{i}"),
            other => other.to_string(),
        })
        .collect();

    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col_idx, values) in columns.iter_mut().enumerate() {
            let cell = row.get(col_idx).unwrap_or(&Data::Empty);
            values.push(xlsx_cell(cell));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Dataset::from_columns(columns)
}

fn xlsx_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Float(*f),
        Data::Int(i) => CellValue::Int(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        // Dates keep their Excel serial number; ISO strings stay text.
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records orientation: the root must be an array of objects
/// (`[{"a": 1, "b": "x"}, ...]`). Column order is first-seen key order;
/// records missing a key get `Null`, and columns discovered late are
/// back-filled with `Null`.
fn read_json(bytes: &[u8]) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
    let records = root
        .as_array()
        .context("expected a top-level JSON array of records")?;

    let mut names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<CellValue>> = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let obj = record
            .as_object()
            .with_context(|| format!("row {i} is not a JSON object"))?;

        for key in obj.keys() {
            if !names.iter().any(|n| n == key) {
                names.push(key.clone());
                columns.push(vec![CellValue::Null; i]);
            }
        }

        for (col_idx, name) in names.iter().enumerate() {
            let cell = match obj.get(name) {
                Some(value) => {
                    json_cell(value).with_context(|| format!("row {i}, column '{name}'"))?
                }
                None => CellValue::Null,
            };
            columns[col_idx].push(cell);
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Dataset::from_columns(columns)
}

fn json_cell(value: &JsonValue) -> Result<CellValue> {
    Ok(match value {
        JsonValue::Null => CellValue::Null,
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                bail!("number {n} does not fit a 64-bit value")
            }
        }
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => {
            bail!("nested arrays and objects are not supported")
        }
    })
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Read all record batches and concatenate them. Scalar column types only;
/// anything else (lists, structs, ...) is a decode error.
fn read_parquet(bytes: &[u8]) -> Result<Dataset> {
    let data = Bytes::copy_from_slice(bytes);
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(data).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let names: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, values) in columns.iter_mut().enumerate() {
            append_arrow_column(values, batch.column(col_idx))
                .with_context(|| format!("column '{}'", names[col_idx]))?;
        }
    }

    let columns = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Dataset::from_columns(columns)
}

/// Append one Arrow array's cells, mapping column nulls to `Null`.
fn append_arrow_column(values: &mut Vec<CellValue>, array: &Arc<dyn Array>) -> Result<()> {
    match array.data_type() {
        DataType::Utf8 => {
            let arr = array
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::Text(arr.value(i).to_string())
                });
            }
        }
        DataType::LargeUtf8 => {
            let arr = array.as_string::<i64>();
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::Text(arr.value(i).to_string())
                });
            }
        }
        DataType::Int32 => {
            let arr = array
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::Int(arr.value(i) as i64)
                });
            }
        }
        DataType::Int64 => {
            let arr = array
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::Int(arr.value(i))
                });
            }
        }
        DataType::Float32 => {
            let arr = array
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::Float(arr.value(i) as f64)
                });
            }
        }
        DataType::Float64 => {
            let arr = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::Float(arr.value(i))
                });
            }
        }
        DataType::Boolean => {
            let arr = array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            for i in 0..arr.len() {
                values.push(if arr.is_null(i) {
                    CellValue::Null
                } else {
                    CellValue::Bool(arr.value(i))
                });
            }
        }
        DataType::Null => {
            for _ in 0..array.len() {
                values.push(CellValue::Null);
            }
        }
        other => bail!("unsupported parquet column type {other:?}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_type_inference() {
        let csv = "id,score,flag,label\n1,0.5,true,alpha\n2,1.5,false,beta\n3,,TRUE,\n";
        let ds = read_bytes(csv.as_bytes(), Format::Csv).unwrap();

        assert_eq!(ds.row_count(), 3);
        let names: Vec<&str> = ds.column_names().collect();
        assert_eq!(names, vec!["id", "score", "flag", "label"]);

        assert_eq!(ds.columns()[0].column_type(), ColumnType::Int);
        assert_eq!(ds.columns()[1].column_type(), ColumnType::Float);
        assert_eq!(ds.columns()[2].column_type(), ColumnType::Bool);
        assert_eq!(ds.columns()[3].column_type(), ColumnType::Text);

        assert_eq!(ds.columns()[1].values[2], CellValue::Null);
        assert_eq!(ds.columns()[3].values[2], CellValue::Null);
    }

    #[test]
    fn csv_mixed_column_falls_back_to_text() {
        let csv = "a\n1\nabc\n";
        let ds = read_bytes(csv.as_bytes(), Format::Csv).unwrap();
        assert_eq!(ds.columns()[0].column_type(), ColumnType::Text);
        assert_eq!(ds.columns()[0].values[0], CellValue::Text("1".into()));
    }

    #[test]
    fn malformed_csv_is_decode_error() {
        let csv = "a,b\n1,2\n3\n";
        let err = read_bytes(csv.as_bytes(), Format::Csv).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { format: Format::Csv, .. }));
    }

    #[test]
    fn json_records_with_missing_keys() {
        let json = r#"[{"a": 1, "b": "x"}, {"b": "y", "c": 2.5}]"#;
        let ds = read_bytes(json.as_bytes(), Format::Json).unwrap();

        let names: Vec<&str> = ds.column_names().collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(ds.row_count(), 2);

        // "a" missing from row 1, "c" back-filled for row 0.
        assert_eq!(ds.columns()[0].values[1], CellValue::Null);
        assert_eq!(ds.columns()[2].values[0], CellValue::Null);
        assert_eq!(ds.columns()[2].values[1], CellValue::Float(2.5));
    }

    #[test]
    fn json_root_must_be_an_array() {
        let err = read_bytes(br#"{"a": 1}"#, Format::Json).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { format: Format::Json, .. }));
    }

    #[test]
    fn json_nested_value_is_decode_error() {
        let err = read_bytes(br#"[{"a": [1, 2]}]"#, Format::Json).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { format: Format::Json, .. }));
    }

    #[test]
    fn corrupt_parquet_is_decode_error() {
        let err = read_bytes(b"not a parquet file", Format::Parquet).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { format: Format::Parquet, .. }));
    }

    #[test]
    fn corrupt_xlsx_is_decode_error() {
        let err = read_bytes(b"not a zip archive", Format::Xlsx).unwrap_err();
        assert!(matches!(err, ConvertError::Decode { format: Format::Xlsx, .. }));
    }

    #[test]
    fn load_file_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat(ref ext) if ext == "txt"));
    }

    #[test]
    fn load_file_reads_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, "a,b\n1,2\n3,4\n").unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column_count(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/nonexistent/data.csv")).unwrap_err();
        assert!(matches!(err, ConvertError::Io { .. }));
    }
}
