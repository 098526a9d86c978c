use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{Format as XlsxCellFormat, Workbook as XlsxWorkbook};
use serde_json::Value as JsonValue;

use super::error::ConvertError;
use super::format::{Format, output_filename};
use super::model::{CellValue, Column, ColumnType, Dataset};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// An encoded dataset ready to be saved: bytes, MIME type, and the output
/// filename (original stem + target extension).
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Encode the full dataset (never just a preview) as the target format.
pub fn write_bytes(dataset: &Dataset, format: Format) -> Result<Vec<u8>, ConvertError> {
    let encoded = match format {
        Format::Csv => write_csv(dataset),
        Format::Xlsx => write_xlsx(dataset),
        Format::Json => write_json(dataset),
        Format::Parquet => write_parquet(dataset),
    };
    encoded.map_err(|source| ConvertError::encode(format, source))
}

/// Encode and bundle with the download metadata.
pub fn prepare_download(
    dataset: &Dataset,
    target: Format,
    original_name: &str,
) -> Result<Download, ConvertError> {
    let bytes = write_bytes(dataset, target)?;
    Ok(Download {
        filename: output_filename(original_name, target),
        mime: target.mime_type(),
        bytes,
    })
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn write_csv(dataset: &Dataset) -> Result<Vec<u8>> {
    // A zero-column dataset has nothing to encode, and the csv crate
    // rejects empty records.
    if dataset.column_count() == 0 {
        return Ok(Vec::new());
    }

    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer
            .write_record(dataset.column_names())
            .context("writing CSV header")?;

        for row in 0..dataset.row_count() {
            let record: Vec<String> = dataset
                .columns()
                .iter()
                .map(|col| col.values[row].to_string())
                .collect();
            writer
                .write_record(&record)
                .with_context(|| format!("writing CSV row {row}"))?;
        }
        writer.flush().context("flushing CSV writer")?;
    }
    Ok(buffer)
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

fn write_xlsx(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = XlsxCellFormat::new().set_bold();

    for (col_idx, col) in dataset.columns().iter().enumerate() {
        let col_num = u16::try_from(col_idx).context("too many columns for an xlsx sheet")?;
        worksheet
            .write_string_with_format(0, col_num, &col.name, &header_format)
            .context("writing xlsx header")?;

        for (row_idx, value) in col.values.iter().enumerate() {
            let row_num = u32::try_from(row_idx + 1)
                .context("too many rows for an xlsx sheet")?;
            match value {
                CellValue::Int(i) => {
                    worksheet.write_number(row_num, col_num, *i as f64)
                }
                CellValue::Float(v) => worksheet.write_number(row_num, col_num, *v),
                CellValue::Bool(b) => worksheet.write_boolean(row_num, col_num, *b),
                CellValue::Text(s) => worksheet.write_string(row_num, col_num, s),
                CellValue::Null => continue,
            }
            .with_context(|| format!("writing xlsx cell ({row_num}, {col_num})"))?;
        }
    }

    workbook.save_to_buffer().context("serializing xlsx workbook")
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records orientation: a compact array of row objects, keys in column
/// order. Missing cells and non-finite floats encode as JSON null.
fn write_json(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut records = Vec::with_capacity(dataset.row_count());
    for row in 0..dataset.row_count() {
        let mut obj = serde_json::Map::new();
        for col in dataset.columns() {
            obj.insert(col.name.clone(), json_value(&col.values[row]));
        }
        records.push(JsonValue::Object(obj));
    }
    serde_json::to_vec(&records).context("serializing JSON records")
}

fn json_value(value: &CellValue) -> JsonValue {
    match value {
        CellValue::Int(i) => JsonValue::from(*i),
        CellValue::Float(v) => serde_json::Number::from_f64(*v)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        CellValue::Bool(b) => JsonValue::Bool(*b),
        CellValue::Text(s) => JsonValue::String(s.clone()),
        CellValue::Null => JsonValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// One record batch through an [`ArrowWriter`]. Parquet is
/// column-homogeneous, so a `Mixed` column (and a zero-column schema) is
/// not representable.
fn write_parquet(dataset: &Dataset) -> Result<Vec<u8>> {
    if dataset.column_count() == 0 {
        bail!("parquet cannot encode a dataset with no columns");
    }

    let mut fields = Vec::with_capacity(dataset.column_count());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(dataset.column_count());
    for col in dataset.columns() {
        let (data_type, array) = column_to_arrow(col)?;
        fields.push(Field::new(&col.name, data_type, true));
        arrays.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch =
        RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let mut buffer = Vec::new();
    let mut writer =
        ArrowWriter::try_new(&mut buffer, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet row group")?;
    writer.close().context("finalizing parquet footer")?;
    Ok(buffer)
}

fn column_to_arrow(col: &Column) -> Result<(DataType, ArrayRef)> {
    match col.column_type() {
        ColumnType::Int => {
            let values: Vec<Option<i64>> = col
                .values
                .iter()
                .map(|v| match v {
                    CellValue::Int(i) => Some(*i),
                    _ => None,
                })
                .collect();
            Ok((DataType::Int64, Arc::new(Int64Array::from(values))))
        }
        ColumnType::Float => {
            // Int cells may coexist in a Float column; widen them.
            let values: Vec<Option<f64>> = col.values.iter().map(CellValue::as_f64).collect();
            Ok((DataType::Float64, Arc::new(Float64Array::from(values))))
        }
        ColumnType::Bool => {
            let values: Vec<Option<bool>> = col
                .values
                .iter()
                .map(|v| match v {
                    CellValue::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Ok((DataType::Boolean, Arc::new(BooleanArray::from(values))))
        }
        ColumnType::Text => {
            let values: Vec<Option<&str>> = col
                .values
                .iter()
                .map(|v| match v {
                    CellValue::Text(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            Ok((DataType::Utf8, Arc::new(StringArray::from(values))))
        }
        ColumnType::Null => {
            let values = vec![None::<f64>; col.len()];
            Ok((DataType::Float64, Arc::new(Float64Array::from(values))))
        }
        ColumnType::Mixed => bail!(
            "column '{}' mixes text and numeric values, which parquet cannot represent",
            col.name
        ),
    }
}
