use std::fmt;
use std::path::Path;

use super::error::ConvertError;

// ---------------------------------------------------------------------------
// Format – closed enumeration of supported file encodings
// ---------------------------------------------------------------------------

/// The supported tabular file encodings. Being a closed enum, an
/// unsupported *target* format is unrepresentable; only the open path
/// (arbitrary user files) can produce [`ConvertError::UnsupportedFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Xlsx,
    Json,
    Parquet,
}

impl Format {
    /// All formats, in the order the UI presents them.
    pub const ALL: [Format; 4] = [Format::Csv, Format::Xlsx, Format::Json, Format::Parquet];

    /// Match a file extension (without the dot), case-insensitively.
    /// `pq` is accepted as a Parquet alias.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Format::Csv),
            "xlsx" => Some(Format::Xlsx),
            "json" => Some(Format::Json),
            "parquet" | "pq" => Some(Format::Parquet),
            _ => None,
        }
    }

    /// Derive the format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Format, ConvertError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        Format::from_extension(&ext).ok_or(ConvertError::UnsupportedFormat(ext))
    }

    /// Canonical extension used for output filenames.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Xlsx => "xlsx",
            Format::Json => "json",
            Format::Parquet => "parquet",
        }
    }

    /// MIME type attached to the download.
    pub fn mime_type(self) -> &'static str {
        match self {
            Format::Csv => "text/csv",
            Format::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Format::Json => "application/json",
            Format::Parquet => "application/octet-stream",
        }
    }

    /// Human-readable name for the UI.
    pub fn label(self) -> &'static str {
        match self {
            Format::Csv => "CSV",
            Format::Xlsx => "Excel (xlsx)",
            Format::Json => "JSON",
            Format::Parquet => "Parquet",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Output filename: the original name's stem plus the target extension.
/// A name without a dot keeps the whole name as the stem.
pub fn output_filename(original_name: &str, target: Format) -> String {
    let stem = original_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(original_name);
    format!("{stem}.{}", target.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_dispatch() {
        assert_eq!(Format::from_extension("csv"), Some(Format::Csv));
        assert_eq!(Format::from_extension("XLSX"), Some(Format::Xlsx));
        assert_eq!(Format::from_extension("pq"), Some(Format::Parquet));
        assert_eq!(Format::from_extension("txt"), None);
    }

    #[test]
    fn unsupported_extension_errors() {
        let err = Format::from_path(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat(ref e) if e == "txt"));

        let err = Format::from_path(Path::new("no_extension")).unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat(_)));
    }

    #[test]
    fn mime_types_match_contract() {
        assert_eq!(Format::Csv.mime_type(), "text/csv");
        assert_eq!(
            Format::Xlsx.mime_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(Format::Json.mime_type(), "application/json");
        assert_eq!(Format::Parquet.mime_type(), "application/octet-stream");
    }

    #[test]
    fn output_filename_swaps_extension() {
        assert_eq!(output_filename("data.xlsx", Format::Json), "data.json");
        assert_eq!(output_filename("a.b.csv", Format::Parquet), "a.b.parquet");
        assert_eq!(output_filename("bare", Format::Csv), "bare.csv");
    }
}
