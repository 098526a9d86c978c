use std::path::PathBuf;

use thiserror::Error;

use super::format::Format;

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Errors surfaced by the conversion pipeline. All of them end up as a
/// status message in the UI; none abort the process, and no partial output
/// is produced when one is raised.
///
/// The decode/encode variants carry an [`anyhow::Error`] so the context
/// chain built up inside the codecs reaches the message.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("failed to decode {format} input: {cause:#}")]
    Decode {
        format: Format,
        cause: anyhow::Error,
    },

    #[error("failed to encode {format} output: {cause:#}")]
    Encode {
        format: Format,
        cause: anyhow::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub fn decode(format: Format, cause: anyhow::Error) -> Self {
        ConvertError::Decode { format, cause }
    }

    pub fn encode(format: Format, cause: anyhow::Error) -> Self {
        ConvertError::Encode { format, cause }
    }
}
