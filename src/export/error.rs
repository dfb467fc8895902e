//! Export error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during export and import
#[derive(Debug, Error)]
pub enum ExportError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Reading or writing an export file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record version is not supported by this version
    #[error("Unsupported record version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Exported data failed validation
    #[error("Export validation failed: {0}")]
    ValidationFailed(String),
}
