//! Error types for gazefuse

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while consolidating capture sessions
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frame directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Metadata document does not exist: {}", .0.display())]
    MissingMetadata(PathBuf),

    #[error("Malformed metadata document {}: {}", .path.display(), .source)]
    MalformedMetadata {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("No feature file found for any frame under {}", .0.display())]
    EmptySession(PathBuf),

    #[error("Feature row for frame {frame} has {found} columns, header has {expected}")]
    SchemaWidthMismatch {
        frame: String,
        expected: usize,
        found: usize,
    },

    #[error("Required column missing from dataset: {0}")]
    MissingColumn(String),

    #[error("Malformed table data: {0}")]
    MalformedTable(String),
}
