//! Error types for wgt-import
//!
//! Only I/O and store failures are errors. Unparseable lines, messages
//! without results and unknown senders are counted in the import summary.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    /// The chat export could not be read
    #[error("Failed to read chat export {path}: {source}")]
    ReadChat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file (SQL script, summary) could not be written
    #[error("Failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The summary could not be serialized
    #[error("Failed to serialize summary: {0}")]
    Summary(#[from] serde_json::Error),

    /// Store or configuration error from wgt-common
    #[error(transparent)]
    Common(#[from] wgt_common::Error),
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;
