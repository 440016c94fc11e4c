//! Error types for ShelfKV
//!
//! Provides a unified error type for all operations.
//!
//! Persistence failures carry the stage they happened in, so a caller can
//! tell "nothing was written" (`TempOpen`, `TempWrite`, `TempSync`) apart from
//! "the temp file is complete but could not replace the target" (`Rename`).

use std::path::PathBuf;

use thiserror::Error;

use crate::record::RecordId;

/// Result type alias using ShelfError
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Unified error type for ShelfKV operations
#[derive(Debug, Error)]
pub enum ShelfError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Persistence Errors (one per stage of an atomic save / load)
    // -------------------------------------------------------------------------
    #[error("failed to open temp file {path}: {source}")]
    TempOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write temp file {path}: {source}")]
    TempWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to sync temp file {path}: {source}")]
    TempSync {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to rename {from} over {to} (temp file kept): {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("record {0} not found")]
    NotFound(RecordId),

    #[error("out of memory growing store to {requested} slots")]
    OutOfMemory { requested: usize },

    #[error("no ids left after {0}")]
    IdSpaceExhausted(RecordId),

    #[error("line {line_no} out of range (document has {len} lines)")]
    LineOutOfRange { line_no: usize, len: usize },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("invalid field: {0}")]
    InvalidField(String),

    #[error("record {0} still has open borrows")]
    HasOpenRelations(RecordId),

    #[error("no copies of book {0} available")]
    Unavailable(RecordId),

    #[error("no open borrow of book {object} by borrower {subject}")]
    NoOpenRelation { subject: RecordId, object: RecordId },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShelfError {
    /// True for failures with no safe continuation (allocation exhaustion).
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShelfError::OutOfMemory { .. })
    }

    /// True when a save failed before anything replaced the target file.
    pub fn target_untouched(&self) -> bool {
        matches!(
            self,
            ShelfError::TempOpen { .. }
                | ShelfError::TempWrite { .. }
                | ShelfError::TempSync { .. }
                | ShelfError::Rename { .. }
        )
    }
}
