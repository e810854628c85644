//! Errors raised around the inspector core (file output, trace decoding).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InspectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A report file could not be created.
    #[error("cannot create '{}': {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The trace length is not a whole number of records.
    #[error("trace of {len} bytes is not a multiple of the record size")]
    TruncatedTrace { len: usize },

    #[error("unknown record tag {tag} at offset {offset:#x}")]
    BadRecordTag { offset: usize, tag: u8 },

    #[error("unknown base register role {role} at offset {offset:#x}")]
    BadBaseRole { offset: usize, role: u8 },

    /// A line in a statistics report is not a `key value` pair.
    #[error("malformed stats line: '{line}'")]
    MalformedStats { line: String },

    #[error("stats file has no '{key}' entry")]
    MissingStat { key: String },
}

pub type InspectorResult<T> = Result<T, InspectorError>;
