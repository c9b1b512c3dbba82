use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error(
        "Missing required column '{column}' in {path:?} (found: {})",
        .available.join(", ")
    )]
    MissingColumn {
        column: String,
        path: PathBuf,
        available: Vec<String>,
    },
    #[error("Skipping line {line} of {path:?}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Failed to write report {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("No dataset CSV files found in {dir:?}")]
    NoCandidates { dir: PathBuf },
    #[error("Unsupported report format for {path:?}; expected .xlsx, .csv or .tsv")]
    UnsupportedOutput { path: PathBuf },
}

impl ReconcileError {
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ReconcileError::Write {
            path: path.into(),
            source,
        }
    }
}
