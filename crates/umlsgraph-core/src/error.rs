use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No source file for table {table}: {}", .path.display())]
    MissingSource { table: &'static str, path: PathBuf },

    #[error("{file}:{line}: record does not end with a field terminator")]
    MissingTerminator { file: &'static str, line: u64 },

    #[error("{file}:{line}: expected {expected} fields, found {found}")]
    FieldCount {
        file: &'static str,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Staging database not found: {}", .path.display())]
    StoreNotFound { path: PathBuf },

    #[error("Extraction scope has no vocabularies")]
    EmptyScope,

    #[error("ICD-O-3 augmentation skipped: base extraction {missing} did not complete")]
    AugmentationSkipped { missing: &'static str },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Scope error: {0}")]
    Scope(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
