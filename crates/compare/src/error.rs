use thiserror::Error;

/// Errors that can occur while comparing snapshots
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Key column not found: {name}")]
    KeyColumnNotFound { name: String },

    #[error("Columns not named; the first row must be a header row")]
    ColumnsNotNamed,

    #[error("Unsupported file format: {0} (expected .xlsx or .csv)")]
    UnsupportedFormat(String),

    #[error("Table error: {0}")]
    Table(#[from] escolar_table::TableError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CompareError>;
