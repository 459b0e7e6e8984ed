use thiserror::Error;

/// Errors that can occur while building dashboard views
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Indicator column not found: {name} (expected {name}_ant and {name}_atu)")]
    IndicatorNotFound { name: String },

    #[error("No data rows match the current filter")]
    NoData,

    #[error("Table error: {0}")]
    Table(#[from] escolar_table::TableError),

    #[error("Compare error: {0}")]
    Compare(#[from] escolar_compare::CompareError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
