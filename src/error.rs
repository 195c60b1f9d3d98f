/// Error types for the dashboard pipeline
use thiserror::Error;

/// Main error type for loading and charting incident data
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Reading the dataset failed
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse CSV data
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// Failed to parse JSON data
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// JSON input had the wrong shape
    #[error("Invalid JSON dataset: {0}")]
    JsonShape(String),

    /// A record's date could not be parsed for display
    #[error("Failed to parse date: {value}")]
    InvalidDate { value: String },
}
