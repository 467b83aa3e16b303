use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Row {row}: cannot parse date '{value}' (expected day-first, e.g. 05/03/2024)")]
    UnparseableDate { row: usize, value: String },
    #[error("Row {row}: cannot parse calories '{value}'")]
    InvalidCalories { row: usize, value: String },
    #[error("Duplicate date in input: {0}")]
    DuplicateDate(NaiveDate),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Chart window failed: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
