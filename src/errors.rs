//! Errors for AIS archive
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AisArchiveError {
    #[error("Configuration error")]
    ConfigError(#[from] config::ConfigError),

    #[error("IO error")]
    IoError(#[from] std::io::Error),

    #[error("Arrow error")]
    ArrowError(#[from] arrow::error::ArrowError),

    #[error("Parquet error")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Invalid MMSI: {0}")]
    InvalidMmsi(String),

    #[error("Invalid number in field '{field}': {value}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Malformed line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl AisArchiveError {
    /// Attach the 1-based input line number to a per-record error
    pub fn at_line(self, line: usize) -> Self {
        match self {
            AisArchiveError::MalformedLine { reason, .. } => {
                AisArchiveError::MalformedLine { line, reason }
            }
            other => AisArchiveError::MalformedLine {
                line,
                reason: other.to_string(),
            },
        }
    }
}
