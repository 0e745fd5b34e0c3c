//! Error types.
//!
//! - `DataError` is the typed taxonomy raised by the loader and the query
//!   pipeline. Callers can match on it (the TUI turns it into a status line).
//! - `AppError` is what the binary reports: a message plus a process exit code.
//!
//! Exit codes: 2 = input/loading, 3 = query, 4 = terminal/UI.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to open CSV '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error at line {line}: {message}")]
    Csv { line: usize, message: String },

    #[error("Missing required column: `{0}`")]
    MissingColumn(String),

    #[error("Duplicate column: `{0}`")]
    DuplicateColumn(String),

    #[error("Line {line}: invalid date '{value}'. Expected YYYY-MM-DD.")]
    UnparseableDate { line: usize, value: String },

    #[error("Line {line}: invalid number '{value}' in column `{column}`.")]
    UnparseableNumber {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Input file contains no data rows.")]
    EmptyTable,

    #[error("Unknown price sector '{0}'. Expected one of: price_all, price_residential, price_commercial, price_industrial.")]
    InvalidSector(String),

    #[error("Invalid smoothing window {0}: must be at least 1.")]
    InvalidWindow(usize),

    #[error("No rows between {start} and {end}.")]
    EmptyRange { start: NaiveDate, end: NaiveDate },

    #[error("Start date {start} is after end date {end}.")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

impl DataError {
    /// Exit code used when this error terminates the process.
    pub fn exit_code(&self) -> u8 {
        match self {
            DataError::Io { .. }
            | DataError::Csv { .. }
            | DataError::MissingColumn(_)
            | DataError::DuplicateColumn(_)
            | DataError::UnparseableDate { .. }
            | DataError::UnparseableNumber { .. }
            | DataError::EmptyTable => 2,
            DataError::InvalidSector(_)
            | DataError::InvalidWindow(_)
            | DataError::EmptyRange { .. }
            | DataError::InvalidDateRange { .. } => 3,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<DataError> for AppError {
    fn from(err: DataError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
