use chrono::NaiveDate;
use thiserror::Error;

/// All errors produced by the pantry monitor.
#[derive(Error, Debug)]
pub enum PantryError {
    /// The raw table could not be fetched from its source.
    #[error("Failed to fetch raw table: {0}")]
    Fetch(String),

    /// A row of the raw table does not match the fixed 8-column contract.
    #[error("Table schema mismatch at row {row}: expected {expected} columns, found {found}")]
    Schema {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// The byte stream could not be decoded as a delimited table, or an
    /// export could not be written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A filter was given a start date after its end date.
    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for raw I/O errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the pantry crates.
pub type Result<T> = std::result::Result<T, PantryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_fetch() {
        let err = PantryError::Fetch("connection refused".to_string());
        assert_eq!(err.to_string(), "Failed to fetch raw table: connection refused");
    }

    #[test]
    fn test_error_display_schema() {
        let err = PantryError::Schema {
            row: 3,
            expected: 8,
            found: 6,
        };
        assert_eq!(
            err.to_string(),
            "Table schema mismatch at row 3: expected 8 columns, found 6"
        );
    }

    #[test]
    fn test_error_display_invalid_date_range() {
        let err = PantryError::InvalidDateRange {
            from: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2024-02-01"));
        assert!(msg.contains("2024-01-01"));
    }

    #[test]
    fn test_error_display_config() {
        let err = PantryError::Config("no table source configured".to_string());
        assert_eq!(err.to_string(), "Configuration error: no table source configured");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: PantryError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
