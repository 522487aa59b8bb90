use std::path::PathBuf;
use thiserror::Error;

use crate::models::Column;

/// All errors produced by the market-intelligence engine.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// A column required by an operation is not part of the dataset schema.
    #[error("{operation}: required column `{column}` is missing")]
    MissingColumn {
        operation: &'static str,
        column: Column,
    },

    /// A numeric cell passed validity filtering but cannot be averaged.
    #[error("{operation}: non-finite value in column `{column}` for job {job_id}")]
    NonFiniteValue {
        operation: &'static str,
        column: Column,
        job_id: String,
    },

    /// A trailing window reaches outside the representable calendar.
    #[error("{operation}: a window of {days} days cannot be computed")]
    WindowOutOfRange { operation: &'static str, days: u32 },

    /// Any other unexpected fault while deriving a table.
    #[error("{operation}: {detail}")]
    Computation {
        operation: &'static str,
        detail: String,
    },

    /// A dataset snapshot file could not be opened or read.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A timezone name is not a recognised IANA identifier.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AnalyticsError {
    /// Name of the aggregation that failed, when the error came from one.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::MissingColumn { operation, .. }
            | Self::NonFiniteValue { operation, .. }
            | Self::WindowOutOfRange { operation, .. }
            | Self::Computation { operation, .. } => Some(operation),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the market crates.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_column() {
        let err = AnalyticsError::MissingColumn {
            operation: "salary_trends",
            column: Column::Location,
        };
        assert_eq!(
            err.to_string(),
            "salary_trends: required column `location` is missing"
        );
    }

    #[test]
    fn test_error_display_non_finite_value() {
        let err = AnalyticsError::NonFiniteValue {
            operation: "summary_stats",
            column: Column::SalaryMax,
            job_id: "J-7".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("salary_max"));
        assert!(msg.contains("J-7"));
    }

    #[test]
    fn test_error_display_window_out_of_range() {
        let err = AnalyticsError::WindowOutOfRange {
            operation: "posting_trends",
            days: 99,
        };
        assert_eq!(
            err.to_string(),
            "posting_trends: a window of 99 days cannot be computed"
        );
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = AnalyticsError::FileRead {
            path: PathBuf::from("/data/jobs.jsonl"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/data/jobs.jsonl"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_invalid_timezone() {
        let err = AnalyticsError::InvalidTimezone("Mars/Olympus".to_string());
        assert_eq!(err.to_string(), "Invalid timezone: Mars/Olympus");
    }

    #[test]
    fn test_error_operation_only_for_aggregation_errors() {
        let err = AnalyticsError::Computation {
            operation: "location_stats",
            detail: "boom".to_string(),
        };
        assert_eq!(err.operation(), Some("location_stats"));
        assert_eq!(AnalyticsError::Config("x".to_string()).operation(), None);
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: AnalyticsError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AnalyticsError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
