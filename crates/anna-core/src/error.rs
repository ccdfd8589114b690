//! Unified error handling for Anna Billing
//!
//! Every fallible operation in the workspace returns [`AppError`]. Row-level
//! data problems that the pipeline can recover from (malformed durations) are
//! logged and never surface here.

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Normalization Errors ====================
    #[error("Timezone region not supported: {0} (only \"jkt\" is supported)")]
    UnsupportedRegion(String),

    #[error("Invalid duration (expected hh:mm:ss): {0}")]
    DurationParse(String),

    #[error("Invalid timestamp: {0}")]
    TimestampParse(String),

    // ==================== Source File Errors ====================
    #[error("File '{file}': missing required column '{column}'")]
    MissingColumn { file: String, column: String },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("IO error: {0}")]
    Io(String),

    // ==================== Configuration Errors ====================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns a stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::UnsupportedRegion(_) => "unsupported_region",
            AppError::DurationParse(_) => "duration_parse_error",
            AppError::TimestampParse(_) => "timestamp_parse_error",
            AppError::MissingColumn { .. } => "missing_column",
            AppError::Csv(_) => "csv_error",
            AppError::Io(_) => "io_error",
            AppError::Config(_) => "config_error",
            AppError::Validation(_) => "validation_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// Whether the error aborts the whole run rather than a single file
    pub fn is_fatal_for_run(&self) -> bool {
        matches!(
            self,
            AppError::UnsupportedRegion(_) | AppError::Config(_) | AppError::Validation(_)
        )
    }
}

// ==================== From implementations ====================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::Csv(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::UnsupportedRegion("sgp".to_string()).error_code(),
            "unsupported_region"
        );
        assert_eq!(
            AppError::MissingColumn {
                file: "dashboard.csv".to_string(),
                column: "Call to".to_string(),
            }
            .error_code(),
            "missing_column"
        );
    }

    #[test]
    fn test_missing_column_message() {
        let err = AppError::MissingColumn {
            file: "console.csv".to_string(),
            column: "pbx_region".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "File 'console.csv': missing required column 'pbx_region'"
        );
    }

    #[test]
    fn test_fatal_classification() {
        assert!(AppError::UnsupportedRegion("sgp".to_string()).is_fatal_for_run());
        assert!(!AppError::Csv("bad row".to_string()).is_fatal_for_run());
    }
}
