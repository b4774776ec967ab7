//! Error types for Stratum.

use thiserror::Error;

/// Result type alias using StratumError.
pub type Result<T> = std::result::Result<T, StratumError>;

/// Errors that can occur in Stratum operations.
#[derive(Debug, Error)]
pub enum StratumError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Short read on page {page_num}: expected {expected} bytes, got {actual}")]
    ShortRead {
        page_num: u32,
        expected: usize,
        actual: usize,
    },

    // Page errors
    #[error("Page full: need {needed} bytes, {available} available")]
    PageFull { needed: usize, available: usize },

    #[error("Page corrupted: {0}")]
    PageCorrupted(String),

    #[error("Slot {slot} out of range (slot count {slot_count})")]
    SlotOutOfRange { slot: u16, slot_count: u16 },

    #[error("Page {page_num} out of range (page count {page_count})")]
    PageOutOfRange { page_num: u32, page_count: u32 },

    #[error("Record too large: {size} bytes (max {max})")]
    RecordTooLarge { size: usize, max: usize },

    // Codec errors
    #[error("Format error: {0}")]
    Format(String),

    // Schema errors
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),

    #[error("Unknown field '{field}' for table {table}")]
    UnknownField { table: String, field: String },

    #[error("Type mismatch for field {field}: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Schema document error: {0}")]
    Serde(#[from] serde_json::Error),

    // Query errors
    #[error("Parse error: {0}")]
    ParseError(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_io_error_conversion() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: StratumError = io_err.into();
        assert!(matches!(err, StratumError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_short_read_display() {
        let err = StratumError::ShortRead {
            page_num: 3,
            expected: 4096,
            actual: 100,
        };
        assert_eq!(
            err.to_string(),
            "Short read on page 3: expected 4096 bytes, got 100"
        );
    }

    #[test]
    fn test_page_errors_display() {
        let err = StratumError::PageFull {
            needed: 24,
            available: 8,
        };
        assert_eq!(err.to_string(), "Page full: need 24 bytes, 8 available");

        let err = StratumError::SlotOutOfRange {
            slot: 5,
            slot_count: 2,
        };
        assert_eq!(err.to_string(), "Slot 5 out of range (slot count 2)");

        let err = StratumError::RecordTooLarge {
            size: 5000,
            max: 4088,
        };
        assert_eq!(err.to_string(), "Record too large: 5000 bytes (max 4088)");
    }

    #[test]
    fn test_schema_errors_display() {
        let err = StratumError::TableNotFound("Employee".to_string());
        assert_eq!(err.to_string(), "Table not found: Employee");

        let err = StratumError::UnknownFieldType("blob".to_string());
        assert_eq!(err.to_string(), "Unknown field type: blob");

        let err = StratumError::TypeMismatch {
            field: "salary".to_string(),
            expected: "float".to_string(),
            actual: "text".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch for field salary: expected float, got text"
        );
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StratumError>();
    }
}
